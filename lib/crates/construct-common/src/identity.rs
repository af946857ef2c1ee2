//! Optional persona/expertise descriptors shipped under `identity/`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed identity documents plus the projections consumers index on.
///
/// Each projection is `Some` only when its source field exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityData {
    pub persona: Option<Value>,
    pub expertise: Option<Value>,
    /// Original text of `persona.yaml`.
    pub persona_yaml: Option<String>,
    /// Original text of `expertise.yaml`.
    pub expertise_yaml: Option<String>,
    pub cognitive_frame: Option<Value>,
    pub expertise_domains: Option<Vec<String>>,
    pub voice_config: Option<Value>,
    pub model_preferences: Option<Value>,
}
