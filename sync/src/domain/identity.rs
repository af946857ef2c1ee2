//! Identity projections derived from `identity/persona.yaml` and
//! `identity/expertise.yaml`.

use serde_json::{Map, Value};

use construct_common::IdentityData;

pub const IDENTITY_DIR: &str = "identity";
pub const PERSONA_FILE: &str = "persona.yaml";
pub const EXPERTISE_FILE: &str = "expertise.yaml";

/// Keys of `persona.cognitive_frame` that are carried into the projection.
pub const COGNITIVE_FRAME_KEYS: &[&str] =
    &["archetype", "disposition", "thinking_style", "decision_making"];

/// A parsed identity document together with its original text.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityDoc {
    pub value: Value,
    pub raw: String,
}

/// Parse one identity document. Anything that is not YAML is treated as
/// absent by the caller.
///
/// # Errors
///
/// Returns the YAML parser's message.
pub fn parse_doc(raw: String) -> Result<IdentityDoc, String> {
    let value: Value = serde_yaml::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(IdentityDoc { value, raw })
}

/// Combine the two optional documents. `None` when both are absent.
#[must_use]
pub fn build_identity(
    persona: Option<IdentityDoc>,
    expertise: Option<IdentityDoc>,
) -> Option<IdentityData> {
    if persona.is_none() && expertise.is_none() {
        return None;
    }

    let persona_value = persona.as_ref().map(|d| &d.value);
    let expertise_value = expertise.as_ref().map(|d| &d.value);

    let cognitive_frame = persona_value
        .and_then(|p| p.get("cognitive_frame"))
        .and_then(cognitive_frame_subset);
    let voice_config = persona_value.and_then(|p| p.get("voice")).cloned();
    let model_preferences = persona_value
        .and_then(|p| p.get("model_preferences"))
        .cloned();
    let expertise_domains = expertise_value
        .and_then(|e| e.get("domains"))
        .and_then(domain_names);

    Some(IdentityData {
        persona: persona.as_ref().map(|d| d.value.clone()),
        expertise: expertise.as_ref().map(|d| d.value.clone()),
        persona_yaml: persona.map(|d| d.raw),
        expertise_yaml: expertise.map(|d| d.raw),
        cognitive_frame,
        expertise_domains,
        voice_config,
        model_preferences,
    })
}

fn cognitive_frame_subset(frame: &Value) -> Option<Value> {
    let frame = frame.as_object()?;
    let subset: Map<String, Value> = COGNITIVE_FRAME_KEYS
        .iter()
        .filter_map(|key| frame.get(*key).map(|v| ((*key).to_string(), v.clone())))
        .collect();
    Some(Value::Object(subset))
}

fn domain_names(domains: &Value) -> Option<Vec<String>> {
    let domains = domains.as_array()?;
    Some(
        domains
            .iter()
            .filter_map(|d| match d {
                Value::String(name) => Some(name.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
    )
}
