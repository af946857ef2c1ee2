//! Domain layer: pure rules and types for construct ingestion.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, `std::process`, or `std::net` sockets.
//! All functions are synchronous and take data in, returning data out.

pub mod collect;
pub mod config;
pub mod error;
pub mod git_ref;
pub mod identity;
pub mod manifest;
pub mod tree;
pub mod url_policy;

pub use collect::{CollectBudget, CollectLimits, mime_type_for};
pub use config::SyncConfig;
pub use error::{GitSyncError, GitSyncErrorCode, SyncOutcome};
pub use tree::check_entry;
pub use url_policy::{blocked_range, check_url_shape};
