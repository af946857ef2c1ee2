//! Construct sync: clones a third-party repository and turns it into a
//! size-bounded, content-addressed snapshot.
//!
//! The repository content is untrusted. Every stage either passes the tree
//! on unchanged or fails the whole run with a single [`GitSyncError`].

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod application;
pub mod domain;
pub mod infra;

pub use app::{ProductionSync, sync_from_git};
pub use application::services::git_sync::GitSync;
pub use construct_common::{CollectedFile, GitSyncError, GitSyncErrorCode, IdentityData, SyncResult};
pub use domain::config::SyncConfig;
