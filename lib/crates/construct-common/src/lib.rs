//! Types shared between the construct sync pipeline and its consumers.
//!
//! Everything here is plain data: serializable, immutable once built, and
//! free of I/O.

pub mod error;
pub mod identity;
pub mod sync;

pub use error::{GitSyncError, GitSyncErrorCode};
pub use identity::IdentityData;
pub use sync::{CollectedFile, SyncResult};
