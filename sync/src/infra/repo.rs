//! Local-filesystem implementation of the `ScratchSpace` and `RepoReader`
//! ports. Each stage runs on the blocking pool.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;

use crate::application::ports::{RepoReader, ScratchSpace};
use crate::domain::SyncOutcome;
use crate::domain::collect::CollectLimits;
use crate::infra::fs::blocking;
use crate::infra::manifest::ManifestSchema;
use crate::infra::workdir::WorkDir;
use crate::infra::{collector, identity, manifest, tree};
use construct_common::{CollectedFile, IdentityData};

/// Reads cloned trees from local disk.
#[derive(Debug, Clone)]
pub struct LocalRepo {
    limits: CollectLimits,
    work_root: Option<PathBuf>,
    schema: &'static ManifestSchema,
}

impl LocalRepo {
    #[must_use]
    pub fn new(
        limits: CollectLimits,
        work_root: Option<PathBuf>,
        schema: &'static ManifestSchema,
    ) -> Self {
        Self {
            limits,
            work_root,
            schema,
        }
    }
}

impl ScratchSpace for LocalRepo {
    fn allocate(&self) -> Result<(PathBuf, Box<dyn std::any::Any + Send>)> {
        let workdir = WorkDir::create(self.work_root.as_deref())?;
        Ok((workdir.path().to_path_buf(), Box::new(workdir)))
    }
}

impl RepoReader for LocalRepo {
    async fn validate_tree(&self, root: &Path) -> SyncOutcome<()> {
        let root = root.to_path_buf();
        let max_path_len = self.limits.max_path_len;
        blocking(move || tree::validate_tree(&root, max_path_len)).await
    }

    async fn read_manifest(&self, root: &Path) -> SyncOutcome<Value> {
        let root = root.to_path_buf();
        let schema = self.schema;
        let max = self.limits.max_file_bytes;
        blocking(move || manifest::read_manifest(&root, schema, max)).await
    }

    async fn collect_files(&self, root: &Path) -> SyncOutcome<Vec<CollectedFile>> {
        let root = root.to_path_buf();
        let limits = self.limits;
        blocking(move || collector::collect_files(&root, limits)).await
    }

    async fn read_identity(&self, root: &Path) -> Option<IdentityData> {
        let root = root.to_path_buf();
        let max = self.limits.max_file_bytes;
        blocking(move || identity::read_identity(&root, max)).await
    }
}
