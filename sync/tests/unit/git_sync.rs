//! End-to-end tests of the sync orchestrator over fixture trees.
//!
//! Clone and DNS are faked; every filesystem stage runs for real inside a
//! temporary work root that must be empty again when `sync` returns.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use construct_sync::application::ports::{RepoReader, ScratchSpace};
use construct_sync::domain::{SyncOutcome, check_entry};
use construct_sync::infra::fs::blocking;
use construct_sync::infra::workdir::WorkDir;
use construct_sync::{CollectedFile, GitSync, GitSyncErrorCode, IdentityData, SyncConfig};
use serde_json::Value;
use tempfile::TempDir;

use crate::helpers::{
    COMMIT, FakeResolver, FixtureCloner, MANIFEST_YAML, NO_SCHEMA, bundled_schema, file,
    leftovers, pipeline,
};

const URL: &str = "https://github.com/acme/pack";

fn work_root() -> TempDir {
    tempfile::tempdir().expect("work root")
}

fn assert_cleaned(root: &TempDir, cloner: &FixtureCloner) {
    assert!(
        leftovers(root.path()).is_empty(),
        "working directory left behind: {:?}",
        leftovers(root.path())
    );
    if let Some(dest) = cloner.dest() {
        assert!(!dest.exists(), "{} still exists", dest.display());
    }
}

// ── Success ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_minimal_pack_syncs() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("README.md", "hello pack"),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let result = sync.sync(URL, "main").await.unwrap();

    assert_eq!(result.commit, COMMIT);
    assert_eq!(result.commit.len(), 40);
    assert_eq!(result.version, "1.0.0");
    assert_eq!(result.manifest["slug"], "acme-pack");
    let readme = result.file("README.md").expect("readme collected");
    assert_eq!(readme.size_bytes, 10);
    assert_eq!(readme.mime_type, "text/markdown");
    assert_eq!(
        result.total_size_bytes,
        result.files.iter().map(|f| f.size_bytes).sum::<u64>()
    );
    assert!(result.identity.is_none());
    assert_eq!(cloner.clones(), 1);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_full_pack_collects_allow_listed_content_only() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("LICENSE", "MIT"),
        file("skills/review/SKILL.md", "# Review"),
        file("commands/fix.md", "fix it"),
        file("scripts/setup.sh", "#!/bin/sh\n"),
        file("node_modules/x/index.js", "nope"),
        file("secrets.env", "TOKEN=1"),
        file(".github/workflows/ci.yml", "on: push"),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let result = sync.sync(URL, "main").await.unwrap();

    let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "construct.yaml",
            "LICENSE",
            "skills/review/SKILL.md",
            "commands/fix.md",
            "scripts/setup.sh",
        ]
    );
    assert!(paths.iter().all(|p| !p.starts_with(".git")));
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_identity_is_extracted() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file(
            "identity/persona.yaml",
            "cognitive_frame:\n  archetype: mentor\nvoice:\n  tone: warm\n",
        ),
        file(
            "identity/expertise.yaml",
            "domains:\n  - rust\n  - name: security\n",
        ),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let identity = sync.sync(URL, "main").await.unwrap().identity.expect("identity");

    assert_eq!(
        identity.expertise_domains,
        Some(vec!["rust".to_string(), "security".to_string()])
    );
    assert_eq!(identity.cognitive_frame.unwrap()["archetype"], "mentor");
    assert_eq!(identity.voice_config.unwrap()["tone"], "warm");
    assert!(identity.persona_yaml.unwrap().contains("mentor"));
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_broken_identity_does_not_fail_sync() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("identity/persona.yaml", "cognitive_frame: [unclosed"),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let result = sync.sync(URL, "main").await.unwrap();

    assert!(result.identity.is_none());
    // The raw file is still part of the snapshot.
    assert!(result.file("identity/persona.yaml").is_some());
}

#[tokio::test]
async fn test_fallback_manifest_is_used_when_primary_is_absent() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file(
        "manifest.json",
        r#"{"name":"Acme","slug":"acme","version":"2.1.0"}"#,
    )]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let result = sync.sync(URL, "main").await.unwrap();

    assert_eq!(result.version, "2.1.0");
    assert_eq!(result.file("manifest.json").unwrap().mime_type, "application/json");
}

#[tokio::test]
async fn test_resync_of_unchanged_tree_is_identical() {
    let entries = vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/a.md", "alpha"),
        file("skills/b.md", "beta"),
    ];
    let resolver = FakeResolver::public();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let root = work_root();
        let cloner = FixtureCloner::new(entries.clone());
        let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);
        runs.push(sync.sync(URL, "main").await.unwrap());
    }

    fn hashes(files: &[CollectedFile]) -> Vec<(String, String)> {
        files
            .iter()
            .map(|f| (f.path.clone(), f.content_hash.clone()))
            .collect()
    }
    assert_eq!(hashes(&runs[0].files), hashes(&runs[1].files));
    assert_eq!(runs[0].total_size_bytes, runs[1].total_size_bytes);
}

// ── Failures: every one of them must leave the work root empty ───────────────

#[tokio::test]
async fn test_http_url_fails_without_clone() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML)]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync("http://github.com/acme/pack", "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::InvalidProtocol);
    assert_eq!(cloner.clones(), 0);
    assert_eq!(resolver.lookups(), 0);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_foreign_host_fails_without_clone() {
    let root = work_root();
    let cloner = FixtureCloner::new(Vec::new());
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync("https://evil.com/x", "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::HostNotAllowed);
    assert_eq!(cloner.clones(), 0);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_ssrf_fails_without_clone() {
    let root = work_root();
    let cloner = FixtureCloner::new(Vec::new());
    let resolver = FakeResolver::answering(&["169.254.169.254"]);
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::SsrfBlocked);
    assert_eq!(cloner.clones(), 0);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_clone_error_is_returned_unchanged() {
    let root = work_root();
    let cloner = FixtureCloner::failing(GitSyncErrorCode::CloneTimeout, "Clone timed out after 60s");
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::CloneTimeout);
    assert_eq!(err.message, "Clone timed out after 60s");
    assert_cleaned(&root, &cloner);
}

#[cfg(unix)]
#[tokio::test]
async fn test_nested_symlink_is_rejected() {
    use crate::helpers::Entry;

    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        Entry::Symlink("skills/deep/creds.md", "/etc/passwd"),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::SymlinkDetected);
    assert!(err.message.contains("skills/deep/creds.md"));
    assert_cleaned(&root, &cloner);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_outside_collected_dirs_is_still_rejected() {
    use crate::helpers::Entry;

    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        Entry::Symlink("docs/link", "../../.."),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::SymlinkDetected);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_overlong_path_is_rejected() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa/b.md", "x"),
    ]);
    let resolver = FakeResolver::public();
    let config = SyncConfig {
        max_path_len: 20,
        ..SyncConfig::default()
    };
    let sync = pipeline(&config, root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::PathTooLong);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_missing_manifest_is_rejected() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file("README.md", "no manifest here")]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::NoManifest);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_manifest_without_version_fails_degraded_validation() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file(
        "construct.yaml",
        "name: Acme Pack\nslug: acme-pack\n",
    )]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&SyncConfig::default(), root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::ManifestValidationFailed);
    assert!(err.message.contains("version"), "{}", err.message);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_bundled_schema_reports_every_violation() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file(
        "construct.yaml",
        "name: Acme Pack\nslug: Not A Slug\nversion: latest\n",
    )]);
    let resolver = FakeResolver::public();
    let sync = pipeline(
        &SyncConfig::default(),
        root.path(),
        &cloner,
        &resolver,
        bundled_schema(),
    );

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::ManifestValidationFailed);
    assert!(err.message.contains("/slug"), "{}", err.message);
    assert!(err.message.contains("/version"), "{}", err.message);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_bundled_schema_accepts_valid_manifest() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML)]);
    let resolver = FakeResolver::public();
    let sync = pipeline(
        &SyncConfig::default(),
        root.path(),
        &cloner,
        &resolver,
        bundled_schema(),
    );

    assert!(sync.sync(URL, "main").await.is_ok());
}

#[tokio::test]
async fn test_file_at_size_ceiling_is_accepted_one_more_byte_is_not() {
    let config = SyncConfig {
        max_file_bytes: 64,
        ..SyncConfig::default()
    };
    let resolver = FakeResolver::public();

    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/exact.md", vec![b'a'; 64]),
    ]);
    let sync = pipeline(&config, root.path(), &cloner, &resolver, &NO_SCHEMA);
    assert!(sync.sync(URL, "main").await.is_ok());

    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/over.md", vec![b'a'; 65]),
    ]);
    let sync = pipeline(&config, root.path(), &cloner, &resolver, &NO_SCHEMA);
    let err = sync.sync(URL, "main").await.unwrap_err();
    assert_eq!(err.code, GitSyncErrorCode::FileTooLarge);
    assert!(err.message.contains("skills/over.md"));
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_aggregate_ceiling_is_enforced() {
    let config = SyncConfig {
        max_total_bytes: 100,
        ..SyncConfig::default()
    };
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/a.md", vec![b'a'; 40]),
        file("skills/b.md", vec![b'b'; 40]),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&config, root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::TotalSizeExceeded);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_file_beyond_count_ceiling_is_rejected() {
    let config = SyncConfig {
        max_files: 3,
        ..SyncConfig::default()
    };
    let root = work_root();
    let cloner = FixtureCloner::new(vec![
        file("construct.yaml", MANIFEST_YAML),
        file("skills/1.md", "1"),
        file("skills/2.md", "2"),
        file("skills/3.md", "3"),
    ]);
    let resolver = FakeResolver::public();
    let sync = pipeline(&config, root.path(), &cloner, &resolver, &NO_SCHEMA);

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::TooManyFiles);
    assert!(err.message.contains("skills/3.md"), "{}", err.message);
    assert_cleaned(&root, &cloner);
}

// ── Stage ordering ───────────────────────────────────────────────────────────

/// A repository whose tree holds a traversal entry. Counts every content
/// read so the test can prove none happened.
#[derive(Clone)]
struct TraversalRepo {
    work_root: PathBuf,
    reads: Arc<AtomicUsize>,
}

impl ScratchSpace for TraversalRepo {
    fn allocate(&self) -> anyhow::Result<(PathBuf, Box<dyn Any + Send>)> {
        let workdir = WorkDir::create(Some(&self.work_root))?;
        Ok((workdir.path().to_path_buf(), Box::new(workdir)))
    }
}

impl RepoReader for TraversalRepo {
    async fn validate_tree(&self, _root: &Path) -> SyncOutcome<()> {
        check_entry("skills/../../etc/passwd", false, 255)
    }
    async fn read_manifest(&self, _root: &Path) -> SyncOutcome<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Null)
    }
    async fn collect_files(&self, _root: &Path) -> SyncOutcome<Vec<CollectedFile>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
    async fn read_identity(&self, _root: &Path) -> Option<IdentityData> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        None
    }
}

#[tokio::test]
async fn test_traversal_entry_stops_sync_before_any_read() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML)]);
    let repo = TraversalRepo {
        work_root: root.path().to_path_buf(),
        reads: Arc::default(),
    };
    let sync = GitSync::new(
        &SyncConfig::default(),
        cloner.clone(),
        FakeResolver::public(),
        repo.clone(),
    );

    let err = sync.sync(URL, "main").await.unwrap_err();

    assert_eq!(err.code, GitSyncErrorCode::PathTraversal);
    assert!(err.message.contains("skills/../../etc/passwd"));
    assert_eq!(repo.reads.load(Ordering::SeqCst), 0);
    assert_cleaned(&root, &cloner);
}

#[tokio::test]
async fn test_concurrent_syncs_do_not_share_directories() {
    let root = work_root();
    let resolver = FakeResolver::public();
    let a = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML), file("README.md", "a")]);
    let b = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML), file("README.md", "bb")]);
    let sync_a = pipeline(&SyncConfig::default(), root.path(), &a, &resolver, &NO_SCHEMA);
    let sync_b = pipeline(&SyncConfig::default(), root.path(), &b, &resolver, &NO_SCHEMA);

    let (ra, rb) = tokio::join!(sync_a.sync(URL, "main"), sync_b.sync(URL, "main"));

    assert_eq!(ra.unwrap().file("README.md").unwrap().size_bytes, 1);
    assert_eq!(rb.unwrap().file("README.md").unwrap().size_bytes, 2);
    assert_ne!(a.dest(), b.dest());
    assert_cleaned(&root, &a);
    assert_cleaned(&root, &b);
}

// ── Unexpected faults ────────────────────────────────────────────────────────

/// Passes tree and manifest stages, then panics on the blocking pool while
/// collecting files.
#[derive(Clone)]
struct PanickingRepo {
    work_root: PathBuf,
}

impl ScratchSpace for PanickingRepo {
    fn allocate(&self) -> anyhow::Result<(PathBuf, Box<dyn Any + Send>)> {
        let workdir = WorkDir::create(Some(&self.work_root))?;
        Ok((workdir.path().to_path_buf(), Box::new(workdir)))
    }
}

impl RepoReader for PanickingRepo {
    async fn validate_tree(&self, _root: &Path) -> SyncOutcome<()> {
        Ok(())
    }
    async fn read_manifest(&self, _root: &Path) -> SyncOutcome<Value> {
        Ok(serde_json::json!({ "name": "a", "slug": "a", "version": "1.0.0" }))
    }
    async fn collect_files(&self, _root: &Path) -> SyncOutcome<Vec<CollectedFile>> {
        blocking(|| -> SyncOutcome<Vec<CollectedFile>> { panic!("collector blew up") }).await
    }
    async fn read_identity(&self, _root: &Path) -> Option<IdentityData> {
        None
    }
}

#[tokio::test]
async fn test_panicking_stage_still_removes_working_directory() {
    let root = work_root();
    let cloner = FixtureCloner::new(vec![file("construct.yaml", MANIFEST_YAML)]);
    let sync = GitSync::new(
        &SyncConfig::default(),
        cloner.clone(),
        FakeResolver::public(),
        PanickingRepo {
            work_root: root.path().to_path_buf(),
        },
    );

    let joined = tokio::spawn(async move { sync.sync(URL, "main").await }).await;

    let err = joined.expect_err("stage panic propagates");
    assert!(err.is_panic());
    assert_eq!(cloner.clones(), 1);
    assert_cleaned(&root, &cloner);
}
