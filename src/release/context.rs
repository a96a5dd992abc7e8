//! State threaded through one release attempt.

use crate::artifacts::InstallerKind;
use crate::error::{Result, VersionError};
use crate::git::{CommitId, GitRepository};
use crate::version::ReleaseType;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Operator-supplied options for one release attempt
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Version component to bump
    pub release_type: ReleaseType,
    /// Prerelease suffix, e.g. `rc`
    pub prerelease: Option<String>,
    /// Release even if the main repository has local changes
    pub force: bool,
    /// Print every action without performing it
    pub dry_run: bool,
    /// Ask for confirmation before mutating anything
    pub interactive: bool,
    /// Installer selectors passed to the artifact builder
    pub installers: Vec<InstallerKind>,
    /// Remote to push to
    pub remote_name: String,
    /// Branch on the remote receiving the release commit
    pub remote_branch: String,
}

/// Everything a release attempt and its rollback need to know.
///
/// Options live in their own struct so they cannot shadow the captured state. Only
/// `new_version` (once) and `release_notes` change after construction.
#[derive(Debug)]
pub struct ReleaseContext<'a> {
    main_repo: &'a GitRepository,
    docs_repo: &'a GitRepository,
    current_version: String,
    new_version: OnceCell<String>,
    released_versions: BTreeSet<String>,
    options: ReleaseOptions,
    checkpoint_main: CommitId,
    checkpoint_docs: CommitId,
    artifacts_dir: PathBuf,
    release_notes: String,
}

impl<'a> ReleaseContext<'a> {
    /// Snapshot both repositories before anything is touched
    pub async fn capture(
        main_repo: &'a GitRepository,
        docs_repo: &'a GitRepository,
        current_version: impl Into<String>,
        options: ReleaseOptions,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let released_versions = main_repo.tags().await?;
        let checkpoint_main = main_repo.checkpoint().await?;
        let checkpoint_docs = docs_repo.checkpoint().await?;

        log::debug!(
            "Captured checkpoints main={checkpoint_main} docs={checkpoint_docs}, {} released version(s)",
            released_versions.len()
        );

        Ok(Self {
            main_repo,
            docs_repo,
            current_version: current_version.into(),
            new_version: OnceCell::new(),
            released_versions,
            options,
            checkpoint_main,
            checkpoint_docs,
            artifacts_dir: artifacts_dir.into(),
            release_notes: String::new(),
        })
    }

    pub fn main_repo(&self) -> &'a GitRepository {
        self.main_repo
    }

    pub fn docs_repo(&self) -> &'a GitRepository {
        self.docs_repo
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Computed version, once the version step has run
    pub fn new_version(&self) -> Option<&str> {
        self.new_version.get().map(String::as_str)
    }

    /// Record the computed version; a second call is rejected
    pub fn set_new_version(&self, version: String) -> Result<()> {
        self.new_version.set(version).map_err(|rejected| {
            VersionError::NewVersionAlreadySet {
                current: self.new_version.get().cloned().unwrap_or_default(),
                rejected,
            }
            .into()
        })
    }

    /// Main repository tags at the time the release started
    pub fn released_versions(&self) -> &BTreeSet<String> {
        &self.released_versions
    }

    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    pub fn checkpoint_main(&self) -> &CommitId {
        &self.checkpoint_main
    }

    pub fn checkpoint_docs(&self) -> &CommitId {
        &self.checkpoint_docs
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn release_notes(&self) -> &str {
        &self.release_notes
    }

    pub fn set_release_notes(&mut self, notes: String) {
        self.release_notes = notes;
    }
}
