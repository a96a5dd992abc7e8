//! Working-tree handle backed by the system `git` binary.

use crate::error::{GitError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Full commit identifier recorded before a release mutates anything
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Commit hash as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle over one git working tree
#[derive(Debug, Clone)]
pub struct GitRepository {
    work_tree: PathBuf,
}

impl GitRepository {
    /// Open the working tree containing `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::NotRepository {
                path: path.to_path_buf(),
            }
            .into());
        }

        let work_tree = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        log::debug!("Opened repository at {}", work_tree.display());
        Ok(Self { work_tree })
    }

    /// Root of the working tree
    pub fn path(&self) -> &Path {
        &self.work_tree
    }

    /// Run a git subcommand in this working tree and return its stdout.
    ///
    /// A non-zero exit becomes `VersionControlCommandFailed` carrying stderr.
    pub async fn run(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        let command_line = std::iter::once(subcommand)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        log::debug!("[{}] git {}", self.work_tree.display(), command_line);

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.work_tree)
            .arg(subcommand)
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::VersionControlCommandFailed {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Whether `git status` reports any modified or untracked path
    pub async fn has_local_changes(&self) -> Result<bool> {
        Ok(!self.run("status", &["--porcelain"]).await?.is_empty())
    }

    /// Name of the checked-out branch
    pub async fn active_branch_name(&self) -> Result<String> {
        self.run("symbolic-ref", &["--short", "HEAD"]).await
    }

    /// Current HEAD commit
    pub async fn checkpoint(&self) -> Result<CommitId> {
        self.run("rev-parse", &["HEAD"]).await.map(CommitId)
    }

    /// Discard all commits and changes after `to`
    pub async fn reset_hard(&self, to: &CommitId) -> Result<()> {
        self.run("reset", &["--hard", to.as_str()]).await.map(|_| ())
    }

    /// Every tag name in the repository
    pub async fn tags(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .run("tag", &["-l"])
            .await?
            .lines()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Whether a tag with exactly this name exists
    pub async fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(!self.run("tag", &["-l", name]).await?.trim().is_empty())
    }

    /// Create an annotated tag on HEAD
    pub async fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.run("tag", &["-a", name, "-m", message]).await.map(|_| ())
    }

    /// Delete a local tag
    pub async fn delete_tag(&self, name: &str) -> Result<()> {
        self.run("tag", &["-d", name]).await.map(|_| ())
    }

    /// Stage everything and commit it, then amend the commit without changing its message.
    ///
    /// Commit hooks may modify tracked files while the first commit runs; the amend folds
    /// those modifications into the release commit instead of leaving the tree dirty.
    pub async fn create_release_commit(&self, message: &str) -> Result<()> {
        self.run("add", &["--all"]).await?;
        self.run("commit", &["-m", message]).await?;

        self.run("add", &["--all"]).await?;
        self.run("commit", &["--amend", "--no-edit"]).await?;
        Ok(())
    }

    /// Push a refspec to a remote
    pub async fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        self.run("push", &[remote, refspec]).await.map(|_| ())
    }
}
