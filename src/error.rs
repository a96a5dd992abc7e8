//! Error types for plugin_release operations.
//!
//! Every failure a release attempt can hit maps to exactly one variant here, together with
//! actionable recovery suggestions and the rollback/exit-status policy for that failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plugin_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all plugin_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version parsing and incrementing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Metadata and settings file errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Artifact builder errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Release hosting errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// CLI and interaction errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version string does not match `major.minor[.patch[-prerelease[.patch]]]`
    #[error("Version string '{version}' has invalid format; valid format: {format}")]
    InvalidVersionFormat {
        /// Offending version string
        version: String,
        /// Expected format description
        format: &'static str,
    },

    /// Requested increment is inconsistent with the current version
    #[error("Cannot increment '{version}': {reason}")]
    VersionIncrementConflict {
        /// Version being incremented
        version: String,
        /// Reason for the conflict
        reason: String,
    },

    /// The new version of a release attempt was computed a second time
    #[error("New version already set to '{current}'; refusing to replace it with '{rejected}'")]
    NewVersionAlreadySet {
        /// Version recorded first
        current: String,
        /// Version passed to the second call
        rejected: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Path is not inside a git working tree
    #[error("Not a git repository: {path}")]
    NotRepository {
        /// Path that was opened
        path: PathBuf,
    },

    /// Working tree has modified or untracked paths
    #[error(
        "Repository in branch '{branch}' contains local changes. Please remove or commit changes before proceeding."
    )]
    DirtyWorkingTree {
        /// Active branch of the dirty repository
        branch: String,
    },

    /// The computed release tag already exists
    #[error(
        "Repository already contains tag '{tag}', indicating that such a version is already released."
    )]
    TagAlreadyExists {
        /// Tag name
        tag: String,
    },

    /// A git subcommand exited with a non-zero status
    #[error("git {command} failed: {stderr}")]
    VersionControlCommandFailed {
        /// Subcommand and arguments
        command: String,
        /// Captured stderr
        stderr: String,
    },
}

/// Metadata and settings file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Requested assignments were never found in the metadata file
    #[error("missing the following entries in file '{}': {}", path.display(), names.join(", "))]
    MissingConfigEntries {
        /// Metadata file path
        path: PathBuf,
        /// Names not found, in request order
        names: Vec<String>,
    },

    /// Settings file could not be parsed
    #[error("Failed to parse settings file '{}': {reason}", path.display())]
    InvalidSettings {
        /// Settings file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A value required to run the release could not be determined
    #[error("Missing setting '{name}': {reason}")]
    MissingSetting {
        /// Setting name
        name: String,
        /// Explanation
        reason: String,
    },
}

/// Artifact builder errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// The external artifact builder failed
    #[error("Artifact builder '{command}' failed: {reason}")]
    ArtifactBuildFailed {
        /// Builder command line
        command: String,
        /// Exit status or stderr
        reason: String,
    },
}

/// Release hosting errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Release creation request failed
    #[error("Creating release '{tag}' failed ({status}): {body}")]
    PublishRequestFailed {
        /// Release tag
        tag: String,
        /// Upstream HTTP status, or "request" for transport failures
        status: String,
        /// Upstream response body or transport error
        body: String,
    },

    /// Asset upload failed
    #[error("Uploading asset '{filename}' failed ({status}): {body}")]
    AssetUploadFailed {
        /// Asset file name
        filename: String,
        /// Upstream HTTP status, or "request" for transport failures
        status: String,
        /// Upstream response body or transport error
        body: String,
    },
}

/// CLI and interaction errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The operator answered the confirmation prompt negatively
    #[error("Aborting.")]
    UserDeclined,

    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Exit status used when the operator declines the confirmation prompt
pub const PROMPT_DECLINED_EXIT_STATUS: i32 = 2;

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Git(GitError::DirtyWorkingTree { .. }) => vec![
                "Commit pending changes: git add --all && git commit".to_string(),
                "Stash changes temporarily: git stash".to_string(),
                "Pass --force to release the main repository anyway".to_string(),
            ],
            ReleaseError::Git(GitError::TagAlreadyExists { tag }) => vec![
                format!("Inspect the existing release: git show {tag}"),
                "Choose a different release type or prerelease suffix".to_string(),
            ],
            ReleaseError::Config(ConfigError::MissingConfigEntries { path, names }) => vec![
                format!(
                    "Add the entries to {}: {}",
                    path.display(),
                    names
                        .iter()
                        .map(|name| format!("c.{name} = \"...\""))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ],
            ReleaseError::Publish(_) => vec![
                "Verify the access token has the 'repo' scope".to_string(),
                "Commits and tags may already be pushed; rollback only resets local state"
                    .to_string(),
                "Finish the release manually on the hosting service if it was created"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the shared rollback routine runs for this error.
    ///
    /// A declined prompt and a failed local-changes check happen before anything is touched;
    /// resetting on a dirty tree would discard the changes the check just refused to release.
    /// The orchestrator also skips rollback for any error raised before the first edit.
    pub fn triggers_rollback(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Cli(CliError::UserDeclined)
                | ReleaseError::Git(GitError::DirtyWorkingTree { .. })
        )
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Cli(CliError::UserDeclined) => PROMPT_DECLINED_EXIT_STATUS,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declined_prompt_exits_with_status_two_without_rollback() {
        let err = ReleaseError::from(CliError::UserDeclined);
        assert_eq!(err.exit_code(), 2);
        assert!(!err.triggers_rollback());
        assert_eq!(err.to_string(), "CLI error: Aborting.");
    }

    #[test]
    fn build_failure_triggers_rollback() {
        let err = ReleaseError::from(BuildError::ArtifactBuildFailed {
            command: "make_installers".to_string(),
            reason: "exit status 1".to_string(),
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.triggers_rollback());
    }

    #[test]
    fn missing_entries_message_lists_names() {
        let err = ConfigError::MissingConfigEntries {
            path: PathBuf::from("config.py"),
            names: vec!["PLUGIN_VERSION".to_string(), "AUTHOR_NAME".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing the following entries in file 'config.py': PLUGIN_VERSION, AUTHOR_NAME"
        );
    }
}
