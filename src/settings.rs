//! Project layout settings.
//!
//! An optional `release.toml` next to the plug-in sources describes where the metadata file,
//! changelog, documentation checkout and installer output live. Every key is optional; missing
//! keys fall back to the plug-in's standard layout. Relative paths resolve against the main
//! repository root.

use crate::error::{ConfigError, Result};
use crate::metadata::{AUTHOR_ENTRY, MetadataFile, REPOSITORY_ENTRY};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the main repository root
pub const SETTINGS_FILE_NAME: &str = "release.toml";

/// Release tool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// File holding the `c.PLUGIN_VERSION` assignments
    pub metadata_file: PathBuf,
    /// Changelog whose first section holds the release notes
    pub changelog_file: PathBuf,
    /// Working tree of the documentation branch
    pub docs_repo: PathBuf,
    /// Subdirectory of `docs_repo` holding the development copies
    pub docs_staging_dir: PathBuf,
    /// Directories of `docs_repo` replaced by their staged counterparts
    pub docs_mirrored_dirs: Vec<String>,
    /// Directory the artifact builder writes to
    pub artifacts_dir: PathBuf,
    /// Artifact builder command line
    pub builder: Vec<String>,
    /// Hosting API base URL
    pub api_base: String,
    /// Repository owner on the hosting service; defaults to `c.AUTHOR_NAME`
    pub owner: Option<String>,
    /// Repository name on the hosting service; defaults to `c.REPOSITORY_NAME`
    pub repo: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            metadata_file: PathBuf::from("export_layers/config.py"),
            changelog_file: PathBuf::from("CHANGELOG.md"),
            docs_repo: PathBuf::from("docs/gh-pages"),
            docs_staging_dir: PathBuf::from("dev"),
            docs_mirrored_dirs: vec!["images".to_string(), "sections".to_string()],
            artifacts_dir: PathBuf::from("installers/output"),
            builder: vec!["python".to_string(), "utils/make_installers.py".to_string()],
            api_base: "https://api.github.com".to_string(),
            owner: None,
            repo: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            ConfigError::InvalidSettings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Load settings from `path`; the file must exist
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let settings = Self::from_toml(&text, path)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path`, or use the defaults when it does not exist
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            log::debug!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Absolute metadata file path
    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.metadata_file)
    }

    /// Absolute changelog path
    pub fn changelog_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.changelog_file)
    }

    /// Absolute documentation working tree path
    pub fn docs_repo_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.docs_repo)
    }

    /// Absolute artifact output directory
    pub fn artifacts_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.artifacts_dir)
    }

    /// Owner and repository name on the hosting service
    pub fn hosting_repository(&self, metadata: &MetadataFile) -> Result<(String, String)> {
        let owner = match &self.owner {
            Some(owner) => owner.clone(),
            None => metadata
                .get(AUTHOR_ENTRY)
                .map(str::to_string)
                .ok_or_else(|| missing_hosting_setting("owner", AUTHOR_ENTRY, metadata))?,
        };
        let repo = match &self.repo {
            Some(repo) => repo.clone(),
            None => metadata
                .get(REPOSITORY_ENTRY)
                .map(str::to_string)
                .ok_or_else(|| missing_hosting_setting("repo", REPOSITORY_ENTRY, metadata))?,
        };
        Ok((owner, repo))
    }
}

fn missing_hosting_setting(name: &str, entry: &str, metadata: &MetadataFile) -> ConfigError {
    ConfigError::MissingSetting {
        name: name.to_string(),
        reason: format!(
            "not set in settings and no c.{entry} assignment in {}",
            metadata.path().display()
        ),
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
