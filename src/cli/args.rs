//! Command line argument parsing and validation.

use crate::artifacts::InstallerKind;
use crate::version::ReleaseType;
use clap::Parser;
use std::path::PathBuf;

/// Release tool for a GIMP plug-in and its documentation site
#[derive(Parser, Debug, Clone)]
#[command(
    name = "plugin_release",
    version,
    about = "Cut a plug-in release: bump the version, tag, build installers and publish",
    long_about = "Cut a plug-in release.

Bumps the version in the metadata file, retitles the changelog, commits and tags the main
repository, mirrors the staged documentation into the docs branch, builds installers, pushes
everything and publishes a GitHub release with the installers attached.

Any failure before the end rolls back local changes. Pushed refs and published releases are
not undone.

Usage:
  plugin_release minor <token>
  plugin_release patch <token> --dry-run
  plugin_release major <token> -p rc -i zip"
)]
pub struct Args {
    /// Version component to bump
    #[arg(value_enum, value_name = "RELEASE_TYPE")]
    pub release_type: ReleaseType,

    /// GitHub access token used to create the release
    #[arg(value_name = "GITHUB_ACCESS_TOKEN")]
    pub github_access_token: String,

    /// Release even if the main repository has local changes
    #[arg(short, long)]
    pub force: bool,

    /// Installers to build
    #[arg(short, long, value_enum, num_args = 1.., default_values_t = [InstallerKind::All])]
    pub installers: Vec<InstallerKind>,

    /// Print every action without performing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Prerelease suffix, e.g. `alpha` or `rc`
    #[arg(short, long, value_name = "SUFFIX")]
    pub prerelease: Option<String>,

    /// Remote to push to
    #[arg(short, long, default_value = "origin")]
    pub remote_name: String,

    /// Branch on the remote receiving the release commit
    #[arg(short = 'b', long, default_value = "master")]
    pub remote_branch: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Main repository
    #[arg(short = 'C', long = "repo", value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Settings file (default: <repo>/release.toml, optional)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.github_access_token.trim().is_empty() {
            return Err("GitHub access token must not be empty".to_string());
        }

        if let Some(suffix) = &self.prerelease
            && suffix.is_empty()
        {
            return Err("Prerelease suffix must not be empty".to_string());
        }

        if self.remote_name.is_empty() || self.remote_branch.is_empty() {
            return Err("Remote name and branch must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["plugin_release", "minor", "token"]).expect("parse");
        assert_eq!(args.release_type, ReleaseType::Minor);
        assert_eq!(args.installers, vec![InstallerKind::All]);
        assert_eq!(args.remote_name, "origin");
        assert_eq!(args.remote_branch, "master");
        assert_eq!(args.repo, PathBuf::from("."));
        assert!(!args.force && !args.dry_run && !args.yes);
        assert!(args.config.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "plugin_release", "patch", "token", "-f", "-n", "-y", "-p", "rc", "-r", "upstream",
            "-b", "main", "-i", "zip", "windows",
        ])
        .expect("parse");
        assert!(args.force && args.dry_run && args.yes);
        assert_eq!(args.prerelease.as_deref(), Some("rc"));
        assert_eq!(args.remote_name, "upstream");
        assert_eq!(args.remote_branch, "main");
        assert_eq!(args.installers, vec![InstallerKind::Zip, InstallerKind::Windows]);
    }

    #[test]
    fn test_rejects_unknown_release_type_and_installer() {
        assert!(Args::try_parse_from(["plugin_release", "huge", "token"]).is_err());
        assert!(Args::try_parse_from(["plugin_release", "minor", "token", "-i", "deb"]).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_token() {
        let args = Args::try_parse_from(["plugin_release", "minor", " "]).expect("parse");
        assert!(args.validate().is_err());
    }
}
