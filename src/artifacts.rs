//! Distributable artifact building and discovery.
//!
//! Installers are produced by an external builder command; this module runs it, clears its output
//! directory beforehand and finds the files worth uploading afterwards.

use crate::error::{BuildError, ConfigError, Result};
use clap::ValueEnum;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use walkdir::WalkDir;

/// Upload content types keyed by file extension; other extensions are not uploaded
pub const FILE_EXTENSIONS_AND_MIME_TYPES: &[(&str, &str)] = &[
    ("zip", "application/x-zip-compressed"),
    ("exe", "application/x-msdownload"),
];

/// Installer selector passed through to the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum InstallerKind {
    /// Windows installer
    Windows,
    /// ZIP archive
    Zip,
    /// Every installer the builder supports
    All,
}

impl fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            InstallerKind::Windows => "windows",
            InstallerKind::Zip => "zip",
            InstallerKind::All => "all",
        };
        f.write_str(token)
    }
}

/// Produces distributable files on disk
pub trait ArtifactBuilder {
    /// Build the selected installers; `force` builds even from a dirty tree
    fn build(&self, installers: &[InstallerKind], force: bool) -> impl Future<Output = Result<()>>;
}

/// Builder that runs an external command
#[derive(Debug, Clone)]
pub struct CommandArtifactBuilder {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandArtifactBuilder {
    /// Create a builder from a command line such as `["python", "utils/make_installers.py"]`
    pub fn new(command: &[String], working_dir: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| ConfigError::MissingSetting {
            name: "builder".to_string(),
            reason: "the artifact builder command is empty".to_string(),
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: working_dir.into(),
        })
    }

    fn command_line(&self, extra: &[String]) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .chain(extra.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ArtifactBuilder for CommandArtifactBuilder {
    async fn build(&self, installers: &[InstallerKind], force: bool) -> Result<()> {
        let mut extra = vec!["--installers".to_string()];
        extra.extend(installers.iter().map(InstallerKind::to_string));
        if force {
            extra.push("--force".to_string());
        }

        let command_line = self.command_line(&extra);
        log::info!("Running artifact builder: {command_line}");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(&extra)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|e| BuildError::ArtifactBuildFailed {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BuildError::ArtifactBuildFailed {
                command: command_line,
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into());
        }

        Ok(())
    }
}

/// Remove an artifact output directory if it exists
pub async fn remove_output_dir(dir: &Path) -> Result<()> {
    if tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
        log::info!("Removing artifact directory {}", dir.display());
        tokio::fs::remove_dir_all(dir).await?;
    }
    Ok(())
}

/// Content type for an artifact, or `None` when its extension is unrecognised or absent
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    FILE_EXTENSIONS_AND_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime)| *mime)
}

/// Every uploadable file under `dir`, sorted by path, paired with its content type
pub fn collect_artifacts(dir: &Path) -> Result<Vec<(PathBuf, &'static str)>> {
    let mut artifacts = Vec::new();
    if !dir.is_dir() {
        log::warn!("Artifact directory {} does not exist", dir.display());
        return Ok(artifacts);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        match mime_type_for(entry.path()) {
            Some(mime) => artifacts.push((entry.into_path(), mime)),
            None => log::debug!("Skipping unrecognised artifact {}", entry.path().display()),
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_mime_type_table() {
        assert_eq!(mime_type_for(Path::new("a/plugin-1.3.0.zip")), Some("application/x-zip-compressed"));
        assert_eq!(mime_type_for(Path::new("plugin-1.3.0-windows.exe")), Some("application/x-msdownload"));
        assert_eq!(mime_type_for(Path::new("README")), None);
        assert_eq!(mime_type_for(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for(Path::new("archive.ZIP")), None);
    }

    #[test]
    fn test_collect_artifacts_walks_recursively_and_filters() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("windows")).expect("mkdir");
        fs::write(dir.path().join("windows/setup.exe"), b"exe").expect("write");
        fs::write(dir.path().join("plugin.zip"), b"zip").expect("write");
        fs::write(dir.path().join("build.log"), b"log").expect("write");
        fs::write(dir.path().join("LICENSE"), b"license").expect("write");

        let artifacts = collect_artifacts(dir.path()).expect("collect");
        let names: Vec<_> = artifacts
            .iter()
            .map(|(path, mime)| (path.file_name().and_then(|n| n.to_str()).unwrap_or_default(), *mime))
            .collect();
        assert_eq!(
            names,
            vec![
                ("plugin.zip", "application/x-zip-compressed"),
                ("setup.exe", "application/x-msdownload"),
            ]
        );
    }

    #[test]
    fn test_empty_builder_command_is_rejected() {
        let result = CommandArtifactBuilder::new(&[], ".");
        assert!(matches!(
            result,
            Err(crate::error::ReleaseError::Config(ConfigError::MissingSetting { .. }))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_builder_passes_selectors_and_reports_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = "printf '%s ' \"$@\" > args.txt; exit 0";
        let builder = CommandArtifactBuilder::new(
            &["sh".to_string(), "-c".to_string(), script.to_string(), "builder".to_string()],
            dir.path(),
        )
        .expect("builder");
        builder
            .build(&[InstallerKind::Zip, InstallerKind::Windows], true)
            .await
            .expect("build succeeds");
        assert_eq!(
            fs::read_to_string(dir.path().join("args.txt")).expect("read"),
            "--installers zip windows --force "
        );

        let failing = CommandArtifactBuilder::new(
            &["sh".to_string(), "-c".to_string(), "echo boom >&2; exit 3".to_string()],
            dir.path(),
        )
        .expect("builder");
        let err = failing.build(&[InstallerKind::All], false).await.expect_err("build fails");
        assert!(err.to_string().contains("boom"), "{err}");
    }

    #[tokio::test]
    async fn test_remove_output_dir_tolerates_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("installers/output");
        remove_output_dir(&output).await.expect("absent dir is fine");

        fs::create_dir_all(&output).expect("mkdir");
        fs::write(output.join("plugin.zip"), b"zip").expect("write");
        remove_output_dir(&output).await.expect("remove");
        assert!(!output.exists());
    }
}
