//! Plug-in metadata file handling.
//!
//! The metadata file is a Python module holding assignments such as
//! `c.PLUGIN_VERSION = "1.2.0"`. Releases read the current version and repository
//! coordinates from it and rewrite the version and release date in place.

use crate::error::{ConfigError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Assignment holding the plug-in version
pub const VERSION_ENTRY: &str = "PLUGIN_VERSION";
/// Assignment holding the release date of the current version
pub const RELEASE_DATE_ENTRY: &str = "PLUGIN_VERSION_RELEASE_DATE";
/// Assignment holding the hosting account name
pub const AUTHOR_ENTRY: &str = "AUTHOR_NAME";
/// Assignment holding the hosting repository name
pub const REPOSITORY_ENTRY: &str = "REPOSITORY_NAME";

static ASSIGNMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^c\.([A-Za-z_][A-Za-z0-9_]*) = "(.*)"$"#)
        .unwrap_or_else(|e| panic!("invalid assignment pattern: {e}"))
});

/// Names requested by [`apply`] that no line assigned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing entries: {}", .0.join(", "))]
pub struct MissingEntries(pub Vec<String>);

/// Rewrite `c.<NAME> = "<value>"` lines for every requested name.
///
/// Lines are rewritten in place on the first match of each name. Scanning stops once every
/// name has been satisfied. Names never found are reported in request order; lines matched
/// before the failure stay rewritten.
pub fn apply(lines: &mut [String], assignments: &[(&str, &str)]) -> std::result::Result<(), MissingEntries> {
    let mut pending: Vec<(&str, &str)> = assignments.to_vec();

    for line in lines.iter_mut() {
        if pending.is_empty() {
            break;
        }

        pending.retain(|(name, value)| match rewrite_assignment(line, name, value) {
            Some(rewritten) => {
                *line = rewritten;
                false
            }
            None => true,
        });
    }

    if pending.is_empty() {
        Ok(())
    } else {
        Err(MissingEntries(
            pending.into_iter().map(|(name, _)| name.to_string()).collect(),
        ))
    }
}

/// Collect every `c.<NAME> = "<value>"` assignment in the document
pub fn read_assignments(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| ASSIGNMENT_PATTERN.captures(line.trim_end_matches('\r')))
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

/// Format a release date as `Month DD, YYYY`
pub fn format_release_date(now: DateTime<Utc>) -> String {
    now.format("%B %d, %Y").to_string()
}

fn rewrite_assignment(line: &str, name: &str, value: &str) -> Option<String> {
    let (body, ending) = split_line_ending(line);
    let prefix = format!("c.{name} = \"");

    let quoted = body.strip_prefix(&prefix)?;
    if !quoted.ends_with('"') {
        return None;
    }

    Some(format!("{prefix}{value}\"{ending}"))
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    (trimmed, &line[trimmed.len()..])
}

/// Metadata file on disk
#[derive(Debug, Clone)]
pub struct MetadataFile {
    path: PathBuf,
    assignments: BTreeMap<String, String>,
}

impl MetadataFile {
    /// Read the metadata file and index its assignments
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path).await?;
        let assignments = read_assignments(&text);
        log::debug!("Read {} assignment(s) from {}", assignments.len(), path.display());
        Ok(Self { path, assignments })
    }

    /// Path of the metadata file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value assigned to `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignments.get(name).map(String::as_str)
    }

    /// Value assigned to `name`, or `MissingConfigEntries`
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| {
            ConfigError::MissingConfigEntries {
                path: self.path.clone(),
                names: vec![name.to_string()],
            }
            .into()
        })
    }

    /// Rewrite the given assignments in the file on disk
    pub async fn update(&self, assignments: &[(&str, &str)]) -> Result<()> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();

        apply(&mut lines, assignments).map_err(|MissingEntries(names)| {
            ConfigError::MissingConfigEntries {
                path: self.path.clone(),
                names,
            }
        })?;

        tokio::fs::write(&self.path, lines.concat()).await?;
        log::info!("Updated {} entr(ies) in {}", assignments.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lines(text: &str) -> Vec<String> {
        text.split_inclusive('\n').map(str::to_string).collect()
    }

    const CONFIG: &str = "\
c.PLUGIN_NAME = \"export_layers\"
c.PLUGIN_VERSION = \"1.2.0\"
c.PLUGIN_VERSION_RELEASE_DATE = \"May 01, 2019\"
c.AUTHOR_NAME = \"khalim19\"
c.REPOSITORY_NAME = \"gimp-plugin-export-layers\"
";

    #[test]
    fn test_apply_rewrites_requested_entries_only() {
        let mut config = lines(CONFIG);
        apply(
            &mut config,
            &[(VERSION_ENTRY, "1.3.0"), (RELEASE_DATE_ENTRY, "June 02, 2019")],
        )
        .expect("all entries present");

        let expected = CONFIG
            .replace("\"1.2.0\"", "\"1.3.0\"")
            .replace("May 01, 2019", "June 02, 2019");
        assert_eq!(config.concat(), expected);
    }

    #[test]
    fn test_apply_uses_first_match_of_each_name() {
        let mut config = lines("c.PLUGIN_VERSION = \"1.0\"\nc.PLUGIN_VERSION = \"0.9\"\n");
        apply(&mut config, &[(VERSION_ENTRY, "2.0")]).expect("entry present");
        assert_eq!(config.concat(), "c.PLUGIN_VERSION = \"2.0\"\nc.PLUGIN_VERSION = \"0.9\"\n");
    }

    #[test]
    fn test_apply_reports_exactly_the_missing_names_and_keeps_found_ones() {
        let mut config = lines("c.PLUGIN_VERSION = \"1.2.0\"\nc.OTHER = \"x\"\n");
        let result = apply(
            &mut config,
            &[(VERSION_ENTRY, "1.3.0"), (RELEASE_DATE_ENTRY, "today"), ("AUTHOR_NAME", "me")],
        );

        assert_eq!(
            result,
            Err(MissingEntries(vec![RELEASE_DATE_ENTRY.to_string(), "AUTHOR_NAME".to_string()]))
        );
        assert_eq!(config[0], "c.PLUGIN_VERSION = \"1.3.0\"\n");
        assert_eq!(config[1], "c.OTHER = \"x\"\n");
    }

    #[test]
    fn test_apply_ignores_near_misses() {
        let mut config = lines(
            "c.PLUGIN_VERSION_X = \"1\"\n  c.PLUGIN_VERSION = \"1\"\nc.PLUGIN_VERSION = 1\n",
        );
        let result = apply(&mut config, &[(VERSION_ENTRY, "2")]);
        assert_eq!(result, Err(MissingEntries(vec![VERSION_ENTRY.to_string()])));
        assert_eq!(
            config.concat(),
            "c.PLUGIN_VERSION_X = \"1\"\n  c.PLUGIN_VERSION = \"1\"\nc.PLUGIN_VERSION = 1\n"
        );
    }

    #[test]
    fn test_apply_preserves_crlf_and_missing_final_newline() {
        let mut config = lines("c.A = \"1\"\r\nc.B = \"2\"");
        apply(&mut config, &[("A", "10"), ("B", "20")]).expect("entries present");
        assert_eq!(config.concat(), "c.A = \"10\"\r\nc.B = \"20\"");
    }

    #[test]
    fn test_read_assignments() {
        let assignments = read_assignments(CONFIG);
        assert_eq!(assignments.get(VERSION_ENTRY).map(String::as_str), Some("1.2.0"));
        assert_eq!(assignments.get(AUTHOR_ENTRY).map(String::as_str), Some("khalim19"));
        assert_eq!(assignments.len(), 5);
    }

    #[test]
    fn test_format_release_date() {
        let date = Utc.with_ymd_and_hms(2019, 6, 2, 23, 59, 0).single().expect("valid date");
        assert_eq!(format_release_date(date), "June 02, 2019");
    }

    #[tokio::test]
    async fn test_update_reports_missing_entries_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.py");
        std::fs::write(&path, "c.PLUGIN_VERSION = \"1.2.0\"\n").expect("write config");

        let metadata = MetadataFile::load(&path).await.expect("load");
        assert_eq!(metadata.require(VERSION_ENTRY).ok(), Some("1.2.0"));

        let err = metadata
            .update(&[(VERSION_ENTRY, "1.3.0"), (RELEASE_DATE_ENTRY, "June 02, 2019")])
            .await
            .expect_err("release date entry is missing");
        assert!(matches!(
            err,
            crate::error::ReleaseError::Config(ConfigError::MissingConfigEntries { ref names, .. })
                if names == &vec![RELEASE_DATE_ENTRY.to_string()]
        ));
        // Nothing is written when an entry is missing.
        assert_eq!(
            std::fs::read_to_string(&path).expect("read config"),
            "c.PLUGIN_VERSION = \"1.2.0\"\n"
        );
    }
}
