//! Changelog section extraction and retitling.
//!
//! The first top-level section of the changelog holds the notes for the upcoming release.
//! Two header styles are recognised:
//!
//! ```text
//! # Unreleased            Unreleased
//!                         ==========
//! ```
//!
//! Retitling rewrites only the header lines; every other byte of the document is kept.

use std::collections::BTreeSet;

/// Header syntax of a changelog section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `# Title`
    Hash,
    /// `Title` followed by a line of `=`
    Underline,
}

/// A located top-level section header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Header title text
    pub title: String,
    /// Header syntax in use
    pub style: HeaderStyle,
    line: usize,
}

impl SectionHeader {
    fn line_count(&self) -> usize {
        match self.style {
            HeaderStyle::Hash => 1,
            HeaderStyle::Underline => 2,
        }
    }
}

/// Outcome of [`extract_and_retitle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEdit {
    /// First section header, if the document has one
    pub header: Option<SectionHeader>,
    /// Retitled document, or `None` when there is no unreleased section to rewrite
    pub updated: Option<String>,
    /// Trimmed text between the first header and the next one
    pub release_notes: String,
}

impl ChangelogEdit {
    /// Whether the first section is unreleased and was retitled
    pub fn is_unreleased(&self) -> bool {
        self.updated.is_some()
    }
}

/// Locate the first section, extract its notes and retitle it with `new_version`.
///
/// When the first header's title is one of `released_versions` the document has no
/// unreleased section and `updated` is `None`.
pub fn extract_and_retitle(
    document: &str,
    new_version: &str,
    released_versions: &BTreeSet<String>,
) -> ChangelogEdit {
    let lines: Vec<&str> = document.split_inclusive('\n').collect();

    let Some(header) = find_header(&lines, 0) else {
        return ChangelogEdit {
            header: None,
            updated: None,
            release_notes: String::new(),
        };
    };

    let notes_start = header.line + header.line_count();
    let notes_end = find_header(&lines, notes_start).map_or(lines.len(), |next| next.line);
    let release_notes = lines[notes_start..notes_end].concat().trim().to_string();

    let updated = if released_versions.contains(&header.title) {
        None
    } else {
        Some(retitle(&lines, &header, new_version))
    };

    ChangelogEdit {
        header: Some(header),
        updated,
        release_notes,
    }
}

fn find_header(lines: &[&str], from: usize) -> Option<SectionHeader> {
    (from..lines.len()).find_map(|index| {
        let body = line_body(lines[index]);

        if let Some(title) = body.strip_prefix("# ") {
            return Some(SectionHeader {
                title: title.trim_end().to_string(),
                style: HeaderStyle::Hash,
                line: index,
            });
        }

        let underline = lines.get(index + 1).map(|line| line_body(line))?;
        if !body.trim().is_empty() && !underline.is_empty() && underline.chars().all(|c| c == '=') {
            return Some(SectionHeader {
                title: body.trim_end().to_string(),
                style: HeaderStyle::Underline,
                line: index,
            });
        }

        None
    })
}

fn retitle(lines: &[&str], header: &SectionHeader, new_version: &str) -> String {
    let mut output = String::with_capacity(lines.iter().map(|line| line.len()).sum());

    for (index, line) in lines.iter().enumerate() {
        let ending = line_ending(line);
        if index == header.line {
            if header.style == HeaderStyle::Hash {
                output.push_str("# ");
            }
            output.push_str(new_version);
            output.push_str(ending);
        } else if header.style == HeaderStyle::Underline && index == header.line + 1 {
            output.push_str(&"=".repeat(new_version.chars().count()));
            output.push_str(ending);
        } else {
            output.push_str(line);
        }
    }

    output
}

fn line_body(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn line_ending(line: &str) -> &str {
    &line[line_body(line).len()..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn released(versions: &[&str]) -> BTreeSet<String> {
        versions.iter().map(|v| v.to_string()).collect()
    }

    const HASH_CHANGELOG: &str = "\
# Unreleased

* Added layer groups export.
* Fixed crash on empty images.

## Internal

* Refactored settings.

# 1.2.0

* Previous notes.
";

    const UNDERLINE_CHANGELOG: &str = "\
Unreleased
==========

* Added layer groups export.

1.2.0
=====

* Previous notes.
";

    #[test]
    fn test_hash_header_is_retitled_and_notes_extracted() {
        let edit = extract_and_retitle(HASH_CHANGELOG, "1.3.0", &released(&["1.2.0"]));

        assert_eq!(edit.header.as_ref().map(|h| h.title.as_str()), Some("Unreleased"));
        assert_eq!(
            edit.release_notes,
            "* Added layer groups export.\n* Fixed crash on empty images.\n\n## Internal\n\n* Refactored settings."
        );
        assert_eq!(
            edit.updated.as_deref(),
            Some(HASH_CHANGELOG.replacen("# Unreleased", "# 1.3.0", 1).as_str())
        );
    }

    #[test]
    fn test_underline_header_keeps_underline_length_equal_to_version() {
        let edit = extract_and_retitle(UNDERLINE_CHANGELOG, "1.3.0-alpha.2", &released(&["1.2.0"]));

        assert_eq!(edit.header.as_ref().map(|h| h.style), Some(HeaderStyle::Underline));
        assert_eq!(edit.release_notes, "* Added layer groups export.");
        let expected = UNDERLINE_CHANGELOG.replacen(
            "Unreleased\n==========\n",
            "1.3.0-alpha.2\n=============\n",
            1,
        );
        assert_eq!(edit.updated.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_released_first_section_is_not_rewritten() {
        let document = "# 1.2.0\n\n* Previous notes.\n";
        let edit = extract_and_retitle(document, "1.3.0", &released(&["1.2.0"]));

        assert!(!edit.is_unreleased());
        assert_eq!(edit.updated, None);
        assert_eq!(edit.header.map(|h| h.title), Some("1.2.0".to_string()));
    }

    #[test]
    fn test_document_without_header() {
        let edit = extract_and_retitle("Just some text\n\nno headers here\n", "1.3.0", &released(&[]));
        assert_eq!(edit.header, None);
        assert_eq!(edit.updated, None);
        assert_eq!(edit.release_notes, "");
    }

    #[test]
    fn test_preamble_and_trailing_text_survive_byte_for_byte() {
        let document = "Changelog for the plug-in.\r\n\r\n# Unreleased\r\n* Note.\r\n# 1.2.0\r\n* Old.";
        let edit = extract_and_retitle(document, "1.3.0", &released(&["1.2.0"]));

        assert_eq!(
            edit.updated.as_deref(),
            Some("Changelog for the plug-in.\r\n\r\n# 1.3.0\r\n* Note.\r\n# 1.2.0\r\n* Old.")
        );
        assert_eq!(edit.release_notes, "* Note.");
    }

    #[test]
    fn test_subsection_and_dash_underlines_are_not_top_level_headers() {
        let document = "Title\n-----\n\n## Sub\n\n# Unreleased\n* Note.\n";
        let edit = extract_and_retitle(document, "2.0", &released(&[]));
        assert_eq!(edit.header.map(|h| h.title), Some("Unreleased".to_string()));
    }

    #[test]
    fn test_rerun_on_retitled_document_reports_released() {
        for document in [HASH_CHANGELOG, UNDERLINE_CHANGELOG] {
            let first = extract_and_retitle(document, "1.3.0", &released(&["1.2.0"]));
            let retitled = first.updated.clone().expect("unreleased section");

            let second = extract_and_retitle(&retitled, "1.3.0", &released(&["1.2.0", "1.3.0"]));
            assert_eq!(second.header.map(|h| h.title), Some("1.3.0".to_string()));
            assert_eq!(second.updated, None);
            assert_eq!(second.release_notes, first.release_notes);
        }
    }
}
