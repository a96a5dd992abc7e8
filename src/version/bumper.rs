//! Version value type with parsing, formatting, ordering and increment rules.

use super::{ReleaseType, VERSION_STRING_FORMAT};
use crate::error::VersionError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?(?:-([0-9A-Za-z]+)(?:\.(\d+))?)?$")
        .unwrap_or_else(|e| panic!("invalid version pattern: {e}"))
});

/// A parsed plug-in version
#[derive(Debug, Clone)]
pub struct Version {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component (absent in `1.2`)
    pub patch: Option<u64>,
    /// Prerelease suffix (`alpha` in `1.2.0-alpha`)
    pub prerelease: Option<String>,
    /// Prerelease counter (`2` in `1.2.0-alpha.2`); absent means the first prerelease
    pub prerelease_patch: Option<u64>,
}

impl Version {
    /// Parse a version string
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersionFormat {
            version: text.to_string(),
            format: VERSION_STRING_FORMAT,
        };

        let captures = VERSION_PATTERN.captures(text).ok_or_else(invalid)?;
        let number = |index: usize| -> Result<Option<u64>, VersionError> {
            captures
                .get(index)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        Ok(Self {
            major: number(1)?.ok_or_else(invalid)?,
            minor: number(2)?.ok_or_else(invalid)?,
            patch: number(3)?,
            prerelease: captures.get(4).map(|m| m.as_str().to_string()),
            prerelease_patch: number(5)?,
        })
    }

    /// Increment the version in place.
    ///
    /// Without `prerelease`, a current prerelease is finalised (`1.3.0-alpha` becomes `1.3.0`)
    /// and otherwise `kind` is bumped. With `prerelease`, a release version is bumped and gets
    /// the suffix attached, the same suffix increments its counter, and a different suffix
    /// replaces the current one only if it orders after it.
    pub fn increment(
        &mut self,
        kind: ReleaseType,
        prerelease: Option<&str>,
    ) -> Result<(), VersionError> {
        if let Some(suffix) = prerelease
            && (suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(self.conflict(format!(
                "prerelease suffix '{suffix}' must be a non-empty alphanumeric string"
            )));
        }

        match (prerelease, self.prerelease.as_deref()) {
            (None, None) => self.bump(kind)?,
            (None, Some(_)) => {
                self.prerelease = None;
                self.prerelease_patch = None;
            }
            (Some(suffix), None) => {
                self.bump(kind)?;
                self.prerelease = Some(suffix.to_string());
                self.prerelease_patch = None;
            }
            (Some(suffix), Some(current)) => match suffix.cmp(current) {
                Ordering::Equal => {
                    let counter = self.prerelease_patch.unwrap_or(1);
                    self.prerelease_patch = Some(self.next(counter, "prerelease counter")?);
                }
                Ordering::Greater => {
                    self.prerelease = Some(suffix.to_string());
                    self.prerelease_patch = None;
                }
                Ordering::Less => {
                    return Err(self.conflict(format!(
                        "prerelease '{suffix}' orders before the current prerelease '{current}'"
                    )));
                }
            },
        }

        Ok(())
    }

    fn bump(&mut self, kind: ReleaseType) -> Result<(), VersionError> {
        match kind {
            ReleaseType::Major => {
                self.major = self.next(self.major, "major component")?;
                self.minor = 0;
                self.patch = self.patch.map(|_| 0);
            }
            ReleaseType::Minor => {
                self.minor = self.next(self.minor, "minor component")?;
                self.patch = self.patch.map(|_| 0);
            }
            ReleaseType::Patch => {
                self.patch = Some(self.next(self.patch.unwrap_or(0), "patch component")?);
            }
        }
        Ok(())
    }

    fn next(&self, component: u64, name: &str) -> Result<u64, VersionError> {
        component
            .checked_add(1)
            .ok_or_else(|| self.conflict(format!("{name} {component} cannot be incremented")))
    }

    fn conflict(&self, reason: String) -> VersionError {
        VersionError::VersionIncrementConflict {
            version: self.to_string(),
            reason,
        }
    }

    fn release_key(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(prerelease) = &self.prerelease {
            write!(f, "-{prerelease}")?;
            if let Some(prerelease_patch) = self.prerelease_patch {
                write!(f, ".{prerelease_patch}")?;
            }
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release_key()
            .cmp(&other.release_key())
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b).then_with(|| {
                    self.prerelease_patch
                        .unwrap_or(1)
                        .cmp(&other.prerelease_patch.unwrap_or(1))
                }),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}
