//! Plug-in version parsing and incrementing.
//!
//! Versions follow `major.minor[.patch[-prerelease[.patch]]]`, which is looser than semver
//! (the patch component is optional), so the parser lives here instead of in a semver crate.

mod bumper;

pub use bumper::Version;

use clap::ValueEnum;
use std::fmt;

/// Human-readable description of the accepted version format
pub const VERSION_STRING_FORMAT: &str = "major.minor[.patch[-prerelease[.patch]]]";

/// Version component raised by a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReleaseType {
    /// Increment the major component
    Major,
    /// Increment the minor component
    Minor,
    /// Increment the patch component
    Patch,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
        };
        f.write_str(name)
    }
}
