//! # plugin_release
//!
//! Release automation for a GIMP plug-in whose documentation site lives in a separate checkout.
//!
//! One run bumps the version recorded in the plug-in metadata file, retitles the unreleased
//! changelog section, commits and tags the main repository, mirrors the staged documentation
//! into the docs branch, builds installers, pushes both repositories and publishes a GitHub
//! release with the installers attached.
//!
//! ## Rollback
//!
//! Any failure or Ctrl-C before the end deletes the new tag, removes the installer output and
//! hard-resets both repositories to the commits they were at when the run started. Remote
//! effects (pushed refs, a created release, uploaded assets) are not undone.
//!
//! ## Usage
//!
//! ```bash
//! plugin_release minor "$GITHUB_TOKEN"             # 1.2.0 -> 1.3.0
//! plugin_release patch "$GITHUB_TOKEN" --dry-run  # print every step, change nothing
//! plugin_release major "$GITHUB_TOKEN" -p rc -y   # 1.3.0 -> 2.0.0-rc, no prompt
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod artifacts;
pub mod changelog;
pub mod cli;
pub mod docs;
pub mod error;
pub mod git;
pub mod github;
pub mod metadata;
pub mod release;
pub mod settings;
pub mod version;

pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use git::GitRepository;
pub use release::{ReleaseContext, ReleaseOptions, ReleaseOrchestrator};
pub use version::{ReleaseType, Version};
