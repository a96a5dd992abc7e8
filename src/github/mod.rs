//! GitHub integration for release operations

mod release_manager;

pub use release_manager::{GitHubReleaseConfig, GitHubReleaseManager, strip_upload_url_template};
