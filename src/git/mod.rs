//! Git operations for release workflows.
//!
//! Both the plug-in repository and the documentation branch checkout are driven through
//! [`GitRepository`], a thin handle that shells out to the system `git` binary so that the
//! operator's hooks, credentials and configuration apply exactly as on the command line.

mod repository;

pub use repository::{CommitId, GitRepository};
