//! Release orchestration.
//!
//! A release touches two working trees: the plug-in repository and the checkout of its
//! documentation branch. [`ReleaseContext`] captures both before anything changes,
//! [`ReleaseOrchestrator`] runs the step sequence over it and [`rollback`] restores the
//! captured state when a step fails or the operator interrupts the run.

mod context;
mod orchestrator;
mod phase;
mod rollback;

pub use context::{ReleaseContext, ReleaseOptions};
pub use orchestrator::{ReleaseLayout, ReleaseOrchestrator, is_affirmative};
pub use phase::ReleasePhase;
pub use rollback::rollback;
