//! CI environment integration
//!
//! - **event**: base/head revisions from the triggering event
//! - **output**: publishing the affected report as step outputs

pub mod event;
pub mod output;

pub use event::{EventContext, resolve_refs};
pub use output::{AffectedReport, GithubOutput, Publisher};
