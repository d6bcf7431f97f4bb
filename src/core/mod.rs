//! Core building blocks for nx-affected
//!
//! - **config**: Workspace layout (nx.json) parsing and validation
//! - **context**: Workspace root + resolved layout, built once per run
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Git operations (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
