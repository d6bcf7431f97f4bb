//! CLI commands for nx-affected
//!
//! - **detect**: Find apps and libs affected by changes between two revisions
//! - **index**: Show the app → lib dependency index built from descriptors

pub mod detect;
pub mod index;

pub use detect::{DetectOptions, run_detect};
pub use index::run_index;

use crate::core::error::{AffectedError, AffectedResult};

/// Output format shared by commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  pub fn from_str(s: &str) -> AffectedResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(AffectedError::with_help(
        format!("Unknown format '{}'", s),
        "Valid formats: text, json, names-only",
      )),
    }
  }
}
