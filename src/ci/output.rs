//! Publishing results back to the CI environment
//!
//! Outputs are stringified JSON lists so follow-up jobs can feed them straight
//! into a dynamic matrix.

use crate::core::error::{AffectedResult, ResultExt};
use crate::graph::Changes;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Final result handed to publishers and printers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedReport {
  pub apps: Vec<String>,
  pub libs: Vec<String>,
  pub affected: bool,
}

impl From<Changes> for AffectedReport {
  fn from(changes: Changes) -> Self {
    let affected = changes.is_affected();
    Self {
      apps: changes.apps,
      libs: changes.libs,
      affected,
    }
  }
}

impl AffectedReport {
  /// Apps followed by libs
  pub fn changed_dirs(&self) -> Vec<String> {
    self.apps.iter().chain(self.libs.iter()).cloned().collect()
  }

  /// Key/value pairs as written to the CI environment
  pub fn output_entries(&self) -> AffectedResult<Vec<(&'static str, String)>> {
    Ok(vec![
      ("changed-apps", serde_json::to_string(&self.apps)?),
      ("changed-libs", serde_json::to_string(&self.libs)?),
      ("changed-dirs", serde_json::to_string(&self.changed_dirs())?),
      ("affected", self.affected.to_string()),
      ("not-affected", (!self.affected).to_string()),
    ])
  }
}

/// Single sink for a finished report
pub trait Publisher {
  fn publish(&self, report: &AffectedReport) -> AffectedResult<()>;
}

/// GitHub Actions step outputs
///
/// Appends to the `$GITHUB_OUTPUT` file when present, otherwise falls back to
/// `::set-output` workflow commands on stdout.
#[derive(Debug, Clone)]
pub struct GithubOutput {
  output_file: Option<PathBuf>,
  stdout_fallback: bool,
}

impl GithubOutput {
  pub fn new(output_file: Option<PathBuf>) -> Self {
    Self {
      output_file: output_file.filter(|p| !p.as_os_str().is_empty()),
      stdout_fallback: true,
    }
  }

  pub fn from_env() -> Self {
    Self::new(std::env::var_os(OUTPUT_FILE_VAR).map(PathBuf::from))
  }

  /// Allow or forbid the `::set-output` fallback.
  ///
  /// Turned off when stdout carries JSON or bare names for another program.
  pub fn with_stdout_fallback(mut self, enabled: bool) -> Self {
    self.stdout_fallback = enabled;
    self
  }
}

impl Publisher for GithubOutput {
  fn publish(&self, report: &AffectedReport) -> AffectedResult<()> {
    let entries = report.output_entries()?;

    match &self.output_file {
      Some(path) => {
        let mut file = OpenOptions::new()
          .create(true)
          .append(true)
          .open(path)
          .with_context(|| format!("Failed to open output file {}", path.display()))?;
        for (key, value) in &entries {
          writeln!(file, "{}={}", key, value).with_context(|| format!("Failed to write output '{}'", key))?;
        }
        tracing::debug!(path = %path.display(), "wrote step outputs");
      }
      None if !self.stdout_fallback => {
        tracing::warn!("{} not set, step outputs skipped to keep stdout machine-readable", OUTPUT_FILE_VAR);
      }
      None => {
        // Workflow commands must start on a fresh line
        println!();
        for (key, value) in &entries {
          println!("::set-output name={}::{}", key, value);
        }
      }
    }

    Ok(())
  }
}
