//! Base/head revision resolution from CI event metadata
//!
//! Explicit refs always win. Without them, the refs come from the GitHub
//! Actions event payload:
//! - `pull_request`: `pull_request.base.sha` / `pull_request.head.sha`
//! - `push`: `before` / `after`

use crate::core::error::{AffectedResult, ConfigError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EVENT_NAME_VAR: &str = "GITHUB_EVENT_NAME";
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

/// The two revisions to diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
  pub base: String,
  pub head: String,
}

/// Triggering event name plus where its JSON payload lives
#[derive(Debug, Clone, Default)]
pub struct EventContext {
  pub name: Option<String>,
  pub payload_path: Option<PathBuf>,
}

/// Event payload (minimal fields we care about)
#[derive(Debug, Default, Deserialize)]
struct EventPayload {
  #[serde(default)]
  before: Option<String>,
  #[serde(default)]
  after: Option<String>,
  #[serde(default)]
  pull_request: Option<PullRequest>,
}

#[derive(Debug, Default, Deserialize)]
struct PullRequest {
  #[serde(default)]
  base: Option<GitRef>,
  #[serde(default)]
  head: Option<GitRef>,
}

#[derive(Debug, Default, Deserialize)]
struct GitRef {
  #[serde(default)]
  sha: Option<String>,
}

impl EventContext {
  pub fn new(name: Option<String>, payload_path: Option<PathBuf>) -> Self {
    Self {
      name: name.filter(|n| !n.is_empty()),
      payload_path: payload_path.filter(|p| !p.as_os_str().is_empty()),
    }
  }

  /// Read event name and payload path from the GitHub Actions environment.
  pub fn from_env() -> Self {
    Self::new(
      std::env::var(EVENT_NAME_VAR).ok(),
      std::env::var_os(EVENT_PATH_VAR).map(PathBuf::from),
    )
  }

  fn payload(&self) -> AffectedResult<EventPayload> {
    match &self.payload_path {
      Some(path) => read_payload(path),
      None => Ok(EventPayload::default()),
    }
  }
}

fn read_payload(path: &Path) -> AffectedResult<EventPayload> {
  let invalid = |reason: String| ConfigError::InvalidEventPayload {
    path: path.to_path_buf(),
    reason,
  };

  let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
  let payload = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
  Ok(payload)
}

/// Resolve the base/head pair.
///
/// When neither explicit ref is given, they are read from the event. Either
/// ref still missing afterwards is a configuration error.
pub fn resolve_refs(base: Option<&str>, head: Option<&str>, event: &EventContext) -> AffectedResult<RevisionRange> {
  let mut base = base.filter(|s| !s.is_empty()).map(str::to_string);
  let mut head = head.filter(|s| !s.is_empty()).map(str::to_string);

  if base.is_none() && head.is_none() {
    match event.name.as_deref() {
      Some("pull_request") => {
        let pr = event.payload()?.pull_request.unwrap_or_default();
        base = pr.base.and_then(|r| r.sha);
        head = pr.head.and_then(|r| r.sha);
      }
      Some("push") => {
        let payload = event.payload()?;
        base = payload.before;
        head = payload.after;
      }
      other => {
        return Err(
          ConfigError::UnsupportedEvent {
            name: other.unwrap_or("<none>").to_string(),
          }
          .into(),
        );
      }
    }
  }

  match (base.filter(|s| !s.is_empty()), head.filter(|s| !s.is_empty())) {
    (Some(base), Some(head)) => {
      tracing::info!(event = event.name.as_deref().unwrap_or("<none>"), %base, %head, "resolved revisions");
      Ok(RevisionRange { base, head })
    }
    _ => Err(ConfigError::MissingRefs.into()),
  }
}
