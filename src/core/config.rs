//! Workspace layout from `nx.json`
//!
//! Only `workspaceLayout.appsDir` / `workspaceLayout.libsDir` matter here. Both
//! fall back to `apps` / `libs`, and a missing `nx.json` means "all defaults".

use crate::core::error::{AffectedResult, ConfigError, ResultExt};
use crate::utils::normalize_dir_root;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const WORKSPACE_FILE: &str = "nx.json";
pub const DEFAULT_APPS_DIR: &str = "apps";
pub const DEFAULT_LIBS_DIR: &str = "libs";

/// nx.json structure (minimal fields we care about)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NxJson {
  #[serde(default)]
  workspace_layout: Option<NxWorkspaceLayout>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NxWorkspaceLayout {
  #[serde(default)]
  apps_dir: Option<String>,
  #[serde(default)]
  libs_dir: Option<String>,
}

/// Resolved apps/libs directory roots, repository-relative with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
  pub apps_dir: String,
  pub libs_dir: String,
}

impl Default for WorkspaceLayout {
  fn default() -> Self {
    Self {
      apps_dir: DEFAULT_APPS_DIR.to_string(),
      libs_dir: DEFAULT_LIBS_DIR.to_string(),
    }
  }
}

/// CLI overrides applied on top of nx.json
#[derive(Debug, Clone, Default)]
pub struct LayoutOverrides {
  pub apps_dir: Option<String>,
  pub libs_dir: Option<String>,
}

impl WorkspaceLayout {
  /// Build a layout from optional raw values, defaulting and validating.
  pub fn from_parts(apps_dir: Option<&str>, libs_dir: Option<&str>) -> AffectedResult<Self> {
    let pick = |raw: Option<&str>, default: &str| {
      raw
        .map(normalize_dir_root)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
    };

    let layout = Self {
      apps_dir: pick(apps_dir, DEFAULT_APPS_DIR),
      libs_dir: pick(libs_dir, DEFAULT_LIBS_DIR),
    };
    layout.validate()?;
    Ok(layout)
  }

  /// Load the layout from `<root>/nx.json`, applying overrides.
  pub fn load(root: &Path, overrides: &LayoutOverrides) -> AffectedResult<Self> {
    let path = root.join(WORKSPACE_FILE);
    let nx = read_nx_json(&path)?;
    let layout = nx.workspace_layout.unwrap_or_default();

    Self::from_parts(
      overrides.apps_dir.as_deref().or(layout.apps_dir.as_deref()),
      overrides.libs_dir.as_deref().or(layout.libs_dir.as_deref()),
    )
  }

  /// Reject roots the classifier can't tell apart.
  ///
  /// A path may only ever match one root, so the roots must differ and neither
  /// may sit inside the other.
  fn validate(&self) -> AffectedResult<()> {
    if self.apps_dir.is_empty() || self.libs_dir.is_empty() {
      return Err(
        ConfigError::InvalidLayout {
          reason: "apps and libs directories must not be empty".to_string(),
        }
        .into(),
      );
    }

    if self.apps_dir == self.libs_dir {
      return Err(
        ConfigError::InvalidLayout {
          reason: format!("apps and libs both point at '{}'", self.apps_dir),
        }
        .into(),
      );
    }

    let nested = |outer: &str, inner: &str| inner.starts_with(&format!("{}/", outer));
    if nested(&self.apps_dir, &self.libs_dir) || nested(&self.libs_dir, &self.apps_dir) {
      return Err(
        ConfigError::InvalidLayout {
          reason: format!("'{}' and '{}' overlap", self.apps_dir, self.libs_dir),
        }
        .into(),
      );
    }

    Ok(())
  }

  /// Absolute apps directory under the given workspace root
  pub fn apps_path(&self, root: &Path) -> PathBuf {
    root.join(&self.apps_dir)
  }
}

fn read_nx_json(path: &Path) -> AffectedResult<NxJson> {
  if !path.exists() {
    tracing::warn!(path = %path.display(), "workspace file not found, using default layout");
    return Ok(NxJson::default());
  }

  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).map_err(|e| {
    ConfigError::InvalidWorkspaceFile {
      path: path.to_path_buf(),
      reason: e.to_string(),
    }
    .into()
  })
}
