//! Workspace context - resolve once, pass to the analysis steps
//!
//! Holds the workspace root and the resolved apps/libs layout. Built fresh on
//! every invocation; nothing is cached across runs.

use crate::core::config::{LayoutOverrides, WorkspaceLayout};
use crate::core::error::AffectedResult;
use crate::graph::descriptors::{DependencyIndex, DescriptorSource};
use std::path::{Path, PathBuf};

/// Workspace root plus the layout read from nx.json (with CLI overrides).
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory
  pub root: PathBuf,

  /// Apps/libs roots, validated as distinct and non-overlapping
  pub layout: WorkspaceLayout,
}

impl WorkspaceContext {
  /// Load nx.json under `workspace_root` and resolve the layout.
  pub fn build(workspace_root: &Path, overrides: &LayoutOverrides) -> AffectedResult<Self> {
    let root = workspace_root.to_path_buf();
    let layout = WorkspaceLayout::load(&root, overrides)?;
    tracing::info!(apps_dir = %layout.apps_dir, libs_dir = %layout.libs_dir, "workspace layout");

    Ok(Self { root, layout })
  }

  /// Build the app → libs index from descriptors under the apps root.
  pub fn dependency_index(&self, source: &impl DescriptorSource) -> AffectedResult<DependencyIndex> {
    DependencyIndex::build(source, &self.layout.apps_path(&self.root))
  }
}
