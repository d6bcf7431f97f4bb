//! Affected app/lib analysis
//!
//! Given the changed files between two revisions, determine:
//! - Which apps directly contain changed files
//! - Which libs directly contain changed files
//! - Which apps depend on a changed lib (one hop, via the dependency index)
//!
//! The whole thing is a single fold over the changed-file list. Output order is
//! first-insertion order, so the same inputs always give the same lists.

use super::descriptors::DependencyIndex;
use crate::core::config::WorkspaceLayout;
use serde::Serialize;
use std::collections::HashSet;

/// Extracts the unit name from paths under one directory root.
///
/// Built once per root and reused for the whole pass.
#[derive(Debug, Clone)]
pub struct DirFinder {
  prefix: String,
}

impl DirFinder {
  pub fn new(root: &str) -> Self {
    Self {
      prefix: format!("{}/", root),
    }
  }

  /// First path segment beneath the root.
  ///
  /// `apps/web/src/main.ts` → `web`. A bare `apps/web` also matches, which is
  /// how git reports a submodule or symlinked unit. Paths outside the root give
  /// `None`.
  pub fn find<'a>(&self, file: &'a str) -> Option<&'a str> {
    let rest = file.strip_prefix(self.prefix.as_str())?;
    let segment = rest.split('/').next()?;
    (!segment.is_empty()).then_some(segment)
  }
}

/// Insertion-ordered set of names
#[derive(Debug, Clone, Default)]
struct OrderedSet {
  seen: HashSet<String>,
  items: Vec<String>,
}

impl OrderedSet {
  fn insert(&mut self, name: &str) -> bool {
    if self.seen.contains(name) {
      return false;
    }
    self.seen.insert(name.to_string());
    self.items.push(name.to_string());
    true
  }

  fn into_vec(self) -> Vec<String> {
    self.items
  }
}

/// Affected apps and libs, unique, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
  pub apps: Vec<String>,
  pub libs: Vec<String>,
}

impl Changes {
  /// Anything at all affected?
  pub fn is_affected(&self) -> bool {
    !(self.apps.is_empty() && self.libs.is_empty())
  }
}

/// Classifies changed files against an apps root and a libs root.
pub struct ChangeClassifier<'a> {
  apps: DirFinder,
  libs: DirFinder,
  index: &'a DependencyIndex,
}

impl<'a> ChangeClassifier<'a> {
  pub fn new(layout: &WorkspaceLayout, index: &'a DependencyIndex) -> Self {
    Self {
      apps: DirFinder::new(&layout.apps_dir),
      libs: DirFinder::new(&layout.libs_dir),
      index,
    }
  }

  /// Classify every changed file and propagate lib changes to dependent apps.
  ///
  /// Duplicated paths are harmless. A path matching neither root contributes
  /// nothing.
  pub fn classify<S: AsRef<str>>(&self, changed_files: &[S]) -> Changes {
    let mut apps = OrderedSet::default();
    let mut libs = OrderedSet::default();

    for file in changed_files {
      let file = file.as_ref();

      if let Some(app) = self.apps.find(file) {
        apps.insert(app);
      }

      if let Some(lib) = self.libs.find(file) {
        // Dependents only need resolving the first time a lib is seen
        if libs.insert(lib) {
          for dependent in self.index.dependents_of(lib) {
            apps.insert(dependent);
          }
        }
      }
    }

    Changes {
      apps: apps.into_vec(),
      libs: libs.into_vec(),
    }
  }
}
