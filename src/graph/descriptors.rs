//! Dependency index built from per-app `project.json` descriptors
//!
//! Each app under the apps root may carry a `project.json` declaring which lib
//! folders it depends on:
//!
//! ```json
//! { "name": "web", "libFolderDependencies": ["ui", "auth"] }
//! ```
//!
//! The index maps app name → set of lib names and is the only input the
//! classifier uses for lib → app propagation.
//!
//! Discovery (walking the apps root, reading files) sits behind
//! [`DescriptorSource`] so the index itself is built from plain values.

use crate::core::error::{AffectedError, AffectedResult, DescriptorError};
use crate::utils::path_to_git_format;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Descriptor file name looked for under the apps root
pub const DESCRIPTOR_FILENAME: &str = "project.json";

/// project.json structure (minimal fields we care about)
///
/// Both fields are optional. A descriptor lacking either one is skipped, it is
/// not an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub lib_folder_dependencies: Option<Vec<String>>,
}

/// Raw descriptor contents plus where they came from
#[derive(Debug, Clone)]
pub struct RawDescriptor {
  pub path: PathBuf,
  pub content: String,
}

/// Something that can list every descriptor under an apps root.
pub trait DescriptorSource {
  fn list_descriptors(&self, apps_dir: &Path) -> AffectedResult<Vec<RawDescriptor>>;
}

/// Filesystem-backed descriptor discovery
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDescriptorSource;

impl DescriptorSource for FsDescriptorSource {
  fn list_descriptors(&self, apps_dir: &Path) -> AffectedResult<Vec<RawDescriptor>> {
    if !apps_dir.is_dir() {
      tracing::debug!(path = %apps_dir.display(), "apps directory not found, no descriptors");
      return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(apps_dir).follow_links(false).sort_by_file_name() {
      let entry = entry?;
      if entry.file_type().is_file() && entry.file_name() == DESCRIPTOR_FILENAME {
        paths.push(entry.into_path());
      }
    }

    tracing::debug!(count = paths.len(), "found project descriptors");

    paths
      .into_par_iter()
      .map(|path| match std::fs::read_to_string(&path) {
        Ok(content) => Ok(RawDescriptor { path, content }),
        Err(e) => Err(
          DescriptorError::Unreadable {
            path,
            reason: e.to_string(),
          }
          .into(),
        ),
      })
      .collect::<Vec<AffectedResult<RawDescriptor>>>()
      .into_iter()
      .collect()
  }
}

/// Parse one descriptor. Malformed JSON is fatal for the whole run.
///
/// The top level must be a JSON object. serde would otherwise read a positional
/// array like `["web", ["ui"]]` into the struct.
pub fn parse_descriptor(raw: &RawDescriptor) -> AffectedResult<ProjectDescriptor> {
  let malformed = |reason: String| -> AffectedError {
    DescriptorError::Parse {
      path: raw.path.clone(),
      reason,
    }
    .into()
  };

  let value: serde_json::Value = serde_json::from_str(&raw.content).map_err(|e| malformed(e.to_string()))?;
  if !value.is_object() {
    return Err(malformed("expected a JSON object".to_string()));
  }
  serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}

/// App name → declared lib dependencies.
///
/// Keyed by name with sorted sets, so the result doesn't depend on the order
/// descriptors were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyIndex {
  deps: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyIndex {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build the index from raw descriptors.
  ///
  /// Descriptors are parsed in parallel. If several are malformed, the error
  /// for the first one in input order is returned.
  pub fn from_raw(raw: &[RawDescriptor]) -> AffectedResult<Self> {
    let parsed: Vec<AffectedResult<(PathBuf, ProjectDescriptor)>> = raw
      .par_iter()
      .map(|r| parse_descriptor(r).map(|d| (r.path.clone(), d)))
      .collect();

    let mut index = Self::new();
    for result in parsed {
      let (path, descriptor) = result?;
      if !index.insert(&descriptor) {
        tracing::debug!(path = %path_to_git_format(&path), "descriptor has no name or lib dependencies, skipped");
      }
    }
    Ok(index)
  }

  /// Discover and index every descriptor under `apps_dir`.
  pub fn build(source: &impl DescriptorSource, apps_dir: &Path) -> AffectedResult<Self> {
    let raw = source.list_descriptors(apps_dir)?;
    let index = Self::from_raw(&raw)?;
    tracing::info!(apps = index.len(), descriptors = raw.len(), "built dependency index");
    Ok(index)
  }

  /// Record a descriptor. Returns false when it was skipped.
  ///
  /// Descriptors sharing a name are merged by union.
  pub fn insert(&mut self, descriptor: &ProjectDescriptor) -> bool {
    let (Some(name), Some(libs)) = (&descriptor.name, &descriptor.lib_folder_dependencies) else {
      return false;
    };
    if name.is_empty() {
      return false;
    }

    self
      .deps
      .entry(name.clone())
      .or_default()
      .extend(libs.iter().filter(|l| !l.is_empty()).cloned());
    true
  }

  /// Apps declaring a dependency on `lib`, in name order
  pub fn dependents_of<'a>(&'a self, lib: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .deps
      .iter()
      .filter(move |(_, libs)| libs.contains(lib))
      .map(|(app, _)| app.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
    self.deps.iter()
  }

  pub fn len(&self) -> usize {
    self.deps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.deps.is_empty()
  }
}

impl<S: Into<String>> FromIterator<(S, Vec<S>)> for DependencyIndex {
  fn from_iter<I: IntoIterator<Item = (S, Vec<S>)>>(iter: I) -> Self {
    let mut index = Self::new();
    for (app, libs) in iter {
      index.insert(&ProjectDescriptor {
        name: Some(app.into()),
        lib_folder_dependencies: Some(libs.into_iter().map(Into::into).collect()),
      });
    }
    index
  }
}
