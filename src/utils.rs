//! Utility functions for repository-relative path handling

use std::path::Path;

/// Normalize a directory root to the form git reports paths in.
///
/// Backslashes become `/`, and leading `./` plus trailing `/` are dropped, so
/// `./apps/`, `apps/` and `apps` all compare equal.
pub fn normalize_dir_root(raw: &str) -> String {
  let mut root = raw.trim().replace('\\', "/");

  while let Some(stripped) = root.strip_prefix("./") {
    root = stripped.to_string();
  }
  while root.ends_with('/') {
    root.pop();
  }

  root
}

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
