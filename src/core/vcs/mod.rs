pub mod system_git;

pub use system_git::SystemGit;

/// A path reported by `git diff --name-status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
  /// Status letter (A, M, D, T, ...)
  pub status: char,
  /// Repository-relative path with `/` separators
  pub path: String,
}
