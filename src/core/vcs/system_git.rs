//! System git backend - zero dependencies
//!
//! Uses git porcelain/plumbing commands for the few operations we need:
//! - Opening a repository (rev-parse)
//! - Checking out revisions so both sides of a diff exist locally
//! - Listing changed paths between two revisions (diff -z)

use super::ChangedFile;
use crate::core::error::{AffectedError, AffectedResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let output = isolated_git(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(AffectedError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(AffectedError::message(format!(
        "Failed to open git repository: {}",
        stderr
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root as reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Check out a revision (detached for SHAs)
  pub fn checkout(&self, rev: &str) -> AffectedResult<()> {
    tracing::debug!(rev, "checking out");
    self.run(&["checkout", rev])?;
    Ok(())
  }

  /// List changed files between two revisions.
  ///
  /// Runs `git diff --no-renames --name-status -z <base>...<head>`, i.e. the
  /// changes on `head` since its merge base with `base`. Renames show up as a
  /// delete plus an add, so both the old and the new location are reported.
  pub fn changed_files(&self, base: &str, head: &str) -> AffectedResult<Vec<ChangedFile>> {
    let range = format!("{}...{}", base, head);
    let stdout = self.run(&["diff", "--no-renames", "--name-status", "-z", &range])?;
    let files = parse_name_status_z(&stdout);
    tracing::debug!(count = files.len(), %range, "collected changed files");
    Ok(files)
  }

  /// Run a git command, returning stdout or a `CommandFailed` error.
  fn run(&self, args: &[&str]) -> AffectedResult<Vec<u8>> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(AffectedError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(output.stdout)
  }

  pub(crate) fn git_cmd(&self) -> Command {
    isolated_git(&self.repo_path)
  }
}

/// Create a safe git command with isolated environment
///
/// - Sets working directory to `dir`
/// - Clears environment variables (so inherited `GIT_DIR`/`GIT_WORK_TREE` can't redirect it)
/// - Whitelists only PATH and HOME
/// - Adds safe configuration overrides
fn isolated_git(dir: &Path) -> Command {
  let mut cmd = Command::new("git");

  cmd.arg("-C").arg(dir);

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

  cmd
}

/// Parse NUL-delimited `--name-status -z` output.
///
/// The stream alternates status and path tokens (`M\0apps/a/x.ts\0D\0...`).
/// Empty tokens are dropped and a dangling status without a path is ignored.
pub fn parse_name_status_z(output: &[u8]) -> Vec<ChangedFile> {
  let text = String::from_utf8_lossy(output);
  let tokens: Vec<&str> = text.split('\0').filter(|s| !s.is_empty()).collect();

  tokens
    .chunks_exact(2)
    .map(|pair| ChangedFile {
      status: pair[0].chars().next().unwrap_or('?'),
      path: pair[1].to_string(),
    })
    .collect()
}
