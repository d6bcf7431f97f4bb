//! Error types for nx-affected with contextual messages and exit codes
//!
//! Every fatal condition is categorised so the process boundary can pick an exit
//! code and print a hint. Non-fatal conditions (no changes, no descriptors) are
//! never errors; they show up as empty results.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for nx-affected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, refs, unsupported event, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Workspace content is invalid (malformed project descriptor)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for nx-affected
#[derive(Debug)]
pub enum AffectedError {
  /// Configuration errors (refs, events, workspace layout)
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Project descriptor errors
  Descriptor(DescriptorError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl AffectedError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    AffectedError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    AffectedError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      AffectedError::Message { message, context, help } => AffectedError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      AffectedError::Io(err) => AffectedError::Message {
        message: ctx_str,
        context: Some(err.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      AffectedError::Config(_) => ExitCode::User,
      AffectedError::Git(_) => ExitCode::System,
      AffectedError::Descriptor(_) => ExitCode::Validation,
      AffectedError::Io(_) => ExitCode::System,
      AffectedError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      AffectedError::Config(e) => e.help_message(),
      AffectedError::Git(e) => e.help_message(),
      AffectedError::Descriptor(e) => e.help_message(),
      AffectedError::Message { help, .. } => help.clone(),
      AffectedError::Io(_) => None,
    }
  }
}

impl fmt::Display for AffectedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AffectedError::Config(e) => write!(f, "{}", e),
      AffectedError::Git(e) => write!(f, "{}", e),
      AffectedError::Descriptor(e) => write!(f, "{}", e),
      AffectedError::Io(e) => write!(f, "I/O error: {}", e),
      AffectedError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for AffectedError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AffectedError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for AffectedError {
  fn from(err: io::Error) -> Self {
    AffectedError::Io(err)
  }
}

impl From<String> for AffectedError {
  fn from(msg: String) -> Self {
    AffectedError::message(msg)
  }
}

impl From<&str> for AffectedError {
  fn from(msg: &str) -> Self {
    AffectedError::message(msg)
  }
}

impl From<serde_json::Error> for AffectedError {
  fn from(err: serde_json::Error) -> Self {
    AffectedError::message(format!("JSON error: {}", err))
  }
}

impl From<walkdir::Error> for AffectedError {
  fn from(err: walkdir::Error) -> Self {
    // walkdir keeps the path in its io::Error conversion
    AffectedError::Io(err.into())
  }
}

impl From<ConfigError> for AffectedError {
  fn from(err: ConfigError) -> Self {
    AffectedError::Config(err)
  }
}

impl From<GitError> for AffectedError {
  fn from(err: GitError) -> Self {
    AffectedError::Git(err)
  }
}

impl From<DescriptorError> for AffectedError {
  fn from(err: DescriptorError) -> Self {
    AffectedError::Descriptor(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Base or head revision could not be determined
  MissingRefs,

  /// CI event we don't know how to read refs from
  UnsupportedEvent { name: String },

  /// Event payload file unreadable or malformed
  InvalidEventPayload { path: PathBuf, reason: String },

  /// nx.json exists but can't be parsed
  InvalidWorkspaceFile { path: PathBuf, reason: String },

  /// Apps/libs roots empty, equal, or nested in each other
  InvalidLayout { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingRefs => {
        Some("Pass both --base and --head, or run inside a push / pull_request workflow.".to_string())
      }
      ConfigError::UnsupportedEvent { .. } => Some(
        "Only `push` and `pull_request` events carry revisions. Pass --base and --head explicitly for other triggers."
          .to_string(),
      ),
      ConfigError::InvalidLayout { .. } => {
        Some("Set distinct, non-nested `workspaceLayout.appsDir` and `workspaceLayout.libsDir` in nx.json.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingRefs => write!(f, "Base or head refs are missing"),
      ConfigError::UnsupportedEvent { name } => write!(f, "Unsupported event: {}", name),
      ConfigError::InvalidEventPayload { path, reason } => {
        write!(f, "Failed to read event payload {}: {}", path.display(), reason)
      }
      ConfigError::InvalidWorkspaceFile { path, reason } => {
        write!(f, "Failed to parse workspace file {}: {}", path.display(), reason)
      }
      ConfigError::InvalidLayout { reason } => write!(f, "Invalid workspace layout: {}", reason),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") || stderr.contains("no merge base") {
          Some("Make sure both revisions are fetched (e.g. actions/checkout with `fetch-depth: 0`).".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside a git checkout or pass --workspace. Looked at: {}",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Project descriptor errors
#[derive(Debug)]
pub enum DescriptorError {
  /// Descriptor could not be read from disk
  Unreadable { path: PathBuf, reason: String },

  /// Descriptor is not a valid JSON record
  Parse { path: PathBuf, reason: String },
}

impl DescriptorError {
  fn help_message(&self) -> Option<String> {
    match self {
      DescriptorError::Parse { path, .. } => Some(format!(
        "Fix the JSON in {}. A broken descriptor would silently drop dependency edges.",
        path.display()
      )),
      DescriptorError::Unreadable { .. } => None,
    }
  }
}

impl fmt::Display for DescriptorError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DescriptorError::Unreadable { path, reason } => {
        write!(f, "Failed to read project descriptor {}: {}", path.display(), reason)
      }
      DescriptorError::Parse { path, reason } => {
        write!(f, "Failed to parse project descriptor {}: {}", path.display(), reason)
      }
    }
  }
}

/// Result type alias for nx-affected
pub type AffectedResult<T> = Result<T, AffectedError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<AffectedError>,
{
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &AffectedError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
