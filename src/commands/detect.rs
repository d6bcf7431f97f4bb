//! `nx-affected detect` - Show which apps and libs are affected by changes
//!
//! Pipeline:
//! 1. Resolve base/head (explicit flags or CI event payload)
//! 2. Diff the two revisions with system git
//! 3. Load the workspace layout and build the dependency index
//! 4. Classify changed files and propagate lib changes to dependent apps
//! 5. Print the result and publish it as CI step outputs
//!
//! Nothing is printed or published for the affected sets if any step fails.

use crate::ci::{AffectedReport, EventContext, GithubOutput, Publisher, resolve_refs};
use crate::commands::OutputFormat;
use crate::core::config::LayoutOverrides;
use crate::core::context::WorkspaceContext;
use crate::core::error::AffectedResult;
use crate::core::vcs::{ChangedFile, SystemGit};
use crate::graph::{ChangeClassifier, FsDescriptorSource};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Options for the detect command
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
  pub base: Option<String>,
  pub head: Option<String>,
  pub event: Option<String>,
  pub event_path: Option<PathBuf>,
  pub layout: LayoutOverrides,
  pub checkout: bool,
  pub format: String,
  pub dry_run: bool,
  pub no_publish: bool,
}

/// Run the detect command
pub fn run_detect(workspace_root: &Path, opts: DetectOptions) -> AffectedResult<()> {
  let output_format = OutputFormat::from_str(&opts.format)?;

  // Event flags override the environment field by field
  let env_event = EventContext::from_env();
  let event = EventContext::new(opts.event.or(env_event.name), opts.event_path.or(env_event.payload_path));
  let range = resolve_refs(opts.base.as_deref(), opts.head.as_deref(), &event)?;

  let git = SystemGit::open(workspace_root)?;
  if opts.checkout {
    git.checkout(&range.base)?;
    git.checkout(&range.head)?;
  }

  let changed = relative_to_workspace(
    git.work_tree(),
    workspace_root,
    git.changed_files(&range.base, &range.head)?,
  );

  if opts.dry_run {
    println!("DRY RUN: Would analyze {} changed files", changed.len());
    for file in &changed {
      println!("  - [{}] {}", file.status, file.path);
    }
    return Ok(());
  }

  let changed_files: Vec<String> = changed.into_iter().map(|f| f.path).collect();

  // Layout and descriptors are read after any checkout so they match head
  let ctx = WorkspaceContext::build(workspace_root, &opts.layout)?;
  let index = ctx.dependency_index(&FsDescriptorSource)?;
  let changes = ChangeClassifier::new(&ctx.layout, &index).classify(&changed_files);
  let report = AffectedReport::from(changes);

  tracing::info!(apps = ?report.apps, libs = ?report.libs, affected = report.affected, "classification done");

  display_results(&report, &changed_files, output_format)?;

  if should_publish(opts.no_publish) {
    GithubOutput::from_env()
      .with_stdout_fallback(output_format == OutputFormat::Text)
      .publish(&report)?;
  }

  Ok(())
}

/// Publish when running under GitHub Actions, unless disabled
fn should_publish(no_publish: bool) -> bool {
  if no_publish {
    return false;
  }
  std::env::var_os(crate::ci::output::OUTPUT_FILE_VAR).is_some()
    || std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Re-root repository-relative paths onto the workspace directory.
///
/// Git reports paths from the repository top level. When the Nx workspace is a
/// subdirectory, only paths inside it are kept, with the prefix stripped.
fn relative_to_workspace(work_tree: &Path, workspace_root: &Path, files: Vec<ChangedFile>) -> Vec<ChangedFile> {
  let prefix = match (work_tree.canonicalize(), workspace_root.canonicalize()) {
    (Ok(top), Ok(ws)) => ws
      .strip_prefix(&top)
      .map(crate::utils::path_to_git_format)
      .unwrap_or_default(),
    _ => String::new(),
  };

  if prefix.is_empty() {
    return files;
  }

  tracing::debug!(%prefix, "workspace is below repository root");
  let prefix = format!("{}/", prefix);
  files
    .into_iter()
    .filter_map(|f| {
      let path = f.path.strip_prefix(prefix.as_str())?.to_string();
      Some(ChangedFile { path, ..f })
    })
    .collect()
}

/// Display affected analysis results
fn display_results(report: &AffectedReport, changed_files: &[String], format: OutputFormat) -> AffectedResult<()> {
  match format {
    OutputFormat::Text => display_text(report, changed_files),
    OutputFormat::Json => display_json(report, changed_files),
    OutputFormat::NamesOnly => display_names_only(report),
  }
}

/// Display results in human-readable text format
fn display_text(report: &AffectedReport, changed_files: &[String]) -> AffectedResult<()> {
  println!("Affected Analysis");
  println!("=================");
  println!();

  println!("Changed files: {}", changed_files.len());
  if !changed_files.is_empty() && changed_files.len() <= 20 {
    for file in changed_files {
      println!("  {}", file);
    }
    println!();
  }

  println!("Changed apps: {}", report.apps.len());
  for app in &report.apps {
    println!("  📦 {}", app);
  }
  println!();

  println!("Changed libs: {}", report.libs.len());
  for lib in &report.libs {
    println!("  📚 {}", lib);
  }
  println!();

  if report.affected {
    println!("Affected: yes");
  } else {
    println!("Affected: no");
  }

  Ok(())
}

/// Display results in JSON format
fn display_json(report: &AffectedReport, changed_files: &[String]) -> AffectedResult<()> {
  let output = json!({
      "changed_files": changed_files,
      "apps": report.apps,
      "libs": report.libs,
      "changed_dirs": report.changed_dirs(),
      "affected": report.affected,
      "summary": {
          "changed_files_count": changed_files.len(),
          "apps_count": report.apps.len(),
          "libs_count": report.libs.len()
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

/// Display only unit names (apps, then libs)
fn display_names_only(report: &AffectedReport) -> AffectedResult<()> {
  for name in report.changed_dirs() {
    println!("{}", name);
  }

  Ok(())
}
