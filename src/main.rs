mod ci;
mod commands;
mod core;
mod graph;
mod utils;

use clap::{Args, Parser, Subcommand};
use crate::core::config::LayoutOverrides;
use crate::core::error::{AffectedError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Detect which Nx apps and libs changed between two revisions
#[derive(Parser)]
#[command(name = "nx-affected")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Workspace root (default: current directory)
  #[arg(long, global = true)]
  workspace: Option<PathBuf>,

  /// Show debug diagnostics on stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Overrides for `workspaceLayout` in nx.json
#[derive(Args, Debug, Clone, Default)]
struct LayoutArgs {
  /// Apps root (default: nx.json workspaceLayout.appsDir, then "apps")
  #[arg(long)]
  apps_dir: Option<String>,
  /// Libs root (default: nx.json workspaceLayout.libsDir, then "libs")
  #[arg(long)]
  libs_dir: Option<String>,
}

impl From<LayoutArgs> for LayoutOverrides {
  fn from(args: LayoutArgs) -> Self {
    LayoutOverrides {
      apps_dir: args.apps_dir,
      libs_dir: args.libs_dir,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Show which apps and libs are affected by changes between two revisions
  Detect {
    /// Base revision (default: from the CI event)
    #[arg(long, requires = "head")]
    base: Option<String>,
    /// Head revision (default: from the CI event)
    #[arg(long, requires = "base")]
    head: Option<String>,
    /// Triggering event name (default: $GITHUB_EVENT_NAME)
    #[arg(long)]
    event: Option<String>,
    /// Path to the event payload JSON (default: $GITHUB_EVENT_PATH)
    #[arg(long)]
    event_path: Option<PathBuf>,
    #[command(flatten)]
    layout: LayoutArgs,
    /// Check out base, then head, before diffing
    #[arg(long)]
    checkout: bool,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
    /// List changed files without classifying or publishing
    #[arg(long)]
    dry_run: bool,
    /// Never write CI step outputs
    #[arg(long)]
    no_publish: bool,
  },

  /// Show the app → lib dependency index built from project.json files
  Index {
    #[command(flatten)]
    layout: LayoutArgs,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "nx_affected=debug" } else { "nx_affected=info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let workspace_root = match cli.workspace {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(1);
      }
    },
  };

  let result = match cli.command {
    Commands::Detect {
      base,
      head,
      event,
      event_path,
      layout,
      checkout,
      format,
      dry_run,
      no_publish,
    } => commands::run_detect(
      &workspace_root,
      commands::DetectOptions {
        base,
        head,
        event,
        event_path,
        layout: layout.into(),
        checkout,
        format,
        dry_run,
        no_publish,
      },
    ),
    Commands::Index { layout, format } => commands::run_index(&workspace_root, layout.into(), format),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: AffectedError) -> ! {
  tracing::error!(exit_code = err.exit_code().as_i32(), "run failed");
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
