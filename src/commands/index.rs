//! `nx-affected index` - Print the app → lib dependency index
//!
//! Useful for checking what the descriptors under the apps root actually
//! declare before relying on propagation in CI.

use crate::commands::OutputFormat;
use crate::core::config::LayoutOverrides;
use crate::core::context::WorkspaceContext;
use crate::core::error::AffectedResult;
use crate::graph::{DependencyIndex, FsDescriptorSource};
use serde_json::json;
use std::path::Path;

/// Run the index command
pub fn run_index(workspace_root: &Path, layout: LayoutOverrides, format: String) -> AffectedResult<()> {
  let output_format = OutputFormat::from_str(&format)?;
  let ctx = WorkspaceContext::build(workspace_root, &layout)?;
  let index = ctx.dependency_index(&FsDescriptorSource)?;

  match output_format {
    OutputFormat::Text => display_text(&ctx, &index),
    OutputFormat::Json => {
      let output = json!({
          "apps_dir": ctx.layout.apps_dir,
          "libs_dir": ctx.layout.libs_dir,
          "dependencies": index,
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
    OutputFormat::NamesOnly => {
      for (app, _) in index.iter() {
        println!("{}", app);
      }
    }
  }

  Ok(())
}

fn display_text(ctx: &WorkspaceContext, index: &DependencyIndex) {
  println!("Dependency Index");
  println!("================");
  println!();
  println!("Apps dir: {}", ctx.layout.apps_dir);
  println!("Libs dir: {}", ctx.layout.libs_dir);
  println!();

  if index.is_empty() {
    println!("No project descriptors with lib dependencies found.");
    return;
  }

  println!("Apps: {}", index.len());
  for (app, libs) in index.iter() {
    let libs: Vec<&str> = libs.iter().map(String::as_str).collect();
    if libs.is_empty() {
      println!("  📦 {} (no lib dependencies)", app);
    } else {
      println!("  📦 {} → {}", app, libs.join(", "));
    }
  }
}
