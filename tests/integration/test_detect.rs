//! Integration tests for `nx-affected detect`

use crate::helpers::{TestWorkspace, names, nx_affected_cmd, run_json, run_nx_affected};
use anyhow::Result;

/// Workspace with apps foo (→ shared), app1 (→ util), app2 (→ other)
fn seeded_workspace() -> Result<(TestWorkspace, String)> {
  let ws = TestWorkspace::new()?;
  ws.add_app("apps", "foo", &["shared"])?;
  ws.add_app("apps", "app1", &["util"])?;
  ws.add_app("apps", "app2", &["other"])?;
  ws.add_lib("libs", "shared")?;
  ws.add_lib("libs", "util")?;
  ws.add_lib("libs", "other")?;
  let base = ws.commit("Add apps and libs")?;
  Ok((ws, base))
}

#[test]
fn test_app_and_lib_change_counts_app_once() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/foo/src/a.ts", "export const a = 1;\n")?;
  ws.write_file("libs/shared/index.ts", "export const s = 2;\n")?;
  let head = ws.commit("Touch foo and shared")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;

  assert_eq!(names(&json, "apps"), vec!["foo"]);
  assert_eq!(names(&json, "libs"), vec!["shared"]);
  assert_eq!(json["affected"], true);

  Ok(())
}

#[test]
fn test_lib_change_propagates_to_dependent_app() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("libs/util/x.ts", "export const x = 1;\n")?;
  let head = ws.commit("Touch util")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;

  assert_eq!(names(&json, "apps"), vec!["app1"]);
  assert_eq!(names(&json, "libs"), vec!["util"]);
  assert_eq!(names(&json, "changed_dirs"), vec!["app1", "util"]);

  Ok(())
}

#[test]
fn test_app_only_change() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("apps/bar/a.ts", "1\n")?;
  let base = ws.commit("Add bar")?;
  ws.write_file("apps/bar/a.ts", "2\n")?;
  let head = ws.commit("Change bar")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;

  assert_eq!(names(&json, "apps"), vec!["bar"]);
  assert!(names(&json, "libs").is_empty());

  Ok(())
}

#[test]
fn test_unrelated_change_not_affected() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("README.md", "# Changed\n")?;
  let head = ws.commit("Docs")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;

  assert!(names(&json, "apps").is_empty());
  assert!(names(&json, "libs").is_empty());
  assert_eq!(json["affected"], false);

  let output = run_nx_affected(&ws.path, &["detect", "--base", &base, "--head", &head, "--no-publish"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Affected: no"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_deleted_app_is_still_reported() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  std::fs::remove_dir_all(ws.path.join("apps/app2"))?;
  let head = ws.commit("Remove app2")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;
  assert_eq!(names(&json, "apps"), vec!["app2"]);

  Ok(())
}

#[test]
fn test_malformed_descriptor_aborts() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/app2/project.json", "{ \"name\": \"app2\", ")?;
  ws.write_file("libs/util/x.ts", "export const x = 1;\n")?;
  let head = ws.commit("Break app2 descriptor")?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--base", &base, "--head", &head, "--format", "json"]).output()?;

  assert_eq!(output.status.code(), Some(3));
  assert!(output.stdout.is_empty(), "no partial result expected");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("apps/app2/project.json"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_custom_layout_from_nx_json() -> Result<()> {
  let ws = TestWorkspace::with_nx_json(r#"{ "workspaceLayout": { "appsDir": "services", "libsDir": "packages" } }"#)?;
  ws.add_app("services", "billing", &["money"])?;
  ws.add_lib("packages", "money")?;
  ws.add_lib("libs", "ignored")?;
  let base = ws.commit("Setup")?;

  ws.write_file("packages/money/src/index.ts", "export const money = 2;\n")?;
  ws.write_file("libs/ignored/src/index.ts", "export const ignored = 2;\n")?;
  let head = ws.commit("Change money")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;
  assert_eq!(names(&json, "apps"), vec!["billing"]);
  assert_eq!(names(&json, "libs"), vec!["money"]);

  Ok(())
}

#[test]
fn test_overlapping_layout_rejected() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/foo/src/a.ts", "changed\n")?;
  let head = ws.commit("Change foo")?;

  let output = nx_affected_cmd(
    &ws.path,
    &["detect", "--base", &base, "--head", &head, "--apps-dir", "apps", "--libs-dir", "apps/libs"],
  )
  .output()?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("overlap"));

  Ok(())
}

#[test]
fn test_push_event_payload() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/app1/src/main.ts", "changed\n")?;
  let head = ws.commit("Change app1")?;

  let event_dir = tempfile::TempDir::new()?;
  let event_path = event_dir.path().join("event.json");
  std::fs::write(
    &event_path,
    serde_json::json!({ "before": base, "after": head, "ref": "refs/heads/main" }).to_string(),
  )?;
  let event_path = event_path.to_string_lossy().to_string();

  let json = run_json(&ws.path, &["detect", "--event", "push", "--event-path", &event_path])?;
  assert_eq!(names(&json, "apps"), vec!["app1"]);

  Ok(())
}

#[test]
fn test_pull_request_event_from_env() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("libs/shared/src/index.ts", "changed\n")?;
  let head = ws.commit("Change shared")?;

  let event_dir = tempfile::TempDir::new()?;
  let event_path = event_dir.path().join("event.json");
  std::fs::write(
    &event_path,
    serde_json::json!({ "pull_request": { "base": { "sha": base }, "head": { "sha": head } } }).to_string(),
  )?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--format", "names", "--no-publish"])
    .env("GITHUB_EVENT_NAME", "pull_request")
    .env("GITHUB_EVENT_PATH", &event_path)
    .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8_lossy(&output.stdout);
  let lines: Vec<&str> = stdout.trim().lines().collect();
  assert_eq!(lines, vec!["foo", "shared"]);

  Ok(())
}

#[test]
fn test_unsupported_event_fails() -> Result<()> {
  let (ws, _base) = seeded_workspace()?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--event", "workflow_dispatch"]).output()?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Unsupported event: workflow_dispatch"), "got: {}", stderr);
  assert!(output.stdout.is_empty());

  Ok(())
}

#[test]
fn test_publishes_step_outputs() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("libs/util/x.ts", "export const x = 1;\n")?;
  let head = ws.commit("Touch util")?;

  let out_dir = tempfile::TempDir::new()?;
  let out_file = out_dir.path().join("github_output");

  let output = nx_affected_cmd(&ws.path, &["detect", "--base", &base, "--head", &head])
    .env("GITHUB_OUTPUT", &out_file)
    .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let content = std::fs::read_to_string(&out_file)?;
  assert!(content.contains(r#"changed-apps=["app1"]"#), "got: {}", content);
  assert!(content.contains(r#"changed-libs=["util"]"#));
  assert!(content.contains(r#"changed-dirs=["app1","util"]"#));
  assert!(content.contains("affected=true"));
  assert!(content.contains("not-affected=false"));

  Ok(())
}

#[test]
fn test_dry_run_lists_files_only() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/foo/src/a.ts", "changed\n")?;
  let head = ws.commit("Change foo")?;

  let output = run_nx_affected(&ws.path, &["detect", "--base", &base, "--head", &head, "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN: Would analyze 1 changed files"), "got: {}", stdout);
  assert!(stdout.contains("[A] apps/foo/src/a.ts"), "got: {}", stdout);
  assert!(!stdout.contains("Changed apps"));

  Ok(())
}

#[test]
fn test_unknown_revision_is_git_error() -> Result<()> {
  let (ws, base) = seeded_workspace()?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--base", &base, "--head", "does-not-exist"]).output()?;
  assert_eq!(output.status.code(), Some(2));

  Ok(())
}

#[test]
fn test_checkout_reads_descriptors_at_head() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  // app2 starts depending on util only at head
  ws.add_app("apps", "app2", &["other", "util"])?;
  ws.write_file("libs/util/x.ts", "export const x = 1;\n")?;
  let head = ws.commit("app2 depends on util")?;
  crate::helpers::git(&ws.path, &["checkout", &base])?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head, "--checkout"])?;
  assert_eq!(names(&json, "apps"), vec!["app2", "app1"]);
  assert_eq!(names(&json, "libs"), vec!["util"]);

  Ok(())
}

#[test]
fn test_json_stays_parseable_under_actions_without_output_file() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("libs/util/x.ts", "export const x = 1;\n")?;
  let head = ws.commit("Touch util")?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--base", &base, "--head", &head, "--format", "json"])
    .env("GITHUB_ACTIONS", "true")
    .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(!stdout.contains("::set-output"), "got: {}", stdout);
  let json: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(names(&json, "apps"), vec!["app1"]);

  Ok(())
}

#[test]
fn test_text_falls_back_to_set_output_under_actions() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/app2/src/main.ts", "changed\n")?;
  let head = ws.commit("Touch app2")?;

  let output = nx_affected_cmd(&ws.path, &["detect", "--base", &base, "--head", &head])
    .env("GITHUB_ACTIONS", "true")
    .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains(r#"::set-output name=changed-apps::["app2"]"#), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_inherited_git_dir_is_ignored() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("apps/foo/src/a.ts", "changed\n")?;
  let head = ws.commit("Change foo")?;

  let output = nx_affected_cmd(
    &ws.path,
    &["detect", "--base", &base, "--head", &head, "--format", "names", "--no-publish"],
  )
  .env("GIT_DIR", ws.path.join("not-a-repo"))
  .env("GIT_WORK_TREE", ws.path.join("apps"))
  .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert_eq!(stdout.trim().lines().collect::<Vec<_>>(), vec!["foo"]);

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinked_app_dir_is_detected() -> Result<()> {
  let (ws, base) = seeded_workspace()?;
  ws.write_file("vendor/linked/main.ts", "console.log('linked');\n")?;
  std::os::unix::fs::symlink("../vendor/linked", ws.path.join("apps/linked"))?;
  let head = ws.commit("Link vendored app")?;

  let json = run_json(&ws.path, &["detect", "--base", &base, "--head", &head])?;
  assert_eq!(names(&json, "apps"), vec!["linked"]);
  assert!(names(&json, "libs").is_empty());
  assert_eq!(json["affected"], true);

  Ok(())
}
