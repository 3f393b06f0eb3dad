//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end. Nothing here talks to Jira;
//! commands that need it are checked for their configuration error.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get the binary to test, isolated from the user's config, cache and credentials.
fn jiraflow(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jiraflow").unwrap();
    cmd.current_dir(dir.path())
        .env("JIRAFLOW_WORKFLOW_DIR", dir.path())
        .env_remove("JIRAFLOW_PROJECT")
        .env_remove("JIRA_BASE_URL")
        .env_remove("JIRA_EMAIL")
        .env_remove("JIRA_API_TOKEN");
    cmd
}

const SAMPLE_CACHE: &str = r#"{
  "workflows": {
    "Task:To Do:Done": {
      "steps": [
        { "fromState": "To Do", "toState": "In Progress", "transitionName": "Start Progress", "transitionId": "11" },
        { "fromState": "In Progress", "toState": "Done", "transitionName": "Done", "transitionId": "31" }
      ],
      "discoveredDate": "2024-05-01T10:00:00Z",
      "lastUsed": "2024-05-02T10:00:00Z",
      "usageCount": 3
    }
  },
  "lastUpdated": "2024-05-02T10:00:00Z"
}"#;

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Move Jira issues through multi-step workflows"));
}

#[test]
fn test_version_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_move_help() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["move", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

// ============================================================================
// Cache Command Tests
// ============================================================================

#[test]
fn test_cache_path_unscoped() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jira-workflows.json"));
}

#[test]
fn test_cache_path_scoped() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["--project", "ENG", "cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jira-workflows-eng.json"));
}

#[test]
fn test_cache_list_empty() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached workflow paths"));
}

#[test]
fn test_cache_list_entries() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("jira-workflows.json").write_str(SAMPLE_CACHE).unwrap();

    jiraflow(&dir)
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Task] To Do → Done"))
        .stdout(predicate::str::contains("2 step(s), used 3x"))
        .stdout(predicate::str::contains("Total: 1 path(s), last updated 2024-05-02 10:00"));
}

#[test]
fn test_cache_list_corrupt_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("jira-workflows.json").write_str("{ broken").unwrap();

    jiraflow(&dir)
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached workflow paths"));
}

#[test]
fn test_cache_forget() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("jira-workflows.json");
    file.write_str(SAMPLE_CACHE).unwrap();

    jiraflow(&dir).args(["cache", "forget", "Task", "To Do", "Done"]).assert().success();
    file.assert(predicate::str::contains("Task:To Do:Done").not());

    jiraflow(&dir).args(["cache", "forget", "Task", "To Do", "Done"]).assert().failure();
}

#[test]
fn test_cache_clear() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("jira-workflows.json").write_str(SAMPLE_CACHE).unwrap();

    jiraflow(&dir)
        .args(["cache", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cached path(s)"));
}

// ============================================================================
// Jira Command Tests
// ============================================================================

#[test]
fn test_move_requires_jira_config() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["move", "PROJ-1", "Done", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Jira integration not configured"));
}

#[test]
fn test_suggest_requires_jira_config() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["suggest", "PROJ-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JIRA_API_TOKEN"));
}

// ============================================================================
// Config & Completions Tests
// ============================================================================

#[test]
fn test_config_reads_local_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".jiraflow.toml").write_str("[workflow]\nsuggestion_limit = 9\n").unwrap();

    jiraflow(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("suggestion_limit = 9"));
}

#[test]
fn test_invalid_config_falls_back_with_warning() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".jiraflow.toml").write_str("[jira\nproject = \"ENG\"\n").unwrap();

    jiraflow(&dir)
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignoring configuration, using defaults"))
        .stdout(predicate::str::contains("Invalid config file"))
        .stdout(predicate::str::contains("jira-workflows.json"));
}

#[test]
fn test_completions_bash() {
    let dir = assert_fs::TempDir::new().unwrap();
    jiraflow(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jiraflow"));
}
