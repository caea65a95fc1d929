//! Integration tests for CLI commands.
//!
//! Every test points the user config at an empty temp directory and runs
//! in its own project directory.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pivotsql(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pivotsql").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("RUST_LOG", "error");
    cmd
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn small_campaign_passes_and_writes_findings() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out/findings.json");

    pivotsql(temp.path())
        .args(["run", "--seed", "3", "--iterations", "20", "--workers", "2", "--no-color"])
        .arg("--project")
        .arg(temp.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Worker"))
        .stdout(predicate::str::contains("upheld the containment guarantee"));

    let json = fs::read_to_string(&output).unwrap();
    assert_eq!(json.trim(), "[]");
}

#[test]
fn run_reads_project_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("pivotsql.toml"),
        "[run]\nseed = 11\niterations = 6\nworkers = 1\noracle = \"negative\"\n",
    )
    .unwrap();

    pivotsql(temp.path())
        .args(["run", "--no-color", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("negative oracle"))
        .stdout(predicate::str::contains("seed: 11"));
}

#[test]
fn run_rejects_zero_workers() {
    let temp = TempDir::new().unwrap();

    pivotsql(temp.path())
        .args(["run", "--workers", "0", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("run.workers"));
}

#[test]
fn invalid_project_config_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pivotsql.toml"), "[run]\nworkers = \"many\"\n").unwrap();

    pivotsql(temp.path())
        .args(["run", "--project"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

// ============================================================================
// Config Commands
// ============================================================================

#[test]
fn config_show_text_lists_keys() {
    let temp = TempDir::new().unwrap();

    pivotsql(temp.path())
        .args(["config", "show", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("run.workers"))
        .stdout(predicate::str::contains("database.dialect"))
        .stdout(predicate::str::contains("pivotsql.local.toml"));
}

#[test]
fn config_show_json_merges_project_and_local() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pivotsql.toml"), "[run]\nworkers = 2\nseed = 5\n").unwrap();
    fs::write(temp.path().join("pivotsql.local.toml"), "[run]\nworkers = 6\n").unwrap();

    pivotsql(temp.path())
        .args(["config", "show", "--format", "json", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workers\": 6"))
        .stdout(predicate::str::contains("\"seed\": 5"));
}

#[test]
fn config_show_toml_has_sections() {
    let temp = TempDir::new().unwrap();

    pivotsql(temp.path())
        .args(["config", "show", "--format", "toml", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[run]"))
        .stdout(predicate::str::contains("[database]"))
        .stdout(predicate::str::contains("oracle = \"both\""));
}

#[test]
fn environment_overrides_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pivotsql.toml"), "[run]\nworkers = 2\n").unwrap();

    pivotsql(temp.path())
        .env("PIVOTSQL_RUN__WORKERS", "8")
        .env("PIVOTSQL_ERRORS__EXTRA_EXPECTED", "Not implemented,Catalog Error")
        .args(["config", "show", "--format", "json", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workers\": 8"))
        .stdout(predicate::str::contains("Not implemented"))
        .stdout(predicate::str::contains("Catalog Error"));
}

#[test]
fn user_config_is_lowest_file_layer() {
    let temp = TempDir::new().unwrap();
    let user_dir = temp.path().join(".config/pivotsql");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("config.toml"), "[run]\niterations = 77\nworkers = 3\n").unwrap();
    fs::write(temp.path().join("pivotsql.toml"), "[run]\nworkers = 2\n").unwrap();

    pivotsql(temp.path())
        .args(["config", "show", "--format", "json", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"iterations\": 77"))
        .stdout(predicate::str::contains("\"workers\": 2"));
}
