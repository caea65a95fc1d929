//! Focused CLI argument parsing tests.
//!
//! None of these open a database.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;

fn pivotsql() -> Command {
    Command::cargo_bin("pivotsql").unwrap()
}

#[test]
fn version_command_succeeds() {
    pivotsql()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pivotsql-cli"))
        .stdout(predicate::str::contains("DuckDB"));
}

#[test]
fn version_flag_shows_version() {
    pivotsql()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pivotsql"));
}

#[test]
fn help_flag_shows_usage() {
    pivotsql()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pivoted query synthesis"));
}

#[test]
fn run_help_lists_flags() {
    pivotsql()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--iterations"))
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--oracle"))
        .stdout(predicate::str::contains("--no-color"));
}

#[test]
fn run_rejects_unknown_oracle() {
    pivotsql()
        .args(["run", "--oracle", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn run_rejects_non_numeric_seed() {
    pivotsql()
        .args(["run", "--seed", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn config_show_rejects_unknown_format() {
    pivotsql()
        .args(["config", "show", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_subcommand_fails() {
    pivotsql().assert().failure();
}
