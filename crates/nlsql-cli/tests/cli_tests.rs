//! CLI integration tests for nlsql.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that need no database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the nlsql binary.
fn cmd() -> Command {
    Command::cargo_bin("nlsql").unwrap()
}

/// Write `yaml` to a temporary config file.
fn config_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("health-check"))
        .stdout(predicate::str::contains("schema"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_query_subcommand_help() {
    cmd()
        .args(["query", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<SQL>"))
        .stdout(predicate::str::contains("--pretty"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nlsql"));
}

#[test]
fn test_global_flags_listed() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: nlsql.yaml]"));
}

// =============================================================================
// Error Exit Codes
// =============================================================================

#[test]
fn test_missing_subcommand_fails() {
    cmd().assert().failure();
}

#[test]
fn test_query_requires_sql() {
    cmd().arg("query").assert().failure();
}

#[test]
fn test_missing_config_exit_code() {
    cmd()
        .args(["--config", "/nonexistent/nlsql.yaml", "schema"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_exit_code() {
    let file = config_file("database: [not, a, mapping]\n");
    cmd()
        .arg("--config")
        .arg(file.path())
        .arg("health-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YAML error"));
}

#[test]
fn test_unsupported_dialect_exit_code() {
    let file = config_file(
        r#"
database:
  db_type: oracle
  host: localhost
  port: 1521
  user: scott
  password: tiger
  dbname: orcl
"#,
    );
    cmd()
        .arg("--config")
        .arg(file.path())
        .arg("health-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported database type: oracle"));
}

#[test]
fn test_invalid_port_exit_code() {
    let file = config_file(
        r#"
database:
  db_type: postgres
  host: localhost
  port: "not-a-port"
  user: app
  dbname: shop
"#,
    );
    cmd()
        .arg("--config")
        .arg(file.path())
        .args(["query", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}
