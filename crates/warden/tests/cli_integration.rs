//! CLI integration tests for the warden command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Invalid inputs are rejected with appropriate messages
//! - Offline commands work end-to-end against an isolated config dir
//!
//! Note: These tests do not touch the identity provider - commands that
//! would reach it (login from scratch, call) are exercised at the unit
//! level instead.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the warden binary.
fn warden() -> Command {
    Command::cargo_bin("warden").unwrap()
}

/// Get a command sandboxed to an isolated config directory.
fn warden_in(dir: &Path) -> Command {
    let mut cmd = warden();
    cmd.env("WARDEN_CONFIG_DIR", dir)
        .env_remove("WARDEN_ENVIRONMENT")
        .current_dir(dir);
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    warden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warden"))
        .stdout(predicate::str::contains("credential lifecycle"));
}

#[test]
fn test_version_displays() {
    warden()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("warden"));
}

#[test]
fn test_help_lists_subcommands() {
    warden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("tokens"))
        .stdout(predicate::str::contains("call"));
}

#[test]
fn test_tokens_help_lists_subcommands() {
    warden()
        .args(["tokens", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("deactivate"))
        .stdout(predicate::str::contains("inject"));
}

#[test]
fn test_call_help_shows_method_and_body() {
    warden()
        .args(["call", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--method"))
        .stdout(predicate::str::contains("--body"));
}

#[test]
fn test_login_help_shows_force() {
    warden()
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag_accepted() {
    warden().args(["--verbose", "--help"]).assert().success();
}

#[test]
fn test_json_flag_accepted() {
    warden().args(["--json", "--help"]).assert().success();
}

#[test]
fn test_environment_flag_accepted() {
    warden()
        .args(["--environment", "production", "--help"])
        .assert()
        .success();
}

#[test]
fn test_environment_short_flag_accepted() {
    warden().args(["-e", "staging", "--help"]).assert().success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_no_subcommand_shows_usage() {
    warden()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_invalid_subcommand_rejected() {
    warden()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_call_requires_path() {
    warden()
        .arg("call")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn test_tokens_show_requires_id() {
    warden()
        .args(["tokens", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ID"));
}

#[test]
fn test_tokens_deactivate_rejects_non_numeric_id() {
    warden()
        .args(["tokens", "deactivate", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime Tests (offline)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_json_with_no_credential() {
    let dir = TempDir::new().unwrap();
    warden_in(dir.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"environment\": \"staging\""))
        .stdout(predicate::str::contains("\"authenticated\": false"));
}

#[test]
fn test_tokens_list_empty_store() {
    let dir = TempDir::new().unwrap();
    warden_in(dir.path())
        .args(["tokens", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tokens stored for staging"));
}

#[test]
fn test_inject_then_status_and_list() {
    let dir = TempDir::new().unwrap();

    warden_in(dir.path())
        .args([
            "tokens",
            "inject",
            "secret-access-token-12345",
            "--refresh-token",
            "refresh-xyz",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored token id 1"));

    warden_in(dir.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": true"))
        .stdout(predicate::str::contains("\"token_id\": 1"));

    // The listing masks the stored value.
    warden_in(dir.path())
        .args(["tokens", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secr...2345"))
        .stdout(predicate::str::contains("secret-access-token-12345").not());
}

#[test]
fn test_environments_do_not_share_tokens() {
    let dir = TempDir::new().unwrap();

    warden_in(dir.path())
        .args(["tokens", "inject", "staging-only-token-value"])
        .assert()
        .success();

    warden_in(dir.path())
        .args(["-e", "production", "tokens", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tokens stored for production"));
}

#[test]
fn test_login_skips_when_token_is_fresh() {
    let dir = TempDir::new().unwrap();

    warden_in(dir.path())
        .args(["tokens", "inject", "fresh-access-token-value"])
        .assert()
        .success();

    warden_in(dir.path())
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already authenticated against staging"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_tokens_deactivate_round_trip() {
    let dir = TempDir::new().unwrap();

    warden_in(dir.path())
        .args(["tokens", "inject", "short-lived-token-value"])
        .assert()
        .success();

    warden_in(dir.path())
        .args(["tokens", "deactivate", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deactivated"));

    warden_in(dir.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": false"));
}

#[test]
fn test_tokens_deactivate_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    warden_in(dir.path())
        .args(["tokens", "deactivate", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no token with id 99"));
}

#[test]
fn test_refresh_without_token_fails() {
    let dir = TempDir::new().unwrap();
    warden_in(dir.path())
        .arg("refresh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active token for staging"));
}

#[test]
fn test_project_config_selects_environment() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("warden.toml"),
        "environment = \"production\"\n",
    )
    .unwrap();

    warden_in(dir.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"environment\": \"production\""));
}
