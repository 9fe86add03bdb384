//! Integration tests for the `adxview` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling -- all without requiring a live reporting backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `adxview` binary with env isolation.
///
/// Clears all `ADXVIEW_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn adxview_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("adxview");
    cmd.env("HOME", "/tmp/adxview-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/adxview-cli-test-nonexistent")
        .env_remove("ADXVIEW_PROFILE")
        .env_remove("ADXVIEW_BACKEND")
        .env_remove("ADXVIEW_OUTPUT")
        .env_remove("ADXVIEW_INSECURE")
        .env_remove("ADXVIEW_TIMEOUT")
        .env_remove("ADXVIEW_USERNAME")
        .env_remove("ADXVIEW_PASSWORD")
        .env_remove("ADXVIEW_TOKEN");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = adxview_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    adxview_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("ad exchange")
            .and(predicate::str::contains("dashboard"))
            .and(predicate::str::contains("platform"))
            .and(predicate::str::contains("content"))
            .and(predicate::str::contains("video")),
    );
}

#[test]
fn test_version_flag() {
    adxview_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adxview"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    adxview_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    adxview_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Presets ─────────────────────────────────────────────────────────

#[test]
fn test_presets_lists_all_six() {
    adxview_cmd().arg("presets").assert().success().stdout(
        predicate::str::contains("today")
            .and(predicate::str::contains("yesterday"))
            .and(predicate::str::contains("last7Days"))
            .and(predicate::str::contains("last30Days"))
            .and(predicate::str::contains("thisWeek"))
            .and(predicate::str::contains("thisMonth")),
    );
}

#[test]
fn test_presets_json_output() {
    adxview_cmd()
        .args(["--output", "json", "presets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Last 7 days\""));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = adxview_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_platform_no_backend_configured() {
    adxview_cmd().arg("platform").assert().failure().stderr(
        predicate::str::contains("backend")
            .or(predicate::str::contains("config"))
            .or(predicate::str::contains("profile")),
    );
}

#[test]
fn test_inverted_date_range_rejected_before_fetch() {
    // Validation happens before any request, so this fails with a usage
    // error even though no backend is running at the given URL.
    let output = adxview_cmd()
        .args([
            "--backend",
            "http://127.0.0.1:9",
            "--username",
            "analyst",
            "platform",
            "--start",
            "2026-03-10",
            "--end",
            "2026-03-01",
        ])
        .env("ADXVIEW_PASSWORD", "pw")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("date range") || text.contains("before start"),
        "Expected inverted-range error:\n{text}"
    );
}

#[test]
fn test_unknown_preset_rejected() {
    let output = adxview_cmd()
        .args(["platform", "--range", "fortnight"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unknown preset") || text.contains("fortnight"),
        "Expected preset parse error:\n{text}"
    );
}

#[test]
fn test_range_conflicts_with_explicit_dates() {
    let output = adxview_cmd()
        .args([
            "platform",
            "--range",
            "today",
            "--start",
            "2026-03-01",
            "--end",
            "2026-03-10",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_start_requires_end() {
    let output = adxview_cmd()
        .args(["platform", "--start", "2026-03-01"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_platform_rejected() {
    let output = adxview_cmd()
        .args(["content", "--platform", "Radio"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unknown platform") || text.contains("Radio"),
        "Expected platform parse error:\n{text}"
    );
}

#[test]
fn test_platform_not_valid_for_content_is_usage_error() {
    // Display is a real platform, but content reports only segment by
    // CTV and Audio.
    let output = adxview_cmd()
        .args([
            "--backend",
            "http://127.0.0.1:9",
            "--username",
            "analyst",
            "content",
            "--platform",
            "Display",
        ])
        .env("ADXVIEW_PASSWORD", "pw")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("not available"),
        "Expected unsupported-platform error:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = adxview_cmd()
        .args(["--output", "invalid", "platform"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    adxview_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_list_empty() {
    adxview_cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles"));
}

#[test]
fn test_config_init_rejects_bad_url() {
    let output = adxview_cmd()
        .args(["config", "init", "--backend", "not a url"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_report_flags_exist() {
    adxview_cmd()
        .args(["platform", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--range")
                .and(predicate::str::contains("--summary"))
                .and(predicate::str::contains("--export"))
                .and(predicate::str::contains("--watch")),
        );
}

#[test]
fn test_segmented_reports_take_platform() {
    adxview_cmd()
        .args(["video", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--platform"));
}

#[test]
fn test_config_subcommands_exist() {
    adxview_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("path")),
        );
}
