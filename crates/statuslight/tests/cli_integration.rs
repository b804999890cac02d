//! Integration tests for the `statuslight` binary.
//!
//! These tests exercise the CLI binary via `assert_cmd`. Device commands use
//! the `console` driver so no busylight is needed.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("statuslight")
}

/// Write a config file selecting the console device.
fn console_config(dir: &std::path::Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, format!("device = \"console\"\n{extra}")).unwrap();
    path
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("statuslight"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_config_json_produces_valid_json() {
    let output = cli()
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(json["settings"].is_object());
    assert!(json["config_file"].is_string() || json["config_file"].is_null());
}

#[test]
fn cli_config_reads_custom_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = console_config(dir.path(), "status_marker = \"Presence\"\n");
    let output = cli()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["config_file_exists"], true);
    assert_eq!(json["settings"]["device"], "console");
    assert_eq!(json["settings"]["status_marker"], "Presence");
}

#[test]
fn cli_malformed_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "device = [").unwrap();
    cli()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("serial"));
}

// ── --verbose flag ──

#[test]
fn cli_verbose_flag_accepted() {
    cli().args(["-v", "config"]).assert().success();
}

#[test]
fn cli_double_verbose_accepted() {
    cli().args(["-vv", "list"]).assert().success();
}

// ── Subcommands ──

#[test]
fn cli_list_shows_builtins() {
    cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("console, serial"))
        .stdout(predicate::str::contains("demo, teams"));
}

#[test]
fn cli_list_json() {
    let output = cli()
        .args(["--json", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["sources"][1], "teams");
}

#[test]
fn cli_classify_file_reports_last_status() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("MSTeams_1.log");
    std::fs::write(
        &log,
        "x BadgeService: status Available\ny BadgeService: status Do not disturb\n",
    )
    .unwrap();

    cli()
        .arg("classify")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("do not disturb"))
        .stdout(predicate::str::contains("#FF0000"));
}

#[test]
fn cli_classify_reads_stdin() {
    let output = cli()
        .args(["--json", "classify"])
        .write_stdin("Badge status Away\r\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["status"], "away");
    assert_eq!(json["matched_lines"], 1);
}

#[test]
fn cli_color_on_console_device() {
    cli()
        .args(["color", "red", "--device", "console"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#FF0000"));
}

#[test]
fn cli_color_rejects_bad_color() {
    cli()
        .args(["color", "mauve-ish", "--device", "console"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn cli_brightness_out_of_range_fails() {
    cli()
        .args(["brightness", "150", "--device", "console"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn cli_version_on_console_device() {
    cli()
        .args(["version", "--device", "console"])
        .assert()
        .success()
        .stdout(predicate::str::contains("console"));
}

#[test]
fn cli_unknown_device_fails() {
    cli()
        .args(["version", "--device", "blink1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown device"));
}

#[test]
fn cli_run_with_missing_log_dir_fails_and_blacks_out() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-logs");
    let path = console_config(
        dir.path(),
        &format!("log_dir = {:?}\n", missing.to_string_lossy()),
    );
    cli()
        .arg("--config")
        .arg(&path)
        .args(["run", "--source", "teams"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("color: #000000"))
        .stderr(predicate::str::contains("Log directory unavailable"));
}

#[test]
fn cli_run_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = console_config(dir.path(), "poll_interval_ms = 0\n");
    cli()
        .arg("--config")
        .arg(&path)
        .args(["run", "--source", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll_interval_ms"));
}

#[test]
fn cli_init_writes_config_then_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    cli()
        .arg("--config")
        .arg(&path)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# statuslight configuration"));
    assert!(text.contains("status_marker = \"Badge\""));

    cli()
        .arg("--config")
        .arg(&path)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn cli_init_force_rewrites_with_loaded_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = console_config(dir.path(), "status_marker = \"Presence\"\n");
    cli()
        .arg("--config")
        .arg(&path)
        .args(["init", "--force"])
        .assert()
        .success();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# statuslight configuration"));
    assert!(text.contains("device = \"console\""));
    assert!(text.contains("status_marker = \"Presence\""));
}
