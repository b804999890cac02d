//! Integration tests: log directory → status source → orchestrator → MockDevice.
//!
//! These exercise the full path through the public API: a rotating log
//! directory is watched, badge lines are classified, and the table colors
//! reach the device in file order, followed by a black-out on shutdown.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use statuslight_lib::color::Color;
use statuslight_lib::config::Config;
use statuslight_lib::device::mock::{DeviceCall, MockDevice};
use statuslight_lib::orchestrator::Orchestrator;
use statuslight_lib::pipe::CancelToken;
use statuslight_lib::registry::Registry;
use statuslight_lib::source::LogStatusSource;

const GREEN: Color = Color::new(0, 255, 0);
const RED: Color = Color::new(255, 0, 0);
const AMBER: Color = Color::new(234, 163, 0);

fn config_for(dir: &Path) -> Config {
    Config {
        log_dir: dir.to_string_lossy().into_owned(),
        poll_interval_ms: 10,
        rescan_interval_ms: 10,
        ..Config::default()
    }
}

fn append(path: &Path, text: &str) {
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

/// Wait until `device` has received `n` colors (or give up after 2 s).
fn wait_for_colors(device: &MockDevice, n: usize) -> Vec<Color> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let colors = device.colors();
        if colors.len() >= n || Instant::now() > deadline {
            return colors;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ── Test: presence changes reach the device in order ──

#[test]
fn status_changes_drive_device_then_black_out() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("MSTeams_2024-05-01.log");
    append(&log, "10:00 Badge: status Available\n");

    let config = config_for(dir.path());
    let source = LogStatusSource::new(config.log_source_options().unwrap());
    let device = Arc::new(MockDevice::new());
    let shutdown = CancelToken::new();

    let orchestrator = Orchestrator::new(Box::new(source), device.clone())
        .with_brightness(config.brightness);
    let trigger = shutdown.clone();
    let runner = std::thread::spawn(move || orchestrator.run(&trigger));

    assert_eq!(wait_for_colors(&device, 1), vec![GREEN]);
    append(&log, "10:05 Badge: status Busy\n");
    assert_eq!(wait_for_colors(&device, 2), vec![GREEN, RED]);
    append(&log, "10:10 noise\n10:11 Badge: status Away\n");
    assert_eq!(wait_for_colors(&device, 3), vec![GREEN, RED, AMBER]);

    shutdown.cancel();
    let stats = runner.join().unwrap().unwrap();
    assert_eq!(stats.forwarded, 3);
    assert_eq!(stats.failed, 0);

    let calls = device.calls();
    assert_eq!(calls.first(), Some(&DeviceCall::SetBrightness(10)));
    assert_eq!(calls.last(), Some(&DeviceCall::SetColor(Color::BLACK)));
}

// ── Test: log rotation hands off to the newer file ──

#[test]
fn rotation_follows_newest_log() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("MSTeams_1.log");
    append(&first, "Badge status Busy\n");
    filetime::set_file_mtime(&first, filetime::FileTime::from_unix_time(1_000, 0)).unwrap();

    let config = config_for(dir.path());
    let source = Registry::with_builtins()
        .create_source("teams", &config)
        .unwrap();
    let device = Arc::new(MockDevice::new());
    let shutdown = CancelToken::new();
    let trigger = shutdown.clone();
    let orchestrator = Orchestrator::new(source, device.clone());
    let runner = std::thread::spawn(move || orchestrator.run(&trigger));

    assert_eq!(wait_for_colors(&device, 1), vec![RED]);
    append(&dir.path().join("MSTeams_2.log"), "Badge status Available\n");
    assert_eq!(wait_for_colors(&device, 2), vec![RED, GREEN]);

    shutdown.cancel();
    runner.join().unwrap().unwrap();
    assert_eq!(device.colors().last(), Some(&Color::BLACK));
}

// ── Test: unknown phrases never reach the device ──

#[test]
fn unknown_status_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    append(
        &dir.path().join("MSTeams_1.log"),
        "Badge status Presenting\nBadge status In a call\n",
    );

    let source = LogStatusSource::new(config_for(dir.path()).log_source_options().unwrap());
    let device = Arc::new(MockDevice::new());
    let shutdown = CancelToken::new();
    let trigger = shutdown.clone();
    let orchestrator = Orchestrator::new(Box::new(source), device.clone());
    let runner = std::thread::spawn(move || orchestrator.run(&trigger));

    std::thread::sleep(Duration::from_millis(100));
    shutdown.cancel();
    let stats = runner.join().unwrap().unwrap();

    assert_eq!(stats.forwarded, 0);
    assert_eq!(device.colors(), vec![Color::BLACK]);
}

// ── Test: a missing log directory fails start but still blacks out ──

#[test]
fn missing_log_dir_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("absent"));
    let source = LogStatusSource::new(config.log_source_options().unwrap());
    let device = Arc::new(MockDevice::new());

    let result = Orchestrator::new(Box::new(source), device.clone()).run(&CancelToken::new());
    assert!(result.is_err());
    assert_eq!(device.colors(), vec![Color::BLACK]);
}
