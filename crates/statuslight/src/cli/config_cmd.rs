//! `config` subcommand: show current configuration and file paths.

use std::path::Path;

use super::{Config, ConfigFilesJson, ConfigOutput, Result, kv, kv_indent, kv_width, print_json};

pub(super) fn cmd_config(config: &Config, custom_path: Option<&Path>, json: bool) -> Result<()> {
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let log_dir = config.log_dir_path();
    let log_dir_exists = log_dir.as_ref().is_some_and(|p| p.is_dir());

    if json {
        return print_json(&ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config.clone(),
            files: ConfigFilesJson {
                log_dir: log_dir.as_ref().map(|p| p.display().to_string()),
                log_dir_exists,
            },
        });
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "device:",
            "source:",
            "brightness:",
            "serial_port:",
            "response_timeout_ms:",
            "log_file_fragment:",
            "log_file_suffix:",
            "status_marker:",
            "poll_interval_ms:",
            "rescan_interval_ms:",
            "demo_interval_ms:",
            "Log directory:",
        ],
    );

    match &config_path {
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("device:", &config.device, w);
    kv_indent("source:", &config.source, w);
    kv_indent("brightness:", config.brightness, w);
    let port = if config.serial_port.is_empty() {
        "(auto-detect)"
    } else {
        config.serial_port.as_str()
    };
    kv_indent("serial_port:", port, w);
    kv_indent("response_timeout_ms:", config.response_timeout_ms, w);
    kv_indent("log_file_fragment:", &config.log_file_fragment, w);
    kv_indent("log_file_suffix:", &config.log_file_suffix, w);
    kv_indent("status_marker:", &config.status_marker, w);
    kv_indent("poll_interval_ms:", config.poll_interval_ms, w);
    kv_indent("rescan_interval_ms:", config.rescan_interval_ms, w);
    kv_indent("demo_interval_ms:", config.demo_interval_ms, w);
    if let Err(errors) = config.validate() {
        for e in &errors {
            println!("  (invalid) {e}");
        }
    }
    println!();

    println!("Files:");
    match &log_dir {
        Some(p) => {
            let status = if log_dir_exists { "present" } else { "not found" };
            kv_indent("Log directory:", format_args!("{} ({status})", p.display()), w);
        }
        None => kv_indent("Log directory:", "(no cache directory)", w),
    }
    Ok(())
}
