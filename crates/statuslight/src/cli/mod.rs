//! CLI subcommands: run the status mirror, drive the indicator, inspect config.

mod classify;
mod config_cmd;
mod device_cmd;
mod devices;
mod init;
mod list;
mod run;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use statuslight_lib::config::Config;
pub(super) use statuslight_lib::device::{Device, DeviceInfo};
pub(super) use statuslight_lib::error::Result;
pub(super) use statuslight_lib::pipe::CancelToken;
pub(super) use statuslight_lib::registry::Registry;
pub(super) use statuslight_lib::serial::PortInfo;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Pretty-print `value` as JSON on stdout.
pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{text}");
    Ok(())
}

/// Load config from `custom_path` if given, else the default location.
/// Parse warnings are logged, never fatal.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("[config] {w}");
    }
    config
}

/// Open the device named by `name`, or the configured one.
pub(super) fn open_device(config: &Config, name: Option<&str>) -> Result<Box<dyn Device>> {
    let name = name.unwrap_or(&config.device);
    let device = Registry::with_builtins().create_device(name, config)?;
    log::info!("[device] {} at {}", device.info().driver, device.info().path);
    Ok(device)
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub files: ConfigFilesJson,
}

#[derive(Serialize)]
pub(super) struct ConfigFilesJson {
    pub log_dir: Option<String>,
    pub log_dir_exists: bool,
}

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub ports: Vec<PortInfo>,
}

#[derive(Serialize)]
pub(super) struct VersionOutput {
    pub device: DeviceInfo,
    pub version: String,
}

#[derive(Serialize)]
pub(super) struct ClassifyOutput {
    /// Newest recognised status, or `"unknown"`.
    pub status: String,
    /// Indicator color for `status`, as `#RRGGBB`.
    pub color: Option<String>,
    /// Lines that classified to a known status.
    pub matched_lines: usize,
    pub total_lines: usize,
}

#[derive(Serialize)]
pub(super) struct ListOutput {
    pub devices: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Mirror presence status on the indicator until Ctrl+C
    Run {
        /// Device driver (overrides config)
        #[arg(long)]
        device: Option<String>,
        /// Status source (overrides config)
        #[arg(long)]
        source: Option<String>,
    },

    /// List serial ports and mark busylight matches
    Devices,

    /// Query the indicator's firmware version
    Version {
        /// Device driver (overrides config)
        #[arg(long)]
        device: Option<String>,
    },

    /// Set the indicator color (name or #RRGGBB)
    Color {
        color: String,
        /// Device driver (overrides config)
        #[arg(long)]
        device: Option<String>,
    },

    /// Set the indicator brightness (0-100)
    Brightness {
        level: u8,
        /// Device driver (overrides config)
        #[arg(long)]
        device: Option<String>,
    },

    /// Classify log lines from a file (or stdin) and print the newest status
    Classify {
        /// Log file to read; stdin if omitted
        file: Option<std::path::PathBuf>,
    },

    /// List registered devices and status sources
    List,

    /// Show current configuration and file paths
    Config,

    /// Write the current configuration to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(
    cmd: Command,
    json: bool,
    config_path: Option<&Path>,
    shutdown: &CancelToken,
) -> Result<()> {
    let config = load_config(config_path);
    match cmd {
        Command::Run { device, source } => run::cmd_run(
            &config,
            device.as_deref(),
            source.as_deref(),
            shutdown,
            json,
        ),
        Command::Devices => devices::cmd_devices(json),
        Command::Version { device } => device_cmd::cmd_version(&config, device.as_deref(), json),
        Command::Color { color, device } => {
            if json {
                warn_json_unsupported("color");
            }
            device_cmd::cmd_color(&config, device.as_deref(), &color)
        }
        Command::Brightness { level, device } => {
            if json {
                warn_json_unsupported("brightness");
            }
            device_cmd::cmd_brightness(&config, device.as_deref(), level)
        }
        Command::Classify { file } => classify::cmd_classify(&config, file.as_deref(), json),
        Command::List => list::cmd_list(json),
        Command::Config => config_cmd::cmd_config(&config, config_path, json),
        Command::Init { force } => {
            if json {
                warn_json_unsupported("init");
            }
            init::cmd_init(&config, config_path, force)
        }
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        let w = kv_width(&["A:"], &["status_marker:"]);
        // 14 + PADDING + 2 = 18
        assert_eq!(w, 18);
    }

    #[test]
    fn kv_width_empty_both() {
        assert_eq!(kv_width(&[], &[]), 0);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Top:"], &["Indent:"]);
        let top = format_kv("Top:", "V", w);
        let indent = format!("  {:<width$}{}", "Indent:", "V", width = w - 2);
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_exact_width() {
        // Key longer than width: no padding added
        assert_eq!(format_kv("ExactWidth:", "val", 10), "ExactWidth:val");
    }
}

#[cfg(test)]
mod json_output_tests {
    use super::*;

    #[test]
    fn config_output_complete() {
        let output = ConfigOutput {
            config_file: Some("/home/user/.config/statuslight/config.toml".into()),
            config_file_exists: true,
            settings: Config::default(),
            files: ConfigFilesJson {
                log_dir: Some("/tmp/logs".into()),
                log_dir_exists: false,
            },
        };
        let parsed = serde_json::to_value(&output).unwrap();
        assert_eq!(parsed["config_file_exists"], true);
        assert_eq!(parsed["settings"]["device"], "serial");
        assert_eq!(parsed["settings"]["status_marker"], "Badge");
        assert_eq!(parsed["files"]["log_dir"], "/tmp/logs");
    }

    #[test]
    fn config_output_missing_paths_are_null() {
        let output = ConfigOutput {
            config_file: None,
            config_file_exists: false,
            settings: Config::default(),
            files: ConfigFilesJson {
                log_dir: None,
                log_dir_exists: false,
            },
        };
        let parsed = serde_json::to_value(&output).unwrap();
        assert!(parsed["config_file"].is_null());
        assert!(parsed["files"]["log_dir"].is_null());
    }

    #[test]
    fn devices_output_marks_indicator() {
        let output = DevicesOutput {
            count: 1,
            ports: vec![PortInfo {
                name: "/dev/ttyACM0".into(),
                vid: Some(0x239A),
                pid: Some(0x80F0),
                product: Some("Busylight".into()),
                serial_number: None,
                is_indicator: true,
            }],
        };
        let parsed = serde_json::to_value(&output).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["ports"][0]["is_indicator"], true);
        assert!(parsed["ports"][0]["serial_number"].is_null());
    }

    #[test]
    fn classify_output_unknown_has_null_color() {
        let output = ClassifyOutput {
            status: "unknown".into(),
            color: None,
            matched_lines: 0,
            total_lines: 3,
        };
        let parsed = serde_json::to_value(&output).unwrap();
        assert_eq!(parsed["status"], "unknown");
        assert!(parsed["color"].is_null());
    }
}
