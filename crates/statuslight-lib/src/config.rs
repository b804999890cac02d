//! Application configuration: TOML-based, platform-aware paths.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::locate::LogFilePattern;
use crate::protocol::{MAX_BRIGHTNESS, Timing};
use crate::source::LogSourceOptions;
use crate::status::DEFAULT_STATUS_MARKER;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# statuslight configuration\n\n";

/// Teams log location below the per-user cache directory.
const TEAMS_LOG_SUBDIR: &str = "Packages/MSTeams_8wekyb3d8bbwe/LocalCache/Microsoft/MSTeams/Logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device driver name from the registry. Default: "serial".
    #[serde(default = "default_device")]
    pub device: String,

    /// Status source name from the registry. Default: "teams".
    #[serde(default = "default_source")]
    pub source: String,

    /// Indicator brightness (0-100) applied at start-up. Default: 10.
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Serial port name. Empty = auto-detect by USB VID/PID.
    #[serde(default)]
    pub serial_port: String,

    /// Maximum wait for a device reply, in milliseconds. Default: 500.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Directory holding the chat client's log files. Empty = platform default.
    #[serde(default)]
    pub log_dir: String,

    /// Substring a log file name must contain. Default: "MSTeams_".
    #[serde(default = "default_log_file_fragment")]
    pub log_file_fragment: String,

    /// Suffix a log file name must end with. Default: ".log".
    #[serde(default = "default_log_file_suffix")]
    pub log_file_suffix: String,

    /// Marker substring identifying presence-badge lines. Default: "Badge".
    #[serde(default = "default_status_marker")]
    pub status_marker: String,

    /// How often the active log file is polled for growth. Default: 1000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often the log directory is re-scanned for a newer file. Default: 2000.
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,

    /// Step interval of the demo source. Default: 2000.
    #[serde(default = "default_demo_interval_ms")]
    pub demo_interval_ms: u64,
}

fn default_device() -> String {
    "serial".into()
}
fn default_source() -> String {
    "teams".into()
}
fn default_brightness() -> u8 {
    10
}
fn default_response_timeout_ms() -> u64 {
    500
}
fn default_log_file_fragment() -> String {
    "MSTeams_".into()
}
fn default_log_file_suffix() -> String {
    ".log".into()
}
fn default_status_marker() -> String {
    DEFAULT_STATUS_MARKER.into()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_rescan_interval_ms() -> u64 {
    2000
}
fn default_demo_interval_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device: default_device(),
            source: default_source(),
            brightness: default_brightness(),
            serial_port: String::new(),
            response_timeout_ms: default_response_timeout_ms(),
            log_dir: String::new(),
            log_file_fragment: default_log_file_fragment(),
            log_file_suffix: default_log_file_suffix(),
            status_marker: default_status_marker(),
            poll_interval_ms: default_poll_interval_ms(),
            rescan_interval_ms: default_rescan_interval_ms(),
            demo_interval_ms: default_demo_interval_ms(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BrightnessOutOfRange(u8),
    /// An interval or timeout field is zero (`field` names it).
    ZeroDuration { field: &'static str },
    EmptyStatusMarker,
    EmptyLogFileSuffix,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BrightnessOutOfRange(b) => {
                write!(f, "brightness {b} is out of range (0-{MAX_BRIGHTNESS})")
            }
            ValidationError::ZeroDuration { field } => write!(f, "{field} must be greater than 0"),
            ValidationError::EmptyStatusMarker => write!(f, "status_marker cannot be empty"),
            ValidationError::EmptyLogFileSuffix => write!(f, "log_file_suffix cannot be empty"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("statuslight"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Write the config with a comment header to `path`, creating parent
    /// directories.
    ///
    /// The file is staged in a temporary file next to `path` and moved into
    /// place, so readers never see a half-written config. With
    /// `overwrite == false` an existing file is left untouched and the call
    /// fails with [`ErrorKind::AlreadyExists`](std::io::ErrorKind::AlreadyExists).
    pub fn save_to(&self, path: &Path, overwrite: bool) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let body = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(CONFIG_HEADER.as_bytes())?;
        staged.write_all(body.as_bytes())?;
        staged.as_file().sync_all()?;

        let persisted = if overwrite {
            staged.persist(path)
        } else {
            staged.persist_noclobber(path)
        };
        persisted.map(|_| ()).map_err(|e| e.error)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.brightness > MAX_BRIGHTNESS {
            errors.push(ValidationError::BrightnessOutOfRange(self.brightness));
        }
        for (field, value) in [
            ("response_timeout_ms", self.response_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("rescan_interval_ms", self.rescan_interval_ms),
            ("demo_interval_ms", self.demo_interval_ms),
        ] {
            if value == 0 {
                errors.push(ValidationError::ZeroDuration { field });
            }
        }
        if self.status_marker.trim().is_empty() {
            errors.push(ValidationError::EmptyStatusMarker);
        }
        if self.log_file_suffix.is_empty() {
            errors.push(ValidationError::EmptyLogFileSuffix);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Config::validate), folded into a single crate error.
    pub fn validated(&self) -> crate::error::Result<()> {
        self.validate().map_err(|errors| {
            let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            crate::StatuslightError::Config(joined.join("; "))
        })
    }

    /// Default Teams log directory below the per-user cache directory.
    pub fn default_log_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join(TEAMS_LOG_SUBDIR))
    }

    /// Effective log directory: `log_dir` if set, else the platform default.
    pub fn log_dir_path(&self) -> Option<PathBuf> {
        let dir = self.log_dir.trim();
        if dir.is_empty() {
            Self::default_log_dir()
        } else {
            Some(PathBuf::from(dir))
        }
    }

    /// Options for the log-file status source.
    pub fn log_source_options(&self) -> crate::error::Result<LogSourceOptions> {
        let dir = self.log_dir_path().ok_or_else(|| {
            crate::source::SourceError::LogDirUnavailable("no cache directory".into())
        })?;
        Ok(LogSourceOptions {
            dir,
            pattern: LogFilePattern {
                fragment: self.log_file_fragment.clone(),
                suffix: self.log_file_suffix.clone(),
            },
            marker: self.status_marker.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            rescan_interval: Duration::from_millis(self.rescan_interval_ms),
        })
    }

    /// Serial exchange timing.
    pub fn serial_timing(&self) -> Timing {
        Timing::with_response_timeout(Duration::from_millis(self.response_timeout_ms))
    }
}
