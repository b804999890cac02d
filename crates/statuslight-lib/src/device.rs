//! Indicator devices: trait, console stand-in, and an in-memory mock.
//!
//! The serial busylight driver lives in [`crate::serial`].

use std::fmt;

use serde::Serialize;

use crate::color::Color;
use crate::protocol::MAX_BRIGHTNESS;

// ── Error type ──

/// Device errors.
///
/// String payloads follow the convention **"context: details"** where *context*
/// identifies the step (e.g. `"open /dev/ttyACM0"`) and *details* describes
/// what went wrong.
#[derive(Debug)]
pub enum DeviceError {
    /// No serial port with the indicator's VID/PID.
    NotFound,
    OpenFailed(String),
    /// The liveness probe did not answer `OK`.
    ProbeFailed(String),
    /// Brightness above 100; rejected before any wire traffic.
    BrightnessOutOfRange(u8),
    /// The device answered without `OK` (or not at all). Carries the raw reply.
    Rejected(Vec<u8>),
    /// Read/write on the connection failed.
    Io(std::io::Error),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotFound => write!(f, "Indicator device not found"),
            DeviceError::OpenFailed(e) => write!(f, "Failed to open device: {e}"),
            DeviceError::ProbeFailed(e) => write!(f, "Device did not respond: {e}"),
            DeviceError::BrightnessOutOfRange(b) => {
                write!(f, "Brightness {b} out of range (0-{MAX_BRIGHTNESS})")
            }
            DeviceError::Rejected(raw) if raw.is_empty() => {
                write!(f, "No response from device")
            }
            DeviceError::Rejected(raw) => write!(
                f,
                "Device rejected command: {}",
                String::from_utf8_lossy(raw).trim_end_matches(['\0', '\r', '\n'])
            ),
            DeviceError::Io(e) => write!(f, "Device I/O error: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(e: std::io::Error) -> Self {
        DeviceError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Device info ──

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    /// Registry name of the driver, e.g. `"serial"`.
    pub driver: String,
    /// Port name or pseudo-path, e.g. `"/dev/ttyACM0"` or `"console://"`.
    pub path: String,
}

// ── Trait ──

/// A status indicator.
///
/// Implementations serialize their own command exchanges; callers may share
/// a device across threads.
pub trait Device: Send + Sync {
    fn info(&self) -> &DeviceInfo;
    /// Set brightness in percent (0-100).
    fn set_brightness(&self, brightness: u8) -> Result<()>;
    fn set_color(&self, color: Color) -> Result<()>;
    fn get_version(&self) -> Result<String>;
}

// ── Console stand-in ──

/// Prints every command to stdout instead of driving hardware. Useful for
/// dry runs of a status source.
pub struct ConsoleDevice {
    info: DeviceInfo,
}

impl ConsoleDevice {
    pub fn new() -> Self {
        ConsoleDevice {
            info: DeviceInfo {
                driver: "console".into(),
                path: "console://".into(),
            },
        }
    }
}

impl Default for ConsoleDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for ConsoleDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn set_brightness(&self, brightness: u8) -> Result<()> {
        if brightness > MAX_BRIGHTNESS {
            return Err(DeviceError::BrightnessOutOfRange(brightness));
        }
        println!("brightness: {brightness}");
        Ok(())
    }

    fn set_color(&self, color: Color) -> Result<()> {
        println!("color: {color}");
        Ok(())
    }

    fn get_version(&self) -> Result<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }
}

// ── Mock device (for tests) ──

pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A command received by [`MockDevice`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DeviceCall {
        SetBrightness(u8),
        SetColor(Color),
        GetVersion,
    }

    /// In-memory device that records every call. `fail_set_color` makes
    /// `set_color` fail (after recording) to simulate a bad exchange.
    pub struct MockDevice {
        info: DeviceInfo,
        calls: Mutex<Vec<DeviceCall>>,
        pub fail_set_color: AtomicBool,
    }

    impl Default for MockDevice {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockDevice {
        pub fn new() -> Self {
            MockDevice {
                info: DeviceInfo {
                    driver: "mock".into(),
                    path: "mock://busylight".into(),
                },
                calls: Mutex::new(Vec::new()),
                fail_set_color: AtomicBool::new(false),
            }
        }

        /// Snapshot of all calls so far.
        pub fn calls(&self) -> Vec<DeviceCall> {
            self.lock().clone()
        }

        /// Colors passed to `set_color`, in order.
        pub fn colors(&self) -> Vec<Color> {
            self.lock()
                .iter()
                .filter_map(|c| match c {
                    DeviceCall::SetColor(color) => Some(*color),
                    _ => None,
                })
                .collect()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DeviceCall>> {
            match self.calls.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }
    }

    impl Device for MockDevice {
        fn info(&self) -> &DeviceInfo {
            &self.info
        }

        fn set_brightness(&self, brightness: u8) -> Result<()> {
            if brightness > MAX_BRIGHTNESS {
                return Err(DeviceError::BrightnessOutOfRange(brightness));
            }
            self.lock().push(DeviceCall::SetBrightness(brightness));
            Ok(())
        }

        fn set_color(&self, color: Color) -> Result<()> {
            self.lock().push(DeviceCall::SetColor(color));
            if self.fail_set_color.load(Ordering::SeqCst) {
                return Err(DeviceError::Rejected(b"ERR".to_vec()));
            }
            Ok(())
        }

        fn get_version(&self) -> Result<String> {
            self.lock().push(DeviceCall::GetVersion);
            Ok("mock-1.0".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{DeviceCall, MockDevice};
    use super::*;

    #[test]
    fn display_rejected_with_payload() {
        let e = DeviceError::Rejected(b"ERR bad arg\r\n\0\0".to_vec());
        assert_eq!(e.to_string(), "Device rejected command: ERR bad arg");
    }

    #[test]
    fn display_rejected_empty_is_timeout() {
        assert_eq!(
            DeviceError::Rejected(Vec::new()).to_string(),
            "No response from device"
        );
    }

    #[test]
    fn display_brightness_out_of_range() {
        assert_eq!(
            DeviceError::BrightnessOutOfRange(150).to_string(),
            "Brightness 150 out of range (0-100)"
        );
    }

    #[test]
    fn io_error_is_chained() {
        let e: DeviceError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("gone"));
    }

    #[test]
    fn console_rejects_brightness_over_100() {
        let dev = ConsoleDevice::new();
        assert!(matches!(
            dev.set_brightness(101),
            Err(DeviceError::BrightnessOutOfRange(101))
        ));
        assert!(dev.set_brightness(100).is_ok());
    }

    #[test]
    fn console_info() {
        let dev = ConsoleDevice::new();
        assert_eq!(dev.info().driver, "console");
        assert!(!dev.get_version().unwrap().is_empty());
    }

    #[test]
    fn mock_records_calls_in_order() {
        let dev = MockDevice::new();
        dev.set_brightness(10).unwrap();
        dev.set_color(Color::new(1, 2, 3)).unwrap();
        dev.get_version().unwrap();
        assert_eq!(
            dev.calls(),
            vec![
                DeviceCall::SetBrightness(10),
                DeviceCall::SetColor(Color::new(1, 2, 3)),
                DeviceCall::GetVersion,
            ]
        );
        assert_eq!(dev.colors(), vec![Color::new(1, 2, 3)]);
    }

    #[test]
    fn mock_can_fail_set_color() {
        let dev = MockDevice::new();
        dev.fail_set_color
            .store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(dev.set_color(Color::BLACK).is_err());
        assert_eq!(dev.colors(), vec![Color::BLACK]);
    }
}
