//! Name → constructor tables for devices and status sources.
//!
//! The CLI looks drivers up by the names in the config file (`device = "serial"`,
//! `source = "teams"`). Registration is explicit; nothing is global.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::StatuslightError;
use crate::config::Config;
use crate::device::{ConsoleDevice, Device};
use crate::error::Result;
use crate::serial;
use crate::source::{DemoSource, LogStatusSource, StatusSource};

pub type DeviceCtor = fn(&Config) -> Result<Box<dyn Device>>;
pub type SourceCtor = fn(&Config) -> Result<Box<dyn StatusSource>>;

#[derive(Default)]
pub struct Registry {
    devices: BTreeMap<String, DeviceCtor>,
    sources: BTreeMap<String, SourceCtor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in drivers: devices `serial`, `console`;
    /// sources `teams`, `demo`.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register_device("serial", open_serial);
        r.register_device("console", open_console);
        r.register_source("teams", open_teams);
        r.register_source("demo", open_demo);
        r
    }

    /// Register (or replace) a device constructor.
    pub fn register_device(&mut self, name: &str, ctor: DeviceCtor) {
        self.devices.insert(name.to_string(), ctor);
    }

    /// Register (or replace) a source constructor.
    pub fn register_source(&mut self, name: &str, ctor: SourceCtor) {
        self.sources.insert(name.to_string(), ctor);
    }

    pub fn create_device(&self, name: &str, config: &Config) -> Result<Box<dyn Device>> {
        let ctor = self.devices.get(name).ok_or_else(|| {
            StatuslightError::Registry(format!(
                "unknown device '{name}' (available: {})",
                self.device_names().join(", ")
            ))
        })?;
        ctor(config)
    }

    pub fn create_source(&self, name: &str, config: &Config) -> Result<Box<dyn StatusSource>> {
        let ctor = self.sources.get(name).ok_or_else(|| {
            StatuslightError::Registry(format!(
                "unknown source '{name}' (available: {})",
                self.source_names().join(", ")
            ))
        })?;
        ctor(config)
    }

    /// Registered device names, sorted.
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Registered source names, sorted.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }
}

fn open_serial(config: &Config) -> Result<Box<dyn Device>> {
    let device = serial::open(&config.serial_port, config.serial_timing())?;
    Ok(Box::new(device))
}

fn open_console(_config: &Config) -> Result<Box<dyn Device>> {
    Ok(Box::new(ConsoleDevice::new()))
}

fn open_teams(config: &Config) -> Result<Box<dyn StatusSource>> {
    Ok(Box::new(LogStatusSource::new(config.log_source_options()?)))
}

fn open_demo(config: &Config) -> Result<Box<dyn StatusSource>> {
    Ok(Box::new(DemoSource::new(Duration::from_millis(
        config.demo_interval_ms,
    ))))
}
