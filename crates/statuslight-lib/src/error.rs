//! Unified error type for the statuslight-lib crate.
//!
//! [`StatuslightError`] wraps module-specific errors (`DeviceError`, `SourceError`)
//! and domain-specific error kinds (`Config`, `Color`, `Registry`).
//! `From` impls allow `?` to propagate across module boundaries.

use std::fmt;

use crate::device::DeviceError;
use crate::source::SourceError;

/// Unified error type for statuslight-lib operations.
#[derive(Debug)]
pub enum StatuslightError {
    /// Indicator device error (discovery, probe, command exchange).
    Device(DeviceError),
    /// Status source error (log directory, log file I/O).
    Source(SourceError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
    /// Unknown device or source name.
    Registry(String),
}

impl fmt::Display for StatuslightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatuslightError::Device(e) => write!(f, "{e}"),
            StatuslightError::Source(e) => write!(f, "{e}"),
            StatuslightError::Io(e) => write!(f, "I/O error: {e}"),
            StatuslightError::Config(e) => write!(f, "Config error: {e}"),
            StatuslightError::Color(e) => write!(f, "Color error: {e}"),
            StatuslightError::Registry(e) => write!(f, "Registry error: {e}"),
        }
    }
}

impl std::error::Error for StatuslightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatuslightError::Device(e) => Some(e),
            StatuslightError::Source(e) => Some(e),
            StatuslightError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for StatuslightError {
    fn from(e: DeviceError) -> Self {
        StatuslightError::Device(e)
    }
}

impl From<SourceError> for StatuslightError {
    fn from(e: SourceError) -> Self {
        StatuslightError::Source(e)
    }
}

impl From<std::io::Error> for StatuslightError {
    fn from(e: std::io::Error) -> Self {
        StatuslightError::Io(e)
    }
}

/// Crate-level Result alias using [`StatuslightError`].
pub type Result<T> = std::result::Result<T, StatuslightError>;
