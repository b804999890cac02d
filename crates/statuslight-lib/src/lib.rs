//! statuslight: mirror a chat client's presence status on a USB busylight.

pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod locate;
pub mod orchestrator;
pub mod pipe;
pub mod protocol;
pub mod registry;
pub mod serial;
pub mod source;
pub mod status;
pub mod tail;

pub use error::StatuslightError;
