//! Orchestrator: wires one status source to one indicator device.
//!
//! The source runs on its own threads and pushes colors into a single-slot
//! pipe; [`Orchestrator::run`] drains it on the caller's thread and forwards
//! each color to the device. Device errors are logged and counted, never
//! fatal. On shutdown the device is blacked out.

use std::sync::Arc;

use crossbeam_channel::select;
use serde::Serialize;

use crate::color::Color;
use crate::device::Device;
use crate::error::Result;
use crate::pipe::{CancelToken, color_pipe};
use crate::source::StatusSource;

/// Counters reported when [`Orchestrator::run`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Colors the device accepted.
    pub forwarded: u64,
    /// Colors the device rejected or failed to receive.
    pub failed: u64,
}

pub struct Orchestrator {
    source: Box<dyn StatusSource>,
    device: Arc<dyn Device>,
    brightness: Option<u8>,
}

impl Orchestrator {
    pub fn new(source: Box<dyn StatusSource>, device: Arc<dyn Device>) -> Self {
        Self {
            source,
            device,
            brightness: None,
        }
    }

    /// Brightness to apply before the source starts.
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Run until `shutdown` fires or the source stops producing colors.
    ///
    /// Returns an error only if the source fails to start; the device is
    /// blacked out in that case too.
    pub fn run(mut self, shutdown: &CancelToken) -> Result<RunStats> {
        if let Some(b) = self.brightness
            && let Err(e) = self.device.set_brightness(b)
        {
            log::warn!("[device] could not set brightness {b}: {e}");
        }

        let (sink, stream) = color_pipe();
        if let Err(e) = self.source.start(sink, shutdown.clone()) {
            shutdown.cancel();
            self.source.join();
            self.blackout();
            return Err(e.into());
        }
        log::info!(
            "[source] {} started, driving {} at {}",
            self.source.name(),
            self.device.info().driver,
            self.device.info().path
        );

        let mut stats = RunStats::default();
        loop {
            select! {
                recv(stream.receiver()) -> msg => {
                    let Ok(color) = msg else {
                        log::info!("[source] {} finished", self.source.name());
                        break;
                    };
                    if shutdown.is_cancelled() {
                        break;
                    }
                    match self.device.set_color(color) {
                        Ok(()) => {
                            log::debug!("[device] color {color}");
                            stats.forwarded += 1;
                        }
                        Err(e) => {
                            log::warn!("[device] set color {color} failed: {e}");
                            stats.failed += 1;
                        }
                    }
                }
                recv(shutdown.done()) -> _ => break,
            }
        }

        shutdown.cancel();
        drop(stream);
        self.source.join();
        self.blackout();
        Ok(stats)
    }

    fn blackout(&self) {
        if let Err(e) = self.device.set_color(Color::BLACK) {
            log::warn!("[device] black-out failed: {e}");
        }
    }
}
