//! Status sources: providers that push indicator colors onto a [`ColorSink`].
//!
//! [`LogStatusSource`] follows the chat client's presence log;
//! [`DemoSource`] cycles the status table for dry runs.

use std::fmt;
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::select;

use crate::locate::{LogFilePattern, WatchOptions, spawn_watcher};
use crate::pipe::{CancelToken, ColorSink};
use crate::status::{Status, StatusClassifier, status_color};

// ── Error type ──

#[derive(Debug)]
pub enum SourceError {
    /// The log directory could not be determined or read.
    LogDirUnavailable(String),
    /// Stat/open/read of a log file or directory failed.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A background thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::LogDirUnavailable(e) => write!(f, "Log directory unavailable: {e}"),
            SourceError::Read { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            SourceError::Spawn(e) => write!(f, "Failed to start source thread: {e}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Read { source, .. } => Some(source),
            SourceError::Spawn(e) => Some(e),
            SourceError::LogDirUnavailable(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;

// ── Trait ──

/// A provider of indicator colors.
pub trait StatusSource: Send {
    /// Registry name, e.g. `"teams"`.
    fn name(&self) -> &str;

    /// Start background tracking and return once set up.
    ///
    /// Colors are delivered through `sink` until `cancel` fires; after that
    /// no further colors are sent and all background threads exit.
    fn start(&mut self, sink: ColorSink, cancel: CancelToken) -> Result<()>;

    /// Wait for background threads started by [`start`](StatusSource::start)
    /// to exit. Call after cancelling.
    fn join(&mut self) {}
}

/// Join every handle, logging threads that panicked.
fn join_all(handles: &mut Vec<JoinHandle<()>>) {
    for handle in handles.drain(..) {
        if handle.join().is_err() {
            log::warn!("[source] background thread panicked");
        }
    }
}

// ── Log-file source ──

/// Settings for [`LogStatusSource`].
#[derive(Debug, Clone)]
pub struct LogSourceOptions {
    pub dir: PathBuf,
    pub pattern: LogFilePattern,
    /// Marker substring of presence-badge lines.
    pub marker: String,
    pub poll_interval: Duration,
    pub rescan_interval: Duration,
}

/// Presence status from the chat client's rotating log files.
pub struct LogStatusSource {
    opts: LogSourceOptions,
    handles: Vec<JoinHandle<()>>,
}

impl LogStatusSource {
    pub fn new(opts: LogSourceOptions) -> Self {
        LogStatusSource {
            opts,
            handles: Vec::new(),
        }
    }
}

impl StatusSource for LogStatusSource {
    fn name(&self) -> &str {
        "teams"
    }

    fn start(&mut self, sink: ColorSink, cancel: CancelToken) -> Result<()> {
        let dir = &self.opts.dir;
        if !dir.is_dir() {
            return Err(SourceError::LogDirUnavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        std::fs::read_dir(dir).map_err(|e| {
            SourceError::LogDirUnavailable(format!("{}: {e}", dir.display()))
        })?;

        let (status_tx, status_rx) = crossbeam_channel::bounded::<Status>(1);
        let watcher = spawn_watcher(
            WatchOptions {
                dir: dir.clone(),
                pattern: self.opts.pattern.clone(),
                poll_interval: self.opts.poll_interval,
                rescan_interval: self.opts.rescan_interval,
            },
            StatusClassifier::new(&self.opts.marker),
            status_tx,
            cancel.clone(),
        )
        .map_err(SourceError::Spawn)?;
        self.handles.push(watcher);

        let forward_cancel = cancel.clone();
        let forwarder = std::thread::Builder::new()
            .name("status-forwarder".into())
            .spawn(move || {
                loop {
                    select! {
                        recv(status_rx) -> msg => {
                            let Ok(status) = msg else { break };
                            let Some(color) = status_color(status) else { continue };
                            log::info!("[source] {status} -> {color}");
                            if !sink.send(color, &forward_cancel) {
                                break;
                            }
                        }
                        recv(forward_cancel.done()) -> _ => break,
                    }
                }
            });
        match forwarder {
            Ok(handle) => self.handles.push(handle),
            Err(e) => {
                // Do not leave the watcher running without a consumer.
                cancel.cancel();
                join_all(&mut self.handles);
                return Err(SourceError::Spawn(e));
            }
        }
        Ok(())
    }

    fn join(&mut self) {
        join_all(&mut self.handles);
    }
}

// ── Demo source ──

/// Cycles through the status table at a fixed interval.
pub struct DemoSource {
    interval: Duration,
    handles: Vec<JoinHandle<()>>,
}

/// Statuses shown by [`DemoSource`], in order.
pub const DEMO_SEQUENCE: [Status; 5] = [
    Status::Available,
    Status::Busy,
    Status::DoNotDisturb,
    Status::Away,
    Status::Offline,
];

impl DemoSource {
    pub fn new(interval: Duration) -> Self {
        DemoSource {
            interval,
            handles: Vec::new(),
        }
    }
}

impl StatusSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn start(&mut self, sink: ColorSink, cancel: CancelToken) -> Result<()> {
        let interval = self.interval;
        let handle = std::thread::Builder::new()
            .name("demo-source".into())
            .spawn(move || {
                for status in DEMO_SEQUENCE.iter().cycle() {
                    let Some(color) = status_color(*status) else {
                        continue;
                    };
                    if !sink.send(color, &cancel) || cancel.wait_timeout(interval) {
                        break;
                    }
                }
            })
            .map_err(SourceError::Spawn)?;
        self.handles.push(handle);
        Ok(())
    }

    fn join(&mut self) {
        join_all(&mut self.handles);
    }
}
