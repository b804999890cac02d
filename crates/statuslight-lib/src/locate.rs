//! Log locator: finds the active log file and hands tailing over when it changes.
//!
//! The chat client rotates its log by starting a new file; the newest matching
//! file by modification time is the active one. The watcher re-scans on a fixed
//! tick and, when the selection changes, retires the current tailer (cancel +
//! join) before starting the next one, so two tailers never feed the status
//! stream at once.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use crossbeam_channel::Sender;

use crate::pipe::CancelToken;
use crate::source::SourceError;
use crate::status::{Status, StatusClassifier};
use crate::tail::{LogTailer, spawn_tailer};

/// Which files in the log directory are candidate logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilePattern {
    /// Substring the file name must contain, e.g. `"MSTeams_"`.
    pub fragment: String,
    /// Required file name suffix, e.g. `".log"`.
    pub suffix: String,
}

impl LogFilePattern {
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.contains(self.fragment.as_str()) && file_name.ends_with(self.suffix.as_str())
    }
}

/// Return the most recently modified matching file in `dir`.
///
/// `Ok(None)` if the directory holds no matching file; `Err` if it cannot be read.
/// Entries whose metadata cannot be read are skipped.
pub fn find_latest_log(dir: &Path, pattern: &LogFilePattern) -> Result<Option<PathBuf>, SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Read {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let name = entry.file_name();
        if !pattern.matches(&name.to_string_lossy()) {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Tuning for the watcher loop.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub dir: PathBuf,
    pub pattern: LogFilePattern,
    pub poll_interval: Duration,
    pub rescan_interval: Duration,
}

/// The tailer currently owned by the watcher.
struct ActiveTailer {
    path: PathBuf,
    scope: CancelToken,
    handle: JoinHandle<()>,
}

impl ActiveTailer {
    /// Cancel the tailer's scope and wait for its thread to exit.
    fn retire(self) {
        self.scope.cancel();
        if self.handle.join().is_err() {
            log::warn!("[source] tailer for {} panicked", self.path.display());
        }
    }
}

/// Start the watcher thread.
///
/// Scans once immediately, then every `rescan_interval`. Each new active
/// file gets a fresh [`LogTailer`] starting at offset 0 with its own
/// cancellation scope. Exits (retiring its tailer) when `cancel` fires.
pub fn spawn_watcher(
    opts: WatchOptions,
    classifier: StatusClassifier,
    statuses: Sender<Status>,
    cancel: CancelToken,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("log-watcher".into())
        .spawn(move || {
            let mut active: Option<ActiveTailer> = None;
            loop {
                if cancel.is_cancelled() {
                    break;
                }
                match find_latest_log(&opts.dir, &opts.pattern) {
                    Ok(Some(path)) if active.as_ref().is_none_or(|a| a.path != path) => {
                        if let Some(old) = active.take() {
                            log::info!("[source] log rotated: {}", path.display());
                            old.retire();
                        }
                        let scope = CancelToken::new();
                        let tailer = LogTailer::new(&path, classifier.clone());
                        match spawn_tailer(tailer, opts.poll_interval, statuses.clone(), scope.clone()) {
                            Ok(handle) => active = Some(ActiveTailer { path, scope, handle }),
                            Err(e) => log::warn!("[source] could not start tailer: {e}"),
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        if active.is_none() {
                            log::debug!(
                                "[source] no log file matching *{}*{} in {}",
                                opts.pattern.fragment,
                                opts.pattern.suffix,
                                opts.dir.display()
                            );
                        }
                    }
                    Err(e) => log::warn!("[source] {e}"),
                }
                if cancel.wait_timeout(opts.rescan_interval) {
                    break;
                }
            }
            if let Some(old) = active.take() {
                old.retire();
            }
        })
}
