//! Log tailer: follows one growing log file and reports the newest status.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, select};

use crate::pipe::CancelToken;
use crate::source::SourceError;
use crate::status::{Status, StatusClassifier};

/// Longest unterminated line kept between polls.
const MAX_PARTIAL_LINE: usize = 64 * 1024;

/// Read position within one log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailState {
    pub path: PathBuf,
    /// Bytes already consumed.
    pub offset: u64,
    /// Consumed bytes after the last `\n`, completed by a later write.
    pub partial: Vec<u8>,
}

/// Tracks growth of a single file.
///
/// Each [`poll`](LogTailer::poll) reads only the bytes appended since the
/// previous successful poll. When the active log file changes, the tailer is
/// dropped and a new one created; state is never re-pointed at another file.
#[derive(Debug)]
pub struct LogTailer {
    state: TailState,
    classifier: StatusClassifier,
}

impl LogTailer {
    /// Tail `path` from the beginning.
    pub fn new(path: impl Into<PathBuf>, classifier: StatusClassifier) -> Self {
        Self::starting_at(path, 0, classifier)
    }

    /// Tail `path` from a known offset.
    pub fn starting_at(path: impl Into<PathBuf>, offset: u64, classifier: StatusClassifier) -> Self {
        LogTailer {
            state: TailState {
                path: path.into(),
                offset,
                partial: Vec::new(),
            },
            classifier,
        }
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn offset(&self) -> u64 {
        self.state.offset
    }

    /// Read newly appended bytes and return the last known status among the
    /// lines they complete.
    ///
    /// - size ≤ offset: nothing to do (`Ok(None)`), offset unchanged.
    /// - otherwise read exactly the new bytes; offset advances to the new
    ///   size even if no line classified. Text after the last `\n` is held
    ///   back and prefixed to the next read.
    /// - stat/open/read errors leave the offset untouched so the same range
    ///   is retried on the next poll.
    pub fn poll(&mut self) -> Result<Option<Status>, SourceError> {
        let path = &self.state.path;
        let err = |source| SourceError::Read {
            path: path.clone(),
            source,
        };

        let size = std::fs::metadata(path).map_err(err)?.len();
        if size <= self.state.offset {
            return Ok(None);
        }

        let mut file = File::open(path).map_err(err)?;
        file.seek(SeekFrom::Start(self.state.offset)).map_err(err)?;
        let mut buf = vec![0u8; (size - self.state.offset) as usize];
        file.read_exact(&mut buf).map_err(err)?;

        log::trace!(
            "[source] {}: read {} bytes at {}",
            path.display(),
            buf.len(),
            self.state.offset
        );
        self.state.offset = size;

        let mut pending = std::mem::take(&mut self.state.partial);
        pending.extend_from_slice(&buf);
        let complete = match pending.iter().rposition(|&b| b == b'\n') {
            Some(end) => {
                self.state.partial = pending.split_off(end + 1);
                pending
            }
            None => {
                self.state.partial = pending;
                Vec::new()
            }
        };
        if self.state.partial.len() > MAX_PARTIAL_LINE {
            log::debug!(
                "[source] {}: dropping {} bytes without a line break",
                self.state.path.display(),
                self.state.partial.len()
            );
            self.state.partial.clear();
        }

        let text = String::from_utf8_lossy(&complete);
        let status = self.classifier.last_status(text.split('\n'));

        Ok(status.is_known().then_some(status))
    }
}

/// Poll `tailer` every `interval` on a background thread until `scope` is
/// cancelled or the receiver of `statuses` goes away.
///
/// Poll errors are logged and retried on the next tick.
pub fn spawn_tailer(
    mut tailer: LogTailer,
    interval: Duration,
    statuses: Sender<Status>,
    scope: CancelToken,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("log-tailer".into())
        .spawn(move || {
            log::info!("[source] reading {}", tailer.path().display());
            while !scope.is_cancelled() {
                match tailer.poll() {
                    Ok(Some(status)) => {
                        log::debug!("[source] status: {status}");
                        select! {
                            send(statuses, status) -> res => {
                                if res.is_err() {
                                    break;
                                }
                            }
                            recv(scope.done()) -> _ => break,
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("[source] {e}"),
                }
                if scope.wait_timeout(interval) {
                    break;
                }
            }
            log::debug!("[source] stopped reading {}", tailer.path().display());
        })
}
