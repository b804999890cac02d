//! Color pipe: one-slot color channel plus the broadcast cancellation token.
//!
//! Every provider and the orchestrator share this contract: providers push
//! colors into a [`ColorSink`], the orchestrator drains the [`ColorStream`],
//! and all of them watch the same [`CancelToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, select};

use crate::color::Color;

// ── Cancellation ──

struct CancelInner {
    cancelled: AtomicBool,
    /// Dropped on cancel; every clone of `done` then reports disconnection.
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

/// Broadcast "done" signal. Cloning shares the signal; once cancelled it
/// stays cancelled.
///
/// [`done`](CancelToken::done) can be used as an arm of `crossbeam_channel::select!`:
/// it becomes ready (disconnected) the moment the token is cancelled.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, done) = crossbeam_channel::bounded(0);
        CancelToken {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let mut trigger = match self.inner.trigger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        trigger.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that never yields a value and disconnects on cancel.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }

    /// Sleep for `timeout`, waking early on cancel.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_cancelled(),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ── Color channel ──

/// Producer half of the color pipe.
#[derive(Clone)]
pub struct ColorSink {
    tx: Sender<Color>,
}

/// Consumer half of the color pipe.
pub struct ColorStream {
    rx: Receiver<Color>,
}

/// Create a one-slot color pipe.
pub fn color_pipe() -> (ColorSink, ColorStream) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (ColorSink { tx }, ColorStream { rx })
}

impl ColorSink {
    /// Deliver a color, blocking while the slot is full.
    ///
    /// Returns `false` without delivering if `cancel` fired (before or while
    /// waiting) or the stream was dropped.
    pub fn send(&self, color: Color, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        select! {
            send(self.tx, color) -> res => res.is_ok(),
            recv(cancel.done()) -> _ => false,
        }
    }
}

impl ColorStream {
    pub fn receiver(&self) -> &Receiver<Color> {
        &self.rx
    }
}
