// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fire-and-forget progress notifications and cooperative cancellation.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};

use crate::error::PitError;

/// Receiver of short free-text status messages from a running solve.
///
/// Implementations must return promptly; engines never wait on a sink and
/// their results never depend on a message being observed.
pub trait ProgressSink: Send + Sync {
    /// Called at phase boundaries ("init normalized tree", "solve", ...).
    fn on_status(&self, status: &str);
}

/// Sink that discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_status(&self, _status: &str) {}
}

/// Sink that forwards messages to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_status(&self, status: &str) {
        tracing::debug!(status, "progress");
    }
}

/// Sink backed by a bounded channel.
///
/// Uses `try_send`, so a full buffer or a dropped receiver loses the message
/// instead of stalling the engine.
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    tx: SyncSender<String>,
}

impl ChannelProgressSink {
    /// Wraps the sending half of a `std::sync::mpsc::sync_channel`.
    pub fn new(tx: SyncSender<String>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn on_status(&self, status: &str) {
        match self.tx.try_send(status.to_owned()) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => tracing::trace!(status, "progress buffer full"),
        }
    }
}

static NULL_SINK: NullProgressSink = NullProgressSink;

/// Per-call collaborators handed to an engine: progress sink and cancel flag.
#[derive(Clone, Copy)]
pub struct SolveContext<'a> {
    progress: &'a dyn ProgressSink,
    cancel: Option<&'a AtomicBool>,
}

impl std::fmt::Debug for SolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveContext")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl Default for SolveContext<'_> {
    fn default() -> Self {
        Self {
            progress: &NULL_SINK,
            cancel: None,
        }
    }
}

impl<'a> SolveContext<'a> {
    /// Context with no progress reporting and no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes status messages to `sink`.
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    /// Aborts the solve with [`PitError::Cancelled`] once `flag` is raised.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Emits a status message.
    pub fn notify(&self, status: &str) {
        self.progress.on_status(status);
    }

    /// Returns [`PitError::Cancelled`] when the cancel flag is raised.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), PitError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(PitError::Cancelled),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::sync::mpsc::sync_channel;

    #[test]
    fn channel_sink_drops_when_full_instead_of_blocking() {
        let (tx, rx) = sync_channel(1);
        let sink = ChannelProgressSink::new(tx);
        sink.on_status("first");
        sink.on_status("second");
        assert_eq!(rx.try_recv().unwrap(), "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_ignores_disconnected_receiver() {
        let (tx, rx) = sync_channel(4);
        drop(rx);
        ChannelProgressSink::new(tx).on_status("nobody listens");
    }

    #[test]
    fn checkpoint_reports_cancellation() {
        let flag = AtomicBool::new(false);
        let ctx = SolveContext::new().with_cancel(&flag);
        assert!(ctx.checkpoint().is_ok());
        flag.store(true, Ordering::Relaxed);
        assert_eq!(ctx.checkpoint(), Err(PitError::Cancelled));
    }
}
