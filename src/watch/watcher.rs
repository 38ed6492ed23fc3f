//! Background task that drives a [`FileWatch`] and survives file recreation.

use super::retry::{RetryPolicy, RetryState};
use super::{ChangeSignal, FileEventKind, FileWatch, WatchStatus};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default interval between [`FileWatch::poll`] calls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why [`Watcher::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// The cancellation token fired.
    Cancelled,
    /// Re-subscription retries were exhausted.
    Dead,
    /// Nobody is listening for change signals any more.
    Closed,
}

/// Watches one file and forwards every change as a [`ChangeSignal`].
///
/// After a removal the watcher re-subscribes using [`RetryState`]: before
/// each attempt it checks that the file exists, and after the last failed
/// attempt it reports [`WatchStatus::Dead`] and returns. A successful
/// re-subscription emits a [`ChangeSignal::Modified`] since the recreated
/// file was written while nothing was watching it.
pub struct Watcher<W: FileWatch> {
    path: PathBuf,
    watch: W,
    retry: RetryState,
    poll_interval: Duration,
    changes: mpsc::Sender<ChangeSignal>,
    status: watch::Sender<WatchStatus>,
    cancel: CancellationToken,
}

impl<W: FileWatch> Watcher<W> {
    /// Create a watcher for `path` that sends signals via `changes`.
    ///
    /// Call [`run`](Self::run) to start watching.
    pub fn new(
        path: impl Into<PathBuf>,
        watch: W,
        policy: RetryPolicy,
        changes: mpsc::Sender<ChangeSignal>,
        cancel: CancellationToken,
    ) -> Self {
        let (status, _rx) = watch::channel(WatchStatus::Starting);
        Self {
            path: path.into(),
            watch,
            retry: RetryState::new(policy),
            poll_interval: DEFAULT_POLL_INTERVAL,
            changes,
            status,
            cancel,
        }
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// A handle for forcing triggers and observing [`WatchStatus`].
    pub fn handle(&self) -> WatcherHandle {
        WatcherHandle {
            changes: self.changes.clone(),
            status: self.status.subscribe(),
        }
    }

    /// Run until cancelled, retries are exhausted, or the signal channel
    /// closes.
    pub async fn run(mut self) -> WatchExit {
        info!(path = %self.path.display(), "SavedVariables watcher started");

        match self.watch.add(&self.path) {
            Ok(()) => self.set_status(WatchStatus::Watching),
            Err(e) => {
                warn!(error = %e, "initial watch failed, retrying");
                if let Err(exit) = self.resubscribe().await {
                    return self.finish(exit);
                }
            }
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return self.finish(WatchExit::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let events = match self.watch.poll() {
                Ok(events) => events,
                Err(e) => {
                    warn!(error = %e, "watch poll failed");
                    continue;
                }
            };

            for event in events {
                info!(kind = ?event.kind, path = %event.path.display(), "SavedVariables changed");
                if !self.signal(event.kind.into()) {
                    return self.finish(WatchExit::Closed);
                }
                if event.kind == FileEventKind::Remove {
                    if let Err(exit) = self.resubscribe().await {
                        return self.finish(exit);
                    }
                    // Anything queued behind a removal belongs to the old file.
                    break;
                }
            }
        }
    }

    /// One removal episode of bounded retries.
    async fn resubscribe(&mut self) -> Result<(), WatchExit> {
        self.retry.reset();

        while let Some(delay) = self.retry.next_delay() {
            self.set_status(WatchStatus::Retrying {
                attempt: self.retry.attempts() + 1,
            });
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(WatchExit::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            let attempt = self.retry.record_attempt();
            info!(attempt, path = %self.path.display(), "retry attempting to watch");

            if !self.watch.exists(&self.path) {
                warn!(attempt, path = %self.path.display(), "file does not exist");
                continue;
            }

            match self.watch.add(&self.path) {
                Ok(()) => {
                    info!(attempt, "watching again");
                    self.set_status(WatchStatus::Watching);
                    if !self.signal(ChangeSignal::Modified) {
                        return Err(WatchExit::Closed);
                    }
                    return Ok(());
                }
                Err(e) => warn!(attempt, error = %e, "retry failed"),
            }
        }

        error!(
            attempts = self.retry.attempts(),
            path = %self.path.display(),
            "exhausted retries, no longer watching SavedVariables"
        );
        Err(WatchExit::Dead)
    }

    /// Forward a signal. Returns `false` once the receiver is gone.
    fn signal(&self, signal: ChangeSignal) -> bool {
        send_signal(&self.changes, signal)
    }

    fn set_status(&self, status: WatchStatus) {
        self.status.send_replace(status);
    }

    fn finish(mut self, exit: WatchExit) -> WatchExit {
        self.watch.close();
        let status = match exit {
            WatchExit::Dead => WatchStatus::Dead,
            WatchExit::Cancelled | WatchExit::Closed => WatchStatus::Stopped,
        };
        self.set_status(status);
        info!(?exit, "SavedVariables watcher stopped");
        exit
    }
}

/// A full channel already has a reload pending, so the signal coalesces.
fn send_signal(changes: &mpsc::Sender<ChangeSignal>, signal: ChangeSignal) -> bool {
    match changes.try_send(signal) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            debug!(?signal, "reload already pending");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!("change receiver closed");
            false
        }
    }
}

/// Cloneable handle onto a running [`Watcher`].
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    changes: mpsc::Sender<ChangeSignal>,
    status: watch::Receiver<WatchStatus>,
}

impl WatcherHandle {
    /// Inject a change signal as if the file had been written.
    ///
    /// Returns `false` when the receiving side has shut down.
    pub fn force_trigger(&self) -> bool {
        info!("forced reload requested");
        send_signal(&self.changes, ChangeSignal::Forced)
    }

    pub fn status(&self) -> WatchStatus {
        *self.status.borrow()
    }

    /// Receiver for status transitions.
    pub fn status_receiver(&self) -> watch::Receiver<WatchStatus> {
        self.status.clone()
    }
}
