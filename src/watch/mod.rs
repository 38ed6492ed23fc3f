//! SavedVariables file watching.
//!
//! The game rewrites its SavedVariables on logout and `/reload`, often by
//! deleting and recreating the file. [`Watcher`] turns every write or
//! removal into a [`ChangeSignal`] and, after a removal, re-subscribes with
//! a bounded linear backoff driven by [`RetryState`]. When retries run out
//! the watcher reports [`WatchStatus::Dead`] and exits; the rest of the
//! agent keeps running on the last snapshot.
//!
//! The notification primitive itself is the [`FileWatch`] capability.
//! [`PollingFileWatch`] implements it by comparing file metadata.

pub mod poll;
pub mod retry;
pub mod watcher;

pub use poll::PollingFileWatch;
pub use retry::{RetryPolicy, RetryState};
pub use watcher::{WatchExit, Watcher, WatcherHandle};

use std::path::{Path, PathBuf};

/// Errors raised by a [`FileWatch`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Could not start watching a path.
    #[error("cannot watch {}: {reason}", path.display())]
    Subscribe {
        /// Path that was being added.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// A poll failed; the watch stays in place.
    #[error("transient watch error: {0}")]
    Transient(String),
}

/// What happened to the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Write,
    Remove,
}

/// One observed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

/// Unified "the file may have new content" signal sent downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSignal {
    /// The file was written.
    Modified,
    /// The file was removed (and may be recreated shortly).
    Removed,
    /// Synthesized by [`WatcherHandle::force_trigger`].
    Forced,
}

impl From<FileEventKind> for ChangeSignal {
    fn from(kind: FileEventKind) -> Self {
        match kind {
            FileEventKind::Write => Self::Modified,
            FileEventKind::Remove => Self::Removed,
        }
    }
}

/// Health of the watch, published on a `tokio::sync::watch` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Not subscribed yet.
    Starting,
    /// Subscribed and polling.
    Watching,
    /// Re-subscribing after a removal; `attempt` is 1-based.
    Retrying { attempt: u32 },
    /// Retries exhausted; no further file events will be reported.
    Dead,
    /// Shut down by cancellation.
    Stopped,
}

/// "Notify on write/remove" capability for a single file.
///
/// Implementations are driven by [`Watcher`], which calls [`poll`](Self::poll)
/// once per poll interval.
pub trait FileWatch: Send + 'static {
    /// Start (or restart) watching `path`.
    ///
    /// # Errors
    ///
    /// [`WatchError::Subscribe`] when the path cannot be watched.
    fn add(&mut self, path: &Path) -> Result<(), WatchError>;

    /// Events observed since the previous poll. A `Remove` event ends the
    /// subscription.
    ///
    /// # Errors
    ///
    /// [`WatchError::Transient`] for failures that leave the watch in place.
    fn poll(&mut self) -> Result<Vec<FileEvent>, WatchError>;

    /// Existence check performed before each re-subscription attempt.
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Release any resources held for the watch.
    fn close(&mut self) {}
}
