//! The single writer of the snapshot store.
//!
//! Each change signal runs one load cycle. A successful cycle replaces the
//! stored snapshot and hands it to the scheduler; a failed one is logged and
//! leaves the previous snapshot in place.

use crate::addon::{SavedVariables, Snapshot};
use crate::store::SnapshotStore;
use crate::watch::ChangeSignal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Loader {
    saved_variables: SavedVariables,
    store: SnapshotStore,
    changes: mpsc::Receiver<ChangeSignal>,
    ready: mpsc::Sender<Arc<Snapshot>>,
    cancel: CancellationToken,
}

impl Loader {
    pub fn new(
        saved_variables: SavedVariables,
        store: SnapshotStore,
        changes: mpsc::Receiver<ChangeSignal>,
        ready: mpsc::Sender<Arc<Snapshot>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            saved_variables,
            store,
            changes,
            ready,
            cancel,
        }
    }

    /// Load once at startup, then once per change signal, until cancelled
    /// or the watcher side hangs up.
    pub async fn run(mut self) {
        info!(path = %self.saved_variables.path().display(), "loader started");
        if !self.cycle().await {
            return;
        }

        loop {
            let signal = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("loader cancelled");
                    break;
                }
                signal = self.changes.recv() => signal,
            };
            let Some(signal) = signal else {
                debug!("change channel closed, loader stopping");
                break;
            };
            debug!(?signal, "reloading");
            if !self.cycle().await {
                break;
            }
        }
    }

    /// One load attempt. Returns `false` if cancelled mid-handoff.
    async fn cycle(&mut self) -> bool {
        let snapshot = match self.saved_variables.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "keeping previous snapshot");
                return true;
            }
        };

        let snapshot = self.store.publish(snapshot);
        info!(characters = snapshot.len(), "snapshot updated");

        tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.ready.send(snapshot) => {
                if sent.is_err() {
                    debug!("scheduler gone, snapshot stored only");
                }
                true
            }
        }
    }
}
