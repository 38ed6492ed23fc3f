//! Wiring of the watcher, loader and scheduler tasks.
//!
//! ```text
//!  Watcher ──ChangeSignal──▶ Loader ──Arc<Snapshot>──▶ RefreshScheduler ──▶ RecomputeSink
//!                              │                              ▲
//!                              └──▶ SnapshotStore ──reader────┘
//! ```
//!
//! Every task gets a child of the agent's [`CancellationToken`];
//! [`Agent::shutdown`] cancels it and joins all of them.

use crate::addon::{PayloadDecoder, SavedVariables};
use crate::config::AgentConfig;
use crate::error::{MinderError, Result};
use crate::loader::Loader;
use crate::refresh::{RecomputeSink, RefreshScheduler, ready_channel};
use crate::store::{SnapshotReader, SnapshotStore};
use crate::watch::{FileWatch, PollingFileWatch, Watcher, WatcherHandle, WatchStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A running agent.
pub struct Agent {
    cancel: CancellationToken,
    reader: SnapshotReader,
    watcher: WatcherHandle,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Agent {
    /// Validate `config` and spawn all tasks with a [`PollingFileWatch`].
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`MinderError::Config`] if the configuration is unusable.
    pub fn start<S: RecomputeSink>(config: &AgentConfig, sink: S) -> Result<Self> {
        Self::start_with_watch(config, PollingFileWatch::new(), sink)
    }

    /// Like [`start`](Self::start) with a caller-supplied [`FileWatch`].
    ///
    /// # Errors
    ///
    /// [`MinderError::Config`] if the configuration is unusable.
    pub fn start_with_watch<W: FileWatch, S: RecomputeSink>(
        config: &AgentConfig,
        watch: W,
        sink: S,
    ) -> Result<Self> {
        config.validate()?;

        let path = config.addon.saved_variables_path();
        let cancel = CancellationToken::new();
        let store = SnapshotStore::new();
        let reader = store.reader();
        let (changes_tx, changes_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = ready_channel();

        let watcher = Watcher::new(
            path.clone(),
            watch,
            config.watch.retry_policy(),
            changes_tx,
            cancel.child_token(),
        )
        .with_poll_interval(config.watch.poll_interval());
        let handle = watcher.handle();

        let loader = Loader::new(
            SavedVariables::new(
                path.clone(),
                PayloadDecoder::new(config.addon.max_decompressed_bytes),
            ),
            store,
            changes_rx,
            ready_tx,
            cancel.child_token(),
        );

        let scheduler = RefreshScheduler::new(ready_rx, reader.clone(), sink, cancel.child_token())
            .with_interval(config.refresh.interval());

        let tasks = vec![
            (
                "watcher",
                tokio::spawn(async move {
                    let exit = watcher.run().await;
                    info!(?exit, "watcher task finished");
                }),
            ),
            ("loader", tokio::spawn(loader.run())),
            (
                "scheduler",
                tokio::spawn(async move {
                    scheduler.run().await;
                }),
            ),
        ];

        info!(path = %path.display(), "agent started");
        Ok(Self {
            cancel,
            reader,
            watcher: handle,
            tasks,
        })
    }

    /// Read-only access to the latest snapshot.
    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    pub fn watcher(&self) -> &WatcherHandle {
        &self.watcher
    }

    pub fn watch_status(&self) -> WatchStatus {
        self.watcher.status()
    }

    /// Reload the file now, as if it had been written.
    pub fn force_trigger(&self) -> bool {
        self.watcher.force_trigger()
    }

    /// Token whose cancellation stops every task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the cancel token, then join every task.
    ///
    /// # Errors
    ///
    /// [`MinderError::Task`] if a task panicked.
    pub async fn run_until_cancelled(self) -> Result<()> {
        self.cancel.cancelled().await;
        self.join().await
    }

    /// Cancel all tasks and wait for them to finish.
    ///
    /// # Errors
    ///
    /// [`MinderError::Task`] if a task panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.join().await
    }

    async fn join(self) -> Result<()> {
        let mut first_err = None;
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!(task = name, error = %e, "task failed");
                first_err.get_or_insert(MinderError::Task(format!("{name}: {e}")));
            }
        }
        info!("agent shut down");
        first_err.map_or(Ok(()), Err)
    }
}
