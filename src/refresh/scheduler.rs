//! Arbitration between fresh snapshots and the periodic refresh timer.

use super::timer::RefreshTimer;
use crate::addon::Snapshot;
use crate::store::SnapshotReader;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default periodic refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Capacity of the loader to scheduler handoff.
pub const READY_CHANNEL_CAPACITY: usize = 1;

/// Create the single-slot channel the loader uses to hand over snapshots.
pub fn ready_channel() -> (mpsc::Sender<Arc<Snapshot>>, mpsc::Receiver<Arc<Snapshot>>) {
    mpsc::channel(READY_CHANNEL_CAPACITY)
}

/// What caused a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// A new snapshot was parsed.
    FreshData,
    /// The interval elapsed; only time-derived values changed.
    Periodic,
}

/// A "recompute now" signal.
#[derive(Debug, Clone)]
pub struct Recompute {
    pub reason: TriggerReason,
    pub snapshot: Arc<Snapshot>,
    /// When the trigger was emitted.
    pub at: Instant,
}

/// Receives recompute triggers, one at a time, on the scheduler task.
pub trait RecomputeSink: Send + 'static {
    fn recompute(&mut self, trigger: &Recompute);
}

/// Forwards triggers to another task. A closed receiver drops them.
impl RecomputeSink for mpsc::UnboundedSender<Recompute> {
    fn recompute(&mut self, trigger: &Recompute) {
        if self.send(trigger.clone()).is_err() {
            debug!("recompute receiver closed");
        }
    }
}

/// Serializes fresh-data and periodic triggers into a [`RecomputeSink`].
///
/// Fresh data stops the timer (draining a fire that is already pending),
/// emits immediately, and rearms. A timer fire emits against the store's
/// current snapshot and rearms. The sink runs inline, so at most one
/// recompute is in flight.
pub struct RefreshScheduler<S: RecomputeSink> {
    ready: mpsc::Receiver<Arc<Snapshot>>,
    reader: SnapshotReader,
    sink: S,
    interval: Duration,
    cancel: CancellationToken,
}

impl<S: RecomputeSink> RefreshScheduler<S> {
    pub fn new(
        ready: mpsc::Receiver<Arc<Snapshot>>,
        reader: SnapshotReader,
        sink: S,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ready,
            reader,
            sink,
            interval: DEFAULT_REFRESH_INTERVAL,
            cancel,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until cancelled. Returns the sink.
    pub async fn run(mut self) -> S {
        info!(interval_secs = self.interval.as_secs_f64(), "refresh scheduler started");
        let mut timer = RefreshTimer::new(self.interval);
        timer.arm();
        let mut ready_open = true;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    timer.stop();
                    info!("refresh scheduler cancelled");
                    break;
                }
                fresh = self.ready.recv(), if ready_open => match fresh {
                    Some(snapshot) => {
                        timer.stop();
                        self.emit(TriggerReason::FreshData, snapshot);
                        timer.arm();
                    }
                    None => {
                        debug!("snapshot handoff closed, periodic refresh only");
                        ready_open = false;
                    }
                },
                _ = timer.fired() => {
                    let snapshot = self.reader.current();
                    self.emit(TriggerReason::Periodic, snapshot);
                    timer.arm();
                }
            }
        }

        self.sink
    }

    fn emit(&mut self, reason: TriggerReason, snapshot: Arc<Snapshot>) {
        debug!(?reason, characters = snapshot.len(), "recompute");
        let trigger = Recompute {
            reason,
            snapshot,
            at: Instant::now(),
        };
        self.sink.recompute(&trigger);
    }
}
