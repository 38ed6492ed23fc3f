//! Deciding when derived mission state is recomputed.
//!
//! Two things make the view stale: a newly parsed snapshot, and the passage
//! of time (remaining durations shrink, missions complete). The
//! [`RefreshScheduler`] turns both into [`Recompute`] triggers for a
//! [`RecomputeSink`], using a [`RefreshTimer`] that fresh data resets.

pub mod scheduler;
pub mod timer;

pub use scheduler::{
    DEFAULT_REFRESH_INTERVAL, READY_CHANNEL_CAPACITY, Recompute, RecomputeSink, RefreshScheduler,
    TriggerReason, ready_channel,
};
pub use timer::{RefreshTimer, TimerState};
