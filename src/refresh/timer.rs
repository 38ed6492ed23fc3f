//! Resettable periodic timer with explicit drain semantics.

use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep};
use tracing::debug;

/// Deadline used when `now + interval` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Lifecycle of a [`RefreshTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not armed; [`RefreshTimer::fired`] never completes.
    Idle,
    /// Counting down to the next periodic trigger.
    Armed,
    /// The deadline passed but nobody has consumed the fire yet.
    FiredPendingDrain,
}

/// A one-shot timer that is rearmed to a fixed interval after every
/// trigger.
///
/// [`stop`](Self::stop) discards a fire that is already pending, so a
/// deadline from the previous window can never complete after
/// [`arm`](Self::arm) starts a new one.
#[derive(Debug)]
pub struct RefreshTimer {
    interval: Duration,
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sleep: Box::pin(tokio::time::sleep(interval)),
            armed: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> TimerState {
        match (self.armed, self.sleep.is_elapsed()) {
            (false, _) => TimerState::Idle,
            (true, false) => TimerState::Armed,
            (true, true) => TimerState::FiredPendingDrain,
        }
    }

    /// Start a fresh window ending one interval from now.
    pub fn arm(&mut self) {
        let now = Instant::now();
        let deadline = now
            .checked_add(self.interval)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.sleep.as_mut().reset(deadline);
        self.armed = true;
    }

    /// Disarm, draining a pending fire. Returns `true` if one was drained.
    pub fn stop(&mut self) -> bool {
        let drained = self.state() == TimerState::FiredPendingDrain;
        if drained {
            debug!("drained pending refresh timer fire");
        }
        self.armed = false;
        drained
    }

    /// Completes when an armed deadline passes, leaving the timer idle.
    ///
    /// Cancel-safe: dropping the future leaves the timer armed.
    pub async fn fired(&mut self) {
        if !self.armed {
            std::future::pending::<()>().await;
        }
        self.sleep.as_mut().await;
        self.armed = false;
    }
}
