//! MissionMinder: a background agent for the MissionMinder addon's exports.
//!
//! The addon stores a compressed JSON export of every character's adventure
//! tables in its SavedVariables file. This crate watches that file, decodes
//! the export into a typed [`Snapshot`], and tells a [`RecomputeSink`] when
//! the derived view (what finished, what finishes next) must be recomputed.
//!
//! # Architecture
//!
//! - **Watcher** ([`watch`]): detects writes and removals; re-subscribes with
//!   bounded backoff when the game recreates the file
//! - **Loader** ([`loader`]): runs the decode pipeline ([`addon`]) and
//!   publishes into the [`store`]
//! - **Scheduler** ([`refresh`]): merges fresh data with a periodic timer
//! - **Report** ([`report`]): the consumer view of a snapshot at an instant
//!
//! [`Agent`] wires them together.

pub mod addon;
pub mod agent;
pub mod config;
pub mod error;
pub mod loader;
pub mod paths;
pub mod refresh;
pub mod report;
pub mod store;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_utils;

pub use addon::{LoadError, Reward, SavedVariables, Snapshot};
pub use agent::Agent;
pub use config::AgentConfig;
pub use error::{MinderError, Result};
pub use refresh::{Recompute, RecomputeSink, TriggerReason};
pub use report::{LogSink, Report};
pub use store::SnapshotReader;
pub use watch::WatchStatus;
