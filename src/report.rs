//! The consumer view of a snapshot at a given instant.
//!
//! [`Report::build`] is pure: the same snapshot and `now` always produce the
//! same report, which is what lets periodic refreshes reuse a stale snapshot.

use crate::addon::{FollowerType, Snapshot};
use crate::refresh::{Recompute, RecomputeSink};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Missions finishing sooner than this are urgent.
pub const ALERT_THRESHOLD: Duration = Duration::from_secs(30 * 60);

/// Missions finishing sooner than this deserve attention.
pub const WARN_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Default number of upcoming missions listed per character.
pub const DEFAULT_MAX_NEXT_COMPLETE: usize = 3;

/// How soon a mission completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Normal,
    Warn,
    Alert,
}

impl Urgency {
    pub fn for_remaining(remaining: Duration) -> Self {
        if remaining < ALERT_THRESHOLD {
            Self::Alert
        } else if remaining < WARN_THRESHOLD {
            Self::Warn
        } else {
            Self::Normal
        }
    }
}

/// Render a countdown as `SSs`, `Mm:SSs` or `Hh:MMm:SSs`.
///
/// Sub-second precision is dropped. Leading hours and minutes are padded to
/// two columns so lines align.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours:>2}h:{minutes:02}m:{seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes:>2}m:{seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// One upcoming mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionLine {
    pub name: String,
    pub remaining: Duration,
    /// Companions assigned (auto-troops excluded).
    pub companions: usize,
    pub scalar: i64,
    pub rewards: String,
}

impl MissionLine {
    pub fn urgency(&self) -> Urgency {
        Urgency::for_remaining(self.remaining)
    }
}

impl fmt::Display for MissionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {:>11}    ({}) [{:>2}] {:<35} {}",
            format_remaining(self.remaining),
            self.companions,
            self.scalar,
            self.name,
            self.rewards
        )
    }
}

/// Mission-table summary for one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSummary {
    pub key: String,
    /// `Name-Realm`.
    pub label: String,
    pub complete: usize,
    pub active: usize,
    pub idle_companions: usize,
    pub companions: usize,
    /// Soonest-completing unfinished missions.
    pub next: Vec<MissionLine>,
}

impl fmt::Display for CharacterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} M({:<2} / {:>2}) F({:<2} / {:>2})",
            self.label, self.complete, self.active, self.idle_companions, self.companions
        )
    }
}

/// Roster-wide view for one follower type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub follower_type: FollowerType,
    /// Epoch seconds the report was computed for.
    pub now: i64,
    /// Every character in the snapshot, including ones without the table.
    pub total_characters: usize,
    pub total_complete: usize,
    pub total_active: usize,
    /// Characters with followers in the table, sorted by key.
    pub characters: Vec<CharacterSummary>,
}

impl Report {
    pub fn build(snapshot: &Snapshot, follower_type: FollowerType, now: i64, max_next: usize) -> Self {
        let characters = snapshot
            .characters()
            .filter_map(|character| {
                let table = character.table(follower_type)?;
                if table.followers.is_empty() {
                    return None;
                }
                let next = table
                    .next_to_complete(now, max_next)
                    .into_iter()
                    .map(|mission| MissionLine {
                        name: mission.name.clone(),
                        remaining: mission.remaining_at(now),
                        companions: table.companions_on_mission(mission).len(),
                        scalar: mission.mission_scalar,
                        rewards: mission.reward_summary(),
                    })
                    .collect();
                Some(CharacterSummary {
                    key: character.key.clone(),
                    label: character.to_string(),
                    complete: table.missions_complete(now).len(),
                    active: table.missions_active().len(),
                    idle_companions: table.idle_companions().len(),
                    companions: table.num_companions(),
                    next,
                })
            })
            .collect();

        Self {
            follower_type,
            now,
            total_characters: snapshot.len(),
            total_complete: snapshot.num_missions_complete(follower_type, now),
            total_active: snapshot.num_missions_active(follower_type),
            characters,
        }
    }

    /// The most urgent pending mission across the roster.
    pub fn most_urgent(&self) -> Option<&MissionLine> {
        self.characters
            .iter()
            .flat_map(|c| c.next.iter())
            .min_by_key(|m| m.remaining)
    }
}

/// Default [`RecomputeSink`]: logs a [`Report`] for every trigger.
#[derive(Debug, Clone)]
pub struct LogSink {
    follower_type: FollowerType,
    max_next: usize,
}

impl LogSink {
    pub fn new(follower_type: FollowerType, max_next: usize) -> Self {
        Self {
            follower_type,
            max_next,
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(FollowerType::Shadowlands, DEFAULT_MAX_NEXT_COMPLETE)
    }
}

impl RecomputeSink for LogSink {
    fn recompute(&mut self, trigger: &Recompute) {
        let now = chrono::Utc::now().timestamp();
        let report = Report::build(&trigger.snapshot, self.follower_type, now, self.max_next);

        info!(
            reason = ?trigger.reason,
            follower_type = %report.follower_type,
            "{} characters, {} complete / {} active",
            report.total_characters,
            report.total_complete,
            report.total_active
        );
        for character in &report.characters {
            info!("\t{character}");
            for mission in &character.next {
                info!(urgency = ?mission.urgency(), "\t\t{mission}");
            }
        }
    }
}
