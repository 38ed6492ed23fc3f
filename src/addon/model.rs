//! Domain model decoded from the addon export.
//!
//! A [`Snapshot`] is built once per successful load and then shared behind
//! an `Arc`; nothing here mutates after parsing. Time-dependent questions
//! ("is this mission done?") take `now` as epoch seconds so callers decide
//! which instant a whole report is computed against.

use super::parse::{
    lenient_i64, lenient_string, lenient_string_list, object_or_empty_list, tables_by_type,
};
use super::reward::Reward;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::Duration;

/// `Enum.GarrisonFollowerType`: which expansion's companion system a table
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "u32")]
pub enum FollowerType {
    /// Warlords of Draenor garrison.
    Garrison,
    /// Warlords of Draenor shipyard.
    Shipyard,
    /// Legion class hall.
    Legion,
    /// Battle for Azeroth war campaign.
    BattleForAzeroth,
    /// Shadowlands covenant adventures.
    Shadowlands,
    /// Any id this crate does not name.
    Other(u32),
}

impl FollowerType {
    /// Numeric id as used by the game and as the `AdventureTables` key.
    pub const fn id(self) -> u32 {
        match self {
            Self::Garrison => 1,
            Self::Shipyard => 2,
            Self::Legion => 4,
            Self::BattleForAzeroth => 22,
            Self::Shadowlands => 123,
            Self::Other(id) => id,
        }
    }
}

impl From<u32> for FollowerType {
    fn from(id: u32) -> Self {
        match id {
            1 => Self::Garrison,
            2 => Self::Shipyard,
            4 => Self::Legion,
            22 => Self::BattleForAzeroth,
            123 => Self::Shadowlands,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for FollowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// All characters known to the addon at one point in time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(
        rename = "Characters",
        default,
        deserialize_with = "object_or_empty_list"
    )]
    characters: BTreeMap<String, Character>,
}

impl Snapshot {
    /// Build a snapshot from already-constructed characters, keyed by
    /// [`Character::key`].
    pub fn from_characters(characters: impl IntoIterator<Item = Character>) -> Self {
        Self {
            characters: characters
                .into_iter()
                .map(|c| (c.key.clone(), c))
                .collect(),
        }
    }

    /// Fill identity fields that the export only carries as map keys.
    pub(crate) fn assign_keys(&mut self) {
        for (key, character) in &mut self.characters {
            if character.key.is_empty() {
                character.key.clone_from(key);
            }
            for table in character.adventure_tables.values_mut() {
                for (id, follower) in &mut table.followers {
                    if follower.id.is_empty() {
                        follower.id.clone_from(id);
                    }
                }
            }
        }
    }

    /// Characters ordered by key.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn character(&self, key: &str) -> Option<&Character> {
        self.characters.get(key)
    }

    /// Character keys in lexicographic order.
    pub fn character_keys(&self) -> Vec<&str> {
        self.characters.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Missions in progress across every character's `follower_type` table.
    pub fn num_missions_active(&self, follower_type: FollowerType) -> usize {
        self.tables(follower_type)
            .map(|t| t.missions_active().len())
            .sum()
    }

    /// Missions finished (but not yet collected) across the roster.
    pub fn num_missions_complete(&self, follower_type: FollowerType, now: i64) -> usize {
        self.tables(follower_type)
            .map(|t| t.missions_complete(now).len())
            .sum()
    }

    fn tables(&self, follower_type: FollowerType) -> impl Iterator<Item = &AdventureTable> {
        self.characters
            .values()
            .filter_map(move |c| c.table(follower_type))
    }
}

/// A single player character.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Character {
    /// Unique key within the snapshot (usually `Name-Realm`).
    pub key: String,
    pub name: String,
    pub realm: String,
    pub class: String,
    pub race: String,
    pub gender: String,
    pub level: i64,
    /// Epoch seconds the addon last saw this character logged in.
    pub last_seen: i64,
    /// Gold in copper.
    pub money: i64,
    pub money_text: String,
    pub played_level: i64,
    pub played_total: i64,
    pub reservoir_anima: i64,
    #[serde(deserialize_with = "tables_by_type")]
    pub adventure_tables: HashMap<FollowerType, AdventureTable>,
}

impl Character {
    /// The mission table for one follower type, if the character has one.
    pub fn table(&self, follower_type: FollowerType) -> Option<&AdventureTable> {
        self.adventure_tables.get(&follower_type)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.realm)
    }
}

/// Followers and in-progress missions of one follower type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AdventureTable {
    #[serde(rename = "Type")]
    pub follower_type: Option<FollowerType>,
    /// Followers keyed by follower id.
    #[serde(deserialize_with = "object_or_empty_list")]
    pub followers: HashMap<String, Follower>,
    pub missions: Vec<Mission>,
}

impl AdventureTable {
    /// Real companions, excluding auto-troops.
    pub fn companions(&self) -> Vec<&Follower> {
        self.followers.values().filter(|f| !f.is_auto_troop).collect()
    }

    pub fn num_companions(&self) -> usize {
        self.followers.values().filter(|f| !f.is_auto_troop).count()
    }

    /// Followers a mission references. Ids missing from this table are
    /// skipped.
    pub fn assigned_followers<'a>(
        &'a self,
        mission: &'a Mission,
    ) -> impl Iterator<Item = &'a Follower> + 'a {
        mission
            .followers
            .iter()
            .filter_map(move |id| self.followers.get(id))
    }

    /// Companions (not troops) on a mission.
    pub fn companions_on_mission<'a>(&'a self, mission: &'a Mission) -> Vec<&'a Follower> {
        self.assigned_followers(mission)
            .filter(|f| !f.is_auto_troop)
            .collect()
    }

    /// Ids of companions on any mission, finished or not.
    pub fn active_companion_ids(&self) -> HashSet<&str> {
        self.missions
            .iter()
            .flat_map(|m| self.companions_on_mission(m))
            .map(|f| f.id.as_str())
            .collect()
    }

    /// Companions not assigned to any mission.
    pub fn idle_companions(&self) -> Vec<&Follower> {
        let active = self.active_companion_ids();
        self.followers
            .values()
            .filter(|f| !f.is_auto_troop && !active.contains(f.id.as_str()))
            .collect()
    }

    /// Every mission the addon exported (all of them were started).
    pub fn missions_active(&self) -> &[Mission] {
        &self.missions
    }

    pub fn missions_complete(&self, now: i64) -> Vec<&Mission> {
        self.missions.iter().filter(|m| m.is_complete_at(now)).collect()
    }

    /// Up to `limit` unfinished missions, soonest first.
    pub fn next_to_complete(&self, now: i64, limit: usize) -> Vec<&Mission> {
        let mut pending: Vec<&Mission> = self
            .missions
            .iter()
            .filter(|m| !m.is_complete_at(now))
            .collect();
        pending.sort_by_key(|m| m.mission_end_time);
        pending.truncate(limit);
        pending
    }
}

/// A companion or auto-troop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Follower {
    /// Follower id; taken from the `Followers` map key when absent.
    #[serde(rename = "followerID", deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
    pub level: i64,
    pub xp: i64,
    #[serde(rename = "levelXP")]
    pub level_xp: i64,
    pub health: i64,
    pub max_health: i64,
    pub role: i64,
    /// Filler troops that are not real companions.
    pub is_auto_troop: bool,
    pub is_soulbind: bool,
    #[serde(rename = "followerTypeID")]
    pub follower_type: Option<FollowerType>,
}

/// Encounter portrait metadata shown on the mission board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncounterIconInfo {
    pub is_elite: bool,
    pub is_rare: bool,
    pub mission_scalar: i64,
    #[serde(rename = "portraitFileDataID")]
    pub portrait_file_data_id: i64,
}

/// An in-progress adventure mission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mission {
    #[serde(rename = "missionID", deserialize_with = "lenient_i64")]
    pub mission_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub mission_type: String,
    pub char_text: String,
    /// Epoch seconds at which the mission finishes.
    #[serde(deserialize_with = "lenient_i64")]
    pub mission_end_time: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub duration_seconds: i64,
    /// Difficulty level shown on the mission board.
    #[serde(deserialize_with = "lenient_i64")]
    pub mission_scalar: i64,
    /// Base follower experience.
    #[serde(deserialize_with = "lenient_i64")]
    pub xp: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub cost: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub base_cost: i64,
    #[serde(rename = "costCurrencyTypesID", deserialize_with = "lenient_i64")]
    pub cost_currency_types_id: i64,
    pub in_progress: bool,
    #[serde(rename = "followerTypeID")]
    pub follower_type: Option<FollowerType>,
    pub encounter_icon_info: Option<EncounterIconInfo>,
    /// Follower ids, resolved against the owning [`AdventureTable`].
    #[serde(deserialize_with = "lenient_string_list")]
    pub followers: Vec<String>,
    pub rewards: Vec<Reward>,
}

impl Mission {
    /// `true` once `now` has reached the end time.
    pub fn is_complete_at(&self, now: i64) -> bool {
        now >= self.mission_end_time
    }

    /// Time left until the end time; zero once complete.
    pub fn remaining_at(&self, now: i64) -> Duration {
        let secs = self.mission_end_time.saturating_sub(now).max(0);
        Duration::from_secs(secs.unsigned_abs())
    }

    /// `[<xp>XP]` followed by every recognized reward, `; `-separated.
    pub fn reward_summary(&self) -> String {
        let rewards: Vec<String> = self
            .rewards
            .iter()
            .filter(|r| r.is_known())
            .map(ToString::to_string)
            .collect();

        if rewards.is_empty() {
            format!("[{}XP]", self.xp)
        } else {
            format!("[{}XP] {}", self.xp, rewards.join("; "))
        }
    }
}
