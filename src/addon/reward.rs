//! Mission reward variants.
//!
//! The addon exports rewards untagged: a currency reward, an item reward and
//! a follower experience reward share one list and are told apart only by
//! which fields they carry. [`Reward`] inspects the field set once at
//! deserialization and keeps anything it cannot place as
//! [`Reward::Unknown`] so it can still be logged.

use super::error::RewardParseError;
use super::parse::lenient_i64;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Title the game uses for gold rewards.
pub const MONEY_REWARD_TITLE: &str = "Money Reward";

/// Copper per gold: 100 copper per silver, 100 silver per gold.
pub const MONEY_DIVISOR: i64 = 100 * 100;

/// Follower experience reward.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceReward {
    /// Experience granted to each follower on the mission.
    #[serde(rename = "followerXP", deserialize_with = "lenient_i64")]
    pub follower_xp: i64,
    /// Display name, e.g. `"1,200 XP"`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub icon: Option<Value>,
}

impl fmt::Display for ExperienceReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Item reward.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemReward {
    #[serde(rename = "itemID", deserialize_with = "lenient_i64")]
    pub item_id: i64,
    /// Chat hyperlink, e.g. `|cff0070dd|Hitem:184646::|h[Sinful Gladiator's Insignia]|h|r`.
    #[serde(rename = "itemLink")]
    pub item_link: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,
}

impl ItemReward {
    /// The bracketed item name inside the hyperlink, if the link is well formed.
    pub fn item_name(&self) -> Option<&str> {
        let start = self.item_link.find("|h[")? + 3;
        let end = self.item_link.find("]|h")?;
        self.item_link.get(start..end)
    }
}

impl fmt::Display for ItemReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_name() {
            Some(name) => write!(f, "[{name}]x{}", self.quantity),
            None => Ok(()),
        }
    }
}

/// Currency reward, including gold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyReward {
    #[serde(rename = "currencyID", deserialize_with = "lenient_i64")]
    pub currency_id: i64,
    /// Amount in the currency's smallest unit (copper for money).
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: Option<Value>,
}

impl CurrencyReward {
    /// Whether this is a gold reward whose quantity is in copper.
    pub fn is_money(&self) -> bool {
        self.title == MONEY_REWARD_TITLE
    }

    /// Quantity rendered for display: `gold.copper` with four fractional
    /// digits for money, a plain integer otherwise.
    pub fn amount(&self) -> String {
        if !self.is_money() {
            return self.quantity.to_string();
        }

        let sign = if self.quantity < 0 { "-" } else { "" };
        let minor = self.quantity.unsigned_abs();
        let divisor = MONEY_DIVISOR.unsigned_abs();
        format!("{sign}{}.{:04}", minor / divisor, minor % divisor)
    }
}

impl fmt::Display for CurrencyReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_money() {
            write!(f, "{}: {}g", self.title, self.amount())
        } else {
            write!(f, "{}: {}", self.title, self.amount())
        }
    }
}

/// One entry of a mission's reward list.
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    Experience(ExperienceReward),
    Item(ItemReward),
    Currency(CurrencyReward),
    /// Unrecognized or malformed entry, kept verbatim for diagnostics.
    Unknown(Value),
}

impl Reward {
    /// Classify a raw reward object by its field set.
    ///
    /// # Errors
    ///
    /// [`RewardParseError::UnknownShape`] when no field set matches, and
    /// [`RewardParseError::Malformed`] when one matches but does not read.
    pub fn classify(value: &Value) -> Result<Self, RewardParseError> {
        let has = |key: &str| value.get(key).is_some();

        if has("currencyID") {
            typed(value, "currency").map(Self::Currency)
        } else if has("itemID") && has("itemLink") {
            typed(value, "item").map(Self::Item)
        } else if has("followerXP") {
            typed(value, "experience").map(Self::Experience)
        } else {
            Err(RewardParseError::UnknownShape)
        }
    }

    /// Like [`classify`](Self::classify), but never fails: problems are
    /// logged and the entry becomes [`Reward::Unknown`].
    pub fn from_value(value: Value) -> Self {
        match Self::classify(&value) {
            Ok(reward) => reward,
            Err(e) => {
                warn!(error = %e, reward = %value, "unknown bonus reward, skipping");
                Self::Unknown(value)
            }
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

fn typed<T: serde::de::DeserializeOwned>(
    value: &Value,
    shape: &'static str,
) -> Result<T, RewardParseError> {
    T::deserialize(value).map_err(|e| RewardParseError::Malformed {
        shape,
        reason: e.to_string(),
    })
}

impl<'de> Deserialize<'de> for Reward {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Experience(r) => fmt::Display::fmt(r, f),
            Self::Item(r) => fmt::Display::fmt(r, f),
            Self::Currency(r) => fmt::Display::fmt(r, f),
            Self::Unknown(_) => Ok(()),
        }
    }
}
