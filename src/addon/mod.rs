//! Reading the MissionMinder addon's SavedVariables export.
//!
//! A load cycle runs four stages, each in its own module:
//!
//! 1. [`export`]: find the `["export"] = "..."` string in the Lua file
//! 2. [`decode`]: base64-decode and zlib-inflate it
//! 3. [`parse`]: deserialize the JSON into a [`Snapshot`]
//! 4. [`reward`]: classify each untagged mission reward while parsing
//!
//! [`SavedVariables`] chains them over a file on disk.

pub mod decode;
pub mod error;
pub mod export;
pub mod model;
pub mod parse;
pub mod reward;
pub mod saved_variables;

pub use decode::{DEFAULT_MAX_DECOMPRESSED_BYTES, PayloadDecoder};
pub use error::{
    DecodeError, DecompressionError, ExtractError, LoadError, ParseError, RewardParseError,
};
pub use export::extract_export;
pub use model::{AdventureTable, Character, EncounterIconInfo, Follower, FollowerType, Mission, Snapshot};
pub use parse::parse_snapshot;
pub use reward::{CurrencyReward, ExperienceReward, ItemReward, Reward};
pub use saved_variables::SavedVariables;
