//! Configuration for the MissionMinder agent.

use crate::addon::{DEFAULT_MAX_DECOMPRESSED_BYTES, FollowerType};
use crate::error::{MinderError, Result};
use crate::watch::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted `refresh.interval_secs` (one week).
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Where the addon writes its SavedVariables.
    pub addon: AddonConfig,
    /// File watch settings.
    pub watch: WatchConfig,
    /// Periodic refresh settings.
    pub refresh: RefreshConfig,
}

/// Location and decoding limits of the SavedVariables file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonConfig {
    /// The account's `WTF/Account/<NAME>/SavedVariables` directory.
    pub saved_variables_dir: PathBuf,
    /// File name inside `saved_variables_dir`.
    pub file_name: String,
    /// Upper bound on the inflated export size in bytes.
    pub max_decompressed_bytes: usize,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            saved_variables_dir: PathBuf::new(),
            file_name: "MissionMinder.lua".to_owned(),
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl AddonConfig {
    pub fn saved_variables_path(&self) -> PathBuf {
        self.saved_variables_dir.join(&self.file_name)
    }
}

/// Watcher polling and re-subscription backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// How often the file's metadata is checked.
    pub poll_interval_ms: u64,
    /// Backoff step between re-subscription attempts after a removal.
    pub retry_interval_ms: u64,
    /// Re-subscription attempts before the watch is given up.
    pub max_retries: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            retry_interval_ms: 500,
            max_retries: 3,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }
}

/// Periodic recompute settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between periodic recomputes.
    pub interval_secs: u64,
    /// Follower type reported on (123 = Shadowlands covenant table).
    pub follower_type: u32,
    /// Upcoming missions listed per character.
    pub max_next_complete: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            follower_type: FollowerType::Shadowlands.id(),
            max_next_complete: 3,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn follower_type(&self) -> FollowerType {
        FollowerType::from(self.follower_type)
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| MinderError::Config(e.to_string()))
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MinderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path (see [`crate::paths::config_file`]).
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_file()
    }

    /// Reject settings the agent cannot run with.
    ///
    /// # Errors
    ///
    /// [`MinderError::Config`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.addon.saved_variables_dir.as_os_str().is_empty() {
            return Err(MinderError::Config(
                "addon.saved_variables_dir is not set".to_owned(),
            ));
        }
        if self.addon.file_name.is_empty() {
            return Err(MinderError::Config("addon.file_name is empty".to_owned()));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(MinderError::Config(
                "watch.poll_interval_ms must be positive".to_owned(),
            ));
        }
        if self.refresh.interval_secs == 0 {
            return Err(MinderError::Config(
                "refresh.interval_secs must be positive".to_owned(),
            ));
        }
        if self.refresh.interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(MinderError::Config(format!(
                "refresh.interval_secs must be at most {MAX_REFRESH_INTERVAL_SECS}"
            )));
        }
        Ok(())
    }
}
