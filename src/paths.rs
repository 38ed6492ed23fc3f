//! Filesystem locations used by the agent.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux | Windows |
//! |---------|-------|-------|---------|
//! | Config | `~/Library/Application Support/missionminder/` | `~/.config/missionminder/` | `%APPDATA%\missionminder\` |
//!
//! Set `MISSIONMINDER_CONFIG_DIR` to override [`config_dir`].

use std::path::PathBuf;

/// Environment variable overriding [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "MISSIONMINDER_CONFIG_DIR";

const APP_DIR: &str = "missionminder";

/// Config directory, `dirs::config_dir()/missionminder/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| std::env::temp_dir().join("missionminder-config"))
}

/// `config_dir()/config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
