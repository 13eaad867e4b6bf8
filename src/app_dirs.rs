//! Application directory paths for EchoMind.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/echomind/` | `~/.local/share/echomind/` |
//! | Config | `~/Library/Application Support/echomind/` | `~/.config/echomind/` |
//!
//! # Environment Overrides
//!
//! - `ECHOMIND_DATA_DIR` overrides [`data_dir`]
//! - `ECHOMIND_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Holds the local key-value storage file and logs.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ECHOMIND_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("echomind"))
        .unwrap_or_else(|| PathBuf::from("/tmp/echomind-data"))
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("ECHOMIND_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("echomind"))
        .unwrap_or_else(|| PathBuf::from("/tmp/echomind-config"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Local storage file (`data_dir()/storage.json`).
#[must_use]
pub fn storage_file() -> PathBuf {
    data_dir().join("storage.json")
}
