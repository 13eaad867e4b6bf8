//! Configuration types for the EchoMind client.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// EchoMind HTTP API settings.
    pub api: ApiConfig,
    /// Local key-value storage settings.
    pub storage: StorageConfig,
    /// UI behaviour settings.
    pub ui: UiConfig,
    /// Text-to-speech settings.
    pub speech: SpeechConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// EchoMind API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are resolved against.
    pub base_url: String,
    /// Per-request timeout in seconds. `0` disables the client-side timeout.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            request_timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    /// Request timeout, or `None` when disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage file path (None = `app_dirs::storage_file()`).
    pub path: Option<PathBuf>,
    /// Keep preferences in memory only; nothing survives a restart.
    pub ephemeral: bool,
}

impl StorageConfig {
    /// Resolved storage file path.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::app_dirs::storage_file)
    }
}

/// UI behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Seconds after which a pending busy operation is force-released.
    pub busy_failsafe_secs: u64,
    /// Language used until the user picks one.
    pub default_language: Language,
    /// Sampling temperature used until the user picks one.
    pub default_temperature: f32,
    /// Seconds between OS appearance checks (0 disables polling).
    pub system_theme_poll_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            busy_failsafe_secs: 10,
            default_language: Language::English,
            default_temperature: 0.7,
            system_theme_poll_secs: 5,
        }
    }
}

impl UiConfig {
    #[must_use]
    pub fn busy_failsafe(&self) -> Duration {
        Duration::from_secs(self.busy_failsafe_secs.max(1))
    }

    /// Interval for polling the OS appearance, if enabled.
    #[must_use]
    pub fn system_theme_poll(&self) -> Option<Duration> {
        (self.system_theme_poll_secs > 0).then(|| Duration::from_secs(self.system_theme_poll_secs))
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether TTS starts enabled when nothing is stored.
    pub enabled_by_default: bool,
    /// Synthesizer program (None = first of `espeak-ng`, `espeak`, `say` on PATH).
    pub program: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily-rotated log file under `app_dirs::logs_dir()`.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            file: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::ClientError::Config(e.to_string()))
    }

    /// Load the config at `path` if it exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> crate::error::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClientError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }
}
