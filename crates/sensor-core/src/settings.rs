//! Application settings management
//!
//! Stores server configuration in a plain JSON file. Missing fields fall
//! back to their defaults so older files keep loading.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SensorError};

/// Settings file name inside the configuration directory
const SETTINGS_FILE: &str = "settings.json";

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpSettings {
    /// Address to bind (e.g., "127.0.0.1" or "0.0.0.0")
    pub host: String,
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Outbound mail configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MailSettings {
    /// Sender address of authentication mail
    pub from_address: String,
    /// Reject every delivery (useful when no mail relay is available)
    pub fail_delivery: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from_address: "noreply@localhost".to_string(),
            fail_delivery: false,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Name reported in `serverInfo`
    pub server_name: String,
    /// Upper bound for a single tool call, in seconds
    pub tool_timeout_secs: u64,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    pub http: HttpSettings,
    pub mail: MailSettings,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            server_name: "sensor-mcp-server".to_string(),
            tool_timeout_secs: 30,
            log_level: "info".to_string(),
            http: HttpSettings::default(),
            mail: MailSettings::default(),
        }
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tool_timeout_secs == 0 {
            return Err(SensorError::InvalidSettings(
                "toolTimeoutSecs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Tool call timeout, never shorter than one second
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a settings manager for `settings.json` in `storage_dir`
    pub fn new(storage_dir: &Path) -> Result<Self> {
        Self::from_file(storage_dir.join(SETTINGS_FILE))
    }

    /// Create a settings manager backed by an explicit file
    pub fn from_file(settings_file: PathBuf) -> Result<Self> {
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    /// Platform configuration directory (e.g., ~/.config/sensor-mcp on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("io", "sensor-mcp", "sensor-mcp")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                SensorError::StorageError("Could not determine config directory".to_string())
            })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and save them
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save().await
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.settings_file
    }
}
