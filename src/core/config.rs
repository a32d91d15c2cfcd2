use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RelayError, Result};

pub const TOKEN_ENV: &str = "SYSRELAY_TOKEN";
pub const CHANNEL_ID_ENV: &str = "SYSRELAY_CHANNEL_ID";

const DEFAULT_CPU_SAMPLE_MS: u64 = 1000;

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub channel_id: String,
    /// Seconds between publish cycles
    pub interval: u64,
    /// Volume reported as disk usage (system volume when unset)
    #[serde(default)]
    pub volume: Option<PathBuf>,
    /// External space probe; replaces the native disk query when set
    #[serde(default)]
    pub disk_command: Option<Vec<String>>,
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
}

fn default_cpu_sample_ms() -> u64 {
    DEFAULT_CPU_SAMPLE_MS
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("interval", &self.interval)
            .field("volume", &self.volume)
            .field("disk_command", &self.disk_command)
            .field("cpu_sample_ms", &self.cpu_sample_ms)
            .finish()
    }
}

impl Config {
    /// Read, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;

        log::debug!("Loaded configuration from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Read and apply environment overrides without validating.
    pub fn read(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            RelayError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config = Self::from_json(&data)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| RelayError::config(format!("Invalid config JSON: {}", e)))
    }

    /// Resolve the config file: explicit path, then `./config.json`,
    /// then the platform config directory.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let local = PathBuf::from("config.json");
        if local.exists() {
            return Ok(local);
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| RelayError::config("Could not determine config directory"))?;

        Ok(config_dir.join("sysrelay").join("config.json"))
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = non_empty_env(TOKEN_ENV) {
            self.token = token;
        }
        if let Some(channel_id) = non_empty_env(CHANNEL_ID_ENV) {
            self.channel_id = channel_id;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(RelayError::config(format!(
                "`token` is required (or set {})",
                TOKEN_ENV
            )));
        }
        if self.channel_id.trim().is_empty() {
            return Err(RelayError::config(format!(
                "`channelId` is required (or set {})",
                CHANNEL_ID_ENV
            )));
        }
        if self.interval == 0 {
            return Err(RelayError::config("`interval` must be greater than 0"));
        }
        if let Some(command) = &self.disk_command {
            if command.is_empty() || command[0].trim().is_empty() {
                return Err(RelayError::config("`diskCommand` must name a program"));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
