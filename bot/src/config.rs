//! fwbot configuration loading and parsing

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "/etc/fwbot/config.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dbus: DbusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Who may talk to the bot and how commands are recognized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub prefix: String,
    /// Operator (developer) ids allowed to run commands.
    #[serde(default)]
    pub devs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbusConfig {
    #[serde(default)]
    pub bus: BusKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

// Default value functions
fn default_log_level() -> String { "info".into() }
fn default_listen_addr() -> String { "127.0.0.1:8085".into() }

impl BotConfig {
    /// Apply `FWBOT_PREFIX` / `FWBOT_DEVS` style overrides.
    ///
    /// `devs` is a JSON array of operator ids, e.g. `["1234", "5678"]`.
    pub fn apply_overrides(&mut self, prefix: Option<String>, devs: Option<String>) -> Result<()> {
        if let Some(prefix) = prefix {
            self.chat.prefix = prefix;
        }
        if let Some(devs) = devs {
            self.chat.devs = serde_json::from_str(&devs)
                .with_context(|| format!("FWBOT_DEVS must be a JSON array of ids, got {devs}"))?;
        }
        Ok(())
    }

    /// Reject configurations the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chat.prefix.trim().is_empty() {
            bail!("chat.prefix must be a non-empty string (set it in the config file or FWBOT_PREFIX)");
        }
        if self.chat.devs.is_empty() {
            tracing::warn!("No developers have been specified, every command will be ignored");
        }
        Ok(())
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file did not exist; built-in defaults were used.
    Defaults(PathBuf),
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
///
/// Runs before logging is up, so the caller reports the [`ConfigSource`].
pub fn load_config_from(path: &Path) -> Result<(BotConfig, ConfigSource)> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: BotConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    } else {
        Ok((BotConfig::default(), ConfigSource::Defaults(path.to_path_buf())))
    }
}

/// Load configuration from $FWBOT_CONFIG (default /etc/fwbot/config.toml)
/// and apply environment overrides.
pub fn load_config() -> Result<(BotConfig, ConfigSource)> {
    let config_path =
        std::env::var("FWBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let (mut config, source) = load_config_from(Path::new(&config_path))?;
    config.apply_overrides(
        std::env::var("FWBOT_PREFIX").ok(),
        std::env::var("FWBOT_DEVS").ok(),
    )?;
    Ok((config, source))
}
