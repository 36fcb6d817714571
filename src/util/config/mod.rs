//! replchain configuration system
//!
//! A single user-level TOML file; every section and field has a default, so a missing
//! or partial file is never an error.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments (--config, --verbose)
//! 2. User-level ($XDG_CONFIG_HOME/replchain/config.toml or ~/.config/replchain/config.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use replchain::util::config::{load_user_config, UserConfiguration};
//!
//! let config = load_user_config().unwrap_or_default();
//! assert!(!config.repl.prompt.is_empty());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::util::logger::LogLevel;

/// User-level configuration for replchain
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserConfiguration {
    /// Color theme
    #[serde(default)]
    pub theme: ThemeConfig,
    /// REPL settings
    #[serde(default)]
    pub repl: ReplConfig,
    /// Default reference set additions
    #[serde(default)]
    pub references: ReferenceConfig,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

/// 24-bit color, written as `#RRGGBB` in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(
        r: u8,
        g: u8,
        b: u8,
    ) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{}', expected #RRGGBB", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Theme colors used by the highlighter and the configuration-loaded event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: Color,
    pub foreground: Color,
    pub keyword: Color,
    pub type_name: Color,
    pub method: Color,
    pub property: Color,
    pub variable: Color,
    pub number: Color,
    pub string: Color,
    pub comment: Color,
    pub directive: Color,
    pub operator: Color,
    pub punctuation: Color,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x1E, 0x1E, 0x1E),
            foreground: Color::rgb(0xD4, 0xD4, 0xD4),
            keyword: Color::rgb(0x56, 0x9C, 0xD6),
            type_name: Color::rgb(0x4E, 0xC9, 0xB0),
            method: Color::rgb(0xDC, 0xDC, 0xAA),
            property: Color::rgb(0x9C, 0xDC, 0xFE),
            variable: Color::rgb(0x9C, 0xDC, 0xFE),
            number: Color::rgb(0xB5, 0xCE, 0xA8),
            string: Color::rgb(0xCE, 0x91, 0x78),
            comment: Color::rgb(0x6A, 0x99, 0x55),
            directive: Color::rgb(0x9B, 0x9B, 0x9B),
            operator: Color::rgb(0xD4, 0xD4, 0xD4),
            punctuation: Color::rgb(0xD4, 0xD4, 0xD4),
        }
    }
}

/// REPL configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplConfig {
    /// Prompt string
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// History file path
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// Maximum history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Interpreter step budget per evaluation
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_history_size() -> usize {
    1000
}

fn default_max_steps() -> u64 {
    1_000_000
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            history_file: None,
            history_size: default_history_size(),
            max_steps: default_max_steps(),
        }
    }
}

/// Additions to the default reference set
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReferenceConfig {
    /// Extra libraries referenced by every line
    #[serde(default)]
    pub extra: Vec<String>,
    /// Extra namespaces imported by every line
    #[serde(default)]
    pub usings: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("replchain"));
    }

    // Fallback to ~/.config/replchain
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("replchain"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("replchain"));
    }

    None
}

/// Get the user config file path (~/.config/replchain/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<UserConfiguration, ConfigError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfiguration::default()),
    }
}

/// Load configuration from an explicit path; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<UserConfiguration, ConfigError> {
    if !path.exists() {
        return Ok(UserConfiguration::default());
    }

    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Save configuration to an explicit path, creating parent directories
pub fn save_config_to(
    config: &UserConfiguration,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(ConfigError::Io)?;
        }
    }

    let content = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    fs::write(path, content).map_err(ConfigError::Io)?;

    Ok(())
}

/// Save user-level configuration
pub fn save_user_config(config: &UserConfiguration) -> Result<(), ConfigError> {
    let path = get_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_config_to(config, &path)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(toml::de::Error),
    #[error("Config serialize error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Cannot determine config directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests;
