use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fonts::FontSource;
use crate::layout::ThemeLayout;

/// Theme root used when nothing else is configured
pub const DEFAULT_THEME_DIR: &str = "grub-theme";

/// Old Firefox identity; makes the font service answer with directly usable files
pub const LEGACY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:40.0) Gecko/20100101 Firefox/40.0";

/// Config file looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "grubtheme.json";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading or writing the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", name)
    }
}

/// Generator and verifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Root directory of the theme
    pub theme_dir: PathBuf,

    /// Font families to download, in order
    pub fonts: Vec<FontSource>,

    /// User agent sent with stylesheet requests
    pub user_agent: String,

    /// Log verbosity
    pub log_level: LogLevel,

    /// Optional log file, appended to
    pub log_file: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme_dir: PathBuf::from(DEFAULT_THEME_DIR),
            fonts: FontSource::defaults(),
            user_agent: LEGACY_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_file: None,
        }
    }
}

impl ThemeConfig {
    /// Load the first config file found, or the defaults
    ///
    /// Looks in the working directory first, then in the user config directory.
    pub fn load() -> Result<Self, ConfigError> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_path(&local);
        }
        match default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ThemeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("theme_dir is empty".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation("user_agent is empty".to_string()));
        }
        for font in &self.fonts {
            if font.family.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "font family name is empty".to_string(),
                ));
            }
            if font.family.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "font family {} contains a path separator",
                    font.family
                )));
            }
            if !font.stylesheet_url.starts_with("http://")
                && !font.stylesheet_url.starts_with("https://")
            {
                return Err(ConfigError::Validation(format!(
                    "stylesheet URL for {} is not http(s): {}",
                    font.family, font.stylesheet_url
                )));
            }
        }
        Ok(())
    }

    /// Override the theme root
    pub fn with_theme_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.theme_dir = dir.into();
        self
    }

    /// Directory layout rooted at `theme_dir`
    pub fn layout(&self) -> ThemeLayout {
        ThemeLayout::new(&self.theme_dir)
    }
}

/// Get the per-user config path
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("grubtheme").join("config.json"))
}
