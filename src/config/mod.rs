//! Settings management

mod theme_config;

pub use theme_config::{ConfigError, LogLevel, ThemeConfig};
pub use theme_config::{DEFAULT_THEME_DIR, LEGACY_USER_AGENT};
