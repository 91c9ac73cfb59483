//! Standalone verifier: `verify-theme [THEME_DIR]`, exits 0 on pass and 1 on failure

use std::process;

use anyhow::Context;
use grubtheme::{app, configure_logging, ThemeConfig};

fn main() -> anyhow::Result<()> {
    let mut config = ThemeConfig::load().context("Failed to load configuration")?;
    if let Some(dir) = std::env::args().nth(1) {
        config = config.with_theme_dir(dir);
    }
    configure_logging(config.log_level, config.log_file.clone(), true)
        .map_err(anyhow::Error::msg)?;

    process::exit(app::run_verify(&config));
}
