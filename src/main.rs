use std::process;

use anyhow::Context;
use grubtheme::{app, configure_logging, ThemeConfig};

fn print_usage() {
    println!("Usage: grubtheme <command> [THEME_DIR]");
    println!();
    println!("Commands:");
    println!("  generate   Write background, selection box, icons and fonts");
    println!("  verify     Check that theme.txt references existing files");
    println!("  help       Show this message");
}

/// Load the config and apply the optional THEME_DIR argument
fn load_config(theme_dir: Option<&String>) -> anyhow::Result<ThemeConfig> {
    let mut config = ThemeConfig::load().context("Failed to load configuration")?;
    if let Some(dir) = theme_dir {
        config = config.with_theme_dir(dir);
    }
    configure_logging(config.log_level, config.log_file.clone(), true)
        .map_err(anyhow::Error::msg)
        .context("Failed to initialize logging")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let code = match args.get(1).map(String::as_str) {
        Some("generate") => app::run_generate(&load_config(args.get(2))?),
        Some("verify") => app::run_verify(&load_config(args.get(2))?),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            0
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            2
        }
        None => {
            print_usage();
            2
        }
    };

    process::exit(code);
}
