//! Command entry points shared by the binaries
//!
//! These print the user-facing progress lines on stdout and return the
//! process exit code.

use crate::config::ThemeConfig;
use crate::errors::AssetError;
use crate::fonts::{FontOutcome, UreqTransport};
use crate::generator::{AssetGenerator, GenerationReport};
use crate::verify::ThemeVerifier;

/// Generate every asset of the configured theme
///
/// Returns 1 only when an image stage failed; font problems are reported but
/// do not change the exit code.
pub fn run_generate(config: &ThemeConfig) -> i32 {
    let generator = AssetGenerator::new(config.layout(), config.fonts.clone(), UreqTransport::new())
        .with_user_agent(config.user_agent.clone());
    let report = generator.run();
    print_generation_report(&report);
    report.exit_code()
}

fn print_generation_report(report: &GenerationReport) {
    print_stage("Background", &report.background);
    print_stage("Selection box", &report.selection);
    print_stage("Icons", &report.icons);

    for family in &report.fonts {
        match &family.outcome {
            FontOutcome::Ready(path) => println!("Font {} ready: {}", family.family, path.display()),
            FontOutcome::Unconverted { path, error } => println!(
                "Conversion failed for {}: {} (kept {})",
                family.family,
                error,
                path.display()
            ),
            FontOutcome::Failed(error) => {
                println!("Error downloading {}: {}", family.family, error)
            }
        }
    }
    if !report.fonts_ok() {
        println!("Some fonts are missing; the images were still generated.");
    }
}

fn print_stage<T>(stage: &str, result: &Result<T, AssetError>) {
    match result {
        Ok(_) => println!("{} generated.", stage),
        Err(e) => eprintln!("{} failed: {}", stage, e),
    }
}

/// Verify the configured theme's `theme.txt`
pub fn run_verify(config: &ThemeConfig) -> i32 {
    let verifier = ThemeVerifier::new(config.layout());
    match verifier.verify() {
        Ok(report) if report.passed() => {
            println!("PASS: theme.txt references valid files (heuristic).");
            report.exit_code()
        }
        Ok(report) => {
            println!("FAIL: Missing referenced files:");
            for missing in &report.missing {
                println!("  - {}", missing);
            }
            report.exit_code()
        }
        Err(e) => {
            println!("FAIL: {}", e);
            1
        }
    }
}
