//! Asset generation pipeline
//!
//! Runs background, selection box, icons and fonts in that order. Every stage
//! is attempted even when an earlier one failed; failures end up in the
//! [`GenerationReport`].

use std::path::PathBuf;

use crate::assets::{write_background, write_icons, write_selection_box};
use crate::errors::AssetError;
use crate::fonts::{FamilyReport, FontFetcher, FontSource, FontTransport};
use crate::layout::ThemeLayout;
use crate::logging::PerformanceLogger;

/// Results of one generator run
#[derive(Debug)]
pub struct GenerationReport {
    pub background: Result<PathBuf, AssetError>,
    pub selection: Result<Vec<PathBuf>, AssetError>,
    pub icons: Result<Vec<PathBuf>, AssetError>,
    pub fonts: Vec<FamilyReport>,
}

impl GenerationReport {
    /// All image stages succeeded; font outcomes are not considered
    pub fn images_ok(&self) -> bool {
        self.background.is_ok() && self.selection.is_ok() && self.icons.is_ok()
    }

    pub fn fonts_ok(&self) -> bool {
        self.fonts.iter().all(FamilyReport::is_success)
    }

    pub fn exit_code(&self) -> i32 {
        if self.images_ok() {
            0
        } else {
            1
        }
    }
}

/// Writes every generated asset of a theme
pub struct AssetGenerator<T: FontTransport> {
    layout: ThemeLayout,
    fonts: Vec<FontSource>,
    fetcher: FontFetcher<T>,
}

impl<T: FontTransport> AssetGenerator<T> {
    pub fn new(layout: ThemeLayout, fonts: Vec<FontSource>, transport: T) -> Self {
        let fetcher = FontFetcher::new(transport, layout.clone());
        Self {
            layout,
            fonts,
            fetcher,
        }
    }

    /// Set the user agent sent with stylesheet requests
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.fetcher = self.fetcher.with_user_agent(user_agent);
        self
    }

    pub fn generate_background(&self) -> Result<PathBuf, AssetError> {
        let perf = PerformanceLogger::new("generator", "background");
        let result = write_background(&self.layout);
        log_stage("background", &result);
        perf.finish();
        result
    }

    pub fn generate_selection_box(&self) -> Result<Vec<PathBuf>, AssetError> {
        let perf = PerformanceLogger::new("generator", "selection_box");
        let result = write_selection_box(&self.layout);
        log_stage("selection box", &result);
        perf.finish();
        result
    }

    pub fn generate_icons(&self) -> Result<Vec<PathBuf>, AssetError> {
        let perf = PerformanceLogger::new("generator", "icons");
        let result = write_icons(&self.layout);
        log_stage("icons", &result);
        perf.finish();
        result
    }

    pub fn download_fonts(&self) -> Vec<FamilyReport> {
        let perf = PerformanceLogger::new("generator", "fonts");
        let reports = self.fetcher.fetch_all(&self.fonts);
        perf.finish_with_context(&format!("{} families", reports.len()));
        reports
    }

    /// Run every stage in order
    pub fn run(&self) -> GenerationReport {
        log::info!("Generating theme assets in {}", self.layout.root().display());
        GenerationReport {
            background: self.generate_background(),
            selection: self.generate_selection_box(),
            icons: self.generate_icons(),
            fonts: self.download_fonts(),
        }
    }
}

fn log_stage<T>(stage: &str, result: &Result<T, AssetError>) {
    match result {
        Ok(_) => log::debug!("Stage {} finished", stage),
        Err(e) => log::error!("Stage {} failed: {}", stage, e),
    }
}
