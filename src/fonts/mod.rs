//! Font download and conversion
//!
//! Families are fetched through a [`FontTransport`] and normalised to
//! TrueType. WOFF2 and WOFF 1.0 containers are decoded here; the result is
//! checked with `ttf-parser` before it is written.

mod binary;
pub mod fetcher;
mod glyf;
pub mod sfnt;
pub mod woff;
pub mod woff2;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FontError;

pub use fetcher::{
    extract_font_url, FamilyReport, FontFetcher, FontOutcome, FontTransport, UreqTransport,
};

/// A font family and the stylesheet that declares it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSource {
    /// Family name, also used as the file stem
    pub family: String,
    /// Stylesheet URL containing a `src: url(...)` declaration
    pub stylesheet_url: String,
}

impl FontSource {
    pub fn new(family: impl Into<String>, stylesheet_url: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            stylesheet_url: stylesheet_url.into(),
        }
    }

    /// The families a theme ships with
    pub fn defaults() -> Vec<FontSource> {
        vec![
            FontSource::new(
                "Inter",
                "https://fonts.googleapis.com/css2?family=Inter:wght@400;700",
            ),
            FontSource::new(
                "JetBrainsMono",
                "https://fonts.googleapis.com/css2?family=JetBrains+Mono:wght@400",
            ),
        ]
    }
}

/// Container format of a downloaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    Woff2,
    Woff,
    Ttf,
}

impl FontFormat {
    /// Guess the format from the download URL
    pub fn from_url(url: &str) -> Self {
        if url.contains("woff2") {
            FontFormat::Woff2
        } else if url.contains("woff") {
            FontFormat::Woff
        } else {
            FontFormat::Ttf
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "ttf",
        }
    }

    /// Whether the file has to be decoded before GRUB tooling can use it
    pub fn needs_conversion(&self) -> bool {
        !matches!(self, FontFormat::Ttf)
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Decode a compressed font container and validate the resulting tables
pub fn convert_to_truetype(data: &[u8], format: FontFormat) -> Result<Vec<u8>, FontError> {
    let sfnt = match format {
        FontFormat::Woff2 => woff2::decode_woff2(data)?,
        FontFormat::Woff => woff::decode_woff(data)?,
        FontFormat::Ttf => data.to_vec(),
    };

    let face = ttf_parser::Face::parse(&sfnt, 0).map_err(|e| FontError::Invalid(e.to_string()))?;
    log::debug!(
        "Converted {} font: {} glyphs, {} units per em",
        format,
        face.number_of_glyphs(),
        face.units_per_em()
    );
    Ok(sfnt)
}
