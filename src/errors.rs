//! Error types for grubtheme

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rendering or writing image assets
#[derive(Debug, Error)]
pub enum AssetError {
    /// Encoding or writing an image failed
    #[error("Failed to write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Creating an output directory failed
    #[error("Failed to create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while fetching or converting a font family
#[derive(Debug, Error)]
pub enum FontError {
    /// Connection or transport failure
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Server answered with a non-success status
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Stylesheet did not declare a `src: url(...)`
    #[error("Could not find font URL for {family}")]
    MissingFontUrl { family: String },

    /// Container is structurally invalid
    #[error("Malformed font data: {0}")]
    Malformed(String),

    /// Container feature not handled by the decoder
    #[error("Unsupported font data: {0}")]
    Unsupported(String),

    /// Decoded tables were rejected by the font parser
    #[error("Converted font failed validation: {0}")]
    Invalid(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FontError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Errors that stop the verifier from producing a report
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The theme descriptor does not exist
    #[error("{} missing", .0.display())]
    DescriptorMissing(PathBuf),

    /// Reading the descriptor or a directory failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern could not be compiled
    #[error("Invalid pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
