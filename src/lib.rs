//! GRUB theme asset generator and `theme.txt` reference checker

pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod fonts;
pub mod generator;
pub mod layout;
pub mod logging;
pub mod verify;

// Re-exports for convenience
pub use config::{LogLevel, ThemeConfig};
pub use errors::{AssetError, FontError, VerifyError};
pub use fonts::{FontFetcher, FontSource, FontTransport, UreqTransport};
pub use generator::{AssetGenerator, GenerationReport};
pub use layout::ThemeLayout;
pub use logging::configure_logging;
pub use verify::{ThemeVerifier, VerificationReport};
