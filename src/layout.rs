//! On-disk layout of a theme directory
//!
//! Both the generator and the verifier resolve file names through
//! [`ThemeLayout`], so the names written are the names checked.

use std::path::{Path, PathBuf};

/// Background image file name
pub const BACKGROUND_FILE: &str = "background.png";
/// Theme descriptor file name
pub const DESCRIPTOR_FILE: &str = "theme.txt";
/// Icon subdirectory
pub const ICONS_DIR: &str = "icons";
/// Font subdirectory
pub const FONTS_DIR: &str = "fonts";

/// Paths inside a theme root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLayout {
    root: PathBuf,
}

impl ThemeLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn background_path(&self) -> PathBuf {
        self.root.join(BACKGROUND_FILE)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join(ICONS_DIR)
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.root.join(FONTS_DIR)
    }

    /// `icons/<name>.png`
    pub fn icon_path(&self, name: &str) -> PathBuf {
        self.icons_dir().join(format!("{}.png", name))
    }

    /// `fonts/<family>.<ext>`
    pub fn font_path(&self, family: &str, extension: &str) -> PathBuf {
        self.fonts_dir().join(format!("{}.{}", family, extension))
    }

    /// Resolve a descriptor reference relative to the root
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}
