//! Image asset generation

pub mod background;
pub mod canvas;
pub mod icons;
pub mod selection;

use std::fs;
use std::path::Path;

use image::{ImageBuffer, ImageFormat, Pixel, PixelWithColorType};

use crate::errors::AssetError;

pub use background::{render_background, write_background};
pub use icons::{render_icon, write_icons, Glyph, ICONS, ICON_SIZE};
pub use selection::{render_selection_box, slice_selection_box, write_selection_box, Slice};

/// Create `dir` and its parents if missing
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), AssetError> {
    fs::create_dir_all(dir).map_err(|source| AssetError::Directory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Encode `img` as PNG at `path`, replacing any existing file
pub(crate) fn save_image<P>(img: &ImageBuffer<P, Vec<u8>>, path: &Path) -> Result<(), AssetError>
where
    P: Pixel<Subpixel = u8> + PixelWithColorType,
{
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })
}
