//! 9-slice selection box
//!
//! A translucent rounded rectangle drawn on a canvas three corner radii
//! wide, then cut into four corners, four edges and a centre so the theme
//! renderer can stretch it to any menu entry size.

use std::fmt;
use std::path::PathBuf;

use image::{imageops, Rgba, RgbaImage};

use super::canvas::Canvas;
use super::{ensure_dir, save_image};
use crate::errors::AssetError;
use crate::layout::ThemeLayout;

/// Corner radius in pixels
pub const CORNER_RADIUS: u32 = 32;
/// Side length of the source canvas
pub const CANVAS_SIZE: u32 = CORNER_RADIUS * 3;
/// Translucent fill
pub const FILL_COLOR: Rgba<u8> = Rgba([208, 188, 255, 25]);
/// Semi-opaque border
pub const BORDER_COLOR: Rgba<u8> = Rgba([208, 188, 255, 128]);
/// Border width in pixels
pub const BORDER_WIDTH: f32 = 1.0;

/// One of the nine regions of the selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Nw,
    N,
    Ne,
    W,
    C,
    E,
    Sw,
    S,
    Se,
}

impl Slice {
    /// All slices in row-major order
    pub const ALL: [Slice; 9] = [
        Slice::Nw,
        Slice::N,
        Slice::Ne,
        Slice::W,
        Slice::C,
        Slice::E,
        Slice::Sw,
        Slice::S,
        Slice::Se,
    ];

    /// Suffix used in the file name
    pub fn id(&self) -> &'static str {
        match self {
            Slice::Nw => "nw",
            Slice::N => "n",
            Slice::Ne => "ne",
            Slice::W => "w",
            Slice::C => "c",
            Slice::E => "e",
            Slice::Sw => "sw",
            Slice::S => "s",
            Slice::Se => "se",
        }
    }

    /// `selection_<id>.png`
    pub fn file_name(&self) -> String {
        format!("selection_{}.png", self.id())
    }

    pub fn is_corner(&self) -> bool {
        matches!(self, Slice::Nw | Slice::Ne | Slice::Sw | Slice::Se)
    }

    fn column(&self) -> usize {
        match self {
            Slice::Nw | Slice::W | Slice::Sw => 0,
            Slice::N | Slice::C | Slice::S => 1,
            Slice::Ne | Slice::E | Slice::Se => 2,
        }
    }

    fn row(&self) -> usize {
        match self {
            Slice::Nw | Slice::N | Slice::Ne => 0,
            Slice::W | Slice::C | Slice::E => 1,
            Slice::Sw | Slice::S | Slice::Se => 2,
        }
    }

    /// Crop rectangle `(x, y, width, height)` in a `width` x `height` image
    ///
    /// Corners take a third of each side; the middle band takes the rest.
    pub fn rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (x, w) = third_band(width, self.column());
        let (y, h) = third_band(height, self.row());
        (x, y, w, h)
    }
}

/// Offset and span of band `index` when `len` is cut into three
fn third_band(len: u32, index: usize) -> (u32, u32) {
    let edge = len / 3;
    match index {
        0 => (0, edge),
        1 => (edge, len - 2 * edge),
        _ => (len - edge, edge),
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Draw the full, unsliced selection box
pub fn render_selection_box() -> RgbaImage {
    let mut canvas = Canvas::new(CANVAS_SIZE, CANVAS_SIZE);
    let size = CANVAS_SIZE as f32;
    canvas.rounded_rect(
        (0.0, 0.0, size, size),
        CORNER_RADIUS as f32,
        Some(FILL_COLOR),
        Some((BORDER_COLOR, BORDER_WIDTH)),
    );
    canvas.into_image()
}

/// Cut a rendered box into its nine regions
pub fn slice_selection_box(img: &RgbaImage) -> Vec<(Slice, RgbaImage)> {
    let (width, height) = img.dimensions();
    Slice::ALL
        .iter()
        .map(|slice| {
            let (x, y, w, h) = slice.rect(width, height);
            (*slice, imageops::crop_imm(img, x, y, w, h).to_image())
        })
        .collect()
}

/// Render, slice and write all nine `selection_*.png` files
pub fn write_selection_box(layout: &ThemeLayout) -> Result<Vec<PathBuf>, AssetError> {
    ensure_dir(layout.root())?;
    let source = render_selection_box();

    let mut written = Vec::with_capacity(Slice::ALL.len());
    for (slice, img) in slice_selection_box(&source) {
        let path = layout.root().join(slice.file_name());
        save_image(&img, &path)?;
        log::debug!("Wrote selection slice {} ({}x{})", slice, img.width(), img.height());
        written.push(path);
    }
    log::info!("Wrote {} selection slices", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_reassemble_canvas() {
        let slices = slice_selection_box(&render_selection_box());
        assert_eq!(slices.len(), 9);

        let top_row: u32 = slices[0..3].iter().map(|(_, img)| img.width()).sum();
        let left_column: u32 = [0, 3, 6].iter().map(|&i| slices[i].1.height()).sum();
        assert_eq!(top_row, CANVAS_SIZE);
        assert_eq!(left_column, CANVAS_SIZE);

        for (slice, img) in &slices {
            assert_eq!(img.dimensions(), (32, 32), "slice {}", slice);
        }
    }

    #[test]
    fn test_slice_rects_tile_without_overlap() {
        let mut covered = vec![0u8; (CANVAS_SIZE * CANVAS_SIZE) as usize];
        for slice in Slice::ALL {
            let (x, y, w, h) = slice.rect(CANVAS_SIZE, CANVAS_SIZE);
            for yy in y..y + h {
                for xx in x..x + w {
                    covered[(yy * CANVAS_SIZE + xx) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_small_image_slices_by_thirds() {
        let img = RgbaImage::new(30, 20);
        let slices = slice_selection_box(&img);
        let size_of = |wanted: Slice| slices.iter().find(|(s, _)| *s == wanted).unwrap().1.dimensions();

        assert_eq!(size_of(Slice::Nw), (10, 6));
        assert_eq!(size_of(Slice::C), (10, 8));
        assert_eq!(size_of(Slice::Se), (10, 6));

        // Degenerate sizes give empty slices instead of panicking
        assert!(slice_selection_box(&RgbaImage::new(2, 1))
            .iter()
            .all(|(_, img)| img.width() <= 2 && img.height() <= 1));
    }

    #[test]
    fn test_centre_is_uniform_fill() {
        let slices = slice_selection_box(&render_selection_box());
        let (_, centre) = slices.iter().find(|(s, _)| *s == Slice::C).unwrap();
        assert!(centre.pixels().all(|p| *p == FILL_COLOR));
    }

    #[test]
    fn test_corners_are_rounded() {
        let slices = slice_selection_box(&render_selection_box());
        for (slice, img) in slices.iter().filter(|(s, _)| s.is_corner()) {
            let (x, y) = match slice {
                Slice::Nw => (0, 0),
                Slice::Ne => (31, 0),
                Slice::Sw => (0, 31),
                _ => (31, 31),
            };
            assert_eq!(img.get_pixel(x, y).0[3], 0, "outer corner of {} must be clear", slice);
            assert_ne!(img.get_pixel(31 - x, 31 - y).0[3], 0);
        }
    }

    #[test]
    fn test_edges_have_border_on_outer_side() {
        let slices = slice_selection_box(&render_selection_box());
        let (_, north) = slices.iter().find(|(s, _)| *s == Slice::N).unwrap();
        for x in 0..32 {
            assert_eq!(*north.get_pixel(x, 0), BORDER_COLOR);
            assert_eq!(*north.get_pixel(x, 1), FILL_COLOR);
        }
    }

    #[test]
    fn test_file_names() {
        let names: Vec<String> = Slice::ALL.iter().map(|s| s.file_name()).collect();
        assert_eq!(names[0], "selection_nw.png");
        assert_eq!(names[4], "selection_c.png");
        assert_eq!(names[8], "selection_se.png");
    }
}
