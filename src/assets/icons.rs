//! Monochrome menu icons
//!
//! Every glyph is drawn with coordinates expressed as fractions of the
//! canvas size, so changing [`ICON_SIZE`] rescales the whole set.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use super::canvas::Canvas;
use super::{ensure_dir, save_image};
use crate::errors::AssetError;
use crate::layout::ThemeLayout;

/// Icon edge length in pixels
pub const ICON_SIZE: u32 = 48;

const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Drawing routines available to icons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Prompt arrow with an underscore
    Terminal,
    /// Four square panes
    Windows,
    /// Gear inside a ring
    Uefi,
    /// Power symbol
    Shutdown,
}

/// Icon file names and the glyph each one uses
///
/// `os_*` entries are the generic fallbacks the menu shows for an OS class
/// and reuse the matching `type_*` glyph.
pub const ICONS: [(&str, Glyph); 6] = [
    ("type_linux", Glyph::Terminal),
    ("type_windows", Glyph::Windows),
    ("type_uefi", Glyph::Uefi),
    ("type_shutdown", Glyph::Shutdown),
    ("os_linux", Glyph::Terminal),
    ("os_windows", Glyph::Windows),
];

impl Glyph {
    fn draw(&self, canvas: &mut Canvas) {
        let s = canvas.width() as f32;
        match self {
            Glyph::Terminal => draw_terminal(canvas, s),
            Glyph::Windows => draw_windows(canvas, s),
            Glyph::Uefi => draw_uefi(canvas, s),
            Glyph::Shutdown => draw_shutdown(canvas, s),
        }
    }
}

fn draw_terminal(canvas: &mut Canvas, s: f32) {
    let chevron = [(s * 0.2, s * 0.2), (s * 0.5, s * 0.5), (s * 0.2, s * 0.8)];
    canvas.fill_polygon(&chevron, INK);
    canvas.line(&chevron, 4.0, INK);
    canvas.line(&[(s * 0.55, s * 0.8), (s * 0.8, s * 0.8)], 4.0, INK);
}

fn draw_windows(canvas: &mut Canvas, s: f32) {
    let m = s * 0.1;
    let h = s / 2.0;
    canvas.fill_rect((m, m, h - 2.0, h - 2.0), INK);
    canvas.fill_rect((h + 2.0, m, s - m, h - 2.0), INK);
    canvas.fill_rect((m, h + 2.0, h - 2.0, s - m), INK);
    canvas.fill_rect((h + 2.0, h + 2.0, s - m, s - m), INK);
}

fn draw_uefi(canvas: &mut Canvas, s: f32) {
    canvas.stroke_ellipse((s * 0.2, s * 0.2, s * 0.8, s * 0.8), 4.0, INK);
    canvas.fill_ellipse((s * 0.4, s * 0.4, s * 0.6, s * 0.6), INK);

    // Eight teeth on the gear rim
    let centre = s / 2.0;
    let (inner, outer, half_width) = (s * 0.28, s * 0.35, s * 0.05);
    for step in 0..8 {
        let angle = (step as f32 * 45.0).to_radians();
        let (dx, dy) = (angle.cos(), angle.sin());
        let (px, py) = (-dy * half_width, dx * half_width);
        let tooth = [
            (centre + dx * inner + px, centre + dy * inner + py),
            (centre + dx * outer + px, centre + dy * outer + py),
            (centre + dx * outer - px, centre + dy * outer - py),
            (centre + dx * inner - px, centre + dy * inner - py),
        ];
        canvas.fill_polygon(&tooth, INK);
    }

    canvas.stroke_ellipse((s * 0.1, s * 0.1, s * 0.9, s * 0.9), 2.0, INK);
}

fn draw_shutdown(canvas: &mut Canvas, s: f32) {
    canvas.stroke_arc((s * 0.1, s * 0.1, s * 0.9, s * 0.9), -60.0, 240.0, 4.0, INK);
    canvas.line(&[(s * 0.5, s * 0.1), (s * 0.5, s * 0.5)], 4.0, INK);
}

/// Draw `glyph` on a transparent square canvas
pub fn render_icon(glyph: Glyph, size: u32) -> RgbaImage {
    let mut canvas = Canvas::new(size, size);
    glyph.draw(&mut canvas);
    canvas.into_image()
}

/// Render and write every entry of [`ICONS`] into `icons/`
pub fn write_icons(layout: &ThemeLayout) -> Result<Vec<PathBuf>, AssetError> {
    ensure_dir(&layout.icons_dir())?;

    let mut written = Vec::with_capacity(ICONS.len());
    for (name, glyph) in ICONS {
        let path = layout.icon_path(name);
        save_image(&render_icon(glyph, ICON_SIZE), &path)?;
        log::debug!("Wrote icon {} ({:?})", name, glyph);
        written.push(path);
    }
    log::info!("Wrote {} icons", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_count(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[3] != 0).count()
    }

    #[test]
    fn test_every_glyph_draws_something() {
        for glyph in [Glyph::Terminal, Glyph::Windows, Glyph::Uefi, Glyph::Shutdown] {
            let img = render_icon(glyph, ICON_SIZE);
            assert_eq!(img.dimensions(), (48, 48));
            let ink = ink_count(&img);
            assert!(ink > 0 && ink < 48 * 48, "{:?} drew {} pixels", glyph, ink);
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        for glyph in [Glyph::Terminal, Glyph::Uefi] {
            assert_eq!(render_icon(glyph, ICON_SIZE), render_icon(glyph, ICON_SIZE));
        }
    }

    #[test]
    fn test_background_stays_transparent() {
        let img = render_icon(Glyph::Windows, ICON_SIZE);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        // Gap between the panes
        assert_eq!(img.get_pixel(24, 10).0[3], 0);
        assert_eq!(*img.get_pixel(10, 10), INK);
    }

    #[test]
    fn test_shutdown_has_gap_beside_bar() {
        let img = render_icon(Glyph::Shutdown, ICON_SIZE);
        // Bar at the top centre
        assert_eq!(*img.get_pixel(24, 6), INK);
        // Ring is open either side of the bar
        assert_eq!(img.get_pixel(16, 6).0[3], 0);
        // Ring is closed at the bottom
        assert_eq!(*img.get_pixel(24, 42), INK);
    }

    #[test]
    fn test_aliases_share_glyphs() {
        let lookup = |name: &str| ICONS.iter().find(|(n, _)| *n == name).map(|(_, g)| *g);
        assert_eq!(lookup("os_linux"), lookup("type_linux"));
        assert_eq!(lookup("os_windows"), lookup("type_windows"));
    }
}
