//! Layered radial-gradient background

use std::path::PathBuf;

use image::{Rgb, RgbImage};

use super::{ensure_dir, save_image};
use crate::errors::AssetError;
use crate::layout::ThemeLayout;

/// Background width in pixels
pub const BACKGROUND_WIDTH: u32 = 1920;
/// Background height in pixels
pub const BACKGROUND_HEIGHT: u32 = 1080;
/// Base colour under all gradients
pub const BACKGROUND_BASE: Rgb<u8> = Rgb([20, 18, 24]);

/// One radial gradient layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    /// Centre as a fraction of the canvas width
    pub center_x: f32,
    /// Centre as a fraction of the canvas height
    pub center_y: f32,
    /// Colour at full opacity
    pub color: Rgb<u8>,
    /// Radius as a fraction of the larger canvas dimension
    pub radius_factor: f32,
}

/// Gradient layers, composited in order
pub const GRADIENTS: [RadialGradient; 5] = [
    RadialGradient { center_x: 0.10, center_y: 0.10, color: Rgb([45, 42, 53]), radius_factor: 0.4 },
    RadialGradient { center_x: 0.90, center_y: 0.10, color: Rgb([54, 52, 59]), radius_factor: 0.4 },
    RadialGradient { center_x: 0.50, center_y: 0.50, color: Rgb([28, 27, 31]), radius_factor: 0.5 },
    RadialGradient { center_x: 0.85, center_y: 0.85, color: Rgb([63, 60, 69]), radius_factor: 0.4 },
    RadialGradient { center_x: 0.15, center_y: 0.85, color: Rgb([43, 41, 48]), radius_factor: 0.4 },
];

impl RadialGradient {
    /// Radius in pixels for a canvas of the given size
    pub fn radius(&self, width: u32, height: u32) -> u32 {
        (width.max(height) as f32 * self.radius_factor) as u32
    }

    /// Opacity at `distance` pixels from the centre
    fn alpha_at(distance: f32, radius: f32) -> f32 {
        if distance >= radius {
            0.0
        } else {
            1.0 - distance / radius
        }
    }

    /// Composite this layer over `canvas`
    ///
    /// Opacity falls off linearly from the centre to the radius; pixels
    /// outside the canvas are clipped.
    pub fn composite(&self, canvas: &mut RgbImage) {
        let (width, height) = canvas.dimensions();
        let radius = self.radius(width, height) as f32;
        if radius <= 0.0 {
            return;
        }
        let cx = width as f32 * self.center_x;
        let cy = height as f32 * self.center_y;

        let x_start = (cx - radius).floor().max(0.0) as u32;
        let y_start = (cy - radius).floor().max(0.0) as u32;
        let x_end = ((cx + radius).ceil().max(0.0) as u32).min(width);
        let y_end = ((cy + radius).ceil().max(0.0) as u32).min(height);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let alpha = Self::alpha_at((dx * dx + dy * dy).sqrt(), radius);
                if alpha <= 0.0 {
                    continue;
                }
                let pixel = canvas.get_pixel_mut(x, y);
                for channel in 0..3 {
                    let base = pixel.0[channel] as f32;
                    let layer = self.color.0[channel] as f32;
                    pixel.0[channel] = (layer * alpha + base * (1.0 - alpha)).round() as u8;
                }
            }
        }
    }
}

/// Render the background with every gradient layer applied
pub fn render_background() -> RgbImage {
    let mut canvas = RgbImage::from_pixel(BACKGROUND_WIDTH, BACKGROUND_HEIGHT, BACKGROUND_BASE);
    for gradient in &GRADIENTS {
        gradient.composite(&mut canvas);
    }
    canvas
}

/// Render and write `background.png`
pub fn write_background(layout: &ThemeLayout) -> Result<PathBuf, AssetError> {
    ensure_dir(layout.root())?;
    let path = layout.background_path();
    save_image(&render_background(), &path)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
