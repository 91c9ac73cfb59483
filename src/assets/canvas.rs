//! Minimal vector drawing on RGBA bitmaps
//!
//! Shapes use continuous coordinates; a pixel is painted when its centre
//! `(x + 0.5, y + 0.5)` falls inside the shape. Painting replaces the
//! pixel rather than blending, so the result is fully deterministic.

use image::{Rgba, RgbaImage};

/// Axis-aligned bounds `(x0, y0, x1, y1)`
pub type Bounds = (f32, f32, f32, f32);

/// A point in canvas coordinates
pub type Point = (f32, f32);

/// A drawing surface over an [`RgbaImage`]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Create a fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Paint every pixel within `bounds` whose centre satisfies `inside`
    fn fill_where<F>(&mut self, bounds: Bounds, color: Rgba<u8>, inside: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let (x0, y0, x1, y1) = bounds;
        let start_x = x0.floor().max(0.0) as u32;
        let start_y = y0.floor().max(0.0) as u32;
        let end_x = (x1.ceil().max(0.0) as u32).min(self.image.width());
        let end_y = (y1.ceil().max(0.0) as u32).min(self.image.height());

        for py in start_y..end_y {
            for px in start_x..end_x {
                if inside(px as f32 + 0.5, py as f32 + 0.5) {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }

    /// Fill an axis-aligned rectangle
    pub fn fill_rect(&mut self, bounds: Bounds, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = bounds;
        self.fill_where(bounds, color, |x, y| {
            x >= x0 && x <= x1 && y >= y0 && y <= y1
        });
    }

    /// Fill a polygon using the even-odd rule
    pub fn fill_polygon(&mut self, points: &[Point], color: Rgba<u8>) {
        if points.len() < 3 {
            return;
        }
        let bounds = points_bounds(points, 0.0);
        self.fill_where(bounds, color, |x, y| point_in_polygon(points, x, y));
    }

    /// Stroke a polyline; segments have round ends so joints close
    pub fn line(&mut self, points: &[Point], width: f32, color: Rgba<u8>) {
        let half = width / 2.0;
        for segment in points.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let bounds = points_bounds(&[a, b], half);
            self.fill_where(bounds, color, |x, y| {
                distance_to_segment((x, y), a, b) <= half
            });
        }
    }

    /// Fill the ellipse inscribed in `bounds`
    pub fn fill_ellipse(&mut self, bounds: Bounds, color: Rgba<u8>) {
        let ellipse = Ellipse::inscribed(bounds);
        self.fill_where(bounds, color, |x, y| ellipse.contains(x, y, 0.0));
    }

    /// Stroke the outline of the ellipse inscribed in `bounds`, inward
    pub fn stroke_ellipse(&mut self, bounds: Bounds, width: f32, color: Rgba<u8>) {
        let ellipse = Ellipse::inscribed(bounds);
        self.fill_where(bounds, color, |x, y| ellipse.on_ring(x, y, width));
    }

    /// Stroke an elliptical arc
    ///
    /// Angles are in degrees, measured clockwise from three o'clock, and the
    /// arc runs from `start` to `end`.
    pub fn stroke_arc(&mut self, bounds: Bounds, start: f32, end: f32, width: f32, color: Rgba<u8>) {
        let ellipse = Ellipse::inscribed(bounds);
        let sweep = end - start;
        self.fill_where(bounds, color, |x, y| {
            if !ellipse.on_ring(x, y, width) {
                return false;
            }
            if sweep >= 360.0 {
                return true;
            }
            let angle = (y - ellipse.cy).atan2(x - ellipse.cx).to_degrees();
            (angle - start).rem_euclid(360.0) <= sweep
        });
    }

    /// Draw a rounded rectangle with an optional fill and inward outline
    pub fn rounded_rect(
        &mut self,
        bounds: Bounds,
        radius: f32,
        fill: Option<Rgba<u8>>,
        outline: Option<(Rgba<u8>, f32)>,
    ) {
        let outer = RoundedRect::new(bounds, radius);
        if let Some(color) = fill {
            self.fill_where(bounds, color, |x, y| outer.contains(x, y));
        }
        if let Some((color, width)) = outline {
            let inner = outer.inset(width);
            self.fill_where(bounds, color, |x, y| {
                outer.contains(x, y) && !inner.contains(x, y)
            });
        }
    }
}

struct Ellipse {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
}

impl Ellipse {
    fn inscribed(bounds: Bounds) -> Self {
        let (x0, y0, x1, y1) = bounds;
        Self {
            cx: (x0 + x1) / 2.0,
            cy: (y0 + y1) / 2.0,
            rx: (x1 - x0) / 2.0,
            ry: (y1 - y0) / 2.0,
        }
    }

    /// Whether the point lies inside the ellipse shrunk by `inset` on each axis
    fn contains(&self, x: f32, y: f32, inset: f32) -> bool {
        let rx = self.rx - inset;
        let ry = self.ry - inset;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (x - self.cx) / rx;
        let ny = (y - self.cy) / ry;
        nx * nx + ny * ny <= 1.0
    }

    fn on_ring(&self, x: f32, y: f32, width: f32) -> bool {
        self.contains(x, y, 0.0) && !self.contains(x, y, width)
    }
}

struct RoundedRect {
    cx: f32,
    cy: f32,
    half_w: f32,
    half_h: f32,
    radius: f32,
}

impl RoundedRect {
    fn new(bounds: Bounds, radius: f32) -> Self {
        let (x0, y0, x1, y1) = bounds;
        let half_w = (x1 - x0) / 2.0;
        let half_h = (y1 - y0) / 2.0;
        Self {
            cx: (x0 + x1) / 2.0,
            cy: (y0 + y1) / 2.0,
            half_w,
            half_h,
            radius: radius.min(half_w).min(half_h).max(0.0),
        }
    }

    fn inset(&self, by: f32) -> Self {
        Self {
            cx: self.cx,
            cy: self.cy,
            half_w: self.half_w - by,
            half_h: self.half_h - by,
            radius: (self.radius - by).max(0.0),
        }
    }

    /// Signed distance test; zero or negative is inside
    fn contains(&self, x: f32, y: f32) -> bool {
        if self.half_w <= 0.0 || self.half_h <= 0.0 {
            return false;
        }
        let qx = (x - self.cx).abs() - (self.half_w - self.radius);
        let qy = (y - self.cy).abs() - (self.half_h - self.radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius <= 0.0
    }
}

fn points_bounds(points: &[Point], pad: f32) -> Bounds {
    let mut bounds = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for &(x, y) in points {
        bounds.0 = bounds.0.min(x - pad);
        bounds.1 = bounds.1.min(y - pad);
        bounds.2 = bounds.2.max(x + pad);
        bounds.3 = bounds.3.max(y + pad);
    }
    bounds
}

fn point_in_polygon(points: &[Point], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (nx, ny) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - nx).powi(2) + (p.1 - ny).powi(2)).sqrt()
}
