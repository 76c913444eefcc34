//! # Drawing Surface
//!
//! An RGBA pixel buffer with the handful of primitives the scenes need:
//! filled circles, polygons (rectangle, triangle, rhombus, star) and stroked
//! segments, all alpha-blended.
//!
//! Scene code draws in canvas coordinates. The surface applies one view
//! transform, rotation and zoom around the canvas center, to every
//! primitive, and runs every fill color through the current [`Tint`].

use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point};

use crate::config::CanvasConfig;
use crate::params::{ShapeKind, Tint};
use crate::shader::{apply_tint, regular_polygon, rotate, star, to_rgba8};

/// Background every clear and fade returns to.
pub const BACKGROUND: Rgba<u8> = Rgba([10, 10, 16, 255]);

/// RGBA drawing surface.
///
/// Shapes are placed through the view transform (rotation and zoom about the
/// center) and every fill color passes through the active tint.
pub struct Surface {
    pixels: RgbaImage,
    view: Affine,
    zoom: f32,
    tint: Tint,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND),
            view: Affine::IDENTITY,
            zoom: 1.0,
            tint: Tint::NONE,
        }
    }

    /// Surface sized from a live size with the config's fallbacks.
    pub fn for_config(config: &CanvasConfig, live: Option<(u32, u32)>) -> Self {
        let (w, h) = config.resolve_size(live, None);
        Self::new(w, h)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reallocate for a new live size. Returns the size in effect.
    ///
    /// Contents are discarded when the size changes.
    pub fn resize(&mut self, config: &CanvasConfig, live: Option<(u32, u32)>) -> (u32, u32) {
        let current = (self.width(), self.height());
        let next = config.resolve_size(live, Some(current));
        if next != current {
            self.pixels = RgbaImage::from_pixel(next.0, next.1, BACKGROUND);
        }
        next
    }

    /// Set rotation (degrees) and zoom around the canvas center.
    pub fn set_view(&mut self, rotation_deg: f32, zoom: f32) {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        let center = (self.width() as f64 / 2.0, self.height() as f64 / 2.0);
        self.view = Affine::translate(center)
            * Affine::rotate((rotation_deg as f64).to_radians())
            * Affine::scale(zoom as f64)
            * Affine::translate((-center.0, -center.1));
        self.zoom = zoom;
    }

    pub fn set_tint(&mut self, tint: Tint) {
        self.tint = tint;
    }

    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = BACKGROUND;
        }
    }

    /// Fade toward the background, keeping `motion_blur` of the previous frame.
    ///
    /// 0.0 clears completely.
    pub fn fade(&mut self, motion_blur: f32) {
        let keep = motion_blur.clamp(0.0, 1.0);
        if keep <= 0.0 {
            self.clear();
            return;
        }
        let bg = BACKGROUND.0;
        for p in self.pixels.pixels_mut() {
            for c in 0..3 {
                let v = bg[c] as f32 + (p.0[c] as f32 - bg[c] as f32) * keep;
                p.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            p.0[3] = 255;
        }
    }

    fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.view * Point::new(x as f64, y as f64);
        (p.x as f32, p.y as f32)
    }

    fn paint(&self, rgb: [f32; 3], alpha: f32) -> Rgba<u8> {
        to_rgba8(apply_tint(rgb, &self.tint), alpha)
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let a = (color.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let v = dst.0[c] as f32 * (1.0 - a) + color.0[c] as f32 * a;
            dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = 255;
    }

    /// Pixel bounds of a device-space box, clipped to the surface.
    fn clip(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<(i64, i64, i64, i64)> {
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let x0 = (min_x.floor() as i64).max(0);
        let y0 = (min_y.floor() as i64).max(0);
        let x1 = (max_x.ceil() as i64).min(self.width() as i64 - 1);
        let y1 = (max_y.ceil() as i64).min(self.height() as i64 - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, rgb: [f32; 3], alpha: f32) {
        let (dx, dy) = self.to_device(cx, cy);
        let r = radius * self.zoom;
        if r <= 0.0 {
            return;
        }
        let color = self.paint(rgb, alpha);
        let Some((x0, y0, x1, y1)) =
            self.clip(dx - r - 1.0, dy - r - 1.0, dx + r + 1.0, dy + r + 1.0)
        else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = x as f32 + 0.5 - dx;
                let py = y as f32 + 0.5 - dy;
                let d = (px * px + py * py).sqrt();
                // one pixel of edge falloff
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Fill a polygon given in canvas coordinates (even-odd rule).
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], rgb: [f32; 3], alpha: f32) {
        if points.len() < 3 {
            return;
        }
        let device: Vec<(f32, f32)> = points.iter().map(|&(x, y)| self.to_device(x, y)).collect();
        if device.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return;
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in &device {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let Some((x0, y0, x1, y1)) = self.clip(min_x, min_y, max_x, max_y) else {
            return;
        };
        let color = self.paint(rgb, alpha);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, &device) {
                    self.blend_pixel(x, y, color, 1.0);
                }
            }
        }
    }

    /// Stroke a segment of the given width.
    pub fn stroke_segment(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        rgb: [f32; 3],
        alpha: f32,
    ) {
        let a = self.to_device(from.0, from.1);
        let b = self.to_device(to.0, to.1);
        let half = (width * self.zoom / 2.0).max(0.5);
        let Some((x0, y0, x1, y1)) = self.clip(
            a.0.min(b.0) - half - 1.0,
            a.1.min(b.1) - half - 1.0,
            a.0.max(b.0) + half + 1.0,
            a.1.max(b.1) + half + 1.0,
        ) else {
            return;
        };
        let color = self.paint(rgb, alpha);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = distance_to_segment((x as f32 + 0.5, y as f32 + 0.5), a, b);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Draw one primitive of `kind` centered on (cx, cy) with radius `size`.
    pub fn fill_shape(
        &mut self,
        kind: ShapeKind,
        (cx, cy): (f32, f32),
        size: f32,
        spin: f32,
        rgb: [f32; 3],
        alpha: f32,
    ) {
        let outline = match kind {
            ShapeKind::Circle => return self.fill_circle(cx, cy, size, rgb, alpha),
            ShapeKind::Rectangle => {
                let half_height = size * 0.6;
                [
                    (-size, -half_height),
                    (size, -half_height),
                    (size, half_height),
                    (-size, half_height),
                ]
                .map(|(x, y)| {
                    let (rx, ry) = rotate(x, y, spin);
                    (cx + rx, cy + ry)
                })
                .to_vec()
            }
            ShapeKind::Triangle => regular_polygon(cx, cy, size, 3, spin),
            ShapeKind::Rhombus => regular_polygon(cx, cy, size, 4, spin),
            ShapeKind::Star => star(cx, cy, size, size * 0.45, 5, spin),
        };
        self.fill_polygon(&outline, rgb, alpha);
    }
}

fn point_in_polygon(x: f32, y: f32, poly: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (qx, qy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}
