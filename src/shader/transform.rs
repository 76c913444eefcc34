//! Coordinate transforms and shape outlines.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Rotate a point around the origin (radians, counter-clockwise).
#[inline]
pub fn rotate(x: f32, y: f32, angle: f32) -> (f32, f32) {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    (x * cos_a - y * sin_a, x * sin_a + y * cos_a)
}

/// Convert polar coordinates to Cartesian.
#[inline]
pub fn polar_to_cart(r: f32, theta: f32) -> (f32, f32) {
    (r * theta.cos(), r * theta.sin())
}

/// Vertices of a regular polygon centered on (cx, cy), first vertex pointing up.
pub fn regular_polygon(cx: f32, cy: f32, radius: f32, sides: usize, spin: f32) -> Vec<(f32, f32)> {
    let sides = sides.max(3);
    (0..sides)
        .map(|i| {
            let theta = spin - FRAC_PI_2 + TAU * i as f32 / sides as f32;
            let (dx, dy) = polar_to_cart(radius, theta);
            (cx + dx, cy + dy)
        })
        .collect()
}

/// Vertices of a star alternating between outer and inner radius.
pub fn star(cx: f32, cy: f32, outer: f32, inner: f32, points: usize, spin: f32) -> Vec<(f32, f32)> {
    let points = points.max(2);
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = spin - FRAC_PI_2 + PI * i as f32 / points as f32;
            let (dx, dy) = polar_to_cart(r, theta);
            (cx + dx, cy + dy)
        })
        .collect()
}
