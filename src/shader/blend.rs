//! Interpolation functions.

/// Linear interpolation between two values.
///
/// Returns `a` when `t=0`, `b` when `t=1`, and linear blend in between.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `x` sits between `a` and `b`, unclamped. Zero when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, x: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        0.0
    } else {
        (x - a) / (b - a)
    }
}

/// Interpolate an angle in degrees along the shorter arc.
pub fn lerp_degrees(a: f32, b: f32, t: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    (a + delta * t).rem_euclid(360.0)
}
