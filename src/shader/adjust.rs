//! Clamping and range remapping.

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Remap a value from one range to another, clamped.
#[inline]
pub fn remap_clamped(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let normalized = ((value - from_min) / (from_max - from_min)).clamp(0.0, 1.0);
    to_min + normalized * (to_max - to_min)
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f32.powi(decimals as i32);
    (value * factor).round() / factor
}
