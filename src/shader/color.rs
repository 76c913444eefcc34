//! HSL color math and tinting.
//!
//! Colors are `[f32; 3]` RGB triples in [0, 1]; hue is in degrees.

use super::{clamp01, lerp, lerp_degrees};
use crate::params::Tint;

/// Convert HSL to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = clamp01(saturation);
    let l = clamp01(lightness);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Convert RGB to (hue, saturation, lightness).
pub fn rgb_to_hsl(rgb: [f32; 3]) -> (f32, f32, f32) {
    let [r, g, b] = rgb.map(clamp01);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta < 1e-6 {
        return (0.0, 0.0, l);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    (h.rem_euclid(360.0), clamp01(s), l)
}

/// Pull a color's hue and saturation toward the tint, keeping lightness.
///
/// A [`Tint::NONE`] tint returns the input unchanged.
pub fn apply_tint(rgb: [f32; 3], tint: &Tint) -> [f32; 3] {
    if tint.is_none() {
        return rgb;
    }
    let (h, s, l) = rgb_to_hsl(rgb);
    let t = clamp01(tint.strength);
    let hue = if s < 1e-6 { tint.hue } else { lerp_degrees(h, tint.hue, t) };
    hsl_to_rgb(hue, lerp(s, tint.saturation, t), l)
}

/// Convert to 8-bit RGBA.
pub fn to_rgba8(rgb: [f32; 3], alpha: f32) -> image::Rgba<u8> {
    let q = |v: f32| (clamp01(v) * 255.0).round() as u8;
    image::Rgba([q(rgb[0]), q(rgb[1]), q(rgb[2]), q(alpha)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn test_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_rgb_to_hsl() {
        let (h, s, l) = rgb_to_hsl([0.0, 0.0, 1.0]);
        assert!((h - 240.0).abs() < 1e-3);
        assert!((s - 1.0).abs() < 1e-3);
        assert!((l - 0.5).abs() < 1e-3);

        let (_, s, l) = rgb_to_hsl([0.5, 0.5, 0.5]);
        assert_eq!(s, 0.0);
        assert!((l - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_no_tint_is_identity() {
        let color = [0.2, 0.6, 0.9];
        assert_eq!(apply_tint(color, &Tint::NONE), color);
    }

    #[test]
    fn test_full_tint_takes_hue() {
        let red = [1.0, 0.0, 0.0];
        let tinted = apply_tint(red, &Tint::new(240.0, 1.0, 1.0));
        assert!(close(tinted, [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_tint_keeps_lightness() {
        let color = hsl_to_rgb(30.0, 0.8, 0.3);
        let (_, _, l) = rgb_to_hsl(apply_tint(color, &Tint::new(200.0, 0.5, 0.6)));
        assert!((l - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_to_rgba8() {
        assert_eq!(to_rgba8([1.0, 0.5, -1.0], 1.0), image::Rgba([255, 128, 0, 255]));
    }
}
