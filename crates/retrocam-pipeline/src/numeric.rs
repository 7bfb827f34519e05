//! Numeric helpers shared by every transform.
//!
//! All intermediate arithmetic happens in `f32`; values are rounded
//! and clamped back to 8-bit only when a pixel is written.

/// ITU-R 601-2 luma weights for R, G and B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Round and clamp a floating-point intensity to an 8-bit channel.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_channel(value: f32) -> u8 {
    // NaN clamps to NaN and casts to 0.
    value.round().clamp(0.0, 255.0) as u8
}

/// Luma of an RGB triple in floating point.
#[must_use]
pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0].mul_add(rgb[0], LUMA_WEIGHTS[1].mul_add(rgb[1], LUMA_WEIGHTS[2] * rgb[2]))
}

/// Luma of an 8-bit RGB triple, rounded to 8-bit.
#[must_use]
pub fn luma_u8(rgb: [u8; 3]) -> u8 {
    to_channel(luma([
        f32::from(rgb[0]),
        f32::from(rgb[1]),
        f32::from(rgb[2]),
    ]))
}

/// Linear interpolation: `a * (1 - t) + b * t`.
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (b - a).mul_add(t, a)
}
