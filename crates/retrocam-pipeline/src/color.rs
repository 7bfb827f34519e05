//! Per-pixel color adjustments.
//!
//! Every function here maps each pixel independently; none of them
//! look at neighbours or draw from the random source. Alpha is left
//! untouched.

use crate::numeric::{luma, to_channel};
use crate::types::Raster;

/// Mid-gray pivot for [`contrast`].
pub const MID_GRAY: f32 = 128.0;

/// The classic sepia tone matrix, rows are output R, G, B.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Saturation kept before the sepia matrix is applied.
pub const SEPIA_DESATURATION: f32 = 0.7;

/// Replace each pixel with its luma, replicated to R, G and B.
#[must_use]
pub fn grayscale(raster: &Raster) -> Raster {
    raster.map_rgb(|rgb| {
        // Round once so all three channels are guaranteed equal.
        let y = f32::from(to_channel(luma(rgb)));
        [y, y, y]
    })
}

/// `255 - v` per channel.
#[must_use]
pub fn invert(raster: &Raster) -> Raster {
    raster.map_rgb(|[r, g, b]| [255.0 - r, 255.0 - g, 255.0 - b])
}

/// Multiply every channel by `factor`.
#[must_use]
pub fn brightness(raster: &Raster, factor: f32) -> Raster {
    raster.map_rgb(|[r, g, b]| [r * factor, g * factor, b * factor])
}

/// Scale each channel's deviation from mid-gray by `factor`.
#[must_use]
pub fn contrast(raster: &Raster, factor: f32) -> Raster {
    let stretch = |v: f32| (v - MID_GRAY).mul_add(factor, MID_GRAY);
    raster.map_rgb(|[r, g, b]| [stretch(r), stretch(g), stretch(b)])
}

/// Blend each pixel between its own luma (`factor = 0`) and itself
/// (`factor = 1`); factors above 1 extrapolate away from gray.
#[must_use]
pub fn saturate(raster: &Raster, factor: f32) -> Raster {
    raster.map_rgb(|rgb| {
        let y = f32::from(to_channel(luma(rgb)));
        rgb.map(|v| (v - y).mul_add(factor, y))
    })
}

/// Desaturate by [`SEPIA_DESATURATION`], then apply [`SEPIA_MATRIX`].
#[must_use]
pub fn sepia(raster: &Raster) -> Raster {
    saturate(raster, SEPIA_DESATURATION).map_rgb(|[r, g, b]| {
        SEPIA_MATRIX.map(|row| row[0].mul_add(r, row[1].mul_add(g, row[2] * b)))
    })
}

/// Cross-processed film look: lifted greens, hot reds, lifted blues.
///
/// On normalised `[0, 1]` channels: `g^0.9`, `min(r * 1.1, 1)`, `b^0.8`.
#[must_use]
pub fn cross_process(raster: &Raster) -> Raster {
    raster.map_rgb(|[r, g, b]| {
        let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
        [
            (r * 1.1).clamp(0.0, 1.0) * 255.0,
            g.powf(0.9) * 255.0,
            b.powf(0.8) * 255.0,
        ]
    })
}

/// Multiply only the green channel by `factor`.
#[must_use]
pub fn green_tint(raster: &Raster, factor: f32) -> Raster {
    raster.map_rgb(|[r, g, b]| [r, g * factor, b])
}

/// Quantize each channel to `2^bits` evenly spaced levels between 0 and
/// 255, choosing the nearest level.
///
/// `bits = 8` is the identity; `bits = 1` leaves only 0 and 255.
#[must_use]
pub fn posterize(raster: &Raster, bits: u8) -> Raster {
    let steps = 2.0_f32.powi(i32::from(bits)) - 1.0;
    let quantize = |v: f32| (v * steps / 255.0).round() * 255.0 / steps;
    raster.map_rgb(|[r, g, b]| [quantize(r), quantize(g), quantize(b)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RgbaImage;

    #[allow(clippy::cast_possible_truncation)]
    fn gradient(width: u32, height: u32) -> Raster {
        Raster::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([
                ((x * 255) / width.max(2).saturating_sub(1)).min(255) as u8,
                ((y * 255) / height.max(2).saturating_sub(1)).min(255) as u8,
                ((x + y) % 256) as u8,
                255,
            ])
        }))
    }

    #[test]
    fn grayscale_of_pure_red_is_its_luma() {
        let red = Raster::filled(50, 50, [255, 0, 0]);
        let gray = grayscale(&red);
        for pixel in gray.image().pixels() {
            assert_eq!(pixel.0, [76, 76, 76, 255]);
        }
    }

    #[test]
    fn grayscale_channels_are_equal() {
        let gray = grayscale(&gradient(16, 16));
        for pixel in gray.image().pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn invert_mid_gray() {
        let out = invert(&Raster::filled(100, 100, [128, 128, 128]));
        for pixel in out.image().pixels() {
            assert_eq!(pixel.0, [127, 127, 127, 255]);
        }
    }

    #[test]
    fn invert_keeps_alpha() {
        let raster = Raster::from_rgba(RgbaImage::from_pixel(2, 2, image::Rgba([0, 10, 20, 77])));
        assert_eq!(invert(&raster).pixel(1, 1), [255, 245, 235, 77]);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let out = brightness(&Raster::filled(2, 2, [100, 200, 0]), 1.5);
        assert_eq!(out.pixel(0, 0), [150, 255, 0, 255]);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let out = contrast(&Raster::filled(2, 2, [128, 138, 118]), 2.0);
        assert_eq!(out.pixel(0, 0), [128, 148, 108, 255]);
        let flat = contrast(&Raster::filled(2, 2, [10, 250, 60]), 0.0);
        assert_eq!(flat.pixel(0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn saturate_zero_is_grayscale_and_one_is_identity() {
        let raster = gradient(8, 8);
        assert_eq!(saturate(&raster, 0.0), grayscale(&raster));
        assert_eq!(saturate(&raster, 1.0), raster);
    }

    #[test]
    fn saturate_above_one_pushes_away_from_gray() {
        let raster = Raster::filled(1, 1, [150, 100, 100]);
        let [r, g, b, _] = saturate(&raster, 2.0).pixel(0, 0);
        assert!(r > 150);
        assert!(g < 100);
        assert_eq!(g, b);
    }

    #[test]
    fn sepia_white_and_black() {
        let white = sepia(&Raster::filled(1, 1, [255, 255, 255]));
        // Row sums 1.351, 1.203 and 0.937 on white.
        assert_eq!(white.pixel(0, 0), [255, 255, 239, 255]);
        let black = sepia(&Raster::filled(1, 1, [0, 0, 0]));
        assert_eq!(black.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn sepia_output_is_warm() {
        let out = sepia(&Raster::filled(1, 1, [100, 120, 140]));
        let [r, g, b, _] = out.pixel(0, 0);
        assert!(r > g && g > b, "expected r > g > b, got {r} {g} {b}");
    }

    #[test]
    fn cross_process_endpoints() {
        let black = cross_process(&Raster::filled(1, 1, [0, 0, 0]));
        assert_eq!(black.pixel(0, 0), [0, 0, 0, 255]);
        let white = cross_process(&Raster::filled(1, 1, [255, 255, 255]));
        assert_eq!(white.pixel(0, 0), [255, 255, 255, 255]);
        let mid = cross_process(&Raster::filled(1, 1, [100, 100, 100]));
        let [r, g, b, _] = mid.pixel(0, 0);
        assert_eq!(r, 110);
        assert!(g > 100 && b > g, "g^0.9 and b^0.8 lift mid-tones: {g} {b}");
    }

    #[test]
    fn green_tint_touches_only_green() {
        let out = green_tint(&Raster::filled(1, 1, [100, 100, 100]), 1.1);
        assert_eq!(out.pixel(0, 0), [100, 110, 100, 255]);
    }

    #[test]
    fn posterize_eight_bits_is_identity() {
        let raster = gradient(32, 32);
        assert_eq!(posterize(&raster, 8), raster);
    }

    #[test]
    fn posterize_one_bit_snaps_to_extremes() {
        let out = posterize(&Raster::filled(1, 1, [200, 100, 128]), 1);
        assert_eq!(out.pixel(0, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn posterize_two_bits_uses_four_levels() {
        let out = posterize(&gradient(64, 1), 2);
        let mut reds: Vec<u8> = out.image().pixels().map(|p| p.0[0]).collect();
        reds.sort_unstable();
        reds.dedup();
        assert_eq!(reds, vec![0, 85, 170, 255]);
    }
}
