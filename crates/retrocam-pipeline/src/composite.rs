//! Compositing primitives shared by the transform library.
//!
//! ```text
//! composite(A, B, mask) = A * mask/255 + B * (1 - mask/255)
//! blend(A, B, alpha)    = A * (1 - alpha) + B * alpha
//! ```
//!
//! Both operate on R, G and B and take alpha from the background
//! operand (`B` for `composite`, `A` for `blend`). [`alpha_over`] is the
//! Porter-Duff "over" operator for overlays that carry their own alpha.

use crate::mask::Mask;
use crate::numeric::{lerp, to_channel};
use crate::types::{FilterError, Raster, RgbaImage, ensure_dimensions};

/// Per-pixel weighted blend of `a` and `b`, weighted by `mask`.
///
/// A mask value of 255 selects `a` entirely, 0 selects `b`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] if `a`, `b` and `mask`
/// differ in size.
pub fn composite(a: &Raster, b: &Raster, mask: &Mask) -> Result<Raster, FilterError> {
    ensure_dimensions(b.dimensions(), a.dimensions())?;
    ensure_dimensions(b.dimensions(), mask.dimensions())?;

    let mut out = b.image().clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let weight = f32::from(mask.value(x, y)) / 255.0;
        let front = a.image().get_pixel(x, y).0;
        for c in 0..3 {
            pixel.0[c] = to_channel(lerp(f32::from(pixel.0[c]), f32::from(front[c]), weight));
        }
    }
    Ok(b.derive(out))
}

/// Linear interpolation between `a` and `b` by a uniform `alpha`.
///
/// `alpha = 0` returns `a`, `alpha = 1` returns `b`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] if `a` and `b` differ in
/// size.
pub fn blend(a: &Raster, b: &Raster, alpha: f32) -> Result<Raster, FilterError> {
    ensure_dimensions(a.dimensions(), b.dimensions())?;

    let mut out = a.image().clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let other = b.image().get_pixel(x, y).0;
        for c in 0..3 {
            pixel.0[c] = to_channel(lerp(f32::from(pixel.0[c]), f32::from(other[c]), alpha));
        }
    }
    Ok(a.derive(out))
}

/// Composite `overlay` over `base` with the standard "over" operator.
///
/// The overlay's alpha channel is its coverage. The result alpha is
/// `a_o + a_b * (1 - a_o)`, so an opaque base stays opaque.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] if the overlay is not
/// exactly the size of `base`.
pub fn alpha_over(base: &Raster, overlay: &RgbaImage) -> Result<Raster, FilterError> {
    let overlay_dimensions = crate::types::Dimensions {
        width: overlay.width(),
        height: overlay.height(),
    };
    ensure_dimensions(base.dimensions(), overlay_dimensions)?;

    let mut out = base.image().clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let top = overlay.get_pixel(x, y).0;
        let top_alpha = f32::from(top[3]) / 255.0;
        if top_alpha <= 0.0 {
            continue;
        }
        let bottom_alpha = f32::from(pixel.0[3]) / 255.0;
        let out_alpha = bottom_alpha.mul_add(1.0 - top_alpha, top_alpha);
        for c in 0..3 {
            let premultiplied = (f32::from(pixel.0[c]) * bottom_alpha)
                .mul_add(1.0 - top_alpha, f32::from(top[c]) * top_alpha);
            pixel.0[c] = to_channel(premultiplied / out_alpha);
        }
        pixel.0[3] = to_channel(out_alpha * 255.0);
    }
    Ok(base.derive(out))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    const DIMS: Dimensions = Dimensions {
        width: 4,
        height: 3,
    };

    #[test]
    fn composite_full_mask_selects_first() {
        let a = Raster::filled(4, 3, [10, 20, 30]);
        let b = Raster::filled(4, 3, [200, 210, 220]);
        let out = composite(&a, &b, &Mask::uniform(DIMS, 255)).unwrap();
        assert_eq!(out, a);
        let out = composite(&a, &b, &Mask::uniform(DIMS, 0)).unwrap();
        assert_eq!(out, b);
    }

    #[test]
    fn composite_half_mask_averages() {
        let a = Raster::filled(4, 3, [0, 0, 0]);
        let b = Raster::filled(4, 3, [200, 100, 50]);
        let out = composite(&a, &b, &Mask::uniform(DIMS, 128)).unwrap();
        // 200 * (1 - 128/255) = 99.6
        assert_eq!(out.pixel(0, 0), [100, 50, 25, 255]);
    }

    #[test]
    fn composite_rejects_mismatched_mask() {
        let a = Raster::filled(4, 3, [0, 0, 0]);
        let mask = Mask::uniform(
            Dimensions {
                width: 3,
                height: 3,
            },
            0,
        );
        assert!(matches!(
            composite(&a, &a, &mask),
            Err(FilterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn blend_endpoints_and_midpoint() {
        let a = Raster::filled(4, 3, [0, 100, 200]);
        let b = Raster::filled(4, 3, [100, 100, 0]);
        assert_eq!(blend(&a, &b, 0.0).unwrap(), a);
        assert_eq!(blend(&a, &b, 1.0).unwrap().pixel(1, 1), [100, 100, 0, 255]);
        assert_eq!(blend(&a, &b, 0.5).unwrap().pixel(1, 1), [50, 100, 100, 255]);
    }

    #[test]
    fn over_with_transparent_overlay_is_identity() {
        let base = Raster::filled(4, 3, [1, 2, 3]);
        let overlay = RgbaImage::new(4, 3);
        assert_eq!(alpha_over(&base, &overlay).unwrap(), base);
    }

    #[test]
    fn over_with_opaque_overlay_replaces() {
        let base = Raster::filled(4, 3, [1, 2, 3]);
        let overlay = RgbaImage::from_pixel(4, 3, image::Rgba([9, 8, 7, 255]));
        assert_eq!(alpha_over(&base, &overlay).unwrap().pixel(0, 0), [9, 8, 7, 255]);
    }

    #[test]
    fn over_with_half_overlay_mixes_and_stays_opaque() {
        let base = Raster::filled(4, 3, [0, 0, 0]);
        let overlay = RgbaImage::from_pixel(4, 3, image::Rgba([255, 255, 255, 51]));
        let out = alpha_over(&base, &overlay).unwrap();
        assert_eq!(out.pixel(2, 2), [51, 51, 51, 255]);
    }

    #[test]
    fn over_onto_transparent_base_takes_overlay_color() {
        let base = Raster::from_rgba(RgbaImage::new(4, 3));
        let overlay = RgbaImage::from_pixel(4, 3, image::Rgba([255, 0, 0, 102]));
        let out = alpha_over(&base, &overlay).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 0, 0, 102]);
    }
}
