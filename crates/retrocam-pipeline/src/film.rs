//! Film and tape artifacts: grain, light leaks, dust, VHS glitches and
//! the lomo look.
//!
//! Grain, light leaks and glitches draw from the caller's random
//! generator, so a seeded generator reproduces the output byte for byte.

use std::ops::RangeInclusive;

use image::imageops::FilterType;
use rand::Rng;

use crate::color::{contrast, green_tint, saturate};
use crate::composite::{alpha_over, blend};
use crate::mask::{Shape, paint};
use crate::numeric::to_channel;
use crate::optics::{random_point, vignette};
use crate::types::{Dimensions, FilterError, Point, Raster, Rgb, RgbaImage, ensure_dimensions};

/// Warm tones a light leak is painted in.
pub const LIGHT_LEAK_PALETTE: [Rgb; 5] = [
    [255, 94, 19],
    [255, 153, 51],
    [255, 196, 87],
    [242, 71, 56],
    [255, 120, 150],
];

/// Radius range of a single light leak, in pixels.
pub const LIGHT_LEAK_RADIUS: RangeInclusive<u32> = 50..=200;

/// Color of a VHS glitch band: semi-transparent red.
pub const GLITCH_BAND_COLOR: image::Rgba<u8> = image::Rgba([255, 0, 0, 100]);

/// Add monochrome film grain.
///
/// Each pixel draws one noise sample `n` uniformly from
/// `[0, intensity)`, shared by R, G and B, and becomes
/// `clip(v + n - offset)`.
#[must_use]
pub fn grain(raster: &Raster, intensity: f32, offset: f32, rng: &mut impl Rng) -> Raster {
    let mut out = raster.image().clone();
    for pixel in out.pixels_mut() {
        let noise = rng.r#gen::<f32>().mul_add(intensity, -offset);
        for c in 0..3 {
            pixel.0[c] = to_channel(f32::from(pixel.0[c]) + noise);
        }
    }
    raster.derive(out)
}

/// Blend `count` warm blobs of light into the frame.
///
/// Each blob is a filled circle with a random center, a radius drawn
/// from [`LIGHT_LEAK_RADIUS`] and a color from [`LIGHT_LEAK_PALETTE`],
/// painted on a black canvas. The canvas is blended over the image by
/// `alpha`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if blending fails,
/// which cannot happen for buffers built here.
pub fn light_leaks(
    raster: &Raster,
    count: u32,
    alpha: f32,
    rng: &mut impl Rng,
) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let mut canvas = RgbaImage::from_pixel(dims.width, dims.height, image::Rgba([0, 0, 0, 255]));
    for _ in 0..count {
        let center = random_point(dims, rng);
        let radius = rng.gen_range(LIGHT_LEAK_RADIUS);
        let [r, g, b] = LIGHT_LEAK_PALETTE[rng.gen_range(0..LIGHT_LEAK_PALETTE.len())];
        paint(
            &mut canvas,
            Shape::circle(center, f64::from(radius)),
            image::Rgba([r, g, b, 255]),
        );
    }
    blend(raster, &raster.derive(canvas), alpha)
}

/// Overlay a dust-and-scratches texture at a uniform opacity.
///
/// The texture is resized to exactly the image dimensions, its alpha
/// channel is replaced by `alpha * 255`, and it is composited over the
/// image with the "over" operator.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] if the resized texture does
/// not match the image.
pub fn dust_overlay(raster: &Raster, texture: &RgbaImage, alpha: f32) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let mut overlay = image::imageops::resize(texture, dims.width, dims.height, FilterType::Triangle);
    ensure_dimensions(
        dims,
        Dimensions {
            width: overlay.width(),
            height: overlay.height(),
        },
    )?;

    let coverage = to_channel(alpha * 255.0);
    for pixel in overlay.pixels_mut() {
        pixel.0[3] = coverage;
    }
    alpha_over(raster, &overlay)
}

/// Tracking-error bands: every other strip of `line_height` rows gets a
/// translucent red bar, jittered horizontally by up to
/// `glitch_strength` pixels either way.
///
/// A `line_height` of zero draws nothing.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if compositing fails,
/// which cannot happen for buffers built here.
#[allow(clippy::cast_precision_loss)]
pub fn vhs_glitch(
    raster: &Raster,
    line_height: u32,
    glitch_strength: u32,
    rng: &mut impl Rng,
) -> Result<Raster, FilterError> {
    if line_height == 0 {
        return Ok(raster.clone());
    }
    let dims = raster.dimensions();
    let mut overlay = RgbaImage::new(dims.width, dims.height);
    let span = i64::from(glitch_strength);
    let band_height = f64::from(line_height);
    let stride = usize::try_from(u64::from(line_height) * 2).unwrap_or(usize::MAX);

    for top in (0..dims.height).step_by(stride) {
        let offset = rng.gen_range(-span..=span) as f64;
        let top = f64::from(top);
        paint(
            &mut overlay,
            Shape::Rect {
                top_left: Point::new(offset, top),
                bottom_right: Point::new(offset + f64::from(dims.width) - 1.0, top + band_height - 1.0),
            },
            GLITCH_BAND_COLOR,
        );
    }
    alpha_over(raster, &overlay)
}

/// Lomography look: a touch more saturation and contrast, a green cast,
/// and a heavy vignette.
///
/// # Errors
///
/// Propagates errors from [`vignette`].
pub fn lomo(raster: &Raster) -> Result<Raster, FilterError> {
    let out = saturate(raster, 1.1);
    let out = contrast(&out, 1.05);
    let out = green_tint(&out, 1.05);
    vignette(&out, 1.3, 1.0)
}
