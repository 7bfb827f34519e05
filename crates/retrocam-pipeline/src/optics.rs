//! Lens effects: vignetting, halation, chromatic aberration, tilt-shift
//! and flares.
//!
//! These are the transforms built on masks and blur rather than plain
//! per-pixel math.

use rand::Rng;

use crate::blur::gaussian_blur_rgba;
use crate::composite::{blend, composite};
use crate::mask::{Mask, Shape};
use crate::numeric::luma_u8;
use crate::types::{Dimensions, FilterError, Point, Raster, Rgb, RgbaImage};

/// Luma above which a pixel feeds the halation glow.
pub const HALATION_THRESHOLD: u8 = 180;

/// Darken the frame edges with a blurred radial mask.
///
/// A white circle of radius `min(w, h) / radius_factor` is drawn at the
/// image center and blurred by `w / 4`. The inverted mask, scaled by
/// `strength`, is the share of black composited over the image.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if compositing fails,
/// which cannot happen for buffers built here.
#[allow(clippy::cast_precision_loss)]
pub fn vignette(raster: &Raster, radius_factor: f32, strength: f32) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let radius = f64::from(dims.shorter_side()) / f64::from(radius_factor);
    let mask = Mask::filled(dims, Shape::circle(dims.center(), radius), 255)
        .blur(dims.width as f32 / 4.0)
        .invert()
        .scale(strength);
    let black = Raster::filled(dims.width, dims.height, [0, 0, 0]);
    composite(&black, raster, &mask)
}

/// Add a soft glow around highlights, like light scattering back
/// through film base.
///
/// Pixels whose luma exceeds [`HALATION_THRESHOLD`] form a binary glow
/// source that is blurred by `blur_radius` and blended over the image
/// by `intensity`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if blending fails,
/// which cannot happen for buffers built here.
pub fn halation(raster: &Raster, blur_radius: f32, intensity: f32) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let highlights = Mask::from_fn(dims, |x, y| {
        let [r, g, b, _] = raster.pixel(x, y);
        if luma_u8([r, g, b]) > HALATION_THRESHOLD {
            255
        } else {
            0
        }
    })
    .blur(blur_radius);

    // A blurred gray glow is the same in every channel, so the mask is
    // blurred once and promoted to RGB afterwards.
    let glow = raster.derive(RgbaImage::from_fn(dims.width, dims.height, |x, y| {
        let v = highlights.value(x, y);
        image::Rgba([v, v, v, raster.pixel(x, y)[3]])
    }));
    blend(raster, &glow, intensity)
}

/// Misregister the color planes: red moves `shift` pixels left, blue
/// moves `shift` pixels right, green stays put.
///
/// Pixels shifted in from beyond the frame replicate the nearest edge
/// column. A negative `shift` swaps the directions; zero is the
/// identity.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn chromatic_aberration(raster: &Raster, shift: i32) -> Raster {
    if shift == 0 {
        return raster.clone();
    }
    let src = raster.image();
    let max_x = i64::from(raster.width()) - 1;
    let shift = i64::from(shift);
    let column = |x: i64| x.clamp(0, max_x) as u32;

    let out = RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [_, g, _, a] = src.get_pixel(x, y).0;
        let r = src.get_pixel(column(i64::from(x) + shift), y).0[0];
        let b = src.get_pixel(column(i64::from(x) - shift), y).0[2];
        image::Rgba([r, g, b, a])
    });
    raster.derive(out)
}

/// Miniature-model look: a sharp horizontal band with blurred surroundings.
///
/// The band is `focus_height` rows tall, centered on row `focus_center`
/// (the image's vertical center when `None`), and feathered by a blur of
/// `blur_strength / 2`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if compositing fails,
/// which cannot happen for buffers built here.
pub fn tilt_shift(
    raster: &Raster,
    blur_strength: f32,
    focus_center: Option<u32>,
    focus_height: u32,
) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let blurred = raster.derive(gaussian_blur_rgba(raster.image(), blur_strength));

    let center = focus_center.map_or_else(|| dims.center().y, f64::from);
    let top = center - f64::from(focus_height) / 2.0;
    let bottom = top + f64::from(focus_height) - 1.0;
    let band = Mask::filled_rect(
        dims,
        Point::new(0.0, top),
        Point::new(f64::from(dims.width), bottom),
        255,
    )
    .blur(blur_strength / 2.0);

    composite(raster, &blurred, &band)
}

/// Paint a translucent disc of `color`, blended in by `intensity`.
///
/// When `center` is `None` a position is drawn from `rng`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] only if compositing fails,
/// which cannot happen for buffers built here.
pub fn lens_flare(
    raster: &Raster,
    center: Option<Point>,
    radius: f64,
    color: Rgb,
    intensity: f32,
    rng: &mut impl Rng,
) -> Result<Raster, FilterError> {
    let dims = raster.dimensions();
    let center = center.unwrap_or_else(|| random_point(dims, rng));
    let mask = Mask::filled(dims, Shape::circle(center, radius), 255).scale(intensity);
    let flare = Raster::filled(dims.width, dims.height, color);
    composite(&flare, raster, &mask)
}

/// A uniformly random pixel position inside the frame.
pub(crate) fn random_point(dims: Dimensions, rng: &mut impl Rng) -> Point {
    Point::new(
        f64::from(rng.gen_range(0..dims.width.max(1))),
        f64::from(rng.gen_range(0..dims.height.max(1))),
    )
}
