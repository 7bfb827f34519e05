//! Gaussian blur for masks and photographs.
//!
//! Feathering a vignette, spreading a halation glow and defocusing a
//! tilt-shift frame all come down to one isotropic blur. Small sigmas
//! use [`imageproc::filter::gaussian_blur_f32`]. The vignette blurs by a
//! quarter of the image width, which would need a kernel thousands of
//! taps wide, so above [`BOX_APPROXIMATION_SIGMA`] three box passes of
//! matching variance stand in for the true kernel.

use image::{GrayImage, ImageBuffer, Luma, Rgba};

use crate::numeric::to_channel;
use crate::types::RgbaImage;

/// Sigma above which the three-pass box approximation is used.
pub const BOX_APPROXIMATION_SIGMA: f32 = 12.0;

/// Blur a single-channel buffer with standard deviation `sigma` pixels.
///
/// A sigma that is zero, negative or not finite leaves the buffer as it
/// is (`imageproc` would panic on it), as does an empty buffer.
#[must_use = "returns the blurred buffer"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if !(sigma.is_finite() && sigma > 0.0) || width == 0 || height == 0 {
        return image.clone();
    }
    if sigma > BOX_APPROXIMATION_SIGMA {
        triple_box(image, sigma)
    } else {
        exact(image, sigma)
    }
}

/// Blur R, G and B of a photograph; alpha is copied through.
#[must_use = "returns the blurred photograph"]
pub fn gaussian_blur_rgba(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if !(sigma.is_finite() && sigma > 0.0) {
        return image.clone();
    }

    let plane = |c: usize| {
        let channel = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y).0[c]])
        });
        gaussian_blur(&channel, sigma)
    };
    let (red, green, blue) = (plane(0), plane(1), plane(2));

    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        *pixel = Rgba([
            red.get_pixel(x, y).0[0],
            green.get_pixel(x, y).0[0],
            blue.get_pixel(x, y).0[0],
            pixel.0[3],
        ]);
    }
    out
}

/// True Gaussian, accumulated in `f32` and rounded once on the way back.
///
/// Blurring the `u8` buffer directly truncates every sample, which pulls
/// flat regions down by one level.
fn exact(image: &GrayImage, sigma: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let wide: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([f32::from(image.get_pixel(x, y).0[0])]));
    let blurred = imageproc::filter::gaussian_blur_f32(&wide, sigma);
    GrayImage::from_fn(width, height, |x, y| {
        Luma([to_channel(blurred.get_pixel(x, y).0[0])])
    })
}

/// Three box passes whose combined variance matches `sigma`.
///
/// A box of width `2r + 1` has variance `((2r + 1)^2 - 1) / 12`; three
/// passes triple it, so `r = (sqrt(4 * sigma^2 + 1) - 1) / 2`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn triple_box(image: &GrayImage, sigma: f32) -> GrayImage {
    let radius = ((4.0 * sigma).mul_add(sigma, 1.0).sqrt() - 1.0) / 2.0;
    let radius = radius.round().max(1.0) as u32;

    (0..3).fold(image.clone(), |acc, _| {
        imageproc::filter::box_filter(&acc, radius, radius)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark left half, bright right half: a hard horizon.
    fn horizon(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { 0 } else { 255 }])
        })
    }

    #[test]
    fn unusable_sigmas_are_no_ops() {
        let img = horizon(12, 6);
        for sigma in [0.0, -2.5, f32::NAN, f32::INFINITY] {
            assert_eq!(gaussian_blur(&img, sigma), img, "sigma {sigma}");
        }
    }

    #[test]
    fn empty_buffer_is_returned_as_is() {
        let img = GrayImage::new(0, 0);
        assert_eq!(gaussian_blur(&img, 3.0), img);
    }

    #[test]
    fn small_sigma_softens_the_horizon() {
        let out = gaussian_blur(&horizon(12, 6), 1.5);
        assert_eq!(out.dimensions(), (12, 6));
        assert!(out.get_pixel(5, 3).0[0] > 0);
        assert!(out.get_pixel(6, 3).0[0] < 255);
        // Far from the edge nothing changes.
        assert_eq!(out.get_pixel(0, 3).0[0], 0);
        assert!(out.get_pixel(11, 3).0[0] >= 254);
    }

    #[test]
    fn large_sigma_ramps_monotonically() {
        let out = gaussian_blur(&horizon(200, 20), 40.0);
        assert_eq!(out.dimensions(), (200, 20));

        let row: Vec<u8> = (60..140).map(|x| out.get_pixel(x, 10).0[0]).collect();
        assert!(row.windows(2).all(|w| w[0] <= w[1]), "row: {row:?}");
        assert!(row[0] < row[row.len() - 1]);
        let mid = out.get_pixel(100, 10).0[0];
        assert!((64..=192).contains(&mid), "mid value {mid}");
    }

    #[test]
    fn flat_field_survives_either_path() {
        let img = GrayImage::from_pixel(30, 30, Luma([90]));
        for sigma in [2.0, 20.0] {
            let out = gaussian_blur(&img, sigma);
            assert!(
                out.pixels().all(|p| p.0[0].abs_diff(90) <= 1),
                "sigma {sigma}"
            );
        }
    }

    #[test]
    fn small_sigma_keeps_flat_levels_exact() {
        for value in [1, 29, 30, 90, 200, 254] {
            let img = GrayImage::from_pixel(30, 30, Luma([value]));
            let out = gaussian_blur(&img, 2.0);
            assert!(out.pixels().all(|p| p.0[0] == value), "level {value}");
        }
    }

    #[test]
    fn photo_blur_mixes_color_across_edges() {
        let img = RgbaImage::from_fn(12, 6, |x, _| {
            if x < 6 {
                Rgba([255, 40, 0, 255])
            } else {
                Rgba([0, 40, 255, 255])
            }
        });
        let out = gaussian_blur_rgba(&img, 1.5);
        let [r, g, b, _] = out.get_pixel(6, 3).0;
        assert!(r > 0 && b < 255, "edge pixel {r} {g} {b}");
        // Green was flat, so it stays flat.
        assert!(out.pixels().all(|p| p.0[1].abs_diff(40) <= 1));
    }

    #[test]
    fn photo_blur_copies_alpha() {
        let img = RgbaImage::from_fn(10, 10, |x, y| Rgba([200, 100, 50, u8::from(x > y) * 200]));
        let out = gaussian_blur_rgba(&img, 2.0);
        for (x, y, pixel) in out.enumerate_pixels() {
            assert_eq!(pixel.0[3], img.get_pixel(x, y).0[3]);
        }
    }
}
