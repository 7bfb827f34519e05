//! Procedural masks: single-channel blend weights.
//!
//! A [`Mask`] has the same width and height as the image it weights.
//! Each value in `0..=255` is the share of the *first* operand of
//! [`crate::composite::composite`] at that pixel.
//!
//! Shapes are described by [`Shape`] and rasterised either into a mask
//! ([`Mask::filled`]) or directly onto an RGBA canvas ([`paint`]), which
//! is how the colored overlays (light leaks, glitch bands) are drawn.

use std::ops::Range;

use image::GrayImage;

use crate::numeric::to_channel;
use crate::types::{Dimensions, Point, RgbaImage};

/// A filled shape in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned ellipse. Pixel `(x, y)` is inside when
    /// `((x - cx) / rx)^2 + ((y - cy) / ry)^2 <= 1`.
    Ellipse {
        /// Center of the ellipse.
        center: Point,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Axis-aligned rectangle, both corners inclusive.
    Rect {
        /// Top-left corner.
        top_left: Point,
        /// Bottom-right corner.
        bottom_right: Point,
    },
}

impl Shape {
    /// A circle of `radius` around `center`.
    #[must_use]
    pub const fn circle(center: Point, radius: f64) -> Self {
        Self::Ellipse {
            center,
            radius_x: radius,
            radius_y: radius,
        }
    }

    /// Whether pixel `(x, y)` is covered by the shape.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (px, py) = (f64::from(x), f64::from(y));
        match *self {
            Self::Ellipse {
                center,
                radius_x,
                radius_y,
            } => {
                if radius_x <= 0.0 || radius_y <= 0.0 {
                    return false;
                }
                let dx = (px - center.x) / radius_x;
                let dy = (py - center.y) / radius_y;
                dx.mul_add(dx, dy * dy) <= 1.0
            }
            Self::Rect {
                top_left,
                bottom_right,
            } => {
                (top_left.x..=bottom_right.x).contains(&px)
                    && (top_left.y..=bottom_right.y).contains(&py)
            }
        }
    }

    /// Pixel rows and columns that can be covered, clipped to the image.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bounds(&self, dimensions: Dimensions) -> (Range<u32>, Range<u32>) {
        let (x0, y0, x1, y1) = match *self {
            Self::Ellipse {
                center,
                radius_x,
                radius_y,
            } => (
                center.x - radius_x,
                center.y - radius_y,
                center.x + radius_x,
                center.y + radius_y,
            ),
            Self::Rect {
                top_left,
                bottom_right,
            } => (top_left.x, top_left.y, bottom_right.x, bottom_right.y),
        };
        let clip = |lo: f64, hi: f64, extent: u32| -> Range<u32> {
            let extent = f64::from(extent);
            let start = lo.ceil().clamp(0.0, extent);
            let end = (hi.floor() + 1.0).clamp(0.0, extent);
            if start < end {
                start as u32..end as u32
            } else {
                0..0
            }
        };
        (
            clip(x0, x1, dimensions.width),
            clip(y0, y1, dimensions.height),
        )
    }

    /// Visit every image pixel covered by the shape.
    fn for_each_pixel(&self, dimensions: Dimensions, mut f: impl FnMut(u32, u32)) {
        let (xs, ys) = self.bounds(dimensions);
        for y in ys {
            for x in xs.clone() {
                if self.contains(x, y) {
                    f(x, y);
                }
            }
        }
    }
}

/// Paint `shape` onto `canvas` in a solid `color`, replacing the
/// covered pixels.
pub fn paint(canvas: &mut RgbaImage, shape: Shape, color: image::Rgba<u8>) {
    let dimensions = Dimensions {
        width: canvas.width(),
        height: canvas.height(),
    };
    shape.for_each_pixel(dimensions, |x, y| canvas.put_pixel(x, y, color));
}

/// A single-channel blend-weight buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// A mask of the given size where every value is `value`.
    #[must_use]
    pub fn uniform(dimensions: Dimensions, value: u8) -> Self {
        Self(GrayImage::from_pixel(
            dimensions.width,
            dimensions.height,
            image::Luma([value]),
        ))
    }

    /// Wrap an existing single-channel image.
    #[must_use]
    pub const fn from_gray(image: GrayImage) -> Self {
        Self(image)
    }

    /// Build a mask from a per-pixel function.
    #[must_use]
    pub fn from_fn(dimensions: Dimensions, f: impl Fn(u32, u32) -> u8) -> Self {
        Self(GrayImage::from_fn(
            dimensions.width,
            dimensions.height,
            |x, y| image::Luma([f(x, y)]),
        ))
    }

    /// Pixels inside `shape` set to `fill`, everything else 0.
    #[must_use]
    pub fn filled(dimensions: Dimensions, shape: Shape, fill: u8) -> Self {
        let mut mask = Self::uniform(dimensions, 0);
        shape.for_each_pixel(dimensions, |x, y| {
            mask.0.put_pixel(x, y, image::Luma([fill]));
        });
        mask
    }

    /// A filled ellipse mask.
    #[must_use]
    pub fn filled_ellipse(
        dimensions: Dimensions,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        fill: u8,
    ) -> Self {
        Self::filled(
            dimensions,
            Shape::Ellipse {
                center,
                radius_x,
                radius_y,
            },
            fill,
        )
    }

    /// A filled rectangle mask, corners inclusive.
    #[must_use]
    pub fn filled_rect(
        dimensions: Dimensions,
        top_left: Point,
        bottom_right: Point,
        fill: u8,
    ) -> Self {
        Self::filled(
            dimensions,
            Shape::Rect {
                top_left,
                bottom_right,
            },
            fill,
        )
    }

    /// Gaussian-blur the mask to feather its edges.
    #[must_use = "returns the blurred mask"]
    pub fn blur(&self, radius: f32) -> Self {
        Self(crate::blur::gaussian_blur(&self.0, radius))
    }

    /// `255 - v` per pixel.
    #[must_use = "returns the inverted mask"]
    pub fn invert(&self) -> Self {
        let mut out = self.0.clone();
        for pixel in out.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
        Self(out)
    }

    /// `v * factor` per pixel, rounded and clamped to `[0, 255]`.
    #[must_use = "returns the scaled mask"]
    pub fn scale(&self, factor: f32) -> Self {
        let mut out = self.0.clone();
        for pixel in out.pixels_mut() {
            pixel.0[0] = to_channel(f32::from(pixel.0[0]) * factor);
        }
        Self(out)
    }

    /// Weight at `(x, y)`.
    #[must_use]
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.0.get_pixel(x, y).0[0]
    }

    /// Width and height of the mask.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.0.width(),
            height: self.0.height(),
        }
    }
}
