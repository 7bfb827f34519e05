//! Shared types for the retrocam effect pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference mask
/// data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage`, the backing store of every [`Raster`].
pub use image::RgbaImage;

/// Re-export `ImageFormat`, used as the source-format tag of a [`Raster`].
pub use image::ImageFormat;

/// An opaque RGB color.
pub type Rgb = [u8; 3];

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Length of the shorter side.
    #[must_use]
    pub const fn shorter_side(self) -> u32 {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }

    /// Center of the image in pixel coordinates.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// An in-memory photograph flowing through the effect pipeline.
///
/// Pixels are stored as straight (non-premultiplied) RGBA regardless of
/// the source channel count. Three-channel sources carry a constant
/// alpha of 255 and are reported (and re-encoded) as RGB.
///
/// Every transform returns a new `Raster`; none mutate their input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    image: RgbaImage,
    channels: u8,
    format: Option<ImageFormat>,
}

impl Raster {
    /// Wrap a four-channel image.
    #[must_use]
    pub const fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image,
            channels: 4,
            format: None,
        }
    }

    /// Wrap a three-channel image, storing it with opaque alpha.
    #[must_use]
    pub fn from_rgb(image: &image::RgbImage) -> Self {
        let rgba = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b] = image.get_pixel(x, y).0;
            image::Rgba([r, g, b, 255])
        });
        Self {
            image: rgba,
            channels: 3,
            format: None,
        }
    }

    /// Convert a decoded image, keeping an alpha channel only when the
    /// source had one.
    #[must_use]
    pub fn from_dynamic(image: &image::DynamicImage) -> Self {
        if image.color().has_alpha() {
            Self::from_rgba(image.to_rgba8())
        } else {
            Self::from_rgb(&image.to_rgb8())
        }
    }

    /// A three-channel raster where every pixel is `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let [r, g, b] = color;
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba([r, g, b, 255])),
            channels: 3,
            format: None,
        }
    }

    /// Tag the raster with the format it was decoded from.
    #[must_use]
    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    /// Build a new raster around `image`, inheriting this raster's
    /// channel count and format tag.
    #[must_use]
    pub const fn derive(&self, image: RgbaImage) -> Self {
        Self {
            image,
            channels: self.channels,
            format: self.format,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width and height in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Source channel count: 3 (RGB) or 4 (RGBA).
    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    /// Whether the source carried an alpha channel.
    #[must_use]
    pub const fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// The format the raster was decoded from, if known.
    #[must_use]
    pub const fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Borrow the pixel store.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Apply `f` to the color channels of every pixel, leaving alpha
    /// untouched. `f` works in floating point; results are rounded and
    /// clamped to `[0, 255]`.
    #[must_use]
    pub fn map_rgb(&self, f: impl Fn([f32; 3]) -> [f32; 3]) -> Self {
        let mut out = self.image.clone();
        for pixel in out.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let [r, g, b] = f([f32::from(r), f32::from(g), f32::from(b)]);
            pixel.0 = [
                crate::numeric::to_channel(r),
                crate::numeric::to_channel(g),
                crate::numeric::to_channel(b),
                a,
            ];
        }
        self.derive(out)
    }
}

/// Which side of the service boundary an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request: missing field or unknown filter name.
    UserInput,
    /// A required external asset is missing or unreadable.
    Asset,
    /// Anything else that went wrong while transforming the image.
    Processing,
}

impl ErrorKind {
    /// HTTP-equivalent status code for this class of error.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::UserInput => 400,
            Self::Asset | Self::Processing => 500,
        }
    }
}

/// Errors that can occur while resolving or applying a filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The requested filter name is not registered.
    #[error("unsupported filter type: {0}")]
    UnknownFilter(String),

    /// A required request field was not supplied.
    #[error("no {0} specified in the request")]
    MissingField(&'static str),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A required asset was never loaded.
    #[error("required asset is not available: {0}")]
    MissingAsset(&'static str),

    /// An asset was supplied but could not be read or parsed.
    #[error("failed to load {name}: {reason}")]
    AssetLoad {
        /// Which asset failed.
        name: String,
        /// Underlying cause.
        reason: String,
    },

    /// Failed to decode an image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// Two buffers that must line up pixel-for-pixel do not.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Dimensions of the target image.
        expected: Dimensions,
        /// Dimensions of the offending buffer.
        actual: Dimensions,
    },

    /// A parameter could not be used (for example an unformattable
    /// timestamp pattern).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl FilterError {
    /// Classify the error for the service boundary.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFilter(_) | Self::MissingField(_) | Self::EmptyInput => {
                ErrorKind::UserInput
            }
            Self::MissingAsset(_) | Self::AssetLoad { .. } => ErrorKind::Asset,
            Self::ImageDecode(_)
            | Self::ImageEncode(_)
            | Self::DimensionMismatch { .. }
            | Self::InvalidParameter(_) => ErrorKind::Processing,
        }
    }
}

/// Fail with [`FilterError::DimensionMismatch`] unless `actual` equals
/// `expected`.
///
/// # Errors
///
/// Returns [`FilterError::DimensionMismatch`] when the sizes differ.
pub fn ensure_dimensions(expected: Dimensions, actual: Dimensions) -> Result<(), FilterError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FilterError::DimensionMismatch { expected, actual })
    }
}
