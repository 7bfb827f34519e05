//! retrocam-pipeline: Pure photographic effect pipeline (sans-IO).
//!
//! Turns a decoded photograph into one that looks like it came out of
//! an old camera: grain, vignettes, light leaks, date stamps, instant
//! film frames and tuned multi-step presets such as `digicam`.
//!
//! Every transform is a pure function from [`Raster`] to [`Raster`].
//! Randomness, assets and the capture timestamp are injected through a
//! [`Context`], so a fixed seed reproduces output byte for byte.
//!
//! This crate has **no I/O dependencies** -- decoding, encoding and
//! filesystem access live in `retrocam-io`.

pub mod assets;
pub mod blur;
pub mod color;
pub mod composite;
pub mod film;
pub mod mask;
pub mod numeric;
pub mod optics;
pub mod preset;
pub mod print;
pub mod registry;
pub mod transform;
pub mod types;

pub use assets::Assets;
pub use preset::Preset;
pub use registry::{Filter, Registry};
pub use transform::{Context, DEFAULT_STAMP_FORMAT, Effect, StampText, Transform};
pub use types::{
    Dimensions, ErrorKind, FilterError, GrayImage, ImageFormat, Point, Raster, Rgb, RgbaImage,
};

/// Apply the filter registered under `name` to `raster`.
///
/// Either the whole filter runs and a new raster is returned, or the
/// call fails and nothing is produced.
///
/// # Errors
///
/// Returns [`FilterError::UnknownFilter`] if `name` is not registered
/// (a user error), [`FilterError::MissingAsset`] if the filter needs an
/// asset that was not loaded, or any processing error raised by a step.
pub fn apply_filter(
    registry: &Registry,
    name: &str,
    raster: &Raster,
    ctx: &mut Context<'_>,
) -> Result<Raster, FilterError> {
    registry.apply(name, raster, ctx)
}
