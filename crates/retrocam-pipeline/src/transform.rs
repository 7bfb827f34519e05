//! Transform descriptors: one variant per photographic effect.
//!
//! A [`Transform`] is plain data (it derives serde traits, so presets
//! can be declared in configuration files). Running it needs a
//! [`Context`], which carries everything outside the pixels: the
//! injected random generator, the shared [`Assets`] and the capture
//! timestamp used by date stamps.
//!
//! The [`Effect`] trait is the single seam every runnable thing goes
//! through: a transform, a preset, or a registry entry.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::types::{FilterError, Point, Raster, Rgb};
use crate::{color, film, optics, print};

/// Default strftime pattern for timestamp date stamps, e.g. `'24 06 01`.
pub const DEFAULT_STAMP_FORMAT: &str = "'%y %m %d";

/// Anything that turns one raster into another.
pub trait Effect {
    /// Apply the effect, drawing randomness and assets from `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] if the effect needs an asset that is not
    /// loaded, receives an unusable parameter, or fails internally.
    fn apply(&self, raster: &Raster, ctx: &mut Context<'_>) -> Result<Raster, FilterError>;
}

/// Per-request execution context.
///
/// Owns the random generator so that two runs with the same seed, the
/// same assets and the same timestamp are byte-identical.
#[derive(Debug)]
pub struct Context<'a> {
    rng: StdRng,
    assets: &'a Assets,
    now: NaiveDateTime,
}

impl<'a> Context<'a> {
    /// Build a context from its parts.
    #[must_use]
    pub const fn new(assets: &'a Assets, rng: StdRng, now: NaiveDateTime) -> Self {
        Self { rng, assets, now }
    }

    /// A context with a fixed seed, stamped with the local time.
    #[must_use]
    pub fn seeded(assets: &'a Assets, seed: u64) -> Self {
        Self::new(assets, StdRng::seed_from_u64(seed), local_now())
    }

    /// A context seeded from OS entropy, stamped with the local time.
    #[must_use]
    pub fn from_entropy(assets: &'a Assets) -> Self {
        Self::new(assets, StdRng::from_entropy(), local_now())
    }

    /// Replace the capture timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// The random generator shared by every step of a request.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// The shared read-only assets.
    #[must_use]
    pub const fn assets(&self) -> &'a Assets {
        self.assets
    }

    /// The capture timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.now
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// What a date stamp prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampText {
    /// Print this exact text.
    Literal(String),
    /// Print the context timestamp through a strftime `format`.
    Timestamp {
        /// chrono strftime pattern.
        format: String,
    },
}

impl Default for StampText {
    fn default() -> Self {
        Self::Timestamp {
            format: DEFAULT_STAMP_FORMAT.to_owned(),
        }
    }
}

impl StampText {
    /// The text to draw for a photo taken at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if the timestamp format
    /// contains an unknown specifier.
    pub fn render(&self, now: NaiveDateTime) -> Result<String, FilterError> {
        match self {
            Self::Literal(text) => Ok(text.clone()),
            Self::Timestamp { format } => {
                let mut out = String::new();
                write!(out, "{}", now.format(format)).map_err(|_| {
                    FilterError::InvalidParameter(format!("invalid timestamp format {format:?}"))
                })?;
                Ok(out)
            }
        }
    }
}

/// One photographic effect together with its parameters.
///
/// Serialized with a `kind` tag, e.g.
/// `{"kind": "grain", "intensity": 45.0, "offset": 20.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Luma replicated to R, G and B.
    Grayscale,
    /// `255 - v` per channel.
    Invert,
    /// Multiply every channel.
    Brightness {
        /// Channel multiplier.
        factor: f32,
    },
    /// Stretch away from mid-gray.
    Contrast {
        /// Deviation multiplier.
        factor: f32,
    },
    /// Push colors away from (or towards) their luma.
    Saturate {
        /// Self-weight; 1 is the identity.
        factor: f32,
    },
    /// Warm brown monochrome.
    Sepia,
    /// Cross-processed slide film.
    CrossProcess,
    /// Lomography look.
    Lomo,
    /// Red and blue planes pulled apart horizontally.
    ChromaticAberration {
        /// Plane offset in pixels.
        shift: i32,
    },
    /// Monochrome film grain.
    Grain {
        /// Width of the uniform noise range.
        intensity: f32,
        /// Subtracted from every noise sample.
        offset: f32,
    },
    /// Warm blobs of stray light.
    LightLeaks {
        /// Number of blobs.
        count: u32,
        /// Blend weight of the leak canvas.
        alpha: f32,
    },
    /// Darkened corners.
    Vignette {
        /// The bright disc has radius `min(w, h) / radius_factor`.
        radius_factor: f32,
        /// Share of black at the darkest point.
        strength: f32,
    },
    /// Glow around highlights.
    Halation {
        /// Blur applied to the highlight mask.
        blur_radius: f32,
        /// Blend weight of the glow.
        intensity: f32,
    },
    /// Dust and scratches from the configured texture.
    DustOverlay {
        /// Opacity of the texture.
        alpha: f32,
    },
    /// Orange LED date imprint in the bottom-right corner.
    DateStamp {
        /// What to print.
        #[serde(default)]
        text: StampText,
        /// Margin from the right and bottom edges.
        padding: u32,
        /// Glyph height in pixels.
        font_size: f32,
        /// Ink color.
        color: Rgb,
    },
    /// Instant-film border.
    PolaroidFrame {
        /// Border on the left, right and top.
        frame_width: u32,
        /// Extra border at the bottom.
        bottom_extra: u32,
        /// Card color.
        background: Rgb,
    },
    /// Translucent red tracking bands.
    VhsGlitch {
        /// Height of each band; bands repeat every two heights.
        line_height: u32,
        /// Maximum horizontal jitter in pixels.
        glitch_strength: u32,
        /// Weight of the final fade of the frame against itself, which
        /// leaves it unchanged.
        alpha: f32,
    },
    /// A single disc of light.
    LensFlare {
        /// Disc center; random when absent.
        #[serde(default)]
        center: Option<Point>,
        /// Disc radius in pixels.
        radius: f64,
        /// Light color.
        color: Rgb,
        /// Blend weight inside the disc.
        intensity: f32,
    },
    /// Miniature-model focus band.
    TiltShift {
        /// Blur outside the band.
        blur_strength: f32,
        /// Row the band is centered on; the image center when absent.
        #[serde(default)]
        focus_center: Option<u32>,
        /// Band height in rows; a third of the image when absent.
        #[serde(default)]
        focus_height: Option<u32>,
    },
    /// Multiply the green channel.
    GreenTint {
        /// Green multiplier.
        factor: f32,
    },
    /// Reduce every channel to `2^bits` levels.
    Posterize {
        /// Bits of precision kept, 1 to 8.
        bits: u8,
    },
}

impl Transform {
    /// Short snake-case name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
            Self::Brightness { .. } => "brightness",
            Self::Contrast { .. } => "contrast",
            Self::Saturate { .. } => "saturate",
            Self::Sepia => "sepia",
            Self::CrossProcess => "cross_process",
            Self::Lomo => "lomo",
            Self::ChromaticAberration { .. } => "chromatic_aberration",
            Self::Grain { .. } => "grain",
            Self::LightLeaks { .. } => "light_leaks",
            Self::Vignette { .. } => "vignette",
            Self::Halation { .. } => "halation",
            Self::DustOverlay { .. } => "dust_overlay",
            Self::DateStamp { .. } => "date_stamp",
            Self::PolaroidFrame { .. } => "polaroid_frame",
            Self::VhsGlitch { .. } => "vhs_glitch",
            Self::LensFlare { .. } => "lens_flare",
            Self::TiltShift { .. } => "tilt_shift",
            Self::GreenTint { .. } => "green_tint",
            Self::Posterize { .. } => "posterize",
        }
    }

    /// Whether the transform draws from the random generator.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        matches!(
            self,
            Self::Grain { .. }
                | Self::LightLeaks { .. }
                | Self::VhsGlitch { .. }
                | Self::LensFlare { center: None, .. }
        )
    }
}

impl Effect for Transform {
    fn apply(&self, raster: &Raster, ctx: &mut Context<'_>) -> Result<Raster, FilterError> {
        match self {
            Self::Grayscale => Ok(color::grayscale(raster)),
            Self::Invert => Ok(color::invert(raster)),
            Self::Brightness { factor } => Ok(color::brightness(raster, *factor)),
            Self::Contrast { factor } => Ok(color::contrast(raster, *factor)),
            Self::Saturate { factor } => Ok(color::saturate(raster, *factor)),
            Self::Sepia => Ok(color::sepia(raster)),
            Self::CrossProcess => Ok(color::cross_process(raster)),
            Self::Lomo => film::lomo(raster),
            Self::ChromaticAberration { shift } => Ok(optics::chromatic_aberration(raster, *shift)),
            Self::Grain { intensity, offset } => {
                Ok(film::grain(raster, *intensity, *offset, ctx.rng()))
            }
            Self::LightLeaks { count, alpha } => film::light_leaks(raster, *count, *alpha, ctx.rng()),
            Self::Vignette {
                radius_factor,
                strength,
            } => optics::vignette(raster, *radius_factor, *strength),
            Self::Halation {
                blur_radius,
                intensity,
            } => optics::halation(raster, *blur_radius, *intensity),
            Self::DustOverlay { alpha } => {
                let texture = ctx
                    .assets()
                    .dust_texture()
                    .ok_or(FilterError::MissingAsset("dust texture"))?;
                film::dust_overlay(raster, texture, *alpha)
            }
            Self::DateStamp {
                text,
                padding,
                font_size,
                color,
            } => {
                let text = text.render(ctx.timestamp())?;
                let font = ctx.assets().font()?;
                Ok(print::date_stamp(
                    raster, &text, *padding, *font_size, *color, &font,
                ))
            }
            Self::PolaroidFrame {
                frame_width,
                bottom_extra,
                background,
            } => Ok(print::polaroid_frame(
                raster,
                *frame_width,
                *bottom_extra,
                *background,
            )),
            // The fade step mixes the glitched frame with itself, so
            // `alpha` has no visible effect.
            Self::VhsGlitch {
                line_height,
                glitch_strength,
                alpha: _,
            } => film::vhs_glitch(raster, *line_height, *glitch_strength, ctx.rng()),
            Self::LensFlare {
                center,
                radius,
                color,
                intensity,
            } => optics::lens_flare(raster, *center, *radius, *color, *intensity, ctx.rng()),
            Self::TiltShift {
                blur_strength,
                focus_center,
                focus_height,
            } => {
                let height = focus_height.unwrap_or(raster.height() / 3);
                optics::tilt_shift(raster, *blur_strength, *focus_center, height)
            }
            Self::GreenTint { factor } => Ok(color::green_tint(raster, *factor)),
            Self::Posterize { bits } => {
                if !(1..=8).contains(bits) {
                    return Err(FilterError::InvalidParameter(format!(
                        "posterize needs 1 to 8 bits, got {bits}"
                    )));
                }
                Ok(color::posterize(raster, *bits))
            }
        }
    }
}
