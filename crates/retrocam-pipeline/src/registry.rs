//! Filter registry: maps request names to transforms and presets.

use std::collections::BTreeMap;

use crate::preset::Preset;
use crate::transform::{Context, Effect, StampText, Transform};
use crate::types::{FilterError, Raster};

/// What a filter name resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// One transform with fixed parameters.
    Single(Transform),
    /// A chain of transforms.
    Preset(Preset),
}

impl Effect for Filter {
    fn apply(&self, raster: &Raster, ctx: &mut Context<'_>) -> Result<Raster, FilterError> {
        match self {
            Self::Single(transform) => transform.apply(raster, ctx),
            Self::Preset(preset) => preset.apply(raster, ctx),
        }
    }
}

impl Filter {
    /// The transforms the filter runs, in order.
    pub fn transforms_mut(&mut self) -> std::slice::IterMut<'_, Transform> {
        match self {
            Self::Single(transform) => std::slice::from_mut(transform).iter_mut(),
            Self::Preset(preset) => preset.steps_mut().iter_mut(),
        }
    }

    /// Whether any step draws from the random generator.
    #[must_use]
    pub fn is_random(&self) -> bool {
        match self {
            Self::Single(transform) => transform.is_random(),
            Self::Preset(preset) => preset.steps().iter().any(Transform::is_random),
        }
    }
}

impl From<Transform> for Filter {
    fn from(transform: Transform) -> Self {
        Self::Single(transform)
    }
}

impl From<Preset> for Filter {
    fn from(preset: Preset) -> Self {
        Self::Preset(preset)
    }
}

/// Name-to-filter table, built once and shared read-only.
///
/// Names are matched exactly; an unknown name is a user error.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    filters: BTreeMap<String, Filter>,
}

impl Registry {
    /// A registry with no filters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in filter with its default parameters.
    #[must_use]
    pub fn builtin() -> Self {
        let singles = [
            ("grayscale", Transform::Grayscale),
            ("sepia", Transform::Sepia),
            ("invert", Transform::Invert),
            ("brightness", Transform::Brightness { factor: 1.5 }),
            ("contrast", Transform::Contrast { factor: 2.0 }),
            ("saturate", Transform::Saturate { factor: 2.0 }),
            ("cross_process", Transform::CrossProcess),
            ("lomo", Transform::Lomo),
            (
                "chromatic_aberration",
                Transform::ChromaticAberration { shift: 5 },
            ),
            (
                "grain",
                Transform::Grain {
                    intensity: 45.0,
                    offset: 20.0,
                },
            ),
            (
                "light_leaks",
                Transform::LightLeaks {
                    count: 3,
                    alpha: 0.3,
                },
            ),
            (
                "vignette",
                Transform::Vignette {
                    radius_factor: 1.5,
                    strength: 0.8,
                },
            ),
            (
                "halation",
                Transform::Halation {
                    blur_radius: 15.0,
                    intensity: 0.3,
                },
            ),
            ("dust", Transform::DustOverlay { alpha: 0.3 }),
            (
                "date_stamp",
                Transform::DateStamp {
                    text: StampText::default(),
                    padding: 40,
                    font_size: 48.0,
                    color: [255, 140, 0],
                },
            ),
            (
                "polaroid",
                Transform::PolaroidFrame {
                    frame_width: 40,
                    bottom_extra: 120,
                    background: [255, 255, 255],
                },
            ),
            (
                "vhs",
                Transform::VhsGlitch {
                    line_height: 4,
                    glitch_strength: 20,
                    alpha: 0.8,
                },
            ),
            (
                "lens_flare",
                Transform::LensFlare {
                    center: None,
                    radius: 120.0,
                    color: [255, 244, 214],
                    intensity: 0.4,
                },
            ),
            (
                "tilt_shift",
                Transform::TiltShift {
                    blur_strength: 8.0,
                    focus_center: None,
                    focus_height: None,
                },
            ),
            ("green_tint", Transform::GreenTint { factor: 1.1 }),
            ("posterize", Transform::Posterize { bits: 4 }),
        ];

        let mut registry = Self::empty();
        for (name, transform) in singles {
            registry.register(name, transform);
        }
        registry.register("digicam", Preset::digicam());
        registry.register("disposable", Preset::disposable());
        registry
    }

    /// Add or replace a filter, returning the one previously under `name`.
    pub fn register(&mut self, name: impl Into<String>, filter: impl Into<Filter>) -> Option<Filter> {
        self.filters.insert(name.into(), filter.into())
    }

    /// Print timestamp date stamps with `format` in every registered
    /// filter. Literal stamps are left alone.
    pub fn set_stamp_format(&mut self, format: &str) {
        for filter in self.filters.values_mut() {
            for transform in filter.transforms_mut() {
                if let Transform::DateStamp {
                    text: text @ StampText::Timestamp { .. },
                    ..
                } = transform
                {
                    *text = StampText::Timestamp {
                        format: format.to_owned(),
                    };
                }
            }
        }
    }

    /// Look up a filter by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFilter`] if nothing is registered
    /// under `name`.
    pub fn resolve(&self, name: &str) -> Result<&Filter, FilterError> {
        self.filters
            .get(name)
            .ok_or_else(|| FilterError::UnknownFilter(name.to_owned()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Number of registered filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Resolve `name` and run it on `raster`.
    ///
    /// Nothing is computed when the name is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFilter`] for an unregistered name, or
    /// the first error raised by the filter itself.
    pub fn apply(
        &self,
        name: &str,
        raster: &Raster,
        ctx: &mut Context<'_>,
    ) -> Result<Raster, FilterError> {
        let filter = self.resolve(name)?;
        log::debug!(
            "applying {name} to {}x{} raster",
            raster.width(),
            raster.height()
        );
        filter.apply(raster, ctx)
    }
}
