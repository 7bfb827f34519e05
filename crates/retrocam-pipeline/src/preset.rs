//! Presets: named, fixed chains of transforms.
//!
//! A preset is data. Each step's output feeds the next step; there is
//! no branching and the first failing step aborts the whole chain, so a
//! half-processed image never escapes.

use serde::{Deserialize, Serialize};

use crate::transform::{Context, Effect, StampText, Transform};
use crate::types::{FilterError, Raster};

/// An ordered list of transforms applied in sequence.
///
/// Serializes as a plain JSON array of transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    steps: Vec<Transform>,
}

impl Preset {
    /// A preset running `steps` in order.
    #[must_use]
    pub const fn new(steps: Vec<Transform>) -> Self {
        Self { steps }
    }

    /// The steps, in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    /// Mutable access to the steps.
    pub fn steps_mut(&mut self) -> &mut [Transform] {
        &mut self.steps
    }

    /// Early-2000s point-and-shoot: yellow date stamp, punchy color,
    /// grain, a soft vignette and a faint glow.
    #[must_use]
    pub fn digicam() -> Self {
        Self::new(vec![
            Transform::DateStamp {
                text: StampText::default(),
                padding: 100,
                font_size: 122.0,
                color: [255, 222, 33],
            },
            Transform::GreenTint { factor: 1.023 },
            Transform::Brightness { factor: 1.2 },
            Transform::Saturate { factor: 1.95 },
            Transform::Contrast { factor: 1.15 },
            Transform::Grain {
                intensity: 45.0,
                offset: 20.0,
            },
            Transform::Vignette {
                radius_factor: 1.7,
                strength: 0.3,
            },
            Transform::Halation {
                blur_radius: 5.0,
                intensity: 0.1,
            },
            Transform::LightLeaks {
                count: 2,
                alpha: 0.05,
            },
            Transform::Saturate { factor: 1.05 },
        ])
    }

    /// Single-use film camera: cross-processed color, grain, leaks and
    /// an orange date imprint.
    #[must_use]
    pub fn disposable() -> Self {
        Self::new(vec![
            Transform::CrossProcess,
            Transform::Grain {
                intensity: 30.0,
                offset: 15.0,
            },
            Transform::LightLeaks {
                count: 2,
                alpha: 0.15,
            },
            Transform::Vignette {
                radius_factor: 1.4,
                strength: 0.6,
            },
            Transform::DateStamp {
                text: StampText::default(),
                padding: 40,
                font_size: 48.0,
                color: [255, 140, 0],
            },
        ])
    }
}

impl Effect for Preset {
    fn apply(&self, raster: &Raster, ctx: &mut Context<'_>) -> Result<Raster, FilterError> {
        let mut current = raster.clone();
        for (i, step) in self.steps.iter().enumerate() {
            current = step.apply(&current, ctx)?;
            log::debug!(
                "step {i} ({}) done: {}x{}",
                step.name(),
                current.width(),
                current.height()
            );
        }
        Ok(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::assets::Assets;
    use crate::color;

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_preset_is_identity() {
        let assets = Assets::builtin();
        let mut ctx = Context::seeded(&assets, 0);
        let img = Raster::filled(3, 3, [7, 8, 9]);
        assert_eq!(Preset::new(Vec::new()).apply(&img, &mut ctx).unwrap(), img);
    }

    #[test]
    fn steps_run_in_order() {
        let assets = Assets::builtin();
        let mut ctx = Context::seeded(&assets, 0);
        let img = Raster::filled(2, 2, [100, 100, 100]);
        let preset = Preset::new(vec![
            Transform::Brightness { factor: 2.0 },
            Transform::Invert,
        ]);
        let expected = color::invert(&color::brightness(&img, 2.0));
        assert_eq!(preset.apply(&img, &mut ctx).unwrap(), expected);
    }

    #[test]
    fn later_steps_see_the_resized_canvas() {
        let assets = Assets::builtin();
        let mut ctx = Context::seeded(&assets, 0);
        let img = Raster::filled(4, 4, [100, 100, 100]);
        let preset = Preset::new(vec![
            Transform::PolaroidFrame {
                frame_width: 2,
                bottom_extra: 3,
                background: [255, 255, 255],
            },
            Transform::Invert,
        ]);
        let out = preset.apply(&img, &mut ctx).unwrap();
        assert_eq!((out.width(), out.height()), (8, 9));
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.pixel(3, 3), [155, 155, 155, 255]);
    }

    #[test]
    fn failing_step_aborts_the_chain() {
        let assets = Assets::builtin();
        let mut ctx = Context::seeded(&assets, 0);
        let preset = Preset::new(vec![
            Transform::Invert,
            Transform::DustOverlay { alpha: 0.5 },
            Transform::Invert,
        ]);
        let result = preset.apply(&Raster::filled(2, 2, [0, 0, 0]), &mut ctx);
        assert!(matches!(result, Err(FilterError::MissingAsset(_))));
    }

    #[test]
    fn digicam_has_ten_steps_ending_in_saturate() {
        let preset = Preset::digicam();
        assert_eq!(preset.steps().len(), 10);
        assert_eq!(preset.steps()[0].name(), "date_stamp");
        assert_eq!(preset.steps()[9], Transform::Saturate { factor: 1.05 });
    }

    #[test]
    fn digicam_is_deterministic_per_seed() {
        let assets = Assets::builtin();
        let img = Raster::filled(200, 200, [120, 110, 100]);
        let run = |seed| {
            let mut ctx = Context::seeded(&assets, seed).with_timestamp(timestamp());
            Preset::digicam().apply(&img, &mut ctx).unwrap()
        };
        let a = run(42);
        assert_eq!(a, run(42));
        assert_ne!(a, run(43));
        assert_eq!(a.dimensions(), img.dimensions());
    }

    #[test]
    fn preset_serializes_as_array() {
        let preset = Preset::new(vec![Transform::Sepia, Transform::Posterize { bits: 3 }]);
        let json = serde_json::to_string(&preset).unwrap();
        assert!(json.starts_with('['));
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }
}
