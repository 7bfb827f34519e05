//! Service configuration and filesystem asset loading.
//!
//! The configuration is a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "font_path": "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
//!   "dust_texture_path": "assets/dust.png",
//!   "stamp_format": "'%y %m %d",
//!   "seed": 42,
//!   "presets": {
//!     "faded": [{"kind": "saturate", "factor": 0.6}, {"kind": "grain", "intensity": 20.0, "offset": 10.0}]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use retrocam_pipeline::assets::FontSource;
use retrocam_pipeline::{Assets, Preset, Registry};
use serde::{Deserialize, Serialize};

/// Errors that can occur while reading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid configuration.
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// TTF/OTF font for date stamps. The built-in font is used when
    /// absent or unreadable.
    pub font_path: Option<PathBuf>,

    /// Texture for the `dust` filter. Without it that filter fails.
    pub dust_texture_path: Option<PathBuf>,

    /// strftime pattern for timestamp date stamps.
    pub stamp_format: Option<String>,

    /// Fixed random seed; fresh entropy per request when absent.
    pub seed: Option<u64>,

    /// Extra presets, registered after (and able to replace) the
    /// built-in filters.
    pub presets: BTreeMap<String, Preset>,
}

impl Config {
    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid configuration JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `text` is not valid configuration.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The built-in filters plus the configured presets, with the
    /// configured stamp format applied.
    #[must_use]
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::builtin();
        for (name, preset) in &self.presets {
            if registry.register(name.clone(), preset.clone()).is_some() {
                log::info!("preset {name} replaces a built-in filter");
            }
        }
        if let Some(format) = &self.stamp_format {
            registry.set_stamp_format(format);
        }
        registry
    }

    /// Load the font and dust texture from disk.
    ///
    /// Never fails: an unusable font falls back to the built-in one, and
    /// an unusable dust texture leaves the `dust` filter without its
    /// asset. Both cases are logged as warnings.
    #[must_use]
    pub fn load_assets(&self) -> Assets {
        let mut assets = Assets::builtin();

        if let Some(path) = &self.font_path {
            match std::fs::read(path) {
                Ok(bytes) => {
                    assets = assets.with_font_or_builtin(bytes);
                    if matches!(assets.font_source(), FontSource::Custom(_)) {
                        log::info!("loaded font from {}", path.display());
                    }
                }
                Err(e) => {
                    log::warn!(
                        "failed to read font {}: {e}; falling back to the built-in font",
                        path.display()
                    );
                }
            }
        }

        if let Some(path) = &self.dust_texture_path {
            let loaded = std::fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    assets
                        .clone()
                        .with_dust_texture_bytes(&bytes)
                        .map_err(|e| e.to_string())
                });
            match loaded {
                Ok(with_texture) => {
                    assets = with_texture;
                    log::info!("loaded dust texture from {}", path.display());
                }
                Err(e) => log::warn!("dust texture {} unavailable: {e}", path.display()),
            }
        }

        assets
    }
}
