//! Read-only assets consumed by the transform library.
//!
//! [`Assets`] holds the date-stamp font and the dust texture. It is
//! built once at startup and shared immutably by every request; cloning
//! is cheap because the heavy data sits behind [`Arc`]s.
//!
//! This module never touches the filesystem. Callers hand in bytes;
//! `retrocam-io` is responsible for reading them from disk.

use std::sync::Arc;

use ab_glyph::FontArc;

use crate::types::{FilterError, RgbaImage};

/// DejaVu Sans Mono, embedded as the fallback date-stamp font.
pub const BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Where the date-stamp font came from.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// The embedded [`BUILTIN_FONT`].
    Builtin,
    /// A caller-supplied font.
    Custom(FontArc),
}

/// Shared, immutable effect assets.
#[derive(Debug, Clone)]
pub struct Assets {
    font: FontSource,
    dust_texture: Option<Arc<RgbaImage>>,
}

impl Default for Assets {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Assets {
    /// The embedded font and no dust texture.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            font: FontSource::Builtin,
            dust_texture: None,
        }
    }

    /// Use the TTF/OTF font in `bytes` for date stamps.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AssetLoad`] if the bytes are not a font.
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Result<Self, FilterError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| FilterError::AssetLoad {
            name: "font".to_owned(),
            reason: e.to_string(),
        })?;
        self.font = FontSource::Custom(font);
        Ok(self)
    }

    /// Use the font in `bytes`, or keep the built-in font if they cannot
    /// be parsed. Never fails; a rejected font is logged as a warning.
    #[must_use]
    pub fn with_font_or_builtin(self, bytes: Vec<u8>) -> Self {
        let fallback = self.clone();
        match self.with_font_bytes(bytes) {
            Ok(assets) => assets,
            Err(e) => {
                log::warn!("{e}; falling back to the built-in font");
                fallback
            }
        }
    }

    /// Decode `bytes` as the dust/scratches texture.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AssetLoad`] if the texture cannot be decoded
    /// or has no pixels.
    pub fn with_dust_texture_bytes(self, bytes: &[u8]) -> Result<Self, FilterError> {
        let texture = image::load_from_memory(bytes)
            .map_err(|e| FilterError::AssetLoad {
                name: "dust texture".to_owned(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        self.with_dust_texture(texture)
    }

    /// Use an already-decoded dust texture.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AssetLoad`] if the texture has no pixels.
    pub fn with_dust_texture(mut self, texture: RgbaImage) -> Result<Self, FilterError> {
        if texture.width() == 0 || texture.height() == 0 {
            return Err(FilterError::AssetLoad {
                name: "dust texture".to_owned(),
                reason: "texture has no pixels".to_owned(),
            });
        }
        self.dust_texture = Some(Arc::new(texture));
        Ok(self)
    }

    /// The font date stamps are drawn with.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AssetLoad`] if the embedded font fails to
    /// parse, which would indicate a corrupted build.
    pub fn font(&self) -> Result<FontArc, FilterError> {
        match &self.font {
            FontSource::Custom(font) => Ok(font.clone()),
            FontSource::Builtin => {
                FontArc::try_from_slice(BUILTIN_FONT).map_err(|e| FilterError::AssetLoad {
                    name: "built-in font".to_owned(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Where the current font came from.
    #[must_use]
    pub const fn font_source(&self) -> &FontSource {
        &self.font
    }

    /// The dust texture, if one was loaded.
    #[must_use]
    pub fn dust_texture(&self) -> Option<&RgbaImage> {
        self.dust_texture.as_deref()
    }
}
