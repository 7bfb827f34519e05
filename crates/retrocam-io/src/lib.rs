//! retrocam-io: Image I/O, configuration and request handling.
//!
//! Decodes uploaded photos (honouring EXIF orientation), runs them
//! through a [`retrocam_pipeline::Registry`] filter and encodes the
//! result back to the source format. Also loads the JSON configuration
//! and the font and dust-texture assets from disk.

pub mod config;
pub mod raster;
pub mod service;

pub use config::{Config, ConfigError};
pub use raster::{FilterResult, decode, encode};
pub use service::{FilterRequest, Response, Service};
