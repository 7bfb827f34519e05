//! Request handling: the `apply-filter` contract without a transport.
//!
//! A [`FilterRequest`] carries the two form fields (`image` and
//! `filter`). [`Service::handle`] turns it into a [`Response`] that is
//! either encoded image bytes or a JSON error body with an HTTP status.
//! Wiring this to an actual HTTP server is left to the caller.

use retrocam_pipeline::{Assets, Context, FilterError, Registry};
use serde::Serialize;

use crate::config::Config;
use crate::raster::{FilterResult, decode, encode};

/// The fields of one filter request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    /// Encoded input image.
    pub image: Option<Vec<u8>>,
    /// Registered filter name.
    pub filter: Option<String>,
}

impl FilterRequest {
    /// A request with both fields present.
    #[must_use]
    pub fn new(image: Vec<u8>, filter: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            filter: Some(filter.into()),
        }
    }
}

/// JSON error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// What goes back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The filtered image.
    Image(FilterResult),
    /// A failure, with its HTTP status and JSON body.
    Error {
        /// HTTP status code.
        status: u16,
        /// Serialized `{"error": ...}` object.
        body: String,
    },
}

impl Response {
    /// Render `err` as an error response.
    #[must_use]
    pub fn from_error(err: &FilterError) -> Self {
        let message = err.to_string();
        let body = serde_json::to_string(&ErrorBody { error: &message })
            .unwrap_or_else(|_| String::from(r#"{"error":"internal error"}"#));
        Self::Error {
            status: err.kind().status_code(),
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Image(_) => 200,
            Self::Error { status, .. } => *status,
        }
    }

    /// Value for the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Image(result) => result.content_type(),
            Self::Error { .. } => "application/json",
        }
    }

    /// Response body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        match self {
            Self::Image(result) => result.bytes(),
            Self::Error { body, .. } => body.as_bytes(),
        }
    }
}

/// Everything needed to serve filter requests.
///
/// Read-only after construction, so one instance can be shared by any
/// number of worker threads.
#[derive(Debug, Clone)]
pub struct Service {
    registry: Registry,
    assets: Assets,
    seed: Option<u64>,
}

impl Service {
    /// A service over `registry` and `assets`, seeding each request from
    /// entropy.
    #[must_use]
    pub const fn new(registry: Registry, assets: Assets) -> Self {
        Self {
            registry,
            assets,
            seed: None,
        }
    }

    /// Build the registry and load assets as described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registry(), config.load_assets()).with_seed(config.seed)
    }

    /// Use a fixed seed for every request.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// The filters this service knows.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The loaded assets.
    #[must_use]
    pub const fn assets(&self) -> &Assets {
        &self.assets
    }

    /// A fresh context for one request.
    #[must_use]
    pub fn context(&self) -> Context<'_> {
        match self.seed {
            Some(seed) => Context::seeded(&self.assets, seed),
            None => Context::from_entropy(&self.assets),
        }
    }

    /// Validate, decode, filter and re-encode one request.
    ///
    /// The filter name is resolved before the image is decoded, so an
    /// unknown name fails without doing any work.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingField`] if a field is absent,
    /// [`FilterError::UnknownFilter`] for an unregistered name, or any
    /// decode, filter or encode error.
    pub fn process(&self, request: &FilterRequest) -> Result<FilterResult, FilterError> {
        self.process_with(request, &mut self.context())
    }

    /// Like [`process`](Self::process) with a caller-supplied context.
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn process_with(
        &self,
        request: &FilterRequest,
        ctx: &mut Context<'_>,
    ) -> Result<FilterResult, FilterError> {
        let image = request
            .image
            .as_deref()
            .ok_or(FilterError::MissingField("image"))?;
        let name = request
            .filter
            .as_deref()
            .ok_or(FilterError::MissingField("filter"))?;

        let filter = self.registry.resolve(name)?;
        if filter.is_random() && self.seed.is_none() {
            log::debug!("{name} is random and no seed is set; output varies per request");
        }
        let raster = decode(image)?;
        let filtered = self.registry.apply(name, &raster, ctx)?;
        encode(&filtered)
    }

    /// Process a request and render the outcome as a [`Response`].
    #[must_use]
    pub fn handle(&self, request: &FilterRequest) -> Response {
        match self.process(request) {
            Ok(result) => Response::Image(result),
            Err(err) => {
                log::warn!("request failed: {err}");
                Response::from_error(&err)
            }
        }
    }
}
