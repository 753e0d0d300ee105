//! Error types for the EXIF stripping library
//!
//! The segment rewriter itself never fails; these errors only surface at the
//! request boundary, configuration loading and file I/O.

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for exifstrip operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for exifstrip operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Request error: {0}")]
    RequestError(#[from] RequestError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Failures decoding a strip request before the rewriter is reached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    #[error("Invalid request body")]
    MalformedBody(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid base64 image data")]
    InvalidBase64(String),
}

impl RequestError {
    /// HTTP-style status code the hosting boundary replies with.
    pub fn status(&self) -> u16 {
        match self {
            RequestError::MalformedBody(_)
            | RequestError::MissingField(_)
            | RequestError::InvalidBase64(_) => 400,
        }
    }

    /// Optional detail string for the error body.
    pub fn details(&self) -> Option<String> {
        match self {
            RequestError::MalformedBody(d) | RequestError::InvalidBase64(d) => Some(d.clone()),
            RequestError::MissingField(_) => None,
        }
    }
}
