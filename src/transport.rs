//! Request boundary
//!
//! JSON-over-base64 contract used by the upload path: decode the request,
//! run the rewriter, re-encode the result. Only decoding can fail; the
//! rewriter always produces a buffer.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::cache::StripCache;
use crate::config::StripperConfig;
use crate::error::RequestError;
use crate::jpeg::rewriter::SegmentRewriter;
use crate::types::StripOutcome;

/// Incoming request body. Fields are optional so a missing field is
/// reported as such rather than as a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripRequest {
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
}

impl StripRequest {
    pub fn new(image: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            image_base64: Some(STANDARD.encode(image)),
            mime_type: Some(mime_type.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripResponse {
    pub image_base64: String,
    pub stripped: bool,
    pub original_size: usize,
    pub cleaned_size: usize,
}

impl From<&StripOutcome> for StripResponse {
    fn from(outcome: &StripOutcome) -> Self {
        Self {
            image_base64: STANDARD.encode(&outcome.cleaned),
            stripped: outcome.stripped,
            original_size: outcome.original_size,
            cleaned_size: outcome.cleaned_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        Self {
            error: err.to_string(),
            details: err.details(),
        }
    }
}

/// Status code plus JSON body, ready for whatever transport hosts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Hosts the rewriter behind the JSON request contract.
#[derive(Debug, Clone, Default)]
pub struct StripService {
    rewriter: SegmentRewriter,
    cache: Option<Arc<StripCache>>,
}

impl StripService {
    pub fn new(rewriter: SegmentRewriter) -> Self {
        Self { rewriter, cache: None }
    }

    pub fn from_config(config: &StripperConfig) -> Self {
        let service = Self::new(SegmentRewriter::from_config(config));
        match config.cache_ttl() {
            Some(ttl) => service.with_cache(Arc::new(StripCache::new(ttl, config.cache_max_entries))),
            None => service,
        }
    }

    /// Memoize outcomes in a caller-owned cache.
    pub fn with_cache(mut self, cache: Arc<StripCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn rewriter(&self) -> &SegmentRewriter {
        &self.rewriter
    }

    /// Handles a raw request body and never fails: decode errors become 400s.
    #[instrument(skip_all, fields(body_len = body.len()))]
    pub fn handle(&self, body: &[u8]) -> Reply {
        let result = serde_json::from_slice::<StripRequest>(body)
            .map_err(|e| RequestError::MalformedBody(e.to_string()))
            .and_then(|request| self.process(&request));

        match result {
            Ok(response) => Reply {
                status: 200,
                body: serde_json::to_value(&response).unwrap_or(Value::Null),
            },
            Err(err) => {
                warn!(error = %err, "Rejected strip request");
                Reply {
                    status: err.status(),
                    body: serde_json::to_value(ErrorResponse::from(&err)).unwrap_or(Value::Null),
                }
            }
        }
    }

    /// Decodes, strips and re-encodes one request.
    pub fn process(&self, request: &StripRequest) -> Result<StripResponse, RequestError> {
        let encoded = request
            .image_base64
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RequestError::MissingField("imageBase64"))?;
        let mime_type = request
            .mime_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RequestError::MissingField("mimeType"))?;

        let bytes = decode_image(encoded)?;
        let outcome = self.strip(&bytes, mime_type);
        info!(
            mime_type,
            stripped = outcome.stripped,
            original_size = outcome.original_size,
            cleaned_size = outcome.cleaned_size,
            "Processed image"
        );
        Ok(StripResponse::from(&outcome))
    }

    fn strip(&self, bytes: &[u8], mime_type: &str) -> StripOutcome {
        let Some(cache) = &self.cache else {
            return self.rewriter.strip(bytes, mime_type);
        };
        let key = StripCache::key(bytes, mime_type);
        if let Some(outcome) = cache.get(&key) {
            return outcome;
        }
        let outcome = self.rewriter.strip(bytes, mime_type);
        cache.insert(key, outcome.clone());
        outcome
    }
}

/// Decodes standard base64, tolerating a `data:<type>;base64,` prefix and
/// embedded line breaks.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, RequestError> {
    let payload = match encoded.trim().strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| RequestError::InvalidBase64("data URL without payload".into()))?,
        None => encoded.trim(),
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RequestError::InvalidBase64(e.to_string()))
}
