//! Result of a single strip call

use serde::Serialize;

/// Why a buffer was returned without being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughReason {
    /// Declared media type is not a JPEG alias.
    MediaType,
    /// Bytes do not open with `FF D8`.
    MissingStartOfImage,
}

/// Structural anomaly that ended a pass early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// A marker, length field or segment runs past the end of the buffer.
    Truncated,
    /// A length field smaller than its own two bytes.
    InvalidLength,
}

/// How the scanning pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Completion {
    Passthrough { reason: PassthroughReason },
    /// Reached SOS; scan data copied verbatim.
    ScanData,
    /// Reached EOI before any scan.
    EndOfImage,
    /// Ran out of bytes on a segment boundary.
    EndOfBuffer,
    /// Remaining bytes from `offset` were flushed verbatim.
    Degraded { offset: usize, reason: DegradedReason },
}

/// Payload family of an elided APP1 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Exif,
    Xmp,
    Other,
}

/// One elided span of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovedSegment {
    /// Offset of the `0xFF` marker byte in the input.
    pub offset: usize,
    /// Full span: marker, length field and payload.
    pub length: usize,
    pub kind: SegmentKind,
}

/// Cleaned bytes plus what happened to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripOutcome {
    #[serde(skip)]
    pub cleaned: Vec<u8>,
    pub stripped: bool,
    pub original_size: usize,
    pub cleaned_size: usize,
    pub removed: Vec<RemovedSegment>,
    pub completion: Completion,
}

impl StripOutcome {
    /// Outcome for a buffer returned byte-identical without scanning.
    pub fn passthrough(bytes: &[u8], reason: PassthroughReason) -> Self {
        Self {
            cleaned: bytes.to_vec(),
            stripped: false,
            original_size: bytes.len(),
            cleaned_size: bytes.len(),
            removed: Vec::new(),
            completion: Completion::Passthrough { reason },
        }
    }

    pub fn bytes_removed(&self) -> usize {
        self.original_size.saturating_sub(self.cleaned_size)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.completion, Completion::Degraded { .. })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.cleaned
    }
}
