//! Segment Rewriter
//! Removes APP1 (EXIF/XMP) segments from a JPEG byte stream in a single
//! forward pass, copying every other byte verbatim and in order.
//!
//! The pass is total: truncated or malformed input degrades to flushing the
//! remaining bytes unchanged, it never panics or fails.

use tracing::{debug, instrument, warn};

use super::marker::{
    classify, marker_name, MarkerClass, ScanAction, EXIF_IDENTIFIER, MARKER_PREFIX, SOI_MARKER,
    XMP_IDENTIFIER,
};
use crate::config::StripperConfig;
use crate::media_type::MediaTypeSet;
use crate::types::{
    Completion, DegradedReason, PassthroughReason, RemovedSegment, SegmentKind, StripOutcome,
};

/// Strips APP1 segments from buffers declared as JPEG.
#[derive(Debug, Clone, Default)]
pub struct SegmentRewriter {
    media_types: MediaTypeSet,
}

impl SegmentRewriter {
    pub fn new(media_types: MediaTypeSet) -> Self {
        Self { media_types }
    }

    pub fn from_config(config: &StripperConfig) -> Self {
        Self::new(config.media_type_set())
    }

    pub fn media_types(&self) -> &MediaTypeSet {
        &self.media_types
    }

    /// Returns `bytes` with every APP1 segment elided.
    ///
    /// Non-JPEG media types and buffers without a leading SOI come back
    /// byte-identical with `stripped == false`.
    #[instrument(skip_all, fields(size = bytes.len(), media_type = declared_media_type))]
    pub fn strip(&self, bytes: &[u8], declared_media_type: &str) -> StripOutcome {
        if !self.media_types.is_jpeg(declared_media_type) {
            debug!("Not a JPEG media type, passing through");
            return StripOutcome::passthrough(bytes, PassthroughReason::MediaType);
        }
        if !bytes.starts_with(&SOI_MARKER) {
            debug!("Missing start-of-image marker, passing through");
            return StripOutcome::passthrough(bytes, PassthroughReason::MissingStartOfImage);
        }

        let mut scanner = Scanner::new(bytes);
        let completion = scanner.run();
        let Scanner { out, removed, .. } = scanner;

        if let Completion::Degraded { offset, reason } = completion {
            warn!(offset, ?reason, "Malformed JPEG structure, remaining bytes copied verbatim");
        }

        let cleaned_size = out.len();
        debug!(
            removed = removed.len(),
            original_size = bytes.len(),
            cleaned_size,
            "JPEG pass complete"
        );

        StripOutcome {
            cleaned: out,
            stripped: !removed.is_empty(),
            original_size: bytes.len(),
            cleaned_size,
            removed,
            completion,
        }
    }
}

/// Strips with the default JPEG alias set.
pub fn strip_exif(bytes: &[u8], declared_media_type: &str) -> StripOutcome {
    SegmentRewriter::default().strip(bytes, declared_media_type)
}

/// Cursor state for one pass over a buffer that starts with SOI.
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    removed: Vec<RemovedSegment>,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        let mut out = Vec::with_capacity(data.len());
        out.extend_from_slice(&SOI_MARKER);
        Self {
            data,
            pos: SOI_MARKER.len(),
            out,
            removed: Vec::new(),
        }
    }

    fn run(&mut self) -> Completion {
        while self.pos < self.data.len() {
            let byte = self.data[self.pos];
            if byte != MARKER_PREFIX {
                self.out.push(byte);
                self.pos += 1;
                continue;
            }

            let Some((code_at, class)) = self.marker_code() else {
                return self.flush_rest(DegradedReason::Truncated);
            };
            let code = self.data[code_at];
            let marker_end = code_at + 1;

            match class.action() {
                // marker_code never stops on a fill byte
                ScanAction::ExtendFill => return self.flush_rest(DegradedReason::Truncated),
                ScanAction::CopyMarker => {
                    self.out.extend_from_slice(&self.data[self.pos..marker_end]);
                    self.pos = marker_end;
                }
                ScanAction::TailCopy => {
                    self.out.extend_from_slice(&self.data[self.pos..]);
                    self.pos = self.data.len();
                    return if class == MarkerClass::ScanStart {
                        Completion::ScanData
                    } else {
                        Completion::EndOfImage
                    };
                }
                ScanAction::CopySegment | ScanAction::DropSegment => {
                    let end = match self.segment_end(marker_end) {
                        Ok(end) => end,
                        Err(reason) => return self.flush_rest(reason),
                    };
                    let span = end - self.pos;
                    if class.action() == ScanAction::DropSegment {
                        let kind = segment_kind(&self.data[marker_end + 2..end]);
                        debug!(offset = self.pos, length = span, ?kind, "Dropping APP1 segment");
                        self.removed.push(RemovedSegment {
                            offset: self.pos,
                            length: span,
                            kind,
                        });
                    } else {
                        debug!(
                            offset = self.pos,
                            length = span,
                            marker = marker_name(code),
                            "Keeping segment"
                        );
                        self.out.extend_from_slice(&self.data[self.pos..end]);
                    }
                    self.pos = end;
                }
            }
        }
        Completion::EndOfBuffer
    }

    /// Skips the `0xFF` run starting at `pos` and returns the index and class
    /// of the marker code behind it. Fill bytes belong to that marker.
    fn marker_code(&self) -> Option<(usize, MarkerClass)> {
        let rest = self.data.get(self.pos + 1..)?;
        let skipped = rest
            .iter()
            .position(|&b| classify(b).action() != ScanAction::ExtendFill)?;
        let code_at = self.pos + 1 + skipped;
        Some((code_at, classify(self.data[code_at])))
    }

    /// End of the length-prefixed segment whose code byte ends at `marker_end`.
    fn segment_end(&self, marker_end: usize) -> Result<usize, DegradedReason> {
        let field = self
            .data
            .get(marker_end..marker_end + 2)
            .ok_or(DegradedReason::Truncated)?;
        let length = usize::from(u16::from_be_bytes([field[0], field[1]]));
        if length < 2 {
            return Err(DegradedReason::InvalidLength);
        }
        match marker_end.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(DegradedReason::Truncated),
        }
    }

    fn flush_rest(&mut self, reason: DegradedReason) -> Completion {
        let offset = self.pos;
        self.out.extend_from_slice(&self.data[offset..]);
        self.pos = self.data.len();
        Completion::Degraded { offset, reason }
    }
}

fn segment_kind(payload: &[u8]) -> SegmentKind {
    if payload.starts_with(EXIF_IDENTIFIER) {
        SegmentKind::Exif
    } else if payload.starts_with(XMP_IDENTIFIER) {
        SegmentKind::Xmp
    } else {
        SegmentKind::Other
    }
}
