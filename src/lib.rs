//! Main Library File for JPEG Metadata Stripping
//! Removes APP1 (EXIF/XMP) segments from user-submitted photographs before
//! they are persisted, copying every other byte of the stream verbatim.
//!
//! ```
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x04, 0x45, 0x78, 0xFF, 0xD9];
//! let outcome = exifstrip::strip_exif(&jpeg, "image/jpeg");
//! assert!(outcome.stripped);
//! assert_eq!(outcome.cleaned, vec![0xFF, 0xD8, 0xFF, 0xD9]);
//! ```

// Configuration and errors
pub mod config;
pub mod error;
pub mod types;

// Marker scanning and segment rewriting
pub mod jpeg {
    pub mod marker;
    pub mod rewriter;
}

pub mod media_type;

// Hosting boundary, memoization and batch helpers
pub mod batch;
pub mod cache;
pub mod io;
pub mod transport;

// Re-exports for crate consumers
pub use batch::{strip_batch, BatchInput, BatchItem, BatchSummary};
pub use cache::{CacheStats, StripCache};
pub use config::StripperConfig;
pub use error::{Error, RequestError, Result};
pub use jpeg::marker::{classify, MarkerClass, ScanAction};
pub use jpeg::rewriter::{strip_exif, SegmentRewriter};
pub use media_type::{media_type_for_path, MediaTypeSet};
pub use transport::{ErrorResponse, Reply, StripRequest, StripResponse, StripService};
pub use types::{
    Completion, DegradedReason, PassthroughReason, RemovedSegment, SegmentKind, StripOutcome,
};
