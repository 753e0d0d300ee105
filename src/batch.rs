//! Parallel batch stripping
//!
//! Each strip call is independent, so a batch fans out over the rayon pool
//! and comes back in input order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::jpeg::rewriter::SegmentRewriter;
use crate::types::StripOutcome;

/// One input of a batch: caller id, bytes and declared media type.
#[derive(Debug, Clone)]
pub struct BatchInput<T> {
    pub id: T,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Result of stripping one item in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem<T> {
    pub id: T,
    pub outcome: StripOutcome,
}

/// Aggregate numbers over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub stripped: usize,
    pub degraded: usize,
    pub bytes_removed: usize,
}

impl BatchSummary {
    pub fn from_items<T>(items: &[BatchItem<T>]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.files += 1;
            acc.stripped += usize::from(item.outcome.stripped);
            acc.degraded += usize::from(item.outcome.is_degraded());
            acc.bytes_removed += item.outcome.bytes_removed();
            acc
        })
    }
}

/// Strips every input in parallel.
pub fn strip_batch<T, I>(rewriter: &SegmentRewriter, items: I) -> Vec<BatchItem<T>>
where
    I: IntoIterator<Item = BatchInput<T>>,
    T: Send,
{
    let inputs: Vec<BatchInput<T>> = items.into_iter().collect();
    let results: Vec<BatchItem<T>> = inputs
        .into_par_iter()
        .map(|input| {
            let outcome = rewriter.strip(&input.bytes, &input.media_type);
            BatchItem { id: input.id, outcome }
        })
        .collect();

    let summary = BatchSummary::from_items(&results);
    info!(
        files = summary.files,
        stripped = summary.stripped,
        degraded = summary.degraded,
        bytes_removed = summary.bytes_removed,
        "Batch complete"
    );
    results
}
