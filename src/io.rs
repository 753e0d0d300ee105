//! File helpers around the rewriter

use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::jpeg::rewriter::SegmentRewriter;
use crate::types::StripOutcome;

/// Reads `input`, strips it and writes the cleaned bytes to `output`.
///
/// The output file is only created once the transform has produced its
/// buffer, so a failed read never leaves a partial file behind.
#[instrument(skip(rewriter))]
pub async fn strip_file(
    rewriter: &SegmentRewriter,
    input: &Path,
    output: &Path,
    media_type: &str,
) -> Result<StripOutcome> {
    let bytes = fs::read(input).await?;
    let outcome = rewriter.strip(&bytes, media_type);
    fs::write(output, &outcome.cleaned).await?;
    info!(
        stripped = outcome.stripped,
        bytes_removed = outcome.bytes_removed(),
        "Wrote cleaned image"
    );
    Ok(outcome)
}

/// Copies `path` to `<path>.backup`.
pub async fn create_backup(path: &Path) -> Result<()> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".backup");
    fs::copy(path, &backup).await?;
    Ok(())
}
