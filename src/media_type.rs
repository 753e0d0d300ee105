//! Declared media-type handling
//!
//! The rewriter only touches buffers whose declared type is one of the JPEG
//! aliases; everything else is a passthrough.

use std::path::Path;

/// Default JPEG media-type aliases.
pub const DEFAULT_JPEG_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/pjpeg"];

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Set of media types treated as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeSet {
    aliases: Vec<String>,
}

impl Default for MediaTypeSet {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_MEDIA_TYPES.iter().copied())
    }
}

impl MediaTypeSet {
    /// Builds a set from arbitrary aliases; entries are normalized on insert.
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for alias in aliases {
            let alias = normalize(alias.as_ref());
            if !alias.is_empty() && !normalized.contains(&alias) {
                normalized.push(alias);
            }
        }
        Self { aliases: normalized }
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Case-insensitive match ignoring surrounding whitespace and `;` parameters.
    pub fn is_jpeg(&self, declared: &str) -> bool {
        let essence = essence(declared);
        self.aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(essence))
    }
}

/// `type/subtype` part of a media type, without parameters.
fn essence(declared: &str) -> &str {
    declared.split(';').next().unwrap_or_default().trim()
}

fn normalize(declared: &str) -> String {
    essence(declared).to_ascii_lowercase()
}

/// Guesses a media type from a file extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => OCTET_STREAM,
    }
}
