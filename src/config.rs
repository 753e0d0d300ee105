//! Configuration types and validation for the stripper

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::media_type::{MediaTypeSet, DEFAULT_JPEG_MEDIA_TYPES};

/// Runtime configuration for the rewriter, the request boundary and its cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripperConfig {
    /// Declared media types treated as JPEG
    pub jpeg_media_types: Vec<String>,
    /// Time-to-live of memoized outcomes, 0 disables the cache
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
}

impl Default for StripperConfig {
    fn default() -> Self {
        Self {
            jpeg_media_types: DEFAULT_JPEG_MEDIA_TYPES.iter().map(|s| s.to_string()).collect(),
            cache_ttl_secs: 0,
            cache_max_entries: 256,
        }
    }
}

impl StripperConfig {
    /// Loads a config file, trying JSON first and YAML second.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_str_any(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_str_any(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| Error::ConfigError(format!("Config parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.media_type_set().is_empty() {
            return Err(Error::InvalidConfiguration(
                "jpeg_media_types must name at least one media type".into(),
            ));
        }
        if self.cache_ttl_secs > 0 && self.cache_max_entries == 0 {
            return Err(Error::InvalidConfiguration(
                "cache_max_entries must be positive when the cache is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn media_type_set(&self) -> MediaTypeSet {
        MediaTypeSet::new(&self.jpeg_media_types)
    }

    /// `None` when memoization is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
