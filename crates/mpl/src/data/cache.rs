//! On-disk cache of parsed behavioral data.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{load_behavioral_csv, BehavioralData, StoredParticipant};
use crate::error::Result;

/// Parsed behavioral data cached as JSON next to its source.
///
/// The cache is used when it exists and is not older than the source;
/// otherwise the source is parsed again and the cache rewritten. Callers own
/// the cache object and pass it where the data is needed.
#[derive(Debug, Clone)]
pub struct DataCache {
    source: PathBuf,
    cache: PathBuf,
}

impl DataCache {
    /// Cache `source` at `cache`.
    pub fn new(source: impl Into<PathBuf>, cache: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cache: cache.into(),
        }
    }

    /// Cache `source` at `<source>.cache.json`.
    pub fn beside(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let mut name = source.clone().into_os_string();
        name.push(".cache.json");
        Self {
            source,
            cache: PathBuf::from(name),
        }
    }

    /// Path of the behavioral CSV.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path of the JSON cache file.
    pub fn cache_path(&self) -> &Path {
        &self.cache
    }

    /// Whether the cache file exists and is at least as new as the source.
    pub fn is_fresh(&self) -> bool {
        let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
        match (modified(&self.cache), modified(&self.source)) {
            (Some(cache), Some(source)) => cache >= source,
            _ => false,
        }
    }

    /// Load the data, from the cache when fresh.
    pub fn load(&self) -> Result<BehavioralData> {
        if self.is_fresh() {
            match self.read_cache() {
                Ok(data) => {
                    tracing::debug!("Cache hit: {}", self.cache.display());
                    return Ok(data);
                }
                Err(e) => tracing::warn!(
                    "Discarding unreadable cache {}: {}",
                    self.cache.display(),
                    e
                ),
            }
        } else {
            tracing::debug!("Cache miss: {}", self.cache.display());
        }

        let data = load_behavioral_csv(&self.source)?;
        self.write_cache(&data)?;
        tracing::info!(
            "Rebuilt cache {} from {}",
            self.cache.display(),
            self.source.display()
        );
        Ok(data)
    }

    /// Remove the cache file. A missing cache is not an error.
    pub fn invalidate(&self) -> Result<()> {
        match fs::remove_file(&self.cache) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_cache(&self) -> Result<BehavioralData> {
        let text = fs::read_to_string(&self.cache)?;
        let stored: Vec<StoredParticipant> = serde_json::from_str(&text)?;
        BehavioralData::from_stored(stored)
    }

    fn write_cache(&self, data: &BehavioralData) -> Result<()> {
        let text = serde_json::to_string(&data.to_stored())?;
        fs::write(&self.cache, text)?;
        Ok(())
    }
}
