//! Cache-aside store for the most recently computed chart.
//!
//! A single fixed key holds the last chart fetched for anyone. There is
//! no expiry and no per-person scoping: the next successful fetch
//! overwrites it. Pages read it only to paint something before the
//! authoritative fetch resolves.

use std::sync::Arc;

use jyotish_core::chart::ChartResult;

use crate::storage::{Storage, StorageError};

/// Storage key of the cached chart.
pub const CHART_CACHE_KEY: &str = "chartData";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored value is not a valid chart document.
    #[error("Cached chart is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Last-write-wins chart cache over a shared [`Storage`].
#[derive(Clone)]
pub struct ChartCache {
    storage: Arc<dyn Storage>,
}

impl ChartCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Serialize and store `chart`, replacing whatever was there.
    pub fn write(&self, chart: &ChartResult) -> Result<(), CacheError> {
        let json = serde_json::to_string(chart)?;
        self.storage.set(CHART_CACHE_KEY, &json)?;
        Ok(())
    }

    /// The cached chart, `None` if nothing is stored. A stored value that
    /// does not parse is reported as [`CacheError::Malformed`].
    pub fn read(&self) -> Result<Option<ChartResult>, CacheError> {
        let Some(raw) = self.storage.get(CHART_CACHE_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.storage.remove(CHART_CACHE_KEY)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
