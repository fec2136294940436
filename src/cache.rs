//! Parse cache keyed by the SHA-256 of the uploaded bytes.

use crate::error::Result;
use crate::loader::LoadReport;
use crate::types::FleetDataset;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Hex SHA-256 of a file's content.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CachedParse {
    pub dataset: Arc<FleetDataset>,
    pub report: LoadReport,
}

#[derive(Debug, Default)]
pub struct ParseCache {
    entries: HashMap<String, CachedParse>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached parse for `bytes`, running `parse` only on a miss.
    /// Failed parses are not cached.
    pub fn get_or_parse<F>(&mut self, bytes: &[u8], parse: F) -> Result<CachedParse>
    where
        F: FnOnce(&[u8]) -> Result<(FleetDataset, LoadReport)>,
    {
        let key = content_key(bytes);
        if let Some(hit) = self.entries.get(&key) {
            debug!(key = %&key[..12], "parse cache hit");
            return Ok(hit.clone());
        }
        let (dataset, report) = parse(bytes)?;
        let entry = CachedParse {
            dataset: Arc::new(dataset),
            report,
        };
        self.entries.insert(key, entry.clone());
        Ok(entry)
    }

    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries.contains_key(&content_key(bytes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached parse.
    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            info!(entries = self.entries.len(), "parse cache cleared");
        }
        self.entries.clear();
    }
}
