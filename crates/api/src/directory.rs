//! The business directory read interface.
//!
//! The directory is an external collaborator that owns full business
//! records; this service only needs region-scoped reads. The in-memory
//! implementation backs local development and tests, seeded from a JSON
//! fixture file.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sipclub_core::types::{BusinessId, BusinessLocation};
use thiserror::Error;

/// Errors surfaced by directory implementations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Seed file could not be read.
    #[error("failed to read directory seed: {0}")]
    Seed(#[from] std::io::Error),

    /// Seed file did not parse as a list of business locations.
    #[error("failed to parse directory seed: {0}")]
    SeedFormat(#[from] serde_json::Error),

    /// Backend failure in a real directory implementation.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the business directory.
///
/// `list_by_region` is the primary narrowing query; `list_all` exists for
/// the near-me flows, which arrive with a coordinate but no region to
/// filter by.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    /// Businesses in a city/state region. Matching is case-insensitive.
    async fn list_by_region(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Vec<BusinessLocation>, DirectoryError>;

    /// A single business by id.
    async fn get(&self, id: &BusinessId) -> Result<Option<BusinessLocation>, DirectoryError>;

    /// Every business in the directory.
    async fn list_all(&self) -> Result<Vec<BusinessLocation>, DirectoryError>;
}

/// In-memory directory, immutable after construction.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    by_id: HashMap<BusinessId, BusinessLocation>,
    ordered: Vec<BusinessId>,
}

impl InMemoryDirectory {
    /// Directory over the given locations, preserving input order.
    #[must_use]
    pub fn new(locations: Vec<BusinessLocation>) -> Self {
        let ordered = locations.iter().map(|l| l.id.clone()).collect();
        let by_id = locations.into_iter().map(|l| (l.id.clone(), l)).collect();
        Self { by_id, ordered }
    }

    /// Load a directory from a JSON array of business locations.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if the file is unreadable or malformed.
    pub fn from_seed_file(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        let locations: Vec<BusinessLocation> = serde_json::from_str(&raw)?;
        tracing::info!(count = locations.len(), path = %path.display(), "directory seed loaded");
        Ok(Self::new(locations))
    }

    /// Number of businesses in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the directory holds no businesses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[async_trait]
impl BusinessDirectory for InMemoryDirectory {
    async fn list_by_region(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Vec<BusinessLocation>, DirectoryError> {
        Ok(self
            .ordered
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .filter(|l| l.city.eq_ignore_ascii_case(city) && l.state.eq_ignore_ascii_case(state))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &BusinessId) -> Result<Option<BusinessLocation>, DirectoryError> {
        Ok(self.by_id.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<BusinessLocation>, DirectoryError> {
        Ok(self
            .ordered
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect())
    }
}
