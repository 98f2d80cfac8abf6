//! Feature directory: the engine's read-only window onto the feature store.
//!
//! Features and teams are owned by an external CRUD store. This engine only
//! needs to resolve a feature ID to its team and current status, so that is
//! the entire trait surface. The engine never mutates features.

use crate::domain::{FeatureId, FeatureRecord, FeatureStatus, TeamId};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only resolution of features.
///
/// Implementations must be `Send + Sync` for concurrent use from request
/// handlers. The engine assumes nothing about a feature beyond its team and
/// status.
#[async_trait]
pub trait FeatureDirectory: Send + Sync {
    /// Resolve a feature to its team and current status.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFeature` if the feature does not exist.
    async fn resolve(&self, id: &FeatureId) -> Result<FeatureRecord>;
}

/// In-memory feature directory.
///
/// Suitable for tests and for embedding the engine without the external
/// feature store. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    features: Arc<RwLock<HashMap<FeatureId, FeatureRecord>>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a feature record
    pub async fn insert(
        &self,
        id: FeatureId,
        team_id: TeamId,
        status: FeatureStatus,
    ) {
        let mut features = self.features.write().await;
        features.insert(id, FeatureRecord { team_id, status });
    }

    /// Update a feature's status.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFeature` if the feature does not exist.
    pub async fn set_status(&self, id: &FeatureId, status: FeatureStatus) -> Result<()> {
        let mut features = self.features.write().await;
        let record = features
            .get_mut(id)
            .ok_or_else(|| Error::UnknownFeature(id.clone()))?;
        record.status = status;
        Ok(())
    }

    /// Remove a feature record.
    ///
    /// The caller is responsible for cascading edge deletion via
    /// `DependencyEngine::delete_all_for_feature`.
    pub async fn remove(&self, id: &FeatureId) -> bool {
        let mut features = self.features.write().await;
        features.remove(id).is_some()
    }
}

#[async_trait]
impl FeatureDirectory for InMemoryDirectory {
    async fn resolve(&self, id: &FeatureId) -> Result<FeatureRecord> {
        let features = self.features.read().await;
        features
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownFeature(id.clone()))
    }
}
