//! EdgeStore trait implementation for the in-memory backend.

use super::graph::would_create_cycle_impl;
use super::InMemoryEdgeStore;
use crate::domain::{
    canonical_key, DependencyEdge, DependencyType, EdgeDirection, EdgeId, FeatureId, NewDependency,
};
use crate::error::{Error, Result};
use crate::store::{DeleteOutcome, EdgeStore};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

#[async_trait]
impl EdgeStore for InMemoryEdgeStore {
    async fn create(&self, candidate: NewDependency) -> Result<DependencyEdge> {
        let mut inner = self.lock().await;

        // Field constraints first; relationship invariants the store owns
        // (self-reference, canonical uniqueness) are re-checked here even
        // though the pipeline ran them, because the lock held for the rest
        // of this call is what makes the check race-safe.
        candidate.validate().map_err(Error::InvalidDescription)?;

        if candidate.source_feature_id == candidate.target_feature_id {
            return Err(Error::SelfDependency(candidate.source_feature_id));
        }

        if inner.canonical_index.contains_key(&candidate.canonical_key()) {
            return Err(Error::DuplicateDependency {
                src: candidate.source_feature_id,
                target: candidate.target_feature_id,
                dep_type: candidate.dep_type,
            });
        }

        let id = inner.generate_id(&candidate)?;
        let now = Utc::now();

        let edge = DependencyEdge {
            id: id.clone(),
            source_feature_id: candidate.source_feature_id,
            target_feature_id: candidate.target_feature_id,
            dep_type: candidate.dep_type,
            created_by: candidate.created_by,
            description: candidate.description,
            created_at: now,
            updated_at: now,
        };

        inner.index_edge(edge.clone());

        debug!(
            edge_id = %id,
            source = %edge.source_feature_id,
            target = %edge.target_feature_id,
            dep_type = %edge.dep_type,
            "Created dependency edge"
        );

        Ok(edge)
    }

    async fn get(&self, id: &EdgeId) -> Result<Option<DependencyEdge>> {
        let inner = self.lock().await;
        Ok(inner.edges.get(id).cloned())
    }

    async fn update_description(
        &self,
        id: &EdgeId,
        description: Option<String>,
    ) -> Result<DependencyEdge> {
        let mut inner = self.lock().await;

        let mut edge = inner
            .edges
            .get(id)
            .cloned()
            .ok_or_else(|| Error::EdgeNotFound(id.clone()))?;

        edge.description = description;
        edge.updated_at = Utc::now();

        // Validate before committing so a rejected update leaves the
        // stored edge untouched.
        edge.validate().map_err(Error::InvalidDescription)?;

        inner.edges.insert(id.clone(), edge.clone());
        Ok(edge)
    }

    async fn delete(&self, id: &EdgeId) -> Result<DeleteOutcome> {
        let mut inner = self.lock().await;

        match inner.remove_edge(id) {
            Some(edge) => {
                debug!(
                    edge_id = %id,
                    source = %edge.source_feature_id,
                    target = %edge.target_feature_id,
                    "Deleted dependency edge"
                );
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn delete_all_for_feature(&self, feature_id: &FeatureId) -> Result<usize> {
        let mut inner = self.lock().await;

        let ids = inner.edge_ids_touching(feature_id);
        for id in &ids {
            inner.remove_edge(id);
        }

        if !ids.is_empty() {
            debug!(
                feature_id = %feature_id,
                removed = ids.len(),
                "Cascaded edge deletion for feature"
            );
        }

        Ok(ids.len())
    }

    async fn find_by_endpoint(
        &self,
        feature_id: &FeatureId,
        direction: EdgeDirection,
    ) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;

        let index = match direction {
            EdgeDirection::Outgoing => &inner.outgoing,
            EdgeDirection::Incoming => &inner.incoming,
        };

        let mut edges: Vec<DependencyEdge> = index
            .get(feature_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.edges.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        // Oldest first, so views render in creation order.
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(edges)
    }

    async fn contains_equivalent(
        &self,
        source: &FeatureId,
        target: &FeatureId,
        dep_type: DependencyType,
    ) -> Result<bool> {
        let inner = self.lock().await;
        let key = canonical_key(source, target, dep_type);
        Ok(inner.canonical_index.contains_key(&key))
    }

    async fn would_create_cycle(
        &self,
        source: &FeatureId,
        target: &FeatureId,
        dep_type: DependencyType,
    ) -> Result<bool> {
        let inner = self.lock().await;
        Ok(would_create_cycle_impl(
            inner.edges.values(),
            source,
            target,
            dep_type,
        ))
    }

    async fn import_edges(&self, edges: Vec<DependencyEdge>) -> Result<()> {
        let mut inner = self.lock().await;

        for edge in edges {
            if let Err(reason) = edge.validate() {
                warn!(edge_id = %edge.id, %reason, "Skipped invalid edge during import");
                continue;
            }
            if inner.canonical_index.contains_key(&edge.canonical_key()) {
                warn!(edge_id = %edge.id, "Skipped duplicate edge during import");
                continue;
            }
            if edge.dep_type.is_blocking()
                && would_create_cycle_impl(
                    inner.edges.values(),
                    &edge.source_feature_id,
                    &edge.target_feature_id,
                    edge.dep_type,
                )
            {
                warn!(edge_id = %edge.id, "Skipped cycle-closing edge during import");
                continue;
            }

            inner.index_edge(edge);
        }

        Ok(())
    }

    async fn export_all(&self) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;
        Ok(inner.edges.values().cloned().collect())
    }
}
