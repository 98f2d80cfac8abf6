//! Core in-memory storage data structures.
//!
//! The inner state holds the edge map plus the three indexes that back the
//! store's guarantees. It is not thread-safe on its own; the trait
//! implementation wraps it in `Arc<Mutex<_>>`.

use crate::domain::{CanonicalKey, DependencyEdge, EdgeId, FeatureId, NewDependency};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use std::collections::{HashMap, HashSet};

/// Inner storage structure (not thread-safe).
pub(crate) struct EdgeStoreInner {
    /// Edges indexed by ID for O(1) lookups
    pub(super) edges: HashMap<EdgeId, DependencyEdge>,

    /// Unique index on the canonical `(from, to, type)` triple.
    ///
    /// This is the linearization point for the duplicate invariant: an
    /// insert only commits if its canonical key is absent here.
    pub(super) canonical_index: HashMap<CanonicalKey, EdgeId>,

    /// Edge IDs keyed by their source feature
    pub(super) outgoing: HashMap<FeatureId, HashSet<EdgeId>>,

    /// Edge IDs keyed by their target feature
    pub(super) incoming: HashMap<FeatureId, HashSet<EdgeId>>,

    /// ID generator for new edges
    pub(super) id_generator: IdGenerator,

    /// Prefix for edge IDs (e.g., "dep")
    prefix: String,
}

impl EdgeStoreInner {
    /// Create a new empty store
    pub(crate) fn new(prefix: String) -> Self {
        let config = IdGeneratorConfig {
            prefix: prefix.clone(),
            store_size: 0,
        };

        Self {
            edges: HashMap::new(),
            canonical_index: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            id_generator: IdGenerator::new(config),
            prefix,
        }
    }

    /// Refresh the ID generator when the store crosses a length threshold.
    ///
    /// ID length changes at 500 and 1500 edges, so re-registration is only
    /// needed at those boundaries.
    pub(super) fn update_id_generator_if_needed(&mut self) {
        let current_size = self.edges.len();
        let old_size = self.id_generator.store_size();

        let needs_update = match (old_size, current_size) {
            (0..=500, 501..) => true,
            (0..=1500, 1501..) => true,
            (501.., 0..=500) => true,
            (1501.., 0..=1500) => true,
            _ => false,
        };

        if needs_update {
            self.id_generator = IdGenerator::new(IdGeneratorConfig {
                prefix: self.prefix.clone(),
                store_size: current_size,
            });

            for id in self.edges.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
        }
    }

    /// Generate a new unique ID for an edge
    pub(super) fn generate_id(&mut self, candidate: &NewDependency) -> Result<EdgeId> {
        self.update_id_generator_if_needed();

        let id_str = self
            .id_generator
            .generate(
                candidate.source_feature_id.as_str(),
                candidate.target_feature_id.as_str(),
                candidate.dep_type.as_str(),
                candidate.created_by.as_str(),
            )
            .map_err(|e| Error::Storage(format!("ID generation failed: {}", e)))?;

        Ok(EdgeId::new(id_str))
    }

    /// Insert an edge into the edge map and all indexes.
    ///
    /// The caller must have already established that the canonical key is
    /// free.
    pub(super) fn index_edge(&mut self, edge: DependencyEdge) {
        self.canonical_index
            .insert(edge.canonical_key(), edge.id.clone());
        self.outgoing
            .entry(edge.source_feature_id.clone())
            .or_default()
            .insert(edge.id.clone());
        self.incoming
            .entry(edge.target_feature_id.clone())
            .or_default()
            .insert(edge.id.clone());
        self.id_generator.register_id(edge.id.as_str().to_string());
        self.edges.insert(edge.id.clone(), edge);
    }

    /// Remove an edge from the edge map and all indexes.
    pub(super) fn remove_edge(&mut self, id: &EdgeId) -> Option<DependencyEdge> {
        let edge = self.edges.remove(id)?;

        self.canonical_index.remove(&edge.canonical_key());

        if let Some(set) = self.outgoing.get_mut(&edge.source_feature_id) {
            set.remove(id);
            if set.is_empty() {
                self.outgoing.remove(&edge.source_feature_id);
            }
        }
        if let Some(set) = self.incoming.get_mut(&edge.target_feature_id) {
            set.remove(id);
            if set.is_empty() {
                self.incoming.remove(&edge.target_feature_id);
            }
        }
        self.id_generator.release_id(id.as_str());

        Some(edge)
    }

    /// All edge IDs touching a feature as source or target.
    pub(super) fn edge_ids_touching(&self, feature_id: &FeatureId) -> Vec<EdgeId> {
        let mut ids: HashSet<EdgeId> = HashSet::new();
        if let Some(set) = self.outgoing.get(feature_id) {
            ids.extend(set.iter().cloned());
        }
        if let Some(set) = self.incoming.get(feature_id) {
            ids.extend(set.iter().cloned());
        }
        ids.into_iter().collect()
    }
}
