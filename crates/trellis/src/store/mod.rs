//! Storage abstraction for dependency edges.
//!
//! The store owns edge identity, uniqueness, and timestamps. Uniqueness is
//! enforced *inside* the store on the canonical `(source, target, type)`
//! triple: two concurrent validations can both pass the pipeline before
//! either commits, so the store's unique index is the actual linearization
//! point for the duplicate invariant.
//!
//! The trait is object-safe, allowing dynamic dispatch via
//! `Box<dyn EdgeStore>`. All methods take `&self`; implementations use
//! interior mutability so one store can serve concurrent request handlers.

use crate::domain::{
    DependencyEdge, DependencyType, EdgeDirection, EdgeId, FeatureId, NewDependency,
};
use crate::error::Result;
use async_trait::async_trait;

// Storage backend implementations
pub mod in_memory;

/// Result of an idempotent delete.
///
/// Deleting an edge that does not exist is not a fault; callers get a
/// distinct signal instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The edge existed and was removed
    Deleted,

    /// No edge with that ID existed
    NotFound,
}

/// Core storage trait for dependency edges.
///
/// # Method Categories
///
/// - **Writes**: `create`, `update_description`, `delete`,
///   `delete_all_for_feature`
/// - **Reads**: `get`, `find_by_endpoint`, `contains_equivalent`
/// - **Graph**: `would_create_cycle`
/// - **Batch**: `import_edges`, `export_all`
///
/// # Error Handling
///
/// Validation rejections (`DuplicateDependency`, `SelfDependency`) come back
/// as typed errors; IO and backend faults use the fault variants. "Not
/// found" on delete is expressed via [`DeleteOutcome`], not an error.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Create a new edge, assigning its ID and timestamps.
    ///
    /// Atomic with respect to the uniqueness invariant: the canonical
    /// `(source, target, type)` triple is checked and inserted under one
    /// lock, closing the race window left by application-level validation.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateDependency` if an equivalent edge exists
    /// - `Error::SelfDependency` if source equals target
    /// - `Error::InvalidDescription` if the description is over-long
    async fn create(&self, candidate: NewDependency) -> Result<DependencyEdge>;

    /// Get an edge by ID.
    ///
    /// Returns `None` if the edge doesn't exist.
    async fn get(&self, id: &EdgeId) -> Result<Option<DependencyEdge>>;

    /// Replace an edge's description, bumping `updated_at`.
    ///
    /// All other edge fields are immutable after creation.
    ///
    /// # Errors
    ///
    /// - `Error::EdgeNotFound` if the edge doesn't exist
    /// - `Error::InvalidDescription` if the description is over-long
    async fn update_description(
        &self,
        id: &EdgeId,
        description: Option<String>,
    ) -> Result<DependencyEdge>;

    /// Delete an edge by ID. Idempotent.
    async fn delete(&self, id: &EdgeId) -> Result<DeleteOutcome>;

    /// Delete every edge where the feature is source or target.
    ///
    /// Returns the number of edges removed. Exposed so the feature store
    /// can cascade edge cleanup when a feature is deleted.
    async fn delete_all_for_feature(&self, feature_id: &FeatureId) -> Result<usize>;

    /// All edges touching a feature in the given direction.
    async fn find_by_endpoint(
        &self,
        feature_id: &FeatureId,
        direction: EdgeDirection,
    ) -> Result<Vec<DependencyEdge>>;

    /// Whether an edge equivalent to `(source, target, dep_type)` exists.
    ///
    /// Equivalence is canonical, so `A blocks B` matches a stored
    /// `B blocked_by A`.
    async fn contains_equivalent(
        &self,
        source: &FeatureId,
        target: &FeatureId,
        dep_type: DependencyType,
    ) -> Result<bool>;

    /// Whether adding `(source, target, dep_type)` would close a directed
    /// cycle in the canonicalized blocking subgraph.
    ///
    /// Always `false` for `relates_to`.
    async fn would_create_cycle(
        &self,
        source: &FeatureId,
        target: &FeatureId,
        dep_type: DependencyType,
    ) -> Result<bool>;

    /// Import previously exported edges, preserving IDs and timestamps.
    ///
    /// Used for bulk loading from snapshots. Edges that violate invariants
    /// against the already-imported set are skipped.
    async fn import_edges(&self, edges: Vec<DependencyEdge>) -> Result<()>;

    /// Export all edges, suitable for snapshot or backup.
    async fn export_all(&self) -> Result<Vec<DependencyEdge>>;
}
