//! Engine façade: the operations exposed to the API layer.
//!
//! [`DependencyEngine`] owns the feature directory handle, the edge store,
//! and a per-team lock table. The lock table closes the concurrent-writer
//! cycle race: two edges that are individually acyclic can jointly form a
//! cycle if validated concurrently, so creation is serialized per team
//! (edges never span teams, so cross-team creations need no ordering).

use crate::directory::FeatureDirectory;
use crate::domain::{
    DependencyEdge, DependencyLink, DependencyStats, DependencyType, EdgeDirection, EdgeId,
    FeatureDependencyView, FeatureId, NewDependency, TeamId,
};
use crate::error::{Error, Result};
use crate::store::{DeleteOutcome, EdgeStore};
use crate::validate::validate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// The dependency graph engine.
///
/// One instance serves all request handlers; all methods take `&self`.
pub struct DependencyEngine {
    /// Read-only window onto the external feature store
    directory: Arc<dyn FeatureDirectory>,

    /// Edge storage backend
    store: Box<dyn EdgeStore>,

    /// One creation lock per team
    team_locks: Mutex<HashMap<TeamId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for DependencyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyEngine")
            .field("directory", &"<dyn FeatureDirectory>")
            .field("store", &"<dyn EdgeStore>")
            .finish()
    }
}

impl DependencyEngine {
    /// Create an engine over the given directory and store.
    pub fn new(directory: Arc<dyn FeatureDirectory>, store: Box<dyn EdgeStore>) -> Self {
        Self {
            directory,
            store,
            team_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Validate and create a dependency edge.
    ///
    /// Resolves the source feature's team, serializes against other
    /// creations on that team, runs the validation pipeline, and persists
    /// via the store. The store independently re-enforces uniqueness at
    /// commit time.
    ///
    /// # Errors
    ///
    /// Any validation rejection from [`validate`], or a store fault.
    pub async fn create(&self, candidate: NewDependency) -> Result<DependencyEdge> {
        // The source must resolve to pick the serialization domain; the
        // pipeline re-checks existence for both endpoints under the lock.
        let source = self.directory.resolve(&candidate.source_feature_id).await?;

        let lock = self.team_lock(&source.team_id).await;
        let _guard = lock.lock().await;

        validate(&candidate, self.directory.as_ref(), self.store.as_ref()).await?;

        let edge = self.store.create(candidate).await?;

        debug!(
            edge_id = %edge.id,
            team_id = %source.team_id,
            "Dependency edge committed"
        );

        Ok(edge)
    }

    /// Replace an edge's description.
    ///
    /// The only mutable field; everything else on an edge is immutable
    /// after creation, so no validation pipeline run is needed.
    ///
    /// # Errors
    ///
    /// - `Error::EdgeNotFound` if the edge doesn't exist
    /// - `Error::InvalidDescription` if the text is over-long
    pub async fn update_description(
        &self,
        id: &EdgeId,
        description: Option<String>,
    ) -> Result<DependencyEdge> {
        self.store.update_description(id, description).await
    }

    /// Delete an edge by ID. Idempotent.
    pub async fn delete(&self, id: &EdgeId) -> Result<DeleteOutcome> {
        self.store.delete(id).await
    }

    /// Delete every edge touching a feature.
    ///
    /// The cascade primitive for feature deletion; the feature store calls
    /// this inside its own deletion transaction. Returns the number of
    /// edges removed.
    pub async fn delete_all_for_feature(&self, feature_id: &FeatureId) -> Result<usize> {
        self.store.delete_all_for_feature(feature_id).await
    }

    /// Full dependency view for a feature: both edge directions, peer
    /// statuses, aggregate counts, and blocked state.
    ///
    /// This is the hot path behind every Kanban card. Cost is O(degree of
    /// the feature); it never touches the cycle detector.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFeature` if the feature itself does not
    /// resolve. A feature with no edges yields an empty view, not an error.
    pub async fn get_dependencies(&self, feature_id: &FeatureId) -> Result<FeatureDependencyView> {
        self.directory.resolve(feature_id).await?;

        let outgoing_edges = self
            .store
            .find_by_endpoint(feature_id, EdgeDirection::Outgoing)
            .await?;
        let incoming_edges = self
            .store
            .find_by_endpoint(feature_id, EdgeDirection::Incoming)
            .await?;

        let outgoing = self
            .resolve_links(outgoing_edges, EdgeDirection::Outgoing)
            .await?;
        let incoming = self
            .resolve_links(incoming_edges, EdgeDirection::Incoming)
            .await?;

        let (stats, is_blocked) = compute_stats(&outgoing, &incoming);

        Ok(FeatureDependencyView {
            feature_id: feature_id.clone(),
            outgoing,
            incoming,
            stats,
            is_blocked,
        })
    }

    /// Pair each edge with the current status of its far endpoint.
    ///
    /// Edges whose peer no longer resolves (cascade lag between feature
    /// deletion and edge cleanup) are omitted from the view rather than
    /// failing the read.
    async fn resolve_links(
        &self,
        edges: Vec<DependencyEdge>,
        direction: EdgeDirection,
    ) -> Result<Vec<DependencyLink>> {
        let mut links = Vec::with_capacity(edges.len());

        for edge in edges {
            let peer = match direction {
                EdgeDirection::Outgoing => &edge.target_feature_id,
                EdgeDirection::Incoming => &edge.source_feature_id,
            };

            match self.directory.resolve(peer).await {
                Ok(record) => links.push(DependencyLink {
                    peer_status: record.status,
                    edge,
                }),
                Err(Error::UnknownFeature(id)) => {
                    warn!(edge_id = %edge.id, peer = %id, "Omitting edge with unresolvable endpoint");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(links)
    }

    /// Get (or lazily create) the creation lock for a team.
    async fn team_lock(&self, team_id: &TeamId) -> Arc<Mutex<()>> {
        let mut locks = self.team_locks.lock().await;
        locks
            .entry(team_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Compute aggregate statistics and blocked state from resolved links.
///
/// `blocks` and `blocked_by` are counted in canonical form, so the user's
/// choice of wording never changes the stats: an outgoing `blocked_by` edge
/// contributes exactly as an incoming `blocks` edge would. The `depends_on`
/// contribution to `blocked_by_count` only counts unfinished targets; a
/// feature stops being blocked once every gating feature is done, even
/// though the edges persist as historical records. `relates_to` edges count
/// toward the totals and nothing else.
fn compute_stats(outgoing: &[DependencyLink], incoming: &[DependencyLink]) -> (DependencyStats, bool) {
    let mut stats = DependencyStats {
        total_outgoing: outgoing.len(),
        total_incoming: incoming.len(),
        blocking_count: 0,
        blocked_by_count: 0,
    };
    let mut is_blocked = false;

    for link in outgoing {
        match link.edge.dep_type {
            // This feature blocks the target.
            DependencyType::Blocks => stats.blocking_count += 1,
            // Canonically the target blocks this feature.
            DependencyType::BlockedBy => {
                stats.blocked_by_count += 1;
                if !link.peer_status.is_done() {
                    is_blocked = true;
                }
            }
            // Gated on the target until it is done.
            DependencyType::DependsOn => {
                if !link.peer_status.is_done() {
                    stats.blocked_by_count += 1;
                    is_blocked = true;
                }
            }
            DependencyType::RelatesTo => {}
        }
    }

    for link in incoming {
        match link.edge.dep_type {
            // The source blocks this feature.
            DependencyType::Blocks => {
                stats.blocked_by_count += 1;
                if !link.peer_status.is_done() {
                    is_blocked = true;
                }
            }
            // Canonically this feature blocks the source.
            DependencyType::BlockedBy => stats.blocking_count += 1,
            // The source's progress is gated on this feature.
            DependencyType::DependsOn => stats.blocking_count += 1,
            DependencyType::RelatesTo => {}
        }
    }

    (stats, is_blocked)
}
