//! In-memory edge store backed by hash maps and petgraph.
//!
//! All data is held in RAM; optional JSONL snapshot persistence is available
//! via [`load_from_jsonl`] and [`save_to_jsonl`]. Suitable for tests,
//! development, and single-process deployments.
//!
//! # Indexes
//!
//! - `HashMap<EdgeId, DependencyEdge>` for O(1) edge lookups
//! - `HashMap<CanonicalKey, EdgeId>`: the unique index enforcing the
//!   duplicate invariant at the commit point. Keys are canonical, so
//!   `A blocks B` and `B blocked_by A` collide here.
//! - Per-feature outgoing/incoming adjacency sets, keeping dependency views
//!   O(degree) rather than O(store size)
//!
//! # Graph Representation
//!
//! Cycle checks build the blocking subgraph on demand from the edge set:
//! `blocks` edges keep their stored direction, `blocked_by` edges are
//! reversed into the `blocks` direction, `depends_on` edges keep their
//! stored direction, and `relates_to` edges are excluded. The candidate
//! closes a cycle iff its head already reaches its tail.
//!
//! # Thread Safety
//!
//! The inner state is wrapped in `Arc<tokio::sync::Mutex<_>>`. Every trait
//! method acquires the lock for its full duration, which is what makes
//! `create`'s check-then-insert atomic.

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::store::EdgeStore;
use inner::EdgeStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export public API
pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory edge store.
pub(crate) type InMemoryEdgeStore = Arc<Mutex<EdgeStoreInner>>;

/// Create a new in-memory edge store.
///
/// # Arguments
///
/// * `prefix` - The prefix for edge IDs (e.g., "dep")
pub fn new_in_memory_edge_store(prefix: String) -> Box<dyn EdgeStore> {
    Box::new(Arc::new(Mutex::new(EdgeStoreInner::new(prefix))))
}
