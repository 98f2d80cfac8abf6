//! JSONL snapshot persistence for the in-memory edge store.
//!
//! Each line of the snapshot file is one serialized [`DependencyEdge`].
//! Loading is resilient: problematic lines are skipped and reported as
//! [`LoadWarning`]s instead of failing the whole load, so one corrupted
//! record never takes the board down.

use super::graph::would_create_cycle_impl;
use super::inner::EdgeStoreInner;
use crate::domain::{DependencyEdge, EdgeId};
use crate::error::{Error, Result};
use crate::store::EdgeStore;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tracing::warn;

/// Non-fatal problems encountered while loading a snapshot.
///
/// Applications should log or report these to users: each one means a
/// record from the snapshot was dropped to keep the loaded store
/// consistent.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line that couldn't be parsed as a `DependencyEdge`.
    ///
    /// **Effect**: the line is skipped entirely.
    MalformedJson {
        /// 1-based line number in the snapshot file
        line_number: usize,
        /// Parse error text
        error: String,
    },

    /// An edge that failed field validation (self-loop, over-long
    /// description).
    ///
    /// **Effect**: the edge is skipped.
    InvalidEdgeData {
        /// ID of the offending edge
        edge_id: EdgeId,
        /// 1-based line number in the snapshot file
        line_number: usize,
        /// Validation error text
        error: String,
    },

    /// An edge whose canonical `(from, to, type)` triple duplicates an
    /// earlier line.
    ///
    /// **Effect**: the later edge is skipped; the earlier one wins.
    DuplicateEdge {
        /// ID of the skipped edge
        edge_id: EdgeId,
    },

    /// A blocking edge that would close a cycle against earlier lines.
    ///
    /// **Effect**: the edge is skipped to keep the invariant.
    CircularEdge {
        /// ID of the skipped edge
        edge_id: EdgeId,
    },
}

/// Load an edge store from a JSONL snapshot.
///
/// Returns the loaded store together with any warnings. Invariants are
/// re-enforced line by line, so a hand-edited or corrupted snapshot loads
/// into a consistent store.
pub async fn load_from_jsonl(
    path: &Path,
    prefix: String,
) -> Result<(Box<dyn EdgeStore>, Vec<LoadWarning>)> {
    let file = File::open(path).await.map_err(Error::Io)?;
    let mut lines = BufReader::new(file).lines();

    let mut warnings = Vec::new();
    let mut inner = EdgeStoreInner::new(prefix);
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await.map_err(Error::Io)? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let edge: DependencyEdge = match serde_json::from_str(&line) {
            Ok(edge) => edge,
            Err(e) => {
                warn!(line_number, error = %e, "Skipped malformed snapshot line");
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Err(error) = edge.validate() {
            warnings.push(LoadWarning::InvalidEdgeData {
                edge_id: edge.id.clone(),
                line_number,
                error,
            });
            continue;
        }

        if inner.canonical_index.contains_key(&edge.canonical_key()) {
            warnings.push(LoadWarning::DuplicateEdge {
                edge_id: edge.id.clone(),
            });
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
            warnings.push(LoadWarning::CircularEdge {
                edge_id: edge.id.clone(),
            });
            continue;
        }

        inner.index_edge(edge);
    }

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Save an edge store to a JSONL snapshot with an atomic write.
///
/// Writes to a temporary file first, then renames it over the target, so an
/// interrupted save leaves the previous snapshot intact. Edges are written
/// sorted by ID for deterministic output across saves.
pub async fn save_to_jsonl(store: &dyn EdgeStore, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await.map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);

    let mut edges = store.export_all().await?;
    edges.sort_by(|a, b| a.id.cmp(&b.id));

    for edge in &edges {
        let json = serde_json::to_string(edge).map_err(Error::Json)?;
        writer.write_all(json.as_bytes()).await.map_err(Error::Io)?;
        writer.write_all(b"\n").await.map_err(Error::Io)?;
    }

    writer.flush().await.map_err(Error::Io)?;

    tokio::fs::rename(&temp_path, path).await.map_err(Error::Io)?;

    Ok(())
}
