//! Error types for trellis operations.
//!
//! Expected validation rejections and store faults share one enum but are
//! distinguishable: the API layer surfaces rejections verbatim to the user
//! and treats everything else as a server-side fault.

use crate::domain::{DependencyType, EdgeId, FeatureId, TeamId};
use std::io;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// One or both endpoint features do not exist.
    #[error("Unknown feature: {0}")]
    UnknownFeature(FeatureId),

    /// Source and target are the same feature.
    #[error("Feature {0} cannot depend on itself")]
    SelfDependency(FeatureId),

    /// Source and target belong to different teams.
    #[error("Cross-team dependency: {src} (team {source_team}) -> {target} (team {target_team})")]
    CrossTeamDependency {
        /// Source feature
        src: FeatureId,
        /// Target feature
        target: FeatureId,
        /// Source feature's team
        source_team: TeamId,
        /// Target feature's team
        target_team: TeamId,
    },

    /// An equivalent relationship already exists.
    ///
    /// Equivalence is canonical: `A blocks B` and `B blocked_by A` are the
    /// same relationship.
    #[error("Duplicate dependency: {src} {dep_type} {target}")]
    DuplicateDependency {
        /// Source feature as submitted
        src: FeatureId,
        /// Target feature as submitted
        target: FeatureId,
        /// Relationship type as submitted
        dep_type: DependencyType,
    },

    /// The edge would close a directed cycle in the blocking subgraph.
    #[error("Circular dependency: {src} {dep_type} {target} would create a cycle")]
    CircularDependency {
        /// Source feature as submitted
        src: FeatureId,
        /// Target feature as submitted
        target: FeatureId,
        /// Relationship type as submitted
        dep_type: DependencyType,
    },

    /// Description exceeds the allowed length.
    #[error("Invalid description: {0}")]
    InvalidDescription(String),

    /// Edge not found (update of a missing edge).
    #[error("Dependency edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// IO error from the persistence layer.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other storage fault.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether this is a semantic validation rejection rather than a fault.
    ///
    /// Rejections are surfaced verbatim to the end user and never retried.
    /// Faults may be retried once by the caller for idempotent operations.
    pub fn is_validation_rejection(&self) -> bool {
        matches!(
            self,
            Error::UnknownFeature(_)
                | Error::SelfDependency(_)
                | Error::CrossTeamDependency { .. }
                | Error::DuplicateDependency { .. }
                | Error::CircularDependency { .. }
                | Error::InvalidDescription(_)
        )
    }
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
