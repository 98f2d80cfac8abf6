//! Domain types for the feature dependency graph engine.
//!
//! This module contains the identifiers, closed enumerations, and edge/view
//! types shared by the validation pipeline, the edge store, and the
//! aggregator. It also owns the canonicalization rules: `blocks` and
//! `blocked_by` are inverse wordings of one relationship and must collapse
//! to a single canonical form before uniqueness and cycle analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an edge description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Unique identifier for a feature.
///
/// Opaque to this engine; features are owned by the external feature store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub String);

impl FeatureId {
    /// Create a new feature ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl TeamId {
    /// Create a new team ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the acting user.
///
/// Recorded on each edge for audit purposes; not otherwise interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dependency edge, assigned by the store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of a feature.
///
/// Only `Done` is meaningful to this engine: a finished feature no longer
/// gates anything that depends on it. The other values exist so callers can
/// render them, but the engine treats them uniformly as "not done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    /// Not yet started
    Backlog,

    /// Currently being worked on
    InProgress,

    /// Awaiting review
    InReview,

    /// Finished (terminal status)
    Done,
}

impl FeatureStatus {
    /// Whether this is the terminal status.
    pub fn is_done(self) -> bool {
        matches!(self, FeatureStatus::Done)
    }
}

/// Type of dependency relationship between two features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Source blocks target: target cannot progress until source is done
    Blocks,

    /// Source is blocked by target: inverse wording of `Blocks`
    BlockedBy,

    /// Source depends on target: source cannot progress until target is done
    DependsOn,

    /// Soft link, informational only
    RelatesTo,
}

impl DependencyType {
    /// String form matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::BlockedBy => "blocked_by",
            DependencyType::DependsOn => "depends_on",
            DependencyType::RelatesTo => "relates_to",
        }
    }

    /// The logically inverse wording of this type, if one exists.
    ///
    /// `A blocks B` and `B blocked_by A` denote the same relationship.
    /// `relates_to` is symmetric, so it is its own inverse. `depends_on`
    /// has no inverse wording in the vocabulary.
    pub fn inverse(self) -> Option<DependencyType> {
        match self {
            DependencyType::Blocks => Some(DependencyType::BlockedBy),
            DependencyType::BlockedBy => Some(DependencyType::Blocks),
            DependencyType::DependsOn => None,
            DependencyType::RelatesTo => Some(DependencyType::RelatesTo),
        }
    }

    /// Whether edges of this type participate in the acyclicity invariant
    /// and in blocked-status computation.
    pub fn is_blocking(self) -> bool {
        match self {
            DependencyType::Blocks | DependencyType::BlockedBy | DependencyType::DependsOn => true,
            DependencyType::RelatesTo => false,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of edges relative to a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Edges where the feature is the source
    Outgoing,

    /// Edges where the feature is the target
    Incoming,
}

/// What the feature directory knows about a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Team the feature belongs to
    pub team_id: TeamId,

    /// Current lifecycle status
    pub status: FeatureStatus,
}

/// Canonical identity of a dependency relationship.
///
/// `blocks` and `blocked_by` edges between the same pair collapse to one
/// key, so storing `A blocks B` and then `B blocked_by A` is a duplicate.
/// `depends_on` and `relates_to` keep their stored direction; in particular
/// `A relates_to B` and `B relates_to A` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    /// Canonical source
    pub from: FeatureId,

    /// Canonical target
    pub to: FeatureId,

    /// Canonical type (`blocked_by` never appears here)
    pub dep_type: DependencyType,
}

/// Compute the canonical uniqueness key for a relationship.
pub fn canonical_key(
    source: &FeatureId,
    target: &FeatureId,
    dep_type: DependencyType,
) -> CanonicalKey {
    match dep_type {
        DependencyType::BlockedBy => CanonicalKey {
            from: target.clone(),
            to: source.clone(),
            dep_type: DependencyType::Blocks,
        },
        DependencyType::Blocks | DependencyType::DependsOn | DependencyType::RelatesTo => {
            CanonicalKey {
                from: source.clone(),
                to: target.clone(),
                dep_type,
            }
        }
    }
}

/// Traversal endpoints of a relationship in the blocking subgraph.
///
/// Returns `None` for `relates_to`, which never enters the graph. For the
/// blocking-semantic types the returned pair is the directed edge used by
/// cycle analysis: `blocks` keeps its stored direction, `blocked_by` is
/// reversed into the `blocks` direction, `depends_on` keeps its stored
/// direction.
pub fn flow_endpoints<'a>(
    source: &'a FeatureId,
    target: &'a FeatureId,
    dep_type: DependencyType,
) -> Option<(&'a FeatureId, &'a FeatureId)> {
    match dep_type {
        DependencyType::Blocks | DependencyType::DependsOn => Some((source, target)),
        DependencyType::BlockedBy => Some((target, source)),
        DependencyType::RelatesTo => None,
    }
}

/// A typed directed relationship between two features.
///
/// Immutable after creation except for `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Unique identifier, assigned by the store
    pub id: EdgeId,

    /// Source feature
    pub source_feature_id: FeatureId,

    /// Target feature
    pub target_feature_id: FeatureId,

    /// Relationship type
    pub dep_type: DependencyType,

    /// User who created the edge
    pub created_by: UserId,

    /// Optional free-text note, at most [`DESCRIPTION_MAX_LEN`] characters
    pub description: Option<String>,

    /// Creation timestamp, set by the store
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, set by the store
    pub updated_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Canonical uniqueness key for this edge.
    pub fn canonical_key(&self) -> CanonicalKey {
        canonical_key(
            &self.source_feature_id,
            &self.target_feature_id,
            self.dep_type,
        )
    }

    /// Traversal endpoints in the blocking subgraph, if any.
    pub fn flow_endpoints(&self) -> Option<(&FeatureId, &FeatureId)> {
        flow_endpoints(
            &self.source_feature_id,
            &self.target_feature_id,
            self.dep_type,
        )
    }

    /// Validate stored edge data (used when loading snapshots).
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.source_feature_id == self.target_feature_id {
            return Err(format!(
                "self-dependency on feature {}",
                self.source_feature_id
            ));
        }
        validate_description(self.description.as_deref())
    }
}

/// Data for creating a new dependency edge.
///
/// The store assigns the ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewDependency {
    /// Source feature
    pub source_feature_id: FeatureId,

    /// Target feature
    pub target_feature_id: FeatureId,

    /// Relationship type
    pub dep_type: DependencyType,

    /// User creating the edge
    pub created_by: UserId,

    /// Optional free-text note
    pub description: Option<String>,
}

impl NewDependency {
    /// Canonical uniqueness key for this candidate.
    pub fn canonical_key(&self) -> CanonicalKey {
        canonical_key(
            &self.source_feature_id,
            &self.target_feature_id,
            self.dep_type,
        )
    }

    /// Validate field constraints (description length).
    ///
    /// Relationship-level invariants (existence, team scope, uniqueness,
    /// acyclicity) are checked by the validation pipeline, not here.
    pub fn validate(&self) -> std::result::Result<(), String> {
        validate_description(self.description.as_deref())
    }
}

fn validate_description(description: Option<&str>) -> std::result::Result<(), String> {
    if let Some(text) = description {
        let length = text.chars().count();
        if length > DESCRIPTION_MAX_LEN {
            return Err(format!(
                "description is {} characters, maximum is {}",
                length, DESCRIPTION_MAX_LEN
            ));
        }
    }
    Ok(())
}

/// One edge paired with the current status of the feature at its far end.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyLink {
    /// The stored edge
    pub edge: DependencyEdge,

    /// Current status of the other endpoint
    pub peer_status: FeatureStatus,
}

/// Aggregate dependency statistics for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DependencyStats {
    /// Number of outgoing edges
    pub total_outgoing: usize,

    /// Number of incoming edges
    pub total_incoming: usize,

    /// Number of other features whose progress is gated on this one
    pub blocking_count: usize,

    /// Number of other features gating this one
    pub blocked_by_count: usize,
}

/// Full dependency view for one feature, as rendered on a Kanban card.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDependencyView {
    /// The feature this view describes
    pub feature_id: FeatureId,

    /// Edges where this feature is the source
    pub outgoing: Vec<DependencyLink>,

    /// Edges where this feature is the target
    pub incoming: Vec<DependencyLink>,

    /// Aggregate counts
    pub stats: DependencyStats,

    /// Whether at least one unfinished feature is gating this one
    pub is_blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_pairs_are_symmetric() {
        assert_eq!(
            DependencyType::Blocks.inverse(),
            Some(DependencyType::BlockedBy)
        );
        assert_eq!(
            DependencyType::BlockedBy.inverse(),
            Some(DependencyType::Blocks)
        );
        assert_eq!(DependencyType::DependsOn.inverse(), None);
        assert_eq!(
            DependencyType::RelatesTo.inverse(),
            Some(DependencyType::RelatesTo)
        );
    }

    #[test]
    fn blocked_by_canonicalizes_to_blocks() {
        let a = FeatureId::from("feat-a");
        let b = FeatureId::from("feat-b");

        let forward = canonical_key(&a, &b, DependencyType::Blocks);
        let reverse = canonical_key(&b, &a, DependencyType::BlockedBy);
        assert_eq!(forward, reverse);
        assert_eq!(forward.dep_type, DependencyType::Blocks);
    }

    #[test]
    fn relates_to_keys_keep_direction() {
        let a = FeatureId::from("feat-a");
        let b = FeatureId::from("feat-b");

        let ab = canonical_key(&a, &b, DependencyType::RelatesTo);
        let ba = canonical_key(&b, &a, DependencyType::RelatesTo);
        assert_ne!(ab, ba);
    }

    #[test]
    fn flow_endpoints_reverse_blocked_by_only() {
        let a = FeatureId::from("feat-a");
        let b = FeatureId::from("feat-b");

        assert_eq!(
            flow_endpoints(&a, &b, DependencyType::Blocks),
            Some((&a, &b))
        );
        assert_eq!(
            flow_endpoints(&a, &b, DependencyType::BlockedBy),
            Some((&b, &a))
        );
        assert_eq!(
            flow_endpoints(&a, &b, DependencyType::DependsOn),
            Some((&a, &b))
        );
        assert_eq!(flow_endpoints(&a, &b, DependencyType::RelatesTo), None);
    }

    #[test]
    fn relates_to_is_not_blocking() {
        assert!(DependencyType::Blocks.is_blocking());
        assert!(DependencyType::BlockedBy.is_blocking());
        assert!(DependencyType::DependsOn.is_blocking());
        assert!(!DependencyType::RelatesTo.is_blocking());
    }

    #[test]
    fn dependency_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&DependencyType::BlockedBy).unwrap();
        assert_eq!(json, "\"blocked_by\"");

        let parsed: DependencyType = serde_json::from_str("\"relates_to\"").unwrap();
        assert_eq!(parsed, DependencyType::RelatesTo);
    }

    #[test]
    fn description_length_is_bounded() {
        let candidate = NewDependency {
            source_feature_id: FeatureId::from("feat-a"),
            target_feature_id: FeatureId::from("feat-b"),
            dep_type: DependencyType::Blocks,
            created_by: UserId::from("user-1"),
            description: Some("x".repeat(DESCRIPTION_MAX_LEN)),
        };
        assert!(candidate.validate().is_ok());

        let too_long = NewDependency {
            description: Some("x".repeat(DESCRIPTION_MAX_LEN + 1)),
            ..candidate
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn status_terminality() {
        assert!(FeatureStatus::Done.is_done());
        assert!(!FeatureStatus::Backlog.is_done());
        assert!(!FeatureStatus::InProgress.is_done());
        assert!(!FeatureStatus::InReview.is_done());
    }
}
