//! Validation pipeline for candidate dependency edges.
//!
//! Runs before every insert. The checks are ordered and short-circuit on
//! the first failure: existence, self-reference, team scope, uniqueness,
//! cycle. The pipeline is a pure check with no side effects; on success the
//! caller persists via the store, whose canonical unique index re-enforces
//! uniqueness as the race-safe commit point.

use crate::directory::FeatureDirectory;
use crate::domain::NewDependency;
use crate::error::{Error, Result};
use crate::store::EdgeStore;

/// Validate a candidate edge against the directory and the store.
///
/// # Errors
///
/// The first failing check wins:
///
/// 1. `Error::InvalidDescription`: field constraints (description bound)
/// 2. `Error::UnknownFeature`: either endpoint does not resolve
/// 3. `Error::SelfDependency`: source equals target
/// 4. `Error::CrossTeamDependency`: endpoints on different teams
/// 5. `Error::DuplicateDependency`: an equivalent edge already exists
/// 6. `Error::CircularDependency`: the edge would close a cycle
///    (blocking-semantic types only; `relates_to` skips this check)
pub async fn validate(
    candidate: &NewDependency,
    directory: &dyn FeatureDirectory,
    store: &dyn EdgeStore,
) -> Result<()> {
    candidate.validate().map_err(Error::InvalidDescription)?;

    let source = directory.resolve(&candidate.source_feature_id).await?;
    let target = directory.resolve(&candidate.target_feature_id).await?;

    if candidate.source_feature_id == candidate.target_feature_id {
        return Err(Error::SelfDependency(candidate.source_feature_id.clone()));
    }

    if source.team_id != target.team_id {
        return Err(Error::CrossTeamDependency {
            src: candidate.source_feature_id.clone(),
            target: candidate.target_feature_id.clone(),
            source_team: source.team_id,
            target_team: target.team_id,
        });
    }

    if store
        .contains_equivalent(
            &candidate.source_feature_id,
            &candidate.target_feature_id,
            candidate.dep_type,
        )
        .await?
    {
        return Err(Error::DuplicateDependency {
            src: candidate.source_feature_id.clone(),
            target: candidate.target_feature_id.clone(),
            dep_type: candidate.dep_type,
        });
    }

    if candidate.dep_type.is_blocking()
        && store
            .would_create_cycle(
                &candidate.source_feature_id,
                &candidate.target_feature_id,
                candidate.dep_type,
            )
            .await?
    {
        return Err(Error::CircularDependency {
            src: candidate.source_feature_id.clone(),
            target: candidate.target_feature_id.clone(),
            dep_type: candidate.dep_type,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::domain::{DependencyType, FeatureId, FeatureStatus, TeamId, UserId};
    use crate::store::in_memory::new_in_memory_edge_store;

    fn candidate(source: &str, target: &str, dep_type: DependencyType) -> NewDependency {
        NewDependency {
            source_feature_id: FeatureId::from(source),
            target_feature_id: FeatureId::from(target),
            dep_type,
            created_by: UserId::from("user-1"),
            description: None,
        }
    }

    #[tokio::test]
    async fn existence_is_checked_before_self_reference() {
        let directory = InMemoryDirectory::new();
        let store = new_in_memory_edge_store("dep".to_string());

        let result = validate(
            &candidate("feat-x", "feat-x", DependencyType::Blocks),
            &directory,
            store.as_ref(),
        )
        .await;

        assert!(matches!(result, Err(Error::UnknownFeature(_))));
    }

    #[tokio::test]
    async fn self_reference_is_rejected_for_known_features() {
        let directory = InMemoryDirectory::new();
        directory
            .insert(
                FeatureId::from("feat-x"),
                TeamId::from("team-1"),
                FeatureStatus::Backlog,
            )
            .await;
        let store = new_in_memory_edge_store("dep".to_string());

        let result = validate(
            &candidate("feat-x", "feat-x", DependencyType::RelatesTo),
            &directory,
            store.as_ref(),
        )
        .await;

        assert!(matches!(result, Err(Error::SelfDependency(_))));
    }

    #[tokio::test]
    async fn relates_to_skips_the_cycle_check() {
        let directory = InMemoryDirectory::new();
        for id in ["feat-a", "feat-b"] {
            directory
                .insert(
                    FeatureId::from(id),
                    TeamId::from("team-1"),
                    FeatureStatus::Backlog,
                )
                .await;
        }
        let store = new_in_memory_edge_store("dep".to_string());
        store
            .create(candidate("feat-a", "feat-b", DependencyType::RelatesTo))
            .await
            .unwrap();

        // Opposite direction is a distinct relates_to edge, not a duplicate
        // and never a cycle.
        let result = validate(
            &candidate("feat-b", "feat-a", DependencyType::RelatesTo),
            &directory,
            store.as_ref(),
        )
        .await;

        assert!(result.is_ok());
    }
}
