//! Common test utilities shared across integration tests.

use std::sync::Arc;
use trellis::directory::InMemoryDirectory;
use trellis::domain::{DependencyType, FeatureId, FeatureStatus, NewDependency, TeamId, UserId};
use trellis::engine::DependencyEngine;
use trellis::store::in_memory::new_in_memory_edge_store;

/// Engine wired to an in-memory store plus a handle to the directory,
/// so tests can flip feature statuses mid-scenario.
pub struct Harness {
    pub engine: DependencyEngine,
    pub directory: Arc<InMemoryDirectory>,
}

/// Install a test subscriber so rejection and cascade logs are captured
/// per test. Safe to call from every test; later calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a harness with the given `(feature, team, status)` rows seeded.
pub async fn harness(features: &[(&str, &str, FeatureStatus)]) -> Harness {
    init_tracing();

    let directory = Arc::new(InMemoryDirectory::new());
    for (feature, team, status) in features {
        directory
            .insert(FeatureId::from(*feature), TeamId::from(*team), *status)
            .await;
    }

    let engine = DependencyEngine::new(
        directory.clone(),
        new_in_memory_edge_store("dep".to_string()),
    );

    Harness { engine, directory }
}

/// Build a harness where every listed feature is on one team, in backlog.
pub async fn harness_same_team(features: &[&str]) -> Harness {
    let rows: Vec<(&str, &str, FeatureStatus)> = features
        .iter()
        .map(|f| (*f, "team-1", FeatureStatus::Backlog))
        .collect();
    harness(&rows).await
}

/// Candidate edge with no description.
pub fn dep(source: &str, target: &str, dep_type: DependencyType) -> NewDependency {
    NewDependency {
        source_feature_id: FeatureId::from(source),
        target_feature_id: FeatureId::from(target),
        dep_type,
        created_by: UserId::from("user-test"),
        description: None,
    }
}
