//! Integration tests for JSONL snapshot persistence.
//!
//! Verifies the save/load round trip and that loading is resilient to
//! malformed lines and invariant-violating records.

use tempfile::tempdir;
use trellis::domain::{DependencyType, FeatureId, NewDependency, UserId};
use trellis::store::in_memory::{load_from_jsonl, new_in_memory_edge_store, save_to_jsonl, LoadWarning};

fn candidate(source: &str, target: &str, dep_type: DependencyType) -> NewDependency {
    NewDependency {
        source_feature_id: FeatureId::from(source),
        target_feature_id: FeatureId::from(target),
        dep_type,
        created_by: UserId::from("user-test"),
        description: None,
    }
}

fn edge_line(id: &str, source: &str, target: &str, dep_type: &str) -> String {
    format!(
        concat!(
            r#"{{"id":"{}","source_feature_id":"{}","target_feature_id":"{}","#,
            r#""dep_type":"{}","created_by":"user-test","description":null,"#,
            r#""created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}}"#
        ),
        id, source, target, dep_type
    )
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edges.jsonl");

    let store = new_in_memory_edge_store("dep".to_string());
    let e1 = store
        .create(candidate("feat-a", "feat-b", DependencyType::Blocks))
        .await
        .unwrap();
    let e2 = store
        .create(candidate("feat-b", "feat-c", DependencyType::DependsOn))
        .await
        .unwrap();
    let e3 = store
        .create(candidate("feat-c", "feat-a", DependencyType::RelatesTo))
        .await
        .unwrap();

    save_to_jsonl(store.as_ref(), &path).await.unwrap();

    let (loaded, warnings) = load_from_jsonl(&path, "dep".to_string()).await.unwrap();
    assert!(warnings.is_empty());

    let mut original = vec![e1, e2, e3];
    original.sort_by(|a, b| a.id.cmp(&b.id));
    let mut reloaded = loaded.export_all().await.unwrap();
    reloaded.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(original, reloaded);
}

#[tokio::test]
async fn saved_snapshot_is_deterministic() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.jsonl");
    let second = dir.path().join("second.jsonl");

    let store = new_in_memory_edge_store("dep".to_string());
    for (s, t, k) in [
        ("feat-a", "feat-b", DependencyType::Blocks),
        ("feat-b", "feat-c", DependencyType::Blocks),
        ("feat-a", "feat-c", DependencyType::RelatesTo),
    ] {
        store.create(candidate(s, t, k)).await.unwrap();
    }

    save_to_jsonl(store.as_ref(), &first).await.unwrap();
    save_to_jsonl(store.as_ref(), &second).await.unwrap();

    let a = tokio::fs::read_to_string(&first).await.unwrap();
    let b = tokio::fs::read_to_string(&second).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn loading_skips_bad_records_with_warnings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edges.jsonl");

    let lines = [
        edge_line("dep-aaaa", "feat-a", "feat-b", "blocks"),
        "{this is not json".to_string(),
        // Same relationship as line 1, worded inversely: canonical duplicate.
        edge_line("dep-bbbb", "feat-b", "feat-a", "blocked_by"),
        // Would close a cycle against line 1.
        edge_line("dep-cccc", "feat-b", "feat-a", "blocks"),
        // Self-loop never validates.
        edge_line("dep-dddd", "feat-c", "feat-c", "depends_on"),
        // Fine: relates_to never cycles.
        edge_line("dep-eeee", "feat-b", "feat-a", "relates_to"),
    ];
    tokio::fs::write(&path, lines.join("\n")).await.unwrap();

    let (loaded, warnings) = load_from_jsonl(&path, "dep".to_string()).await.unwrap();

    let edges = loaded.export_all().await.unwrap();
    let mut ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["dep-aaaa", "dep-eeee"]);

    assert_eq!(warnings.len(), 4);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::MalformedJson { line_number: 2, .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::DuplicateEdge { edge_id } if edge_id.as_str() == "dep-bbbb")));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::CircularEdge { edge_id } if edge_id.as_str() == "dep-cccc")));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::InvalidEdgeData { line_number: 5, .. })));
}

#[tokio::test]
async fn loaded_store_keeps_enforcing_invariants() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edges.jsonl");

    tokio::fs::write(&path, edge_line("dep-aaaa", "feat-a", "feat-b", "blocks"))
        .await
        .unwrap();

    let (loaded, _) = load_from_jsonl(&path, "dep".to_string()).await.unwrap();

    // The canonical unique index was rebuilt from the snapshot.
    let duplicate = loaded
        .create(candidate("feat-b", "feat-a", DependencyType::BlockedBy))
        .await;
    assert!(duplicate.is_err());

    // And cycle checks see the loaded edge.
    assert!(loaded
        .would_create_cycle(
            &FeatureId::from("feat-b"),
            &FeatureId::from("feat-a"),
            DependencyType::Blocks,
        )
        .await
        .unwrap());
}
