//! Cycle detection over the blocking subgraph, using petgraph.
//!
//! The graph is built per check from the current edge set: only
//! blocking-semantic edges (`blocks`, `blocked_by`, `depends_on`) enter it,
//! each inserted at its canonical traversal endpoints (`blocked_by`
//! reversed into the `blocks` direction). Once canonicalized, all three
//! kinds are traversed uniformly; no kind is special-cased during the walk.

use crate::domain::{flow_endpoints, DependencyEdge, DependencyType, FeatureId};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Check whether adding `(source, target, dep_type)` would close a cycle.
///
/// A candidate closes a cycle iff, after canonicalization, its head already
/// reaches its tail through existing canonical edges. `relates_to`
/// candidates never participate. Endpoints with no existing blocking edges
/// trivially pass: they have no node in the graph, so no path can exist.
///
/// Cost is O(V+E) per check: one graph build plus one reachability search
/// with a visited set.
pub(super) fn would_create_cycle_impl<'a, I>(
    existing: I,
    source: &FeatureId,
    target: &FeatureId,
    dep_type: DependencyType,
) -> bool
where
    I: IntoIterator<Item = &'a DependencyEdge>,
{
    let Some((tail, head)) = flow_endpoints(source, target, dep_type) else {
        return false;
    };

    let mut graph: DiGraph<FeatureId, DependencyType> = DiGraph::new();
    let mut node_map: HashMap<FeatureId, NodeIndex> = HashMap::new();

    for edge in existing {
        let Some((from, to)) = edge.flow_endpoints() else {
            continue;
        };
        let from_node = ensure_node(&mut graph, &mut node_map, from);
        let to_node = ensure_node(&mut graph, &mut node_map, to);
        graph.add_edge(from_node, to_node, edge.dep_type);
    }

    // If either endpoint has no blocking edges yet, no return path exists.
    let (Some(&head_node), Some(&tail_node)) = (node_map.get(head), node_map.get(tail)) else {
        return false;
    };

    algo::has_path_connecting(&graph, head_node, tail_node, None)
}

fn ensure_node(
    graph: &mut DiGraph<FeatureId, DependencyType>,
    node_map: &mut HashMap<FeatureId, NodeIndex>,
    id: &FeatureId,
) -> NodeIndex {
    if let Some(&node) = node_map.get(id) {
        return node;
    }
    let node = graph.add_node(id.clone());
    node_map.insert(id.clone(), node);
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeId, UserId};
    use chrono::Utc;

    fn edge(id: &str, source: &str, target: &str, dep_type: DependencyType) -> DependencyEdge {
        let now = Utc::now();
        DependencyEdge {
            id: EdgeId::from(id),
            source_feature_id: FeatureId::from(source),
            target_feature_id: FeatureId::from(target),
            dep_type,
            created_by: UserId::from("user-1"),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_graph_never_cycles() {
        let existing: Vec<DependencyEdge> = vec![];
        assert!(!would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-a"),
            &FeatureId::from("feat-b"),
            DependencyType::Blocks,
        ));
    }

    #[test]
    fn direct_back_edge_is_a_cycle() {
        let existing = vec![edge("dep-1", "feat-a", "feat-b", DependencyType::Blocks)];
        assert!(would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-b"),
            &FeatureId::from("feat-a"),
            DependencyType::Blocks,
        ));
    }

    #[test]
    fn transitive_cycle_is_detected() {
        let existing = vec![
            edge("dep-1", "feat-a", "feat-b", DependencyType::Blocks),
            edge("dep-2", "feat-b", "feat-c", DependencyType::DependsOn),
        ];
        assert!(would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-c"),
            &FeatureId::from("feat-a"),
            DependencyType::Blocks,
        ));
    }

    #[test]
    fn blocked_by_is_reversed_before_traversal() {
        // "b blocked_by a" is the edge a -> b, so "b blocks a" closes a cycle.
        let existing = vec![edge("dep-1", "feat-b", "feat-a", DependencyType::BlockedBy)];
        assert!(would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-b"),
            &FeatureId::from("feat-a"),
            DependencyType::Blocks,
        ));

        // The same direction worded twice is parallel, not circular.
        assert!(!would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-a"),
            &FeatureId::from("feat-b"),
            DependencyType::Blocks,
        ));
    }

    #[test]
    fn relates_to_never_enters_the_graph() {
        let existing = vec![
            edge("dep-1", "feat-a", "feat-b", DependencyType::RelatesTo),
            edge("dep-2", "feat-b", "feat-a", DependencyType::RelatesTo),
        ];
        assert!(!would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-b"),
            &FeatureId::from("feat-a"),
            DependencyType::Blocks,
        ));
        assert!(!would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-a"),
            &FeatureId::from("feat-b"),
            DependencyType::RelatesTo,
        ));
    }

    #[test]
    fn forward_edge_between_connected_nodes_is_fine() {
        let existing = vec![
            edge("dep-1", "feat-a", "feat-b", DependencyType::Blocks),
            edge("dep-2", "feat-b", "feat-c", DependencyType::Blocks),
        ];
        assert!(!would_create_cycle_impl(
            &existing,
            &FeatureId::from("feat-a"),
            &FeatureId::from("feat-c"),
            DependencyType::DependsOn,
        ));
    }
}
