//! Property-based invariant tests for the two-layer graph.
//!
//! 1. A locally deleted id never resolves
//! 2. `all_ids` is duplicate free and covers both layers
//! 3. Local edits shadow the base layer; revert exposes it again
//! 4. Snapshots taken from a handle are unaffected by later edits

use std::collections::BTreeSet;

use proptest::prelude::*;
use rapid_core::{Entity, EntityId, Graph, GraphHandle, LatLon};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Load(i64),
    Replace(i64),
    Remove(i64),
    Revert(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-20i64..50).prop_map(Op::Load),
        (-20i64..50).prop_map(Op::Replace),
        (-20i64..50).prop_map(Op::Remove),
        (-20i64..50).prop_map(Op::Revert),
    ]
}

fn node(id: i64, lon: f64) -> Entity {
    Entity::node(id, LatLon::new(lon, 0.0))
}

fn apply(graph: &mut Graph, ops: &[Op]) {
    for op in ops {
        match *op {
            Op::Load(id) => graph.load_base(node(id, 0.0)),
            Op::Replace(id) => graph.replace(node(id, 1.0)),
            Op::Remove(id) => graph.remove(EntityId::node(id)),
            Op::Revert(id) => graph.revert(EntityId::node(id)),
        }
    }
}

proptest! {
    #[test]
    fn deleted_ids_never_resolve(ops in prop::collection::vec(op_strategy(), 0..120)) {
        let mut graph = Graph::new();
        apply(&mut graph, &ops);
        for id in graph.all_ids() {
            if graph.is_deleted_locally(id) {
                prop_assert!(graph.has_entity(id).is_none());
            }
        }
    }

    #[test]
    fn all_ids_is_the_deduplicated_union(ops in prop::collection::vec(op_strategy(), 0..120)) {
        let mut graph = Graph::new();
        apply(&mut graph, &ops);
        let all: Vec<_> = graph.all_ids().copied().collect();
        let unique: BTreeSet<_> = all.iter().copied().collect();
        prop_assert_eq!(all.len(), unique.len());
        let expected: BTreeSet<_> = graph.base_ids().chain(graph.local_ids()).copied().collect();
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn local_shadows_base_until_revert(id in -20i64..50) {
        let mut graph = Graph::new();
        graph.load_base(node(id, 0.0));
        graph.replace(node(id, 1.0));
        let loc = graph.has_entity(&EntityId::node(id)).and_then(|e| e.loc);
        prop_assert_eq!(loc, Some(LatLon::new(1.0, 0.0)));
        graph.revert(EntityId::node(id));
        let loc = graph.has_entity(&EntityId::node(id)).and_then(|e| e.loc);
        prop_assert_eq!(loc, Some(LatLon::new(0.0, 0.0)));
    }

    #[test]
    fn snapshots_are_immutable(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let handle = GraphHandle::new(Graph::with_base((0..10).map(|i| node(i, 0.0))));
        let before = handle.snapshot();
        let count = before.len();
        handle.update(|g| apply(g, &ops));
        prop_assert_eq!(before.len(), count);
    }
}
