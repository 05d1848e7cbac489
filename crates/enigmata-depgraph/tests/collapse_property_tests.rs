use enigmata_depgraph::{DependencyGraph, NodeKind};
use proptest::prelude::*;
use std::collections::HashSet;

const OWNERS: [&str; 3] = ["pig", "cow", "bee"];
const INDEXES: [&str; 4] = ["default", "walk", "look", "idle"];

#[derive(Debug, Clone)]
enum Op {
    Index { owner: usize, index: usize, unique: bool },
    Model { owner: usize, model: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..OWNERS.len(), 0..INDEXES.len(), any::<bool>())
            .prop_map(|(owner, index, unique)| Op::Index { owner, index, unique }),
        (0..OWNERS.len(), 0..OWNERS.len()).prop_map(|(owner, model)| Op::Model { owner, model }),
    ]
}

fn apply(g: &mut DependencyGraph, op: &Op) {
    let (owner, kind, payload, unique) = match *op {
        Op::Index { owner, index, unique } => (owner, NodeKind::AnimationIndex, INDEXES[index], unique),
        Op::Model { owner, model } => (owner, NodeKind::Model, OWNERS[model], true),
    };
    g.add_node(NodeKind::Entity, OWNERS[owner], true);
    g.add_node(kind, payload, unique);
    g.add_edge(NodeKind::Entity, OWNERS[owner], kind, payload)
        .expect("both endpoints were just recorded");
}

fn live_nodes(g: &DependencyGraph) -> Vec<enigmata_depgraph::NodeId> {
    NodeKind::ALL
        .iter()
        .flat_map(|kind| {
            g.labels_of(*kind)
                .flat_map(move |payload| g.instances(*kind, payload).to_vec())
                .collect::<Vec<_>>()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn no_node_has_two_successors_with_one_label(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut g = DependencyGraph::new();
        for op in &ops {
            apply(&mut g, op);
        }

        for node in live_nodes(&g) {
            for kind in NodeKind::ALL {
                let succ = g.successor_nodes(node, kind);
                let labels: HashSet<_> = succ.iter().filter_map(|n| g.payload(*n)).collect();
                prop_assert_eq!(labels.len(), succ.len());
            }
        }
    }

    #[test]
    fn edge_count_matches_adjacency(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut g = DependencyGraph::new();
        for op in &ops {
            apply(&mut g, op);
        }

        let nodes = live_nodes(&g);
        prop_assert_eq!(nodes.len(), g.node_count());
        let counted: usize = nodes
            .iter()
            .map(|n| NodeKind::ALL.iter().map(|k| g.successor_nodes(*n, *k).len()).sum::<usize>())
            .sum();
        prop_assert_eq!(counted, g.edge_count());
    }

    #[test]
    fn every_index_edge_is_still_queryable(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut g = DependencyGraph::new();
        for op in &ops {
            apply(&mut g, op);
        }
        if let Some(Op::Index { owner, index, .. }) = ops.last() {
            let indexes = g.indexes_of(NodeKind::Entity, OWNERS[*owner], NodeKind::AnimationIndex);
            prop_assert!(indexes.contains(INDEXES[*index]));
        }
    }
}
