//! Typed dependency graph over asset identifiers
//!
//! Nodes are labelled `(kind, payload)`, e.g. `(entity, "pig")` or
//! `(model_index, "default")`. One label may be backed by several physical
//! nodes: index names like `"default"` are recorded once per owning entity.
//! Every lookup by label resolves to the most recently recorded instance.
//!
//! ```text
//!   (entity, pig) ──► (model_index, default) ──► (model, pig)
//!         │                                          │
//!         └──────────► (model, pig) ───────────► (bone, leg)
//! ```
//!
//! ## Storage
//!
//! - **Interned payloads**: every payload string is stored once ([`StringInterner`])
//! - **Arena nodes**: node ids are arena slots; discarded slots stay empty
//! - **Bitmap adjacency**: successors and predecessors as Roaring bitmaps,
//!   which keeps every query result in node-id order
//!
//! ## Duplicate collapse
//!
//! [`DependencyGraph::add_edge`] refuses to build a parallel path. When the
//! source already reaches another instance of the target label through nodes
//! of the target kind, the newest target instance is discarded instead. The
//! first recorded instance wins.

mod interner;
mod kind;
mod scope;

pub use interner::{StrId, StringInterner};
pub use kind::NodeKind;

use indexmap::IndexMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Hops followed when looking for an existing path to a duplicate label.
pub const MAX_COLLAPSE_DEPTH: usize = 8;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("no node is labelled ({kind}, `{payload}`)")]
    UnknownLabel { kind: NodeKind, payload: String },
}

// ============================================================================
// Nodes
// ============================================================================

/// Arena slot of a physical node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct NodeRecord {
    kind: NodeKind,
    payload: StrId,
}

/// What [`DependencyGraph::add_edge`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Added,
    /// The exact edge was already present.
    AlreadyPresent,
    /// The target instance is already reachable through a longer path.
    AlreadyReachable,
    /// Another instance of the target label was reachable; the newest target
    /// instance was removed from the graph.
    Collapsed(NodeId),
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct DependencyGraph {
    interner: StringInterner,
    nodes: Vec<Option<NodeRecord>>,
    /// kind -> payload -> physical instances, oldest first
    labels: HashMap<NodeKind, IndexMap<StrId, Vec<NodeId>>>,
    successors: HashMap<u32, RoaringBitmap>,
    predecessors: HashMap<u32, RoaringBitmap>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node. With `unique`, an existing label is reused instead.
    pub fn add_node(&mut self, kind: NodeKind, payload: &str, unique: bool) -> NodeId {
        if unique {
            if let Some(existing) = self.latest(kind, payload) {
                return existing;
            }
        }

        let payload = self.interner.intern(payload);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeRecord { kind, payload }));
        self.labels
            .entry(kind)
            .or_default()
            .entry(payload)
            .or_default()
            .push(id);
        id
    }

    /// Connect the latest instances of two labels.
    pub fn add_edge(
        &mut self,
        from_kind: NodeKind,
        from_payload: &str,
        to_kind: NodeKind,
        to_payload: &str,
    ) -> Result<EdgeOutcome, GraphError> {
        let from = self.require(from_kind, from_payload)?;
        let to = self.require(to_kind, to_payload)?;

        if self.has_edge(from, to) {
            return Ok(EdgeOutcome::AlreadyPresent);
        }

        match self.find_reachable_label(from, to_kind, to_payload) {
            Some(reached) if reached == to => Ok(EdgeOutcome::AlreadyReachable),
            Some(_) => {
                self.discard_latest(to_kind, to_payload);
                tracing::debug!(
                    from = %from_kind,
                    from_payload,
                    to = %to_kind,
                    to_payload,
                    "collapsed duplicate node instance"
                );
                Ok(EdgeOutcome::Collapsed(to))
            }
            None => {
                self.insert_edge(from, to);
                Ok(EdgeOutcome::Added)
            }
        }
    }

    fn require(&self, kind: NodeKind, payload: &str) -> Result<NodeId, GraphError> {
        self.latest(kind, payload)
            .ok_or_else(|| GraphError::UnknownLabel {
                kind,
                payload: payload.to_string(),
            })
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId) {
        if self.successors.entry(from.0).or_default().insert(to.0) {
            self.predecessors.entry(to.0).or_default().insert(from.0);
            self.edge_count += 1;
        }
    }

    /// Breadth-first search from `from` through nodes of `kind`, looking for
    /// any instance labelled `(kind, payload)`.
    fn find_reachable_label(&self, from: NodeId, kind: NodeKind, payload: &str) -> Option<NodeId> {
        let target = self.interner.id_of(payload)?;
        let mut seen = RoaringBitmap::new();
        let mut queue: VecDeque<(u32, usize)> = VecDeque::from([(from.0, 0)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= MAX_COLLAPSE_DEPTH {
                continue;
            }
            let Some(next) = self.successors.get(&node) else {
                continue;
            };
            for succ in next {
                let Some(record) = self.record(NodeId(succ)) else {
                    continue;
                };
                if record.kind != kind || !seen.insert(succ) {
                    continue;
                }
                if record.payload == target {
                    return Some(NodeId(succ));
                }
                queue.push_back((succ, depth + 1));
            }
        }
        None
    }

    /// Remove the newest instance of a label together with its edges.
    fn discard_latest(&mut self, kind: NodeKind, payload: &str) -> Option<NodeId> {
        let payload_id = self.interner.id_of(payload)?;
        let by_payload = self.labels.get_mut(&kind)?;
        let instances = by_payload.get_mut(&payload_id)?;
        let removed = instances.pop()?;
        if instances.is_empty() {
            by_payload.shift_remove(&payload_id);
        }

        if let Some(out) = self.successors.remove(&removed.0) {
            for succ in &out {
                if let Some(preds) = self.predecessors.get_mut(&succ) {
                    preds.remove(removed.0);
                }
            }
            self.edge_count -= out.len() as usize;
        }
        if let Some(inc) = self.predecessors.remove(&removed.0) {
            for pred in &inc {
                if let Some(succs) = self.successors.get_mut(&pred) {
                    succs.remove(removed.0);
                }
            }
            self.edge_count -= inc.len() as usize;
        }
        self.nodes[removed.0 as usize] = None;
        Some(removed)
    }

    fn record(&self, node: NodeId) -> Option<NodeRecord> {
        self.nodes.get(node.0 as usize).copied().flatten()
    }

    // ------------------------------------------------------------------------
    // Label queries
    // ------------------------------------------------------------------------

    /// Most recently recorded instance of a label
    pub fn latest(&self, kind: NodeKind, payload: &str) -> Option<NodeId> {
        self.instances(kind, payload).last().copied()
    }

    /// All live instances of a label, oldest first
    pub fn instances(&self, kind: NodeKind, payload: &str) -> &[NodeId] {
        self.interner
            .id_of(payload)
            .and_then(|id| self.labels.get(&kind)?.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_label(&self, kind: NodeKind, payload: &str) -> bool {
        !self.instances(kind, payload).is_empty()
    }

    /// Payloads of every label of one kind, in first-recorded order.
    pub fn labels_of(&self, kind: NodeKind) -> impl Iterator<Item = &str> + '_ {
        self.labels
            .get(&kind)
            .into_iter()
            .flat_map(|by_payload| by_payload.keys())
            .filter_map(|id| self.interner.resolve(*id))
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.record(node).map(|r| r.kind)
    }

    pub fn payload(&self, node: NodeId) -> Option<&str> {
        self.record(node)
            .and_then(|r| self.interner.resolve(r.payload))
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.successors
            .get(&from.0)
            .is_some_and(|succ| succ.contains(to.0))
    }

    /// Live node count
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    // ------------------------------------------------------------------------
    // Neighbourhood queries
    // ------------------------------------------------------------------------

    /// Direct successors of a node that have the given kind.
    pub fn successor_nodes(&self, node: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.filter_neighbours(self.successors.get(&node.0), kind)
    }

    /// Payloads of the direct successors of a node that have the given kind.
    pub fn successor_payloads_of(&self, node: NodeId, kind: NodeKind) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for succ in self.successor_nodes(node, kind) {
            if let Some(payload) = self.payload(succ) {
                if !out.contains(&payload) {
                    out.push(payload);
                }
            }
        }
        out
    }

    /// Payloads of the successors of a label's latest instance that have
    /// kind `to_kind`. A missing label yields an empty result.
    pub fn successors(&self, kind: NodeKind, payload: &str, to_kind: NodeKind) -> Vec<&str> {
        match self.latest(kind, payload) {
            Some(node) => self.successor_payloads_of(node, to_kind),
            None => Vec::new(),
        }
    }

    /// Predecessors of a label's latest instance that have kind `from_kind`.
    pub fn predecessors(&self, kind: NodeKind, payload: &str, from_kind: NodeKind) -> Vec<NodeId> {
        match self.latest(kind, payload) {
            Some(node) => self.filter_neighbours(self.predecessors.get(&node.0), from_kind),
            None => Vec::new(),
        }
    }

    fn filter_neighbours(&self, set: Option<&RoaringBitmap>, kind: NodeKind) -> Vec<NodeId> {
        set.into_iter()
            .flat_map(|s| s.iter())
            .map(NodeId)
            .filter(|n| self.kind(*n) == Some(kind))
            .collect()
    }
}

// ============================================================================
// Snapshot form
// ============================================================================

/// Flat serde form: payload table, arena slots, edge list.
#[derive(Serialize, Deserialize)]
struct GraphSnapshot {
    payloads: StringInterner,
    nodes: Vec<Option<NodeRecord>>,
    edges: Vec<(u32, u32)>,
}

impl From<DependencyGraph> for GraphSnapshot {
    fn from(graph: DependencyGraph) -> Self {
        let mut sources: Vec<_> = graph.successors.iter().collect();
        sources.sort_by_key(|(from, _)| **from);
        let edges = sources
            .into_iter()
            .flat_map(|(from, succ)| succ.iter().map(move |to| (*from, to)))
            .collect();
        Self {
            payloads: graph.interner,
            nodes: graph.nodes,
            edges,
        }
    }
}

impl From<GraphSnapshot> for DependencyGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        let mut graph = DependencyGraph {
            interner: snapshot.payloads,
            nodes: snapshot.nodes,
            ..DependencyGraph::default()
        };
        for (i, record) in graph.nodes.iter().enumerate() {
            if let Some(record) = record {
                graph
                    .labels
                    .entry(record.kind)
                    .or_default()
                    .entry(record.payload)
                    .or_default()
                    .push(NodeId(i as u32));
            }
        }
        for (from, to) in snapshot.edges {
            let live = |n: u32| graph.nodes.get(n as usize).is_some_and(Option::is_some);
            if live(from) && live(to) {
                graph.insert_edge(NodeId(from), NodeId(to));
            }
        }
        graph
    }
}
