//! Baseline data the run must never rename.
//!
//! Vanilla identifiers, index names and UI vocabulary are collected from the
//! reference packs by an external step and handed to the session. The
//! reference graph answers the scoped questions ("is `default` one of this
//! entity's vanilla model indexes?").

use enigmata_depgraph::{DependencyGraph, NodeKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub graph: DependencyGraph,
    pub material_ids: HashSet<String>,
    pub localization_keys: HashSet<String>,
    /// `$name` form
    pub ui_variables: HashSet<String>,
    /// `#name` form
    pub ui_bindings: HashSet<String>,
    pub ui_properties: HashSet<String>,
    pub ui_keywords: HashSet<String>,
    /// Namespace halves of `ns:name` identifiers that stay as they are
    pub reserved_namespaces: HashSet<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            graph: DependencyGraph::default(),
            material_ids: HashSet::new(),
            localization_keys: HashSet::new(),
            ui_variables: HashSet::new(),
            ui_bindings: HashSet::new(),
            ui_properties: HashSet::new(),
            ui_keywords: HashSet::new(),
            reserved_namespaces: HashSet::from(["minecraft".to_string()]),
        }
    }
}

impl ReferenceData {
    /// Absorb the `$variables` declared in a global-variables file; they are
    /// visible to every UI file and so cannot be renamed.
    pub fn collect_ui_variables(&mut self, text: &str) -> Result<usize, regex::Error> {
        let pattern = Regex::new(r#"\$[^@|)\s"]+"#)?;
        let before = self.ui_variables.len();
        self.ui_variables
            .extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
        Ok(self.ui_variables.len() - before)
    }
}

// ============================================================================
// Membership tests
// ============================================================================

/// Scoped membership test: `(owner kind, owner id)` if known, then the name.
pub type ReferenceFn = dyn Fn(Option<(NodeKind, &str)>, &str) -> bool + Send + Sync;

/// Which reference names a handler must leave untouched.
#[derive(Clone, Default)]
pub enum ReferenceSet {
    #[default]
    Empty,
    MaterialIds,
    /// Any label of this kind in the reference graph
    Labels(NodeKind),
    /// Index names of this kind visible from the owning identifier
    Indexes(NodeKind),
    /// Bones visible from the owning identifier
    Bones,
    Names(Arc<HashSet<String>>),
    Custom(Arc<ReferenceFn>),
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        matches!(self, ReferenceSet::Empty)
    }

    pub fn contains(
        &self,
        reference: &ReferenceData,
        owner: Option<(NodeKind, &str)>,
        name: &str,
    ) -> bool {
        let graph = &reference.graph;
        match self {
            ReferenceSet::Empty => false,
            ReferenceSet::MaterialIds => reference.material_ids.contains(name),
            ReferenceSet::Labels(kind) => graph.contains_label(*kind, name),
            ReferenceSet::Indexes(index_kind) => owner
                .is_some_and(|(kind, id)| graph.indexes_of(kind, id, *index_kind).contains(name)),
            ReferenceSet::Bones => {
                owner.is_some_and(|(kind, id)| graph.bones_of(kind, id).contains(name))
            }
            ReferenceSet::Names(names) => names.contains(name),
            ReferenceSet::Custom(test) => test(owner, name),
        }
    }
}

impl fmt::Debug for ReferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSet::Empty => f.write_str("Empty"),
            ReferenceSet::MaterialIds => f.write_str("MaterialIds"),
            ReferenceSet::Labels(kind) => f.debug_tuple("Labels").field(kind).finish(),
            ReferenceSet::Indexes(kind) => f.debug_tuple("Indexes").field(kind).finish(),
            ReferenceSet::Bones => f.write_str("Bones"),
            ReferenceSet::Names(names) => f.debug_tuple("Names").field(&names.len()).finish(),
            ReferenceSet::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
