//! Related-identifier queries.
//!
//! Answers "which sub-identifiers belong together with this one", e.g. the
//! bones an animation may touch or the index names an entity declares.

use crate::{DependencyGraph, NodeKind};
use std::collections::BTreeSet;

impl DependencyGraph {
    /// Bones reachable from an identifier.
    ///
    /// A model yields its own bones, an entity the bones of its models, and
    /// anything else the bones of the models of every entity that uses it.
    pub fn bones_of(&self, kind: NodeKind, payload: &str) -> BTreeSet<&str> {
        match kind {
            NodeKind::Model => self
                .successors(NodeKind::Model, payload, NodeKind::Bone)
                .into_iter()
                .collect(),
            NodeKind::Entity => self
                .successors(NodeKind::Entity, payload, NodeKind::Model)
                .into_iter()
                .flat_map(|model| self.successors(NodeKind::Model, model, NodeKind::Bone))
                .collect(),
            _ => self
                .predecessors(kind, payload, NodeKind::Entity)
                .into_iter()
                .flat_map(|entity| self.successor_payloads_of(entity, NodeKind::Model))
                .flat_map(|model| self.successors(NodeKind::Model, model, NodeKind::Bone))
                .collect(),
        }
    }

    /// Bones of the models an identifier is rendered with, reached through
    /// the entities that use it and only those of their model indexes named
    /// in `model_indexes`.
    ///
    /// ```text
    ///   (kind, payload) <- entity -> model_index -> model -> bone
    /// ```
    pub fn bones_via_model_indexes(
        &self,
        kind: NodeKind,
        payload: &str,
        model_indexes: &BTreeSet<String>,
    ) -> BTreeSet<&str> {
        self.predecessors(kind, payload, NodeKind::Entity)
            .into_iter()
            .flat_map(|entity| self.successor_nodes(entity, NodeKind::ModelIndex))
            .filter(|index| self.payload(*index).is_some_and(|p| model_indexes.contains(p)))
            .flat_map(|index| self.successor_payloads_of(index, NodeKind::Model))
            .flat_map(|model| self.successors(NodeKind::Model, model, NodeKind::Bone))
            .collect()
    }

    /// Index names of kind `index_kind` visible from an identifier.
    pub fn indexes_of(&self, kind: NodeKind, payload: &str, index_kind: NodeKind) -> BTreeSet<&str> {
        if kind == NodeKind::Entity {
            return self.successors(kind, payload, index_kind).into_iter().collect();
        }
        self.predecessors(kind, payload, NodeKind::Entity)
            .into_iter()
            .flat_map(|entity| self.successor_payloads_of(entity, index_kind))
            .collect()
    }

    /// Molang variables shared by an identifier and the entities using it.
    pub fn molang_vars_of(&self, kind: NodeKind, payload: &str) -> BTreeSet<&str> {
        let mut vars: BTreeSet<&str> = self
            .predecessors(kind, payload, NodeKind::Entity)
            .into_iter()
            .flat_map(|entity| self.successor_payloads_of(entity, NodeKind::MolangVar))
            .collect();
        vars.extend(self.successors(kind, payload, NodeKind::MolangVar));
        vars
    }
}
