use crate::ReferenceSet;
use enigmata_depgraph::NodeKind;
use enigmata_rename::Category;
use std::collections::HashMap;

/// How one side (key or value) of a mapping entry is treated.
#[derive(Debug, Clone)]
pub struct EntityHandler {
    /// Names that must stay untouched
    pub reference: ReferenceSet,
    /// Rename category; `None` leaves the text as it is
    pub category: Option<Category>,
    /// Graph kind the identifier is recorded under
    pub node_kind: Option<NodeKind>,
    /// Reuse an existing graph node with the same label
    pub unique: bool,
}

impl Default for EntityHandler {
    fn default() -> Self {
        Self {
            reference: ReferenceSet::Empty,
            category: None,
            node_kind: None,
            unique: true,
        }
    }
}

impl EntityHandler {
    pub fn renaming(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn recording(kind: NodeKind) -> Self {
        Self {
            node_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: ReferenceSet) -> Self {
        self.reference = reference;
        self
    }

    pub fn recorded_as(mut self, kind: NodeKind) -> Self {
        self.node_kind = Some(kind);
        self
    }

    /// Record a fresh graph node per occurrence.
    pub fn per_occurrence(mut self) -> Self {
        self.unique = false;
        self
    }
}

/// Key and value handlers of one mapping entry.
#[derive(Debug, Clone, Default)]
pub struct ProcessMapping {
    pub key: EntityHandler,
    pub value: EntityHandler,
}

impl ProcessMapping {
    pub fn new(key: EntityHandler, value: EntityHandler) -> Self {
        Self { key, value }
    }

    pub fn keys(key: EntityHandler) -> Self {
        Self {
            key,
            value: EntityHandler::default(),
        }
    }

    pub fn values(value: EntityHandler) -> Self {
        Self {
            key: EntityHandler::default(),
            value,
        }
    }

    /// Same handler on both sides.
    pub fn both(handler: EntityHandler) -> Self {
        Self {
            key: handler.clone(),
            value: handler,
        }
    }
}

/// Mapping-key name -> handlers for the entries below it.
pub type KeyMapping = HashMap<String, ProcessMapping>;
