//! Obfuscation session: the state one run shares across documents.
//!
//! ```text
//!   ObfuscationSession
//!   ├── NameGenerator          (config, stateless)
//!   ├── Mutex<RenameTables>    every category table, one lock
//!   ├── RwLock<DependencyGraph> working copy of the reference graph
//!   └── Arc<ReferenceData>     read-only baseline
//! ```
//!
//! Borrowing reads several category tables at once, so all tables sit
//! behind a single lock. The session is `Send + Sync`; the bundled run
//! driver is sequential, which keeps generated names reproducible.

use crate::{ConfigError, ReferenceData, SessionConfig};
use enigmata_depgraph::{DependencyGraph, EdgeOutcome, GraphError, NodeId, NodeKind};
use enigmata_rename::{Category, CouplingGroup, NameGenerator, RenameError, RenameTables, TableExport};
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use std::sync::Arc;

/// Patterns compiled once per session.
#[derive(Debug)]
pub(crate) struct Patterns {
    /// `scope.name` Molang variable references, with the boundary character
    pub molang_var: Regex,
    /// `$variable` and `#binding` references in UI text
    pub ui_variable: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            molang_var: Regex::new(
                r"(?i)(^|[!&|<>=*/+\-(){}?\[\];',\s])(v|t|c|q|variable|temp|context|query|array)\.([^!&|<>=*/+\-(){}?\[\];',\s.]+)",
            )?,
            ui_variable: Regex::new(r"[$#][^@|)\s]*")?,
        })
    }
}

#[derive(Debug)]
pub struct ObfuscationSession {
    config: SessionConfig,
    generator: NameGenerator,
    patterns: Patterns,
    reference: Arc<ReferenceData>,
    tables: Mutex<RenameTables>,
    graph: RwLock<DependencyGraph>,
}

impl ObfuscationSession {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_reference(config, ReferenceData::default())
    }

    /// Start from baseline data; the working graph begins as a copy of the
    /// reference graph.
    pub fn with_reference(config: SessionConfig, reference: ReferenceData) -> Result<Self, ConfigError> {
        let config = config.normalized();
        config.validate()?;
        let graph = reference.graph.clone();
        Ok(Self {
            generator: NameGenerator::new(config.generator.clone()),
            patterns: Patterns::compile()?,
            config,
            reference: Arc::new(reference),
            tables: Mutex::new(RenameTables::new()),
            graph: RwLock::new(graph),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub(crate) fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    // ------------------------------------------------------------------------
    // Rename tables
    // ------------------------------------------------------------------------

    pub fn generate(&self, original: &str, category: Category) -> Result<String, RenameError> {
        self.generator
            .generate(&mut self.tables.lock(), original, category, None)
    }

    pub fn generate_linked(
        &self,
        original: &str,
        category: Category,
        link: CouplingGroup,
    ) -> Result<String, RenameError> {
        self.generator
            .generate(&mut self.tables.lock(), original, category, Some(link))
    }

    pub fn lookup(&self, category: Category, original: &str) -> Option<String> {
        self.tables.lock().get(category, original).map(str::to_string)
    }

    pub fn bind(&self, category: Category, original: &str, generated: &str) -> Result<(), RenameError> {
        self.tables.lock().table_mut(category).set(original, generated)
    }

    pub fn replace_value(&self, category: Category, old: &str, new: &str) -> Result<(), RenameError> {
        self.tables.lock().table_mut(category).replace_value(old, new)
    }

    /// `(original, generated)` pairs of one category, in binding order
    pub fn table_entries(&self, category: Category) -> Vec<(String, String)> {
        self.tables
            .lock()
            .table(category)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn export_tables(&self) -> TableExport {
        self.tables.lock().export()
    }

    // ------------------------------------------------------------------------
    // Working graph
    // ------------------------------------------------------------------------

    pub fn record_node(&self, kind: NodeKind, payload: &str, unique: bool) -> NodeId {
        self.graph.write().add_node(kind, payload, unique)
    }

    pub fn record_edge(
        &self,
        from_kind: NodeKind,
        from_payload: &str,
        to_kind: NodeKind,
        to_payload: &str,
    ) -> Result<EdgeOutcome, GraphError> {
        self.graph
            .write()
            .add_edge(from_kind, from_payload, to_kind, to_payload)
    }

    pub fn with_graph<R>(&self, f: impl FnOnce(&DependencyGraph) -> R) -> R {
        f(&self.graph.read())
    }

    pub fn into_parts(self) -> (RenameTables, DependencyGraph) {
        (self.tables.into_inner(), self.graph.into_inner())
    }
}
