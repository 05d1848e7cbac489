//! Run driver: one pass over every document of a pack.
//!
//! ```text
//!   phase 0  lang          localization keys
//!   phase 1  entity family models, animations, controllers, entities, ...
//!            then render controllers, whose bone keys need the models
//!   phase 2  UI            localize -> variables -> control names
//!                          -> control references (unique before shared)
//! ```
//!
//! Outputs keep the given document order within a phase. The driver is
//! sequential so the same input always yields the same names.

use crate::bones::rename_bone_keys;
use crate::entities::obfuscate_entity_document;
use crate::ui::{
    rename_lang_keys, ControlNameCollector, ControlReferenceRewriter, LocalizationRewriter,
    UiVariableRenamer, VariableMode,
};
use crate::{DocumentError, EntityKind, ObfuscateError, ObfuscationSession};
use enigmata_traverse::{parse_document, render_document, ControlTraverser, NodeVisitor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Entity(EntityKind),
    Lang,
    /// UI file declaring the pack's own namespace
    UniqueUi,
    /// UI file overriding a vanilla one
    SharedUi,
}

impl DocumentKind {
    pub fn phase(self) -> u8 {
        match self {
            DocumentKind::Lang => 0,
            DocumentKind::Entity(_) => 1,
            DocumentKind::UniqueUi | DocumentKind::SharedUi => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-chosen identity, usually the pack-relative path
    pub id: String,
    pub kind: DocumentKind,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Rewritten text per document id
    pub outputs: IndexMap<String, String>,
    /// Documents left out because they could not be parsed
    pub skipped: Vec<DocumentError>,
}

impl RunReport {
    fn skip(&mut self, error: DocumentError) {
        tracing::warn!(document = %error.document(), error = %error, "skipping document");
        self.skipped.push(error);
    }
}

fn fatal(error: DocumentError) -> DocumentError {
    tracing::error!(document = %error.document(), error = %error, "aborting run");
    error
}

type UiDocument = (String, Value);

/// Apply one control-aware visitor to each document in turn.
fn ui_pass<V>(
    documents: &mut [UiDocument],
    visitor: &mut V,
    excluded: &HashSet<String>,
    exclude: bool,
) -> Result<(), DocumentError>
where
    V: NodeVisitor<Context = bool, Error = ObfuscateError>,
{
    let mut traverser = ControlTraverser::new(visitor, excluded).exclude(exclude);
    for (id, document) in documents.iter_mut() {
        *document = traverser
            .traverse(std::mem::take(document))
            .map_err(|e| fatal(DocumentError::rename(id, e)))?;
    }
    Ok(())
}

/// Namespaces declared by unique UI documents, first occurrence first.
fn declared_namespaces(documents: &[UiDocument]) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for (_, document) in documents {
        if let Some(ns) = document.get("namespace").and_then(Value::as_str) {
            if !namespaces.iter().any(|n| n == ns) {
                namespaces.push(ns.to_string());
            }
        }
    }
    namespaces
}

fn rename_entity(
    session: &ObfuscationSession,
    id: &str,
    kind: EntityKind,
    document: Value,
) -> Result<String, DocumentError> {
    let out = obfuscate_entity_document(session, kind, document)
        .map_err(|e| fatal(DocumentError::rename(id, e)))?;
    tracing::debug!(document = %id, %kind, "entity document renamed");
    Ok(render_document(&out))
}

/// Rename every document. Malformed documents are skipped and reported;
/// the first rename failure aborts the run.
pub fn run(session: &ObfuscationSession, mut documents: Vec<Document>) -> Result<RunReport, DocumentError> {
    tracing::info!(documents = documents.len(), "obfuscation run started");
    documents.sort_by_key(|d| d.kind.phase());

    let mut report = RunReport::default();
    let mut render_controllers = Vec::new();
    let mut unique = Vec::new();
    let mut shared = Vec::new();

    for Document { id, kind, text } in documents {
        match kind {
            DocumentKind::Lang => {
                let out = rename_lang_keys(session, &text)
                    .map_err(|e| fatal(DocumentError::rename(&id, e)))?;
                report.outputs.insert(id, out);
            }
            DocumentKind::Entity(entity_kind) => {
                let document = match parse_document(&text) {
                    Ok(document) => document,
                    Err(e) => {
                        report.skip(DocumentError::malformed(&id, e));
                        continue;
                    }
                };
                if entity_kind == EntityKind::RenderController {
                    // hold the output slot so the document keeps its position
                    report.outputs.insert(id.clone(), String::new());
                    render_controllers.push((id, document));
                    continue;
                }
                let out = rename_entity(session, &id, entity_kind, document)?;
                report.outputs.insert(id, out);
            }
            DocumentKind::UniqueUi | DocumentKind::SharedUi => match parse_document(&text) {
                Ok(document) if kind == DocumentKind::UniqueUi => unique.push((id, document)),
                Ok(document) => shared.push((id, document)),
                Err(e) => report.skip(DocumentError::malformed(&id, e)),
            },
        }
    }

    for (id, document) in render_controllers {
        let document = rename_bone_keys(session, document);
        let out = rename_entity(session, &id, EntityKind::RenderController, document)?;
        report.outputs.insert(id, out);
    }

    if !unique.is_empty() || !shared.is_empty() {
        rename_ui(session, &mut unique, &mut shared)?;
    }
    for (id, document) in unique.into_iter().chain(shared) {
        report.outputs.insert(id, render_document(&document));
    }

    tracing::info!(
        outputs = report.outputs.len(),
        skipped = report.skipped.len(),
        "obfuscation run finished"
    );
    Ok(report)
}

fn rename_ui(
    session: &ObfuscationSession,
    unique: &mut [UiDocument],
    shared: &mut [UiDocument],
) -> Result<(), DocumentError> {
    let excluded = &session.config().excluded_ui_names;
    let namespaces = declared_namespaces(unique);
    tracing::debug!(unique = unique.len(), shared = shared.len(), ?namespaces, "renaming UI");

    let mut localize = LocalizationRewriter::new(session);
    ui_pass(unique, &mut localize, excluded, false)?;
    ui_pass(shared, &mut localize, excluded, false)?;

    ui_pass(unique, &mut UiVariableRenamer::new(session, VariableMode::Generate), excluded, true)?;
    ui_pass(shared, &mut UiVariableRenamer::new(session, VariableMode::Lookup), excluded, false)?;

    ui_pass(unique, &mut ControlNameCollector::new(session, true), excluded, true)?;
    ui_pass(
        unique,
        &mut ControlReferenceRewriter::new(session, &namespaces, true),
        excluded,
        false,
    )?;

    ui_pass(
        shared,
        &mut ControlReferenceRewriter::new(session, &namespaces, false),
        excluded,
        false,
    )?;
    ui_pass(shared, &mut ControlNameCollector::new(session, false), excluded, true)
}
