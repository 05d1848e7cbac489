//! Identifier obfuscation for Bedrock resource packs.
//!
//! The crate ties the generic pieces together:
//!
//! ```text
//!   Document ──► run ──► EntityRenamer / UI renamers ──► NodeVisitor walk
//!                              │
//!                              ▼
//!                     ObfuscationSession
//!                     ├── NameGenerator + RenameTables   (enigmata-rename)
//!                     ├── DependencyGraph                (enigmata-depgraph)
//!                     └── ReferenceData                  (never renamed)
//! ```
//!
//! Every renamer shares the one session, so an identifier gets the same
//! substitute in every document that mentions it.

mod bones;
mod config;
mod entities;
mod error;
mod handler;
mod identity;
mod presets;
mod reference;
mod run;
mod session;
mod ui;

pub use bones::rename_bone_keys;
pub use config::{ConfigError, SessionConfig, BUILTIN_ENTITY_EXCLUSIONS, BUILTIN_UI_EXCLUSIONS};
pub use entities::{obfuscate_entity_document, EntityContext, EntityRenamer};
pub use error::{DocumentError, ObfuscateError};
pub use handler::{EntityHandler, KeyMapping, ProcessMapping};
pub use identity::{true_id, ENTITY_PREFIXES};
pub use presets::{EntityKind, IdentifierSource, RenameProfile};
pub use reference::{ReferenceData, ReferenceFn, ReferenceSet};
pub use run::{run, Document, DocumentKind, RunReport};
pub use session::ObfuscationSession;
pub use ui::{
    rename_lang_keys, ControlNameCollector, ControlReferenceRewriter, LocalizationRewriter,
    UiVariableRenamer, VariableMode,
};

pub use enigmata_depgraph::{DependencyGraph, NodeKind};
pub use enigmata_rename::{Category, CouplingGroup, GeneratorConfig, RenameError, TableExport};
