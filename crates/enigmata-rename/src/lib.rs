//! Rename core: categories, bijective tables and the name generator.
//!
//! ```text
//!   original ──► NameGenerator ──► RenameTables[category] ──► export
//!                    │  ▲
//!                    ▼  │ borrow unused names
//!              coupling group tables
//! ```
//!
//! Tables only ever grow during a run; the exported snapshot is what a later
//! run (or a human) uses to map generated names back.

mod category;
mod error;
mod generator;
mod table;

pub use category::{Category, CouplingGroup};
pub use error::RenameError;
pub use generator::{GeneratorConfig, LengthSchedule, NameGenerator, MIN_LENGTH};
pub use table::{RenameTable, RenameTables, TableExport};
