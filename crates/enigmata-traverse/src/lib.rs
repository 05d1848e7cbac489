//! Structured-tree transformation for pack documents.
//!
//! A document is a `serde_json::Value` tree (with key order preserved). The
//! [`transform`] walk hands every mapping, sequence and string to a
//! [`NodeVisitor`], which may rewrite it, stop descent into some or all
//! children, and choose the context each child is visited with.
//! [`ControlTraverser`] layers the UI-control rules on top of the same
//! visitor trait.

mod controls;
mod document;
mod transform;

pub use controls::{ControlTraverser, NOT_CONTROL_KEYS};
pub use document::{parse_document, render_document, strip_comments, MalformedDocument};
pub use transform::{
    transform, Children, Identity, MappingStep, NodeVisitor, ScalarFn, SequenceStep, Step, Stop,
};
