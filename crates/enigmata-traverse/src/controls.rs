//! UI-control aware traversal.
//!
//! UI documents mix control definitions with plain property objects. A
//! mapping is treated as a control when it sits at the document root, under
//! a `value` key or inside a sequence, and has none of
//! [`NOT_CONTROL_KEYS`]. Visitors receive that flag as their context.

use crate::{NodeVisitor, Step, Stop};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Keys that only occur on binding and button-mapping objects.
pub const NOT_CONTROL_KEYS: [&str; 10] = [
    "requires",
    "binding_name",
    "binding_name_override",
    "binding_type",
    "source_control_name",
    "source_property_name",
    "target_property_name",
    "from_button_id",
    "to_button_id",
    "mapping_type",
];

pub struct ControlTraverser<'a, V> {
    visitor: &'a mut V,
    excluded: &'a HashSet<String>,
    exclude: bool,
    first_level: bool,
}

impl<'a, V> ControlTraverser<'a, V>
where
    V: NodeVisitor<Context = bool>,
{
    /// Names in `excluded` (compared on the part before any `@`) are copied
    /// through verbatim unless exclusion is switched off.
    pub fn new(visitor: &'a mut V, excluded: &'a HashSet<String>) -> Self {
        Self {
            visitor,
            excluded,
            exclude: true,
            first_level: true,
        }
    }

    pub fn exclude(mut self, exclude: bool) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn traverse(&mut self, doc: Value) -> Result<Value, V::Error> {
        self.first_level = true;
        self.walk(doc, false)
    }

    fn walk(&mut self, node: Value, is_control: bool) -> Result<Value, V::Error> {
        match node {
            Value::Object(map) => self.walk_mapping(map, is_control).map(Value::Object),
            Value::Array(seq) => self.walk_sequence(seq, is_control).map(Value::Array),
            Value::String(s) if self.is_excluded(&s) => Ok(Value::String(s)),
            Value::String(s) => self.visitor.visit_scalar(s, &is_control).map(Value::String),
            literal => Ok(literal),
        }
    }

    fn walk_mapping(
        &mut self,
        map: Map<String, Value>,
        is_control: bool,
    ) -> Result<Map<String, Value>, V::Error> {
        let mut is_control = is_control || std::mem::take(&mut self.first_level);

        // namespace and excluded entries bypass the visitor and lead the output
        let mut out = Map::with_capacity(map.len());
        if let Some(ns) = map.get("namespace") {
            out.insert("namespace".to_string(), ns.clone());
        }
        let mut rest = Map::with_capacity(map.len());
        for (key, value) in map {
            if NOT_CONTROL_KEYS.contains(&key.as_str()) {
                is_control = false;
            }
            if out.contains_key(&key) {
                continue;
            }
            if self.is_excluded(&key) {
                out.insert(key, value);
            } else {
                rest.insert(key, value);
            }
        }

        let Step { node, stop, .. } = self.visitor.visit_mapping(rest, &is_control)?;
        for (key, value) in node {
            if out.contains_key(&key) {
                continue;
            }
            let value = if stop.skips(key.as_str()) {
                value
            } else {
                self.walk(value, key == "value")?
            };
            out.insert(key, value);
        }
        Ok(out)
    }

    fn walk_sequence(&mut self, seq: Vec<Value>, is_control: bool) -> Result<Vec<Value>, V::Error> {
        let Step { node, stop, .. } = self.visitor.visit_sequence(seq, &is_control)?;
        if matches!(stop, Stop::Halt) {
            return Ok(node);
        }
        node.into_iter()
            .enumerate()
            .map(|(index, value)| {
                if stop.skips(&index) {
                    Ok(value)
                } else {
                    self.walk(value, true)
                }
            })
            .collect()
    }

    fn is_excluded(&self, name: &str) -> bool {
        let prefix = name.split_once('@').map_or(name, |(prefix, _)| prefix);
        self.exclude && self.excluded.contains(prefix)
    }
}
