//! UI and localization renaming.
//!
//! UI documents come in two flavours. *Unique* documents declare the pack's
//! own namespace and may have every name renamed; *shared* documents
//! override vanilla files, so only references into the pack's namespaces
//! and already-known variables are touched.
//!
//! All visitors here run under [`enigmata_traverse::ControlTraverser`] and
//! receive the "this mapping is a control" flag as context.

use crate::{ObfuscateError, ObfuscationSession};
use enigmata_rename::{Category, RenameError};
use enigmata_traverse::{MappingStep, NodeVisitor, Step, Stop};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Localization
// ============================================================================

/// Rename every `.lang` key not in the reference localization set.
///
/// Comment lines (`#`), lines without `=` and keys with an empty value are
/// kept. Line endings and values are preserved byte for byte.
pub fn rename_lang_keys(session: &ObfuscationSession, text: &str) -> Result<String, RenameError> {
    let (bom, body) = match text.strip_prefix('\u{feff}') {
        Some(body) => ("\u{feff}", body),
        None => ("", text),
    };
    let known = &session.reference().localization_keys;

    let mut out = String::with_capacity(text.len());
    out.push_str(bom);
    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        match content.split_once('=') {
            Some((key, value))
                if !key.is_empty() && !key.starts_with('#') && !value.is_empty() && !known.contains(key) =>
            {
                out.push_str(&session.generate(key, Category::Localization)?);
                out.push_str(&line[key.len()..]);
            }
            _ => out.push_str(line),
        }
    }
    Ok(out)
}

/// Replaces UI strings that are renamed localization keys.
#[derive(Debug, Clone, Default)]
pub struct LocalizationRewriter {
    renamed: HashMap<String, String>,
}

impl LocalizationRewriter {
    pub fn new(session: &ObfuscationSession) -> Self {
        Self {
            renamed: session.table_entries(Category::Localization).into_iter().collect(),
        }
    }
}

impl NodeVisitor for LocalizationRewriter {
    type Context = bool;
    type Error = ObfuscateError;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        _is_control: &bool,
    ) -> Result<MappingStep<bool>, ObfuscateError> {
        if map.get("localize") != Some(&Value::Bool(false)) {
            return Ok(Step::descend(map));
        }
        let literal = map
            .iter()
            .filter(|(_, v)| v.is_string())
            .map(|(k, _)| k.clone())
            .collect();
        Ok(Step::descend(map).with_stop(Stop::Skip(literal)))
    }

    fn visit_scalar(&mut self, s: String, _is_control: &bool) -> Result<String, ObfuscateError> {
        Ok(self.renamed.get(&s).cloned().unwrap_or(s))
    }
}

// ============================================================================
// Variables and bindings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableMode {
    /// Generate names for unseen variables
    Generate,
    /// Only apply names that already exist
    Lookup,
}

/// Renames `$variables` into [`Category::UiVariable`] and `#bindings` into
/// [`Category::UiBinding`], in keys and strings alike.
pub struct UiVariableRenamer<'a> {
    session: &'a ObfuscationSession,
    mode: VariableMode,
}

impl<'a> UiVariableRenamer<'a> {
    pub fn new(session: &'a ObfuscationSession, mode: VariableMode) -> Self {
        Self { session, mode }
    }

    pub fn rename_text(&self, text: &str) -> Result<String, RenameError> {
        let reference = self.session.reference();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for found in self.session.patterns().ui_variable.find_iter(text) {
            let var = found.as_str();
            out.push_str(&text[last..found.start()]);
            last = found.end();

            let (sigil, name) = var.split_at(1);
            if name.is_empty() || reference.ui_variables.contains(var) || reference.ui_bindings.contains(var) {
                out.push_str(var);
                continue;
            }
            let category = if sigil == "$" {
                Category::UiVariable
            } else {
                Category::UiBinding
            };
            let renamed = match self.mode {
                VariableMode::Generate => self.session.generate(name, category)?,
                VariableMode::Lookup => self
                    .session
                    .lookup(category, name)
                    .unwrap_or_else(|| name.to_string()),
            };
            out.push_str(sigil);
            out.push_str(&renamed);
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl NodeVisitor for UiVariableRenamer<'_> {
    type Context = bool;
    type Error = ObfuscateError;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        _is_control: &bool,
    ) -> Result<MappingStep<bool>, ObfuscateError> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            out.insert(self.rename_text(&key)?, value);
        }
        Ok(Step::descend(out))
    }

    fn visit_scalar(&mut self, s: String, _is_control: &bool) -> Result<String, ObfuscateError> {
        Ok(self.rename_text(&s)?)
    }
}

// ============================================================================
// Control names
// ============================================================================

/// Renames control definitions (`name` or `name@base` keys of control
/// mappings) into [`Category::UiControl`].
pub struct ControlNameCollector<'a> {
    session: &'a ObfuscationSession,
    unique: bool,
}

impl<'a> ControlNameCollector<'a> {
    /// `unique` renames every control; otherwise only controls deriving from
    /// the configured namespace are renamed.
    pub fn new(session: &'a ObfuscationSession, unique: bool) -> Self {
        Self { session, unique }
    }

    fn rename_key(&self, key: String) -> Result<String, RenameError> {
        let (name, base) = match key.split_once('@') {
            Some((name, base)) => (name, Some(base)),
            None => (key.as_str(), None),
        };
        let keep = name.is_empty()
            || name.contains(['$', '#'])
            || name.chars().all(|c| c.is_ascii_digit())
            || self.session.reference().ui_keywords.contains(name);
        if keep {
            return Ok(key);
        }

        let namespace = &self.session.config().namespace;
        match base {
            Some(base) if self.unique || (!namespace.is_empty() && key.contains(namespace.as_str())) => {
                let renamed = self.session.generate(name, Category::UiControl)?;
                Ok(format!("{renamed}@{base}"))
            }
            None if self.unique => self.session.generate(name, Category::UiControl),
            _ => Ok(key),
        }
    }
}

impl NodeVisitor for ControlNameCollector<'_> {
    type Context = bool;
    type Error = ObfuscateError;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        is_control: &bool,
    ) -> Result<MappingStep<bool>, ObfuscateError> {
        if !*is_control {
            return Ok(Step::descend(map));
        }
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            out.insert(self.rename_key(key)?, value);
        }
        Ok(Step::descend(out))
    }
}

/// Rewrites references to renamed controls: `name@ns.base` keys and the
/// `ns.base`, `name@ns.base` and `@base` string spellings.
pub struct ControlReferenceRewriter<'a> {
    namespaces: &'a [String],
    properties: &'a HashSet<String>,
    controls: HashMap<String, String>,
    unique: bool,
}

impl<'a> ControlReferenceRewriter<'a> {
    /// Takes a snapshot of the control table; controls renamed afterwards
    /// are not applied.
    pub fn new(session: &'a ObfuscationSession, namespaces: &'a [String], unique: bool) -> Self {
        Self {
            namespaces,
            properties: &session.reference().ui_properties,
            controls: session.table_entries(Category::UiControl).into_iter().collect(),
            unique,
        }
    }

    fn rewrite_key(&self, key: &str) -> Option<String> {
        for ns in self.namespaces {
            let marker = format!("@{ns}.");
            if let Some((head, base)) = key.split_once(marker.as_str()) {
                if let Some(renamed) = self.controls.get(base) {
                    return Some(format!("{head}{marker}{renamed}"));
                }
            }
            if self.unique {
                if let Some((head, base)) = key.split_once('@') {
                    if let Some(renamed) = self.controls.get(base) {
                        return Some(format!("{head}@{renamed}"));
                    }
                }
            }
        }
        None
    }

    fn rewrite_str(&self, s: &str) -> Option<String> {
        for ns in self.namespaces {
            let marker = format!("@{ns}.");
            let dotted = format!("{ns}.");
            let rewritten = if let Some((head, base)) = s.split_once(marker.as_str()) {
                self.controls
                    .get(base)
                    .map(|renamed| format!("{head}{marker}{renamed}"))
            } else if s.contains('@') && self.unique {
                s.strip_prefix('@')
                    .and_then(|base| self.controls.get(base))
                    .map(|renamed| format!("@{renamed}"))
            } else if s.contains(dotted.as_str()) {
                s.strip_prefix(dotted.as_str())
                    .and_then(|base| self.controls.get(base))
                    .map(|renamed| format!("{dotted}{renamed}"))
            } else if self.unique {
                self.controls.get(s).cloned()
            } else {
                None
            };
            if rewritten.is_some() {
                return rewritten;
            }
        }
        None
    }
}

impl NodeVisitor for ControlReferenceRewriter<'_> {
    type Context = bool;
    type Error = ObfuscateError;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        is_control: &bool,
    ) -> Result<MappingStep<bool>, ObfuscateError> {
        let out: Map<String, Value> = if *is_control {
            map.into_iter()
                .map(|(key, value)| match self.rewrite_key(&key) {
                    Some(renamed) => (renamed, value),
                    None => (key, value),
                })
                .collect()
        } else {
            map
        };
        let properties = out
            .keys()
            .filter(|k| self.properties.contains(*k))
            .cloned()
            .collect();
        Ok(Step::descend(out).with_stop(Stop::Skip(properties)))
    }

    fn visit_scalar(&mut self, s: String, _is_control: &bool) -> Result<String, ObfuscateError> {
        Ok(self.rewrite_str(&s).unwrap_or(s))
    }
}
