//! Bijective rename tables.

use crate::{Category, RenameError};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Exported form: category name -> {original: generated}.
pub type TableExport = BTreeMap<String, IndexMap<String, String>>;

/// Bijective `original -> generated` map for one category.
///
/// Both directions iterate in insertion order, which keeps every choice the
/// generator makes over them reproducible.
#[derive(Debug, Clone)]
pub struct RenameTable {
    category: Category,
    forward: IndexMap<String, String>,
    backward: IndexMap<String, String>,
}

impl RenameTable {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            forward: IndexMap::new(),
            backward: IndexMap::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Bind `key -> value`, replacing any previous value of `key`.
    ///
    /// Re-binding the same pair is a no-op. Binding a value already owned by
    /// another key fails with [`RenameError::Conflict`] and leaves the table
    /// untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RenameError> {
        if self.forward.get(key).is_some_and(|v| v == value) {
            return Ok(());
        }
        if let Some(owner) = self.backward.get(value) {
            return Err(RenameError::Conflict {
                category: self.category,
                key: key.to_string(),
                value: value.to_string(),
                owner: owner.clone(),
            });
        }

        match self.forward.get_mut(key) {
            Some(slot) => {
                let old = std::mem::replace(slot, value.to_string());
                self.backward.shift_remove(&old);
            }
            None => {
                self.forward.insert(key.to_string(), value.to_string());
            }
        }
        self.backward.insert(value.to_string(), key.to_string());
        Ok(())
    }

    /// Re-point whichever key currently owns `old_value` to `new_value`.
    /// An unowned `old_value` is bound as a key in its own right.
    pub fn replace_value(&mut self, old_value: &str, new_value: &str) -> Result<(), RenameError> {
        match self.backward.get(old_value).cloned() {
            Some(key) => self.set(&key, new_value),
            None => self.set(old_value, new_value),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    /// Original bound to a generated value
    pub fn original_of(&self, value: &str) -> Option<&str> {
        self.backward.get(value).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.backward.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// `(original, generated)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Generated values in the order they were bound
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.backward.keys().map(String::as_str)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// One [`RenameTable`] per [`Category`].
#[derive(Debug, Clone)]
pub struct RenameTables {
    tables: Vec<RenameTable>,
}

impl Default for RenameTables {
    fn default() -> Self {
        Self {
            tables: Category::ALL.into_iter().map(RenameTable::new).collect(),
        }
    }
}

impl RenameTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, category: Category) -> &RenameTable {
        &self.tables[category.index()]
    }

    pub fn table_mut(&mut self, category: Category) -> &mut RenameTable {
        &mut self.tables[category.index()]
    }

    pub fn get(&self, category: Category, original: &str) -> Option<&str> {
        self.table(category).get(original)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenameTable> {
        self.tables.iter()
    }

    /// Whether a table outside `shared` already hands out `value`.
    pub fn value_taken_outside(&self, value: &str, shared: &[Category]) -> bool {
        self.tables
            .iter()
            .filter(|table| !shared.contains(&table.category()))
            .any(|table| table.contains_value(value))
    }

    /// Total number of bindings across all categories
    pub fn len(&self) -> usize {
        self.tables.iter().map(RenameTable::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(RenameTable::is_empty)
    }

    /// Snapshot every non-empty table for persistence.
    pub fn export(&self) -> TableExport {
        self.tables
            .iter()
            .filter(|table| !table.is_empty())
            .map(|table| {
                let pairs = table
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (table.category().as_str().to_string(), pairs)
            })
            .collect()
    }
}
