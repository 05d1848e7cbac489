//! Compact payload storage for graph labels.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Interned payload ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StrId(u32);

impl StrId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// String interner: maps payload strings to compact IDs.
///
/// Serialized as the plain list of strings in ID order, so a snapshot stays
/// readable and the reverse index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StringInterner {
    str_to_id: AHashMap<String, StrId>,
    id_to_str: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its ID
    pub fn intern(&mut self, s: &str) -> StrId {
        if let Some(id) = self.str_to_id.get(s) {
            return *id;
        }
        let id = StrId(self.id_to_str.len() as u32);
        self.str_to_id.insert(s.to_string(), id);
        self.id_to_str.push(s.to_string());
        id
    }

    /// ID of an already interned string
    pub fn id_of(&self, s: &str) -> Option<StrId> {
        self.str_to_id.get(s).copied()
    }

    pub fn resolve(&self, id: StrId) -> Option<&str> {
        self.id_to_str.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }
}

impl From<Vec<String>> for StringInterner {
    fn from(id_to_str: Vec<String>) -> Self {
        let str_to_id = id_to_str
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), StrId(i as u32)))
            .collect();
        Self {
            str_to_id,
            id_to_str,
        }
    }
}

impl From<StringInterner> for Vec<String> {
    fn from(interner: StringInterner) -> Self {
        interner.id_to_str
    }
}
