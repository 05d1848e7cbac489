//! Bone keys of render-controller `materials` and `part_visibility` lists.
//!
//! Entries in these lists address the bones of the models an entity renders
//! with the controller, e.g. `{"leg": "Material.default"}`. Plain keys follow
//! the bone table. Glob keys such as `leg*` expand into one entry per
//! matching bone, where the candidate bones are
//!
//! ```text
//!   rc <- entity -> model_index -> model -> bone
//! ```
//!
//! restricted to the model indexes the controller itself names
//! (`Geometry.default`). The catch-all `*` key stays as it is.
//!
//! Only keys change here; values are left to the render-controller renamer,
//! so this runs on the original document once every entity and model has
//! been recorded.

use crate::identity::{starts_with_ignore_case, true_id};
use crate::ObfuscationSession;
use enigmata_depgraph::NodeKind;
use enigmata_rename::Category;
use globset::Glob;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const BONE_LISTS: [&str; 2] = ["materials", "part_visibility"];
const GEOMETRY_REFERENCE: &str = "geometry.";

/// Rewrite the bone keys of every render controller in `document`.
pub fn rename_bone_keys(session: &ObfuscationSession, mut document: Value) -> Value {
    let Some(controllers) = document
        .get_mut("render_controllers")
        .and_then(Value::as_object_mut)
    else {
        return document;
    };

    for (key, body) in controllers.iter_mut() {
        let Some(body) = body.as_object_mut() else {
            continue;
        };
        let mut model_indexes = BTreeSet::new();
        for value in body.values() {
            collect_geometry_references(value, &mut model_indexes);
        }
        let keys = BoneKeys {
            session,
            controller: true_id(key).0,
            model_indexes: &model_indexes,
        };
        for list in BONE_LISTS {
            if let Some(Value::Array(items)) = body.get_mut(list) {
                *items = keys.rewrite_list(std::mem::take(items));
            }
        }
    }
    document
}

/// Model index names referenced as `Geometry.<index>` anywhere below `value`.
fn collect_geometry_references(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => {
            let tokens = text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'));
            for token in tokens {
                if starts_with_ignore_case(token, GEOMETRY_REFERENCE) {
                    let index = &token[GEOMETRY_REFERENCE.len()..];
                    if !index.is_empty() {
                        out.insert(index.to_string());
                    }
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_geometry_references(item, out)),
        Value::Object(map) => map
            .values()
            .for_each(|item| collect_geometry_references(item, out)),
        _ => {}
    }
}

fn is_pattern(key: &str) -> bool {
    key != "*" && key.contains(['*', '?', '['])
}

struct BoneKeys<'a> {
    session: &'a ObfuscationSession,
    controller: &'a str,
    model_indexes: &'a BTreeSet<String>,
}

impl BoneKeys<'_> {
    fn renamed(&self, bone: &str) -> String {
        self.session
            .lookup(Category::Bone, bone)
            .unwrap_or_else(|| bone.to_string())
    }

    /// Bones of the controller's models matching `pattern`, in name order.
    /// `None` when the key is not a valid glob.
    fn matching_bones(&self, pattern: &str) -> Option<Vec<String>> {
        let matcher = match Glob::new(pattern) {
            Ok(glob) => glob.compile_matcher(),
            Err(error) => {
                tracing::debug!(pattern, %error, "bone key is not a glob");
                return None;
            }
        };
        let bones: Vec<String> = self.session.with_graph(|graph| {
            graph
                .bones_via_model_indexes(NodeKind::RenderController, self.controller, self.model_indexes)
                .into_iter()
                .filter(|bone| matcher.is_match(bone))
                .map(str::to_string)
                .collect()
        });
        Some(bones)
    }

    /// A glob entry is replaced by one single-key entry per matching bone.
    /// Entries that match nothing are kept as written.
    fn rewrite_list(&self, items: Vec<Value>) -> Vec<Value> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(entry) = item else {
                out.push(item);
                continue;
            };

            let mut pending = Map::new();
            for (key, value) in entry {
                let expanded = if is_pattern(&key) {
                    self.matching_bones(&key).filter(|bones| !bones.is_empty())
                } else {
                    None
                };
                match expanded {
                    Some(bones) => {
                        if !pending.is_empty() {
                            out.push(Value::Object(std::mem::take(&mut pending)));
                        }
                        for bone in bones {
                            let mut single = Map::new();
                            single.insert(self.renamed(&bone), value.clone());
                            out.push(Value::Object(single));
                        }
                    }
                    None if key == "*" || is_pattern(&key) => {
                        pending.insert(key, value);
                    }
                    None => {
                        pending.insert(self.renamed(&key), value);
                    }
                }
            }
            if !pending.is_empty() {
                out.push(Value::Object(pending));
            }
        }
        out
    }
}
