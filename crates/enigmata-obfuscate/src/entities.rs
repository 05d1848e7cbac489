//! Entity-family renaming.
//!
//! An [`EntityRenamer`] walks one document of a given [`EntityKind`]. Each
//! mapping entry is matched against the kind's [`RenameProfile`]:
//!
//! ```text
//!   handlers for (key, value) =
//!       mapping[parent key]              entries below a mapped key
//!    or mapping[key]                     the key itself is mapped
//!    or root handler                     key carries an entity prefix
//!    and "array.*": [..] keys always go to RenderControllerArray
//! ```
//!
//! Strings that no entry decides are scanned for Molang variables, then
//! renamed with the key handler of the enclosing mapped key (list items).

use crate::identity::{entity_prefix, starts_with_ignore_case, true_id, ARRAY_PREFIX, GEOMETRY_PREFIX};
use crate::{
    EntityHandler, EntityKind, IdentifierSource, ObfuscateError, ObfuscationSession, ProcessMapping,
    RenameProfile,
};
use enigmata_depgraph::NodeKind;
use enigmata_rename::Category;
use enigmata_traverse::{transform, Children, MappingStep, NodeVisitor, Step, Stop};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Context threaded to each child of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityContext {
    /// Enclosing key when it has a mapping entry
    pub mapping_key: Option<String>,
    /// Identity of the enclosing entity
    pub identifier: Option<String>,
    /// Keys of this mapping name entities
    pub keyed_section: bool,
    pub top_level: bool,
}

/// One side of an `a:b` identifier, or the whole of a plain one.
#[derive(Debug, Clone, Copy)]
struct Part<'s> {
    text: &'s str,
    id: &'s str,
    prefix: &'s str,
    excluded: bool,
}

#[derive(Debug, Clone, Copy)]
enum Spelling<'s> {
    Plain(Part<'s>),
    Namespaced(Part<'s>, Part<'s>),
}

/// Handlers picked for one mapping entry.
struct Selection<'p> {
    mapping: &'p ProcessMapping,
    /// The key itself names a mapping entry and is never renamed
    by_key: bool,
    /// Picked through the root handler
    from_root: bool,
}

pub struct EntityRenamer<'a> {
    session: &'a ObfuscationSession,
    profile: RenameProfile,
    root_mapping: ProcessMapping,
    array_mapping: ProcessMapping,
}

impl<'a> EntityRenamer<'a> {
    pub fn new(session: &'a ObfuscationSession, kind: EntityKind) -> Self {
        Self::with_profile(session, RenameProfile::for_kind(kind))
    }

    pub fn with_profile(session: &'a ObfuscationSession, profile: RenameProfile) -> Self {
        Self {
            session,
            root_mapping: ProcessMapping::keys(profile.root.clone()),
            array_mapping: ProcessMapping::keys(EntityHandler::renaming(
                Category::RenderControllerArray,
            )),
            profile,
        }
    }

    pub fn initial_context(&self) -> EntityContext {
        EntityContext {
            keyed_section: self.profile.identifiers == IdentifierSource::Geometry,
            top_level: true,
            ..EntityContext::default()
        }
    }

    pub fn rename(&mut self, document: Value) -> Result<Value, ObfuscateError> {
        let ctx = self.initial_context();
        transform(self, document, &ctx)
    }

    fn owner_kind(&self) -> Option<NodeKind> {
        self.profile.root.node_kind
    }

    fn identifier_of(&self, map: &Map<String, Value>) -> Option<String> {
        match self.profile.identifiers {
            IdentifierSource::Description | IdentifierSource::Geometry => map
                .get("description")
                .and_then(|d| d.get("identifier"))
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(|id| true_id(id).0.to_string()),
            IdentifierSource::None | IdentifierSource::SectionKeys(_) => None,
        }
    }

    fn keyed_identifier(&self, key: &str) -> Option<String> {
        match self.profile.identifiers {
            IdentifierSource::SectionKeys(_) => Some(true_id(key).0.to_string()),
            IdentifierSource::Geometry if starts_with_ignore_case(key, GEOMETRY_PREFIX) => {
                Some(true_id(key).0.to_string())
            }
            _ => None,
        }
    }

    fn select(&self, parent_key: Option<&str>, key: &str, is_array: bool) -> Option<Selection<'_>> {
        let by_key = self.profile.mapping.get(key);
        let selection = |mapping, from_root| Selection {
            mapping,
            by_key: by_key.is_some(),
            from_root,
        };
        if is_array {
            return Some(selection(&self.array_mapping, false));
        }
        if let Some(mapping) = parent_key.and_then(|k| self.profile.mapping.get(k)) {
            return Some(selection(mapping, false));
        }
        if let Some(mapping) = by_key {
            return Some(selection(mapping, false));
        }
        entity_prefix(key).map(|_| selection(&self.root_mapping, true))
    }

    // ------------------------------------------------------------------------
    // Deciding and renaming one string
    // ------------------------------------------------------------------------

    fn part<'s>(
        &self,
        text: &'s str,
        handler: &EntityHandler,
        owner: Option<(NodeKind, &str)>,
        namespace: bool,
    ) -> Part<'s> {
        let (id, prefix) = true_id(text);
        let reference = self.session.reference();
        let excluded = self.session.config().excluded_entity_names.contains(id)
            || (namespace && reference.reserved_namespaces.contains(id))
            || handler.reference.contains(reference, owner, id);
        Part {
            text,
            id,
            prefix,
            excluded,
        }
    }

    /// `None` when the handler does not rename anything.
    fn decide<'s>(
        &self,
        text: &'s str,
        handler: &EntityHandler,
        owner: Option<(NodeKind, &str)>,
    ) -> Option<Spelling<'s>> {
        handler.category?;
        let spelling = match text.split_once(':') {
            Some((namespace, name)) if !name.contains(':') => Spelling::Namespaced(
                self.part(namespace, handler, owner, true),
                self.part(name, handler, owner, false),
            ),
            _ => Spelling::Plain(self.part(text, handler, owner, false)),
        };
        Some(spelling)
    }

    fn render_part(&self, part: Part<'_>, category: Category) -> Result<String, ObfuscateError> {
        if part.excluded {
            return Ok(part.text.to_string());
        }
        let generated = self.session.generate(part.id, category)?;
        Ok(format!("{}{generated}", part.prefix))
    }

    /// Decide `text` with `handler`, record it in the graph and return the
    /// output text. `None` means the string was left undecided.
    fn apply(
        &self,
        text: &str,
        handler: &EntityHandler,
        owner: Option<(NodeKind, &str)>,
        from_root: bool,
    ) -> Result<Option<String>, ObfuscateError> {
        let (Some(category), Some(spelling)) = (handler.category, self.decide(text, handler, owner))
        else {
            return Ok(None);
        };

        if let Some(kind) = handler.node_kind {
            let payload = true_id(text).0;
            self.session.record_node(kind, payload, handler.unique);
            if let (false, Some((owner_kind, owner_id))) = (from_root, owner) {
                self.session.record_node(owner_kind, owner_id, true);
                self.session.record_edge(owner_kind, owner_id, kind, payload)?;
            }
        }

        let rendered = match spelling {
            Spelling::Plain(part) if part.excluded => text.to_string(),
            Spelling::Plain(part) => self.render_part(part, category)?,
            Spelling::Namespaced(namespace, name) => format!(
                "{}:{}",
                self.render_part(namespace, category)?,
                self.render_part(name, category)?
            ),
        };
        Ok(Some(rendered))
    }

    /// Edge from a decided key to its decided value (`model_index -> model`).
    fn link(&self, mapping: &ProcessMapping, key: &str, value: &str) -> Result<(), ObfuscateError> {
        if let (Some(key_kind), Some(value_kind)) = (mapping.key.node_kind, mapping.value.node_kind) {
            self.session
                .record_edge(key_kind, true_id(key).0, value_kind, true_id(value).0)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Molang
    // ------------------------------------------------------------------------

    /// Rewrite Molang variable names in `text`. `None` when nothing matched.
    fn rewrite_molang(
        &self,
        text: &str,
        owner: Option<(NodeKind, &str)>,
    ) -> Result<Option<String>, ObfuscateError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut matched = false;
        for caps in self.session.patterns().molang_var.captures_iter(text) {
            let (Some(scope), Some(name)) = (caps.get(2), caps.get(3)) else {
                continue;
            };
            matched = true;
            out.push_str(&text[last..scope.start()]);
            out.push_str(&self.molang_name(scope.as_str(), name.as_str(), owner)?);
            last = name.end();
        }
        if !matched {
            return Ok(None);
        }
        out.push_str(&text[last..]);
        Ok(Some(out))
    }

    fn molang_name(
        &self,
        scope: &str,
        name: &str,
        owner: Option<(NodeKind, &str)>,
    ) -> Result<String, ObfuscateError> {
        let keep = || format!("{scope}.{name}");
        if scope.starts_with(['q', 'Q']) || self.session.config().excluded_entity_names.contains(name) {
            return Ok(keep());
        }
        if scope.eq_ignore_ascii_case("array") {
            let generated = self.session.generate(name, Category::RenderControllerArray)?;
            return Ok(format!("{scope}.{generated}"));
        }

        if let Some((kind, id)) = owner {
            let reference = &self.session.reference().graph;
            if reference.molang_vars_of(kind, id).contains(name) {
                return Ok(keep());
            }
        }
        let generated = self.session.generate(name, Category::MolangVariable)?;
        if let Some((kind, id)) = owner {
            self.session.record_node(kind, id, true);
            self.session.record_node(NodeKind::MolangVar, name, true);
            self.session.record_edge(kind, id, NodeKind::MolangVar, name)?;
        }
        let short = scope.get(..1).unwrap_or(scope);
        Ok(format!("{short}.{generated}"))
    }
}

impl NodeVisitor for EntityRenamer<'_> {
    type Context = EntityContext;
    type Error = ObfuscateError;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        ctx: &EntityContext,
    ) -> Result<MappingStep<EntityContext>, ObfuscateError> {
        let identifier = ctx.identifier.clone().or_else(|| self.identifier_of(&map));
        let parent_key = ctx.mapping_key.as_deref();

        let mut out = Map::with_capacity(map.len());
        let mut stop = HashSet::new();
        let mut children = Vec::with_capacity(map.len());

        for (key, value) in map {
            let entry_identifier = if ctx.keyed_section {
                self.keyed_identifier(&key).or_else(|| identifier.clone())
            } else {
                identifier.clone()
            };
            let is_array = value.is_array() && starts_with_ignore_case(&key, ARRAY_PREFIX);
            let child = EntityContext {
                mapping_key: if is_array {
                    ctx.mapping_key.clone()
                } else {
                    self.profile.mapping.contains_key(&key).then(|| key.clone())
                },
                identifier: entry_identifier.clone(),
                keyed_section: ctx.top_level
                    && matches!(self.profile.identifiers, IdentifierSource::SectionKeys(s) if s == key),
                top_level: false,
            };
            children.push(child);

            let Some(selection) = self.select(parent_key, &key, is_array) else {
                out.insert(key, value);
                continue;
            };
            let owner = self.owner_kind().zip(entry_identifier.as_deref());

            let value_text = match (&value, is_array) {
                (Value::String(s), false) => Some(s.as_str()),
                _ => None,
            };
            let new_value = match value_text {
                Some(text) => self.apply(text, &selection.mapping.value, owner, false)?,
                None => None,
            };
            let new_key = if selection.by_key {
                None
            } else {
                self.apply(&key, &selection.mapping.key, owner, selection.from_root)?
            };
            if let (Some(_), Some(text)) = (&new_key, value_text.filter(|_| new_value.is_some())) {
                self.link(selection.mapping, &key, text)?;
            }

            let key = new_key.unwrap_or(key);
            match new_value {
                Some(text) => {
                    stop.insert(key.clone());
                    out.insert(key, Value::String(text));
                }
                None => {
                    out.insert(key, value);
                }
            }
        }

        Ok(Step::descend(out)
            .with_stop(Stop::Skip(stop))
            .with_children(Children::Positional(children)))
    }

    fn visit_scalar(&mut self, s: String, ctx: &EntityContext) -> Result<String, ObfuscateError> {
        let owner = self.owner_kind().zip(ctx.identifier.as_deref());
        if let Some(rewritten) = self.rewrite_molang(&s, owner)? {
            return Ok(rewritten);
        }
        let Some(mapping) = ctx.mapping_key.as_deref().and_then(|k| self.profile.mapping.get(k)) else {
            return Ok(s);
        };
        Ok(self.apply(&s, &mapping.key, owner, false)?.unwrap_or(s))
    }
}

/// Rename one parsed entity-family document.
pub fn obfuscate_entity_document(
    session: &ObfuscationSession,
    kind: EntityKind,
    document: Value,
) -> Result<Value, ObfuscateError> {
    tracing::trace!(%kind, "renaming entity document");
    EntityRenamer::new(session, kind).rename(document)
}
