//! Canonical identity of entity-family identifiers.

/// Spelling prefixes that are kept in the output but not part of the
/// identity. Longer prefixes come before their own prefixes.
pub const ENTITY_PREFIXES: [&str; 8] = [
    "geometry.",
    "controller.animation.",
    "animation.",
    "controller.render.",
    "materials.",
    "material.",
    "texture.",
    "array.",
];

pub(crate) const GEOMETRY_PREFIX: &str = "geometry.";
pub(crate) const ARRAY_PREFIX: &str = "array.";

/// Split an identifier into `(identity, prefix)`.
///
/// A known prefix (matched case-insensitively, returned as written) is
/// stripped and the rest is cut at the first `:`. Without a prefix the
/// identity is the part after the last `:`.
///
/// ```text
///   geometry.cow:geometry.base  ->  ("cow", "geometry.")
///   minecraft:pig               ->  ("pig", "")
/// ```
pub fn true_id(identifier: &str) -> (&str, &str) {
    match entity_prefix(identifier) {
        Some(len) => {
            let (prefix, rest) = identifier.split_at(len);
            let id = rest.split_once(':').map_or(rest, |(head, _)| head);
            (id, prefix)
        }
        None => {
            let id = identifier.rsplit_once(':').map_or(identifier, |(_, tail)| tail);
            (id, "")
        }
    }
}

/// Byte length of the known prefix `identifier` starts with.
pub(crate) fn entity_prefix(identifier: &str) -> Option<usize> {
    ENTITY_PREFIXES
        .iter()
        .find(|prefix| starts_with_ignore_case(identifier, prefix))
        .map(|prefix| prefix.len())
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
