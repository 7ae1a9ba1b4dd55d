//! Entity id heuristics for free-form configuration values
//!
//! Configuration strings are not typed: the same field may hold an entity id,
//! a URL, a file path, a sentence or a Jinja template. These helpers decide
//! which strings are plausibly a `domain.object_id` pair without validating
//! the character set the way the entity registry does.

/// Markers that open a Jinja expression or statement
pub const TEMPLATE_MARKERS: [&str; 2] = ["{{", "{%"];

/// Characters that never occur in an entity id
const FOREIGN_CHARS: [char; 4] = ['/', ':', '@', ' '];

/// Check whether a string contains a template marker anywhere
pub fn contains_template(s: &str) -> bool {
    TEMPLATE_MARKERS.iter().any(|marker| s.contains(marker))
}

/// Check whether a string is plausibly a direct entity reference
///
/// A direct reference contains exactly one `.` with non-empty text on both
/// sides, holds no template marker anywhere and contains none of `/`, `:`,
/// `@` or a space.
pub fn looks_like_entity_id(s: &str) -> bool {
    if contains_template(s) {
        return false;
    }
    if s.chars().any(|c| FOREIGN_CHARS.contains(&c)) {
        return false;
    }
    split_entity_id(s).is_some()
}

/// Split a `domain.object_id` string into its two parts
///
/// Returns `None` unless there is exactly one `.` and both sides are non-empty.
pub fn split_entity_id(s: &str) -> Option<(&str, &str)> {
    let (domain, object_id) = s.split_once('.')?;
    if domain.is_empty() || object_id.is_empty() || object_id.contains('.') {
        return None;
    }
    Some((domain, object_id))
}
