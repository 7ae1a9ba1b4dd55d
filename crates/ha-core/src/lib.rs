//! Core types for Advanced Relations
//!
//! This crate provides the fundamental types shared by the relations engine:
//! item kinds, edge roles, the tagged [`Identifier`] used for every edge
//! endpoint, synthetic trigger keys and the entity id heuristics.

mod entity_id;
mod identifier;
mod trigger_kind;
mod value;

pub use entity_id::{contains_template, looks_like_entity_id, split_entity_id, TEMPLATE_MARKERS};
pub use identifier::{Identifier, ItemKind, ParseKindError, Role};
pub use trigger_kind::{SyntheticTrigger, TriggerKind};
pub use value::into_list;

/// Domain of script entities and script services
pub const SCRIPT_DOMAIN: &str = "script";

/// Domain of automation entities and automation services
pub const AUTOMATION_DOMAIN: &str = "automation";
