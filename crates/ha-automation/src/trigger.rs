//! Trigger platform recognition
//!
//! State-style triggers name entities directly and are picked up by the
//! reference extractor. The platforms listed in [`TriggerKind`] have no entity
//! behind them, so each such trigger entry is keyed by a [`SyntheticTrigger`]
//! built from the fields that distinguish one instance from another.

use ha_core::{SyntheticTrigger, TriggerKind};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of hex digits of the SHA-256 digest kept for template triggers
pub const TEMPLATE_HASH_LEN: usize = 16;

/// Platform of a trigger entry, read from `trigger` or the legacy `platform` key
pub fn trigger_platform(trigger: &Value) -> Option<&str> {
    trigger
        .get("trigger")
        .or_else(|| trigger.get("platform"))
        .and_then(Value::as_str)
}

/// Fields that make up the payload of each trigger kind, in payload order
fn payload_fields(kind: TriggerKind) -> &'static [&'static str] {
    match kind {
        TriggerKind::Time => &["at"],
        TriggerKind::TimePattern => &["hours", "minutes", "seconds"],
        TriggerKind::Sun => &["event", "offset"],
        TriggerKind::Event => &["event_type"],
        TriggerKind::Mqtt => &["topic"],
        TriggerKind::Webhook => &["webhook_id"],
        TriggerKind::Device => &["device_id", "type"],
        TriggerKind::Tag => &["tag_id"],
        TriggerKind::Homeassistant => &["event"],
        TriggerKind::Calendar => &["event"],
        TriggerKind::Template => &["value_template"],
    }
}

/// Derive the synthetic key for a trigger entry
///
/// Returns `None` for platforms that are not synthetic (`state`,
/// `numeric_state`, `zone`, ...) and for entries that are not mappings. A
/// recognized platform always yields a key, even when its fields are missing.
pub fn synthetic_trigger(trigger: &Value) -> Option<SyntheticTrigger> {
    let kind = TriggerKind::from_platform(trigger_platform(trigger)?)?;

    let mut parts: Vec<String> = payload_fields(kind)
        .iter()
        .filter_map(|field| {
            let value = trigger.get(*field)?;
            let rendered = match kind {
                TriggerKind::Template => template_digest(value),
                _ => render_payload_value(value),
            };
            Some(format!("{field}={rendered}"))
        })
        .collect();

    if kind == TriggerKind::TimePattern {
        parts.sort();
    }

    Some(SyntheticTrigger::new(kind, parts.join(",")))
}

/// Render a trigger field for use in a payload
///
/// Lists are joined with `|` and mappings rendered as compact JSON.
fn render_payload_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_payload_value)
            .collect::<Vec<_>>()
            .join("|"),
    }
}

/// Short content hash of a template, so long templates give stable short keys
fn template_digest(value: &Value) -> String {
    let template = render_payload_value(value);
    let digest = format!("{:x}", Sha256::digest(template.as_bytes()));
    digest[..TEMPLATE_HASH_LEN].to_string()
}
