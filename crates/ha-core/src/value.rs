//! Helpers for loosely shaped configuration values

use serde_json::Value;

/// Normalize a configuration section into a list
///
/// Home Assistant accepts a single mapping wherever a list is expected, and an
/// absent section means an empty one.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}
