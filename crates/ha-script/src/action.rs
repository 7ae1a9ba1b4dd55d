//! Service calls in action steps
//!
//! A step calls a service through its `action` key, or the older `service`
//! key. Calls into the `script` and `automation` domains either invoke a
//! specific rule (`script.morning_routine`) or are generic control services
//! (`script.turn_on`, `automation.trigger`) whose target lives in the step's
//! entity fields instead.

use ha_core::{contains_template, AUTOMATION_DOMAIN, SCRIPT_DOMAIN};
use serde_json::{Map, Value};

/// Services of the script domain that do not name a script
pub const SCRIPT_CONTROL_SERVICES: [&str; 4] = ["turn_on", "turn_off", "toggle", "reload"];

/// Services of the automation domain that do not name an automation
pub const AUTOMATION_CONTROL_SERVICES: [&str; 5] =
    ["trigger", "turn_on", "turn_off", "toggle", "reload"];

/// Rule invoked by a service call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallTarget {
    Script(String),
    Automation(String),
}

/// Service called by a step, lower-cased
///
/// Reads the `service` key first, then `action`. Non-string values are ignored.
pub fn service_name(step: &Map<String, Value>) -> Option<String> {
    ["service", "action"]
        .iter()
        .find_map(|key| step.get(*key).and_then(Value::as_str))
        .map(str::to_lowercase)
}

/// Parse the rule a service name invokes
///
/// Templated service names are never resolved.
pub fn parse_call_target(service: &str) -> Option<CallTarget> {
    let service = service.trim().to_lowercase();
    if contains_template(&service) {
        return None;
    }

    let (domain, name) = service.split_once('.')?;
    if name.is_empty() {
        return None;
    }

    match domain {
        SCRIPT_DOMAIN if !SCRIPT_CONTROL_SERVICES.contains(&name) => {
            Some(CallTarget::Script(name.to_string()))
        }
        AUTOMATION_DOMAIN if !AUTOMATION_CONTROL_SERVICES.contains(&name) => {
            Some(CallTarget::Automation(name.to_string()))
        }
        _ => None,
    }
}
