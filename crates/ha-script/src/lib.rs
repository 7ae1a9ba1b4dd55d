//! Script definitions
//!
//! Scripts are named sequences of actions that can be called from
//! automations, other scripts, or directly as services. This crate models
//! script entries from scripts.yaml and understands which service calls
//! invoke another script or automation.
//!
//! # Key Types
//!
//! - [`Script`] - A complete script definition
//! - [`CallTarget`] - The rule a `script.*` / `automation.*` service call invokes

pub mod action;
pub mod script;

pub use action::{
    parse_call_target, service_name, CallTarget, AUTOMATION_CONTROL_SERVICES,
    SCRIPT_CONTROL_SERVICES,
};
pub use script::{Script, ScriptConfig, ScriptError, ScriptResult};
