//! Automation definitions
//!
//! This crate turns automation entries from automations.yaml into
//! [`Automation`] values and recognizes the trigger platforms that are not
//! backed by an entity.
//!
//! # Architecture
//!
//! ```text
//! AUTOMATION = TRIGGERS → CONDITIONS → ACTIONS
//! ```
//!
//! - **Triggers**: kept as raw configuration values, each optionally keyed by a
//!   [`SyntheticTrigger`](ha_core::SyntheticTrigger)
//! - **Conditions**: raw configuration values
//! - **Actions**: raw action blocks, interpreted by the relations classifier
//!
//! # Key Types
//!
//! - [`AutomationConfig`] - Automation entry as written in YAML
//! - [`Automation`] - Normalized automation with a guaranteed id

pub mod automation;
pub mod trigger;

pub use automation::{Automation, AutomationConfig, AutomationError, AutomationResult};
pub use trigger::{synthetic_trigger, trigger_platform, TEMPLATE_HASH_LEN};
