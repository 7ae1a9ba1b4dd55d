//! Trigger kinds that are not backed by an entity
//!
//! A time or webhook trigger has no entity to point at, yet two automations
//! firing on the same webhook are related. Such triggers are keyed by a
//! [`SyntheticTrigger`] whose display form is `<kind>_trigger:<payload>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identifier::ParseKindError;

/// Trigger platforms that produce a synthetic trigger key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Time,
    TimePattern,
    Sun,
    Event,
    Mqtt,
    Webhook,
    Device,
    Tag,
    Homeassistant,
    Calendar,
    Template,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 11] = [
        TriggerKind::Time,
        TriggerKind::TimePattern,
        TriggerKind::Sun,
        TriggerKind::Event,
        TriggerKind::Mqtt,
        TriggerKind::Webhook,
        TriggerKind::Device,
        TriggerKind::Tag,
        TriggerKind::Homeassistant,
        TriggerKind::Calendar,
        TriggerKind::Template,
    ];

    /// Platform name as written in the `trigger:` / `platform:` field
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Time => "time",
            TriggerKind::TimePattern => "time_pattern",
            TriggerKind::Sun => "sun",
            TriggerKind::Event => "event",
            TriggerKind::Mqtt => "mqtt",
            TriggerKind::Webhook => "webhook",
            TriggerKind::Device => "device",
            TriggerKind::Tag => "tag",
            TriggerKind::Homeassistant => "homeassistant",
            TriggerKind::Calendar => "calendar",
            TriggerKind::Template => "template",
        }
    }

    /// Look up a kind by platform name
    pub fn from_platform(platform: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == platform)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_platform(s).ok_or_else(|| ParseKindError::UnknownTrigger(s.to_string()))
    }
}

/// Key for a trigger that names no entity
///
/// Two triggers with the same kind and payload are the same graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntheticTrigger {
    kind: TriggerKind,
    payload: String,
}

impl SyntheticTrigger {
    pub fn new(kind: TriggerKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for SyntheticTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_trigger:{}", self.kind, self.payload)
    }
}

impl FromStr for SyntheticTrigger {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseKindError::InvalidSyntheticTrigger(s.to_string());
        let (prefix, payload) = s.split_once(':').ok_or_else(invalid)?;
        let kind = prefix
            .strip_suffix("_trigger")
            .and_then(TriggerKind::from_platform)
            .ok_or_else(invalid)?;
        Ok(Self::new(kind, payload))
    }
}
