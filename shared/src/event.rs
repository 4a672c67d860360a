use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How far a listener may interfere with the rest of a dispatch.
///
/// Ordered so that a higher level also covers every lower one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventMutLevel {
    None = 0,
    /// Marks the event as mutated for listeners further along the path
    Mut = 1,
    /// Stops the event from reaching any further listener
    Final = 2,
}

impl EventMutLevel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EventMutLevel::None),
            1 => Some(EventMutLevel::Mut),
            2 => Some(EventMutLevel::Final),
            _ => None,
        }
    }

    pub fn from_flags(mutated: bool, final_: bool) -> Self {
        if final_ {
            EventMutLevel::Final
        } else if mutated {
            EventMutLevel::Mut
        } else {
            EventMutLevel::None
        }
    }
}

impl Default for EventMutLevel {
    fn default() -> Self {
        EventMutLevel::None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOptions {
    #[serde(default)]
    pub bubbles: bool,
    #[serde(default)]
    pub composed: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra_fields: Value,
}

/// Everything needed to recreate an event on the data side
#[derive(Clone, Debug, PartialEq)]
pub struct EventInit {
    pub name: String,
    pub detail: Value,
    pub options: EventOptions,
}
