//! Structured values carried by channel messages, either as plain arguments
//! or inside the opaque JSON string fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::SlotId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub theme: String,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOffset {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxModel {
    pub margin: BoundingClientRect,
    pub border: BoundingClientRect,
    pub padding: BoundingClientRect,
    pub content: BoundingClientRect,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CssProperty {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
    pub sheet_index: u32,
    pub rule_index: u32,
    #[serde(default)]
    pub media_queries: Vec<String>,
    pub selector: String,
    #[serde(default)]
    pub properties: Vec<CssProperty>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyles {
    #[serde(default)]
    pub properties: Vec<CssProperty>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InheritedRules {
    #[serde(default)]
    pub rules: Vec<CssRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedRules {
    #[serde(default)]
    pub inline: Vec<CssProperty>,
    #[serde(default)]
    pub rules: Vec<CssRule>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaQueryResult {
    pub matches: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub start_timestamp: f64,
    pub end_timestamp: f64,
}

/// Slot distribution strategy of a component's shadow root
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotMode {
    Single = 0,
    Multiple = 1,
    /// Slot placeholders are managed by the view side
    Dynamic = 2,
}

impl SlotMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SlotMode::Single),
            1 => Some(SlotMode::Multiple),
            2 => Some(SlotMode::Dynamic),
            _ => None,
        }
    }
}

/// Decision reported for a freshly created node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssociateValueInfo {
    /// Node is a component whose rendering is delegated to the view side
    pub is_reflect: bool,
}

impl AssociateValueInfo {
    pub fn to_json(&self) -> Value {
        json!({ "isReflect": self.is_reflect })
    }

    pub fn from_json(value: &Value) -> Self {
        Self {
            is_reflect: value
                .get("isReflect")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl PathSegment {
    fn to_json(&self) -> Value {
        match self {
            PathSegment::Field(name) => Value::String(name.clone()),
            PathSegment::Index(index) => Value::from(*index as u64),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(PathSegment::Field(name.clone())),
            Value::Number(number) => number
                .as_u64()
                .map(|index| PathSegment::Index(index as usize)),
            _ => None,
        }
    }
}

/// One incremental data update of a reflecting component.
///
/// With `splice_delete_count` set, `new_value` is spliced into the array at
/// `path` instead of replacing the value there.
#[derive(Clone, Debug, PartialEq)]
pub struct DataChange {
    pub path: Vec<PathSegment>,
    pub new_value: Value,
    pub splice_index: Option<usize>,
    pub splice_delete_count: Option<usize>,
}

impl DataChange {
    pub fn replace(path: Vec<PathSegment>, new_value: Value) -> Self {
        Self {
            path,
            new_value,
            splice_index: None,
            splice_delete_count: None,
        }
    }

    /// Encoded as `[path, newValue, spliceIndex, spliceDeleteCount]`
    pub fn to_json(&self) -> Value {
        let path: Vec<Value> = self.path.iter().map(PathSegment::to_json).collect();
        Value::Array(vec![
            Value::Array(path),
            self.new_value.clone(),
            self.splice_index
                .map_or(Value::Null, |index| Value::from(index as u64)),
            self.splice_delete_count
                .map_or(Value::Null, |count| Value::from(count as u64)),
        ])
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        let path = items
            .first()?
            .as_array()?
            .iter()
            .map(PathSegment::from_json)
            .collect::<Option<Vec<_>>>()?;
        let new_value = items.get(1).cloned().unwrap_or(Value::Null);
        let as_usize = |value: Option<&Value>| value.and_then(Value::as_u64).map(|v| v as usize);
        Some(Self {
            path,
            new_value,
            splice_index: as_usize(items.get(2)),
            splice_delete_count: as_usize(items.get(3)),
        })
    }

    pub fn list_to_json(changes: &[DataChange]) -> Value {
        Value::Array(changes.iter().map(DataChange::to_json).collect())
    }

    pub fn list_from_json(value: &Value) -> Option<Vec<DataChange>> {
        value.as_array()?.iter().map(DataChange::from_json).collect()
    }
}

/// A dynamic slot placeholder announced by the view side
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicSlotInit {
    pub slot: SlotId,
    pub name: String,
    pub values: Value,
}
