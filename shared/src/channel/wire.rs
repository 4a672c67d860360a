use serde_json::Value;

use crate::{
    channel::ChannelEventType,
    error::ProtocolError,
    event::EventMutLevel,
    payload::SlotMode,
    types::{CallbackId, EventId, NodeId, SlotId, StyleScopeId, StyleSheetId, TraceId},
};

/// One message as it travels over the transport: `[opcode, arg1, arg2, ...]`
#[derive(Clone, Debug, PartialEq)]
pub struct WireMessage(Vec<Value>);

impl WireMessage {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Raw opcode number, unchecked against the enumeration
    pub fn raw_opcode(&self) -> Result<u64, ProtocolError> {
        self.0
            .first()
            .ok_or(ProtocolError::MalformedMessage {
                reason: "empty message",
            })?
            .as_u64()
            .ok_or(ProtocolError::MalformedMessage {
                reason: "opcode is not an unsigned integer",
            })
    }

    pub fn to_json_string(&self) -> String {
        Value::Array(self.0.clone()).to_string()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| ProtocolError::InvalidJson {
                reason: err.to_string(),
            })?;
        match value {
            Value::Array(values) => Ok(Self(values)),
            _ => Err(ProtocolError::MalformedMessage {
                reason: "message is not an array",
            }),
        }
    }
}

/// Conversion between a single message argument and its JSON form
pub trait ArgValue: Sized {
    const EXPECTED: &'static str;

    fn to_arg(&self) -> Value;

    fn from_arg(value: &Value) -> Option<Self>;
}

impl ArgValue for u32 {
    const EXPECTED: &'static str = "unsigned 32-bit integer";

    fn to_arg(&self) -> Value {
        Value::from(*self)
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|v| u32::try_from(v).ok())
    }
}

impl ArgValue for f64 {
    const EXPECTED: &'static str = "number";

    fn to_arg(&self) -> Value {
        // non-finite numbers have no JSON form
        serde_json::Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl ArgValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn to_arg(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl ArgValue for String {
    const EXPECTED: &'static str = "string";

    fn to_arg(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl ArgValue for Value {
    const EXPECTED: &'static str = "any value";

    fn to_arg(&self) -> Value {
        self.clone()
    }

    fn from_arg(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: ArgValue> ArgValue for Option<T> {
    const EXPECTED: &'static str = "value or null";

    fn to_arg(&self) -> Value {
        match self {
            Some(value) => value.to_arg(),
            None => Value::Null,
        }
    }

    fn from_arg(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_arg(other).map(Some),
        }
    }
}

impl<T: ArgValue> ArgValue for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn to_arg(&self) -> Value {
        Value::Array(self.iter().map(ArgValue::to_arg).collect())
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_arg).collect()
    }
}

impl ArgValue for EventMutLevel {
    const EXPECTED: &'static str = "event mutation level";

    fn to_arg(&self) -> Value {
        Value::from(*self as u8)
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(EventMutLevel::from_u8)
    }
}

impl ArgValue for SlotMode {
    const EXPECTED: &'static str = "slot mode";

    fn to_arg(&self) -> Value {
        Value::from(*self as u8)
    }

    fn from_arg(value: &Value) -> Option<Self> {
        value
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(SlotMode::from_u8)
    }
}

macro_rules! id_arg_value {
    ($($name:ident),*) => {
        $(
            impl ArgValue for $name {
                const EXPECTED: &'static str = "positive id";

                fn to_arg(&self) -> Value {
                    Value::from(self.value())
                }

                fn from_arg(value: &Value) -> Option<Self> {
                    u32::from_arg(value).filter(|v| *v != 0).map($name::new)
                }
            }
        )*
    };
}

id_arg_value!(NodeId, CallbackId, EventId, StyleSheetId, StyleScopeId, SlotId, TraceId);

/// Builds a [`WireMessage`] argument by argument
pub struct ArgWriter {
    values: Vec<Value>,
}

impl ArgWriter {
    pub fn new(opcode: ChannelEventType) -> Self {
        Self {
            values: vec![Value::from(opcode.to_u8())],
        }
    }

    pub fn write<T: ArgValue>(&mut self, value: &T) {
        self.values.push(value.to_arg());
    }

    /// Writes an opaque payload as a JSON string argument
    pub fn write_json(&mut self, value: &Value) {
        self.values.push(Value::String(value.to_string()));
    }

    pub fn finish(self) -> WireMessage {
        WireMessage(self.values)
    }
}

/// Reads the arguments of one [`WireMessage`] in order
pub struct ArgReader<'a> {
    opcode: ChannelEventType,
    values: &'a [Value],
    // index of the next argument, opcode included
    cursor: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(opcode: ChannelEventType, message: &'a WireMessage) -> Self {
        Self {
            opcode,
            values: message.values(),
            cursor: 1,
        }
    }

    pub fn opcode(&self) -> ChannelEventType {
        self.opcode
    }

    pub fn read<T: ArgValue>(&mut self) -> Result<T, ProtocolError> {
        let index = self.cursor;
        let value = self.next_value()?;
        T::from_arg(value).ok_or(ProtocolError::InvalidArgument {
            opcode: self.opcode,
            index,
            expected: T::EXPECTED,
        })
    }

    /// Reads an argument that may be left out at the end of the message,
    /// treating absence like `null`
    pub fn read_optional<T: ArgValue>(&mut self) -> Result<Option<T>, ProtocolError> {
        if self.cursor >= self.values.len() {
            return Ok(None);
        }
        self.read::<Option<T>>()
    }

    /// Reads an opaque JSON string argument and parses it
    pub fn read_json(&mut self) -> Result<Value, ProtocolError> {
        let index = self.cursor;
        let text: String = self.read()?;
        serde_json::from_str(&text).map_err(|err| ProtocolError::InvalidPayload {
            opcode: self.opcode,
            index,
            reason: err.to_string(),
        })
    }

    /// Builds a payload error pointing at the most recently read argument
    pub fn payload_error(&self, reason: impl Into<String>) -> ProtocolError {
        ProtocolError::InvalidPayload {
            opcode: self.opcode,
            index: self.cursor.saturating_sub(1),
            reason: reason.into(),
        }
    }

    pub fn finish(self) -> Result<(), ProtocolError> {
        let remaining = self.values.len().saturating_sub(self.cursor);
        if remaining > 0 {
            return Err(ProtocolError::TrailingArguments {
                opcode: self.opcode,
                count: remaining,
            });
        }
        Ok(())
    }

    fn next_value(&mut self) -> Result<&'a Value, ProtocolError> {
        let value = self
            .values
            .get(self.cursor)
            .ok_or(ProtocolError::MissingArgument {
                opcode: self.opcode,
                index: self.cursor,
            })?;
        self.cursor += 1;
        Ok(value)
    }
}
