use thiserror::Error as ThisError;

use crate::{channel::ChannelEventType, types::Side};

/// Errors raised while encoding or decoding channel messages.
///
/// Every variant is fatal for the channel: a message that cannot be applied
/// exactly leaves the two trees out of sync.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum ProtocolError {
    /// Opcode is not part of the closed enumeration
    #[error("Unknown channel opcode: {opcode}")]
    UnknownOpcode { opcode: u64 },

    /// Opcode is valid but may only be emitted by the other side
    #[error("Opcode {opcode:?} may only be sent by the {sender:?} side")]
    WrongDirection {
        opcode: ChannelEventType,
        sender: Side,
    },

    /// Message is not a non-empty array headed by an integer opcode
    #[error("Malformed channel message: {reason}")]
    MalformedMessage { reason: &'static str },

    /// Message ended before all arguments of its opcode were read
    #[error("Missing argument {index} for {opcode:?}")]
    MissingArgument {
        opcode: ChannelEventType,
        index: usize,
    },

    /// Argument has a different JSON shape than its opcode requires
    #[error("Invalid argument {index} for {opcode:?}: expected {expected}")]
    InvalidArgument {
        opcode: ChannelEventType,
        index: usize,
        expected: &'static str,
    },

    /// An opaque string payload could not be parsed
    #[error("Invalid payload in argument {index} for {opcode:?}: {reason}")]
    InvalidPayload {
        opcode: ChannelEventType,
        index: usize,
        reason: String,
    },

    /// Message carried more arguments than its opcode defines
    #[error("Unexpected {count} trailing argument(s) for {opcode:?}")]
    TrailingArguments {
        opcode: ChannelEventType,
        count: usize,
    },

    /// Wire text is not valid JSON
    #[error("Channel message is not valid JSON: {reason}")]
    InvalidJson { reason: String },
}
