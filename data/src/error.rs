use thiserror::Error;

use shadow_sync_shared::{CallbackId, EventId, ProtocolError};

/// Errors raised while the data side applies messages from the view side
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataChannelError {
    /// A one-shot reply arrived for a callback id that is not outstanding
    #[error("Reply for unknown callback {callback}. The id was never issued or was already consumed")]
    UnknownCallback { callback: CallbackId },

    /// The reply kind does not match what was registered under the id
    #[error("Callback {callback} was registered as {expected} but received a {actual} reply")]
    CallbackKindMismatch {
        callback: CallbackId,
        expected: &'static str,
        actual: &'static str,
    },

    /// An event notification referenced an event that was never created or already released
    #[error("Notification for unknown event {event}")]
    UnknownEvent { event: EventId },

    /// A reply payload has an unexpected shape
    #[error("Invalid {kind} payload: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Error of a render pass, reported by the view side
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Render failed: {0}")]
pub struct RenderError(pub String);
