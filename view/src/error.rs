use thiserror::Error;

use shadow_sync_shared::{NodeId, ProtocolError, SlotId, StyleSheetId, TraceId};

/// Errors raised while the view side applies commands from the data side.
///
/// All of them mean the two trees can no longer be kept in sync.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// A command referenced a node id that was never created or already released
    #[error("Command references unknown node {node}")]
    UnknownNode { node: NodeId },

    /// The node exists but cannot be used in this position
    #[error("Node {node} is a {actual}, expected {expected}")]
    WrongEntryKind {
        node: NodeId,
        expected: &'static str,
        actual: &'static str,
    },

    /// A splice anchor is not a child of the given parent
    #[error("Node {node} is not a child of its splice parent")]
    NotAChild { node: NodeId },

    /// Model binding was switched on without a listener to report to
    #[error("Model binding on node {node} attribute `{attribute}` has no listener id")]
    MissingModelBindingListener { node: NodeId, attribute: String },

    #[error("Unknown style sheet {sheet}")]
    UnknownStyleSheet { sheet: StyleSheetId },

    #[error("Trace {trace} ended without being started")]
    UnknownTrace { trace: TraceId },

    #[error("Unknown dynamic slot {slot}")]
    UnknownSlot { slot: SlotId },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
