//! In-memory fixtures for end-to-end tests of a shadow-sync channel: a
//! loopback transport, a recording view backend and a replayable logical
//! tree.

pub mod logical_tree;
pub mod memory_backend;

pub use logical_tree::{LogicalNode, LogicalTree};
pub use loopback::{Harness, LoopbackTransport, PumpError};
pub use memory_backend::{MemoryBackend, MemoryEntry, MemoryKind, MemoryNode};
pub use shape::Shape;
