//! # Shadow Sync Shared
//! Opcode protocol, wire codec and id allocation shared between the data
//! side & view side of a shadow-sync channel.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod channel;
mod config;
mod error;
mod event;
mod id_generator;
mod node_kind;
mod payload;
mod timestamp;
mod transport;
mod types;

pub use channel::{
    ArgReader, ArgValue, ArgWriter, ChannelEventType, DataMessage, ViewMessage, WireMessage,
};
pub use config::{ChannelConfig, IdGeneratorConfig, IdPolicy, ReplayConfig};
pub use error::ProtocolError;
pub use event::{EventInit, EventMutLevel, EventOptions};
pub use id_generator::IdGenerator;
pub use node_kind::NodeKind;
pub use payload::{
    AssociateValueInfo, BoundingClientRect, BoxModel, ComputedStyles, CssProperty, CssRule,
    DataChange, DynamicSlotInit, InheritedRules, MatchedRules, MediaQueryResult, PathSegment,
    PerformanceStats, ScrollOffset, SlotMode, ThemeInfo, WindowInfo,
};
pub use timestamp::Timestamp;
pub use transport::{Publisher, QueuePublisher};
pub use types::{
    CallbackId, EventId, NodeId, Side, SlotId, StyleScopeId, StyleSheetId, TraceId,
};
