//! # Shadow Sync Data
//! The authoritative side of a shadow-sync channel: translates tree
//! operations of a host framework into channel commands, correlates replies
//! and relayed events, and rebuilds a restarted view side through replay.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod callback_manager;
mod channel;
mod context;
mod dynamic_slot;
mod element;
mod error;
mod replay;
mod style_registry;
mod sync_builder;

pub use callback_manager::{Callback, CallbackManager};
pub use channel::{
    CustomMethodHandler, DynamicSlotUpdate, EventHandler, EventNotification,
    MessageChannelDataSide,
};
pub use context::ShadowBackendContext;
pub use dynamic_slot::{DynamicSlot, DynamicSlotHandler, DynamicSlotManager};
pub use element::{ComponentOptions, Observer, ShadowElement};
pub use error::{DataChannelError, RenderError};
pub use replay::{collapse_listeners, ElementState, ListenerInfo, ReplayNode, ReplaySource};
pub use style_registry::{StyleRegistry, StyleScopeRegistry};
pub use sync_builder::{BehaviorBuilder, FieldObserver, SyncedBehaviorBuilder};
