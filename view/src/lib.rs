//! # Shadow Sync View
//! View side of a shadow-sync channel. Applies the data side's tree commands
//! to a rendering backend, answers its queries and relays backend events
//! back to it.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod backend;
mod channel;
mod controller;
mod error;
mod event_relay;
mod pending_component;
mod registry;

pub use backend::{
    ComponentInit, EventListener, OverlayListener, ValueListener, ViewBackend, ViewEvent,
    ViewObserver,
};
pub use channel::MessageChannelViewSide;
pub use controller::ViewController;
pub use error::ViewError;
pub use pending_component::ComponentState;
