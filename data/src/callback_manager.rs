use std::collections::HashMap;

use log::warn;
use serde_json::Value;

use shadow_sync_shared::{
    BoundingClientRect, BoxModel, CallbackId, ChannelConfig, ComputedStyles, IdGenerator,
    InheritedRules, MatchedRules, MediaQueryResult, NodeId, PerformanceStats, ScrollOffset,
    ThemeInfo, WindowInfo,
};

use crate::error::{DataChannelError, RenderError};

/// A callback waiting for a reply from the view side.
///
/// `FnOnce` variants are consumed by their single reply. `FnMut` variants
/// stay registered until released explicitly.
pub enum Callback {
    Create(Box<dyn FnOnce(WindowInfo, ThemeInfo)>),
    Render(Box<dyn FnOnce(Result<(), RenderError>)>),
    Context(Box<dyn FnOnce(Value)>),
    ComputedStyles(Box<dyn FnOnce(ComputedStyles)>),
    InheritedRules(Box<dyn FnOnce(InheritedRules)>),
    MatchedRules(Box<dyn FnOnce(MatchedRules)>),
    PropertyIndex(Box<dyn FnOnce(Option<u32>)>),
    BoundingClientRect(Box<dyn FnOnce(BoundingClientRect)>),
    ScrollOffset(Box<dyn FnOnce(ScrollOffset)>),
    BoxModel(Box<dyn FnOnce(BoxModel)>),
    PseudoTypes(Box<dyn FnOnce(Vec<String>)>),
    PerformanceStats(Box<dyn FnOnce(PerformanceStats)>),

    WindowResize(Box<dyn FnMut(WindowInfo)>),
    ThemeChange(Box<dyn FnMut(ThemeInfo)>),
    MediaQueryObserver(Box<dyn FnMut(MediaQueryResult)>),
    IntersectionObserver(Box<dyn FnMut(Value)>),
    ModelBinding(Box<dyn FnMut(Value)>),
    OverlayInspect(Box<dyn FnMut(String, Option<NodeId>)>),
}

impl Callback {
    pub fn kind(&self) -> &'static str {
        match self {
            Callback::Create(_) => "create",
            Callback::Render(_) => "render",
            Callback::Context(_) => "context",
            Callback::ComputedStyles(_) => "computed styles",
            Callback::InheritedRules(_) => "inherited rules",
            Callback::MatchedRules(_) => "matched rules",
            Callback::PropertyIndex(_) => "property index",
            Callback::BoundingClientRect(_) => "bounding client rect",
            Callback::ScrollOffset(_) => "scroll offset",
            Callback::BoxModel(_) => "box model",
            Callback::PseudoTypes(_) => "pseudo types",
            Callback::PerformanceStats(_) => "performance stats",
            Callback::WindowResize(_) => "window resize",
            Callback::ThemeChange(_) => "theme change",
            Callback::MediaQueryObserver(_) => "media query observer",
            Callback::IntersectionObserver(_) => "intersection observer",
            Callback::ModelBinding(_) => "model binding",
            Callback::OverlayInspect(_) => "overlay inspect",
        }
    }

    /// Whether the callback survives its replies
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            Callback::WindowResize(_)
                | Callback::ThemeChange(_)
                | Callback::MediaQueryObserver(_)
                | Callback::IntersectionObserver(_)
                | Callback::ModelBinding(_)
                | Callback::OverlayInspect(_)
        )
    }
}

/// Table of outstanding callbacks keyed by the id published with a request.
///
/// Ids come from a dedicated generator. A one-shot id goes back to it once
/// its reply is consumed. A released persistent id is retired instead, since
/// the view side may still have replies for it in flight, and only returns
/// to the generator through [`CallbackManager::recycle_retired`]. There is no
/// timeout: a reply that never arrives keeps its id forever.
pub struct CallbackManager {
    id_generator: IdGenerator<CallbackId>,
    callbacks: HashMap<CallbackId, Callback>,
    retired: Vec<CallbackId>,
    warn_threshold: usize,
}

impl CallbackManager {
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            id_generator: IdGenerator::new(&config.id_generator),
            callbacks: HashMap::new(),
            retired: Vec::new(),
            warn_threshold: config.callback_warn_threshold,
        }
    }

    pub fn register(&mut self, callback: Callback) -> CallbackId {
        let id = self.id_generator.gen();
        self.callbacks.insert(id, callback);
        if self.callbacks.len() > self.warn_threshold {
            warn!(
                "{} callbacks outstanding, replies may have been dropped",
                self.callbacks.len()
            );
        }
        id
    }

    /// Removes the callback for a one-shot reply and frees its id
    pub fn take(&mut self, id: CallbackId) -> Result<Callback, DataChannelError> {
        let callback = self
            .callbacks
            .remove(&id)
            .ok_or(DataChannelError::UnknownCallback { callback: id })?;
        self.id_generator.release(id);
        Ok(callback)
    }

    pub fn get_mut(&mut self, id: CallbackId) -> Option<&mut Callback> {
        self.callbacks.get_mut(&id)
    }

    /// Drops a persistent callback and retires its id. Returns `false` when
    /// the id was not outstanding.
    pub fn release(&mut self, id: CallbackId) -> bool {
        if self.callbacks.remove(&id).is_some() {
            self.retired.push(id);
            return true;
        }
        false
    }

    /// Returns every retired id to the generator. Only valid once no reply
    /// sent through the old transport can arrive anymore.
    pub fn recycle_retired(&mut self) {
        for id in self.retired.drain(..) {
            self.id_generator.release(id);
        }
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.callbacks.contains_key(&id)
    }

    pub fn is_retired(&self, id: CallbackId) -> bool {
        self.retired.contains(&id)
    }

    pub fn outstanding(&self) -> usize {
        self.callbacks.len()
    }
}
