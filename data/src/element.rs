use shadow_sync_shared::{CallbackId, NodeId, NodeKind, SlotMode, StyleScopeId};

/// Handle of a node created through a
/// [`ShadowBackendContext`](crate::ShadowBackendContext).
///
/// Handles are plain values. Using one after it was released is a protocol
/// violation on the view side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShadowElement {
    id: NodeId,
    kind: NodeKind,
    shadow_root: Option<NodeId>,
}

impl ShadowElement {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            shadow_root: None,
        }
    }

    pub(crate) fn component(id: NodeId, shadow_root: NodeId) -> Self {
        Self {
            id,
            kind: NodeKind::Component,
            shadow_root: Some(shadow_root),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The shadow root owned by a component
    pub fn shadow_root(&self) -> Option<ShadowElement> {
        self.shadow_root
            .map(|id| ShadowElement::new(id, NodeKind::ShadowRoot))
    }
}

/// Everything the view side needs to instantiate a component
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentOptions {
    pub tag_name: String,
    pub external: bool,
    pub virtual_host: bool,
    pub style_scope: Option<StyleScopeId>,
    pub extra_style_scope: Option<StyleScopeId>,
    pub external_classes: Option<Vec<String>>,
    pub slot_mode: Option<SlotMode>,
    pub write_id_to_dom: bool,
}

impl ComponentOptions {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            ..Default::default()
        }
    }
}

/// A media query or intersection observer living on the view side
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Observer {
    id: CallbackId,
}

impl Observer {
    pub(crate) fn new(id: CallbackId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> CallbackId {
        self.id
    }
}
