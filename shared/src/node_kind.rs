/// Closed set of node variants known to both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    TextNode,
    VirtualNode,
    Component,
    ShadowRoot,
    /// Transient batching container, emptied by the splice that consumes it
    Fragment,
}

impl NodeKind {
    /// Whether a node of this kind may hold children
    pub fn is_container(&self) -> bool {
        match self {
            NodeKind::Element
            | NodeKind::VirtualNode
            | NodeKind::Component
            | NodeKind::ShadowRoot
            | NodeKind::Fragment => true,
            NodeKind::TextNode => false,
        }
    }

    /// Whether a node of this kind belongs to an owning shadow root
    pub fn has_owner(&self) -> bool {
        match self {
            NodeKind::Element | NodeKind::TextNode | NodeKind::VirtualNode | NodeKind::Component => {
                true
            }
            NodeKind::ShadowRoot | NodeKind::Fragment => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Element => "element",
            NodeKind::TextNode => "text node",
            NodeKind::VirtualNode => "virtual node",
            NodeKind::Component => "component",
            NodeKind::ShadowRoot => "shadow root",
            NodeKind::Fragment => "fragment",
        }
    }
}
