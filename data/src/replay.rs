use std::{collections::HashMap, hash::Hash};

use log::{info, warn};
use serde_json::Value;

use shadow_sync_shared::{AssociateValueInfo, EventMutLevel, NodeKind, ReplayConfig};

use crate::{
    context::ShadowBackendContext,
    element::{ComponentOptions, ShadowElement},
};

/// Variant of a live node, as far as replay is concerned
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayNode {
    Text(String),
    Element {
        logical_name: String,
        styling_name: String,
    },
    Virtual {
        name: String,
        inherit_slots: bool,
    },
    Component(ComponentOptions),
    ShadowRoot,
}

/// One registered event listener
#[derive(Clone, Debug, PartialEq)]
pub struct ListenerInfo {
    pub event_type: String,
    pub capture: bool,
    pub mut_level: EventMutLevel,
}

/// Current attribute state of a non-text node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementState {
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Empty segments are skipped
    pub style_segments: Vec<String>,
    pub attributes: Vec<(String, Value)>,
    pub dataset: Vec<(String, Value)>,
    pub listeners: Vec<ListenerInfo>,
    pub slot: Option<String>,
    /// Set when the node is itself a slot
    pub slot_name: Option<String>,
    pub class_aliases: Vec<(String, Vec<String>)>,
}

/// Read access to a live logical tree, supplied by the host framework
pub trait ReplaySource {
    type Node: Clone + Eq + Hash;

    fn kind(&self, node: &Self::Node) -> ReplayNode;

    /// Light children in order
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn shadow_root(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The slot a light child is currently distributed into
    fn slot_element(&self, node: &Self::Node) -> Option<Self::Node>;

    fn element_state(&self, node: &Self::Node) -> ElementState;

    fn associate_value(&self, _node: &Self::Node) -> AssociateValueInfo {
        AssociateValueInfo::default()
    }

    fn model_binding_listeners(&self, _node: &Self::Node) -> Vec<(String, Box<dyn FnMut(Value)>)> {
        Vec::new()
    }

    /// An element already holding an id on this side. Its creation is
    /// announced again under that id instead of allocating a new one.
    fn existing_element(&self, _node: &Self::Node) -> Option<ShadowElement> {
        None
    }

    fn after_replay(&mut self, _node: &Self::Node, _element: &ShadowElement) {}
}

struct Replayer<'a, S: ReplaySource> {
    context: &'a mut ShadowBackendContext,
    source: &'a mut S,
    config: &'a ReplayConfig,
    elements: HashMap<S::Node, ShadowElement>,
    deferred_slots: Vec<(ShadowElement, S::Node)>,
}

impl<'a, S: ReplaySource> Replayer<'a, S> {
    fn replay_node(&mut self, node: &S::Node, owner: &ShadowElement) -> ShadowElement {
        let element = match self.source.kind(node) {
            ReplayNode::Text(text) => self.replay_text(node, &text, owner),
            ReplayNode::Element {
                logical_name,
                styling_name,
            } => self.replay_element(node, &logical_name, &styling_name, owner),
            ReplayNode::Virtual {
                name,
                inherit_slots,
            } => self.replay_virtual(node, &name, inherit_slots, owner),
            ReplayNode::Component(options) => self.replay_component(node, &options, owner),
            ReplayNode::ShadowRoot => {
                self.replay_shadow_root(node, owner);
                *owner
            }
        };
        self.source.after_replay(node, &element);
        self.elements.insert(node.clone(), element);
        element
    }

    fn prepare(&mut self, node: &S::Node, kind: NodeKind) -> Option<ShadowElement> {
        self.source
            .existing_element(node)
            .filter(|element| element.kind() == kind)
    }

    fn replay_text(&mut self, node: &S::Node, text: &str, owner: &ShadowElement) -> ShadowElement {
        match self.prepare(node, NodeKind::TextNode) {
            Some(element) => {
                self.context.announce_text_node(&element, text, owner);
                element
            }
            None => self.context.create_text_node(text, owner),
        }
    }

    fn replay_element(
        &mut self,
        node: &S::Node,
        logical_name: &str,
        styling_name: &str,
        owner: &ShadowElement,
    ) -> ShadowElement {
        let element = match self.prepare(node, NodeKind::Element) {
            Some(element) => {
                self.context
                    .announce_element(&element, logical_name, styling_name, owner);
                element
            }
            None => self
                .context
                .create_element(logical_name, styling_name, owner),
        };
        self.context
            .associate_value(&element, self.source.associate_value(node));
        let state = self.source.element_state(node);
        self.set_attributes(&element, &state);
        for (attribute, listener) in self.source.model_binding_listeners(node) {
            self.context
                .set_model_binding_stat(&element, &attribute, listener);
        }
        self.replay_children(node, &element, owner);
        element
    }

    fn replay_shadow_root(&mut self, node: &S::Node, shadow_root: &ShadowElement) {
        self.context
            .associate_value(shadow_root, self.source.associate_value(node));
        let state = self.source.element_state(node);
        self.set_attributes(shadow_root, &state);
        self.replay_children(node, shadow_root, shadow_root);
    }

    fn replay_virtual(
        &mut self,
        node: &S::Node,
        name: &str,
        inherit_slots: bool,
        owner: &ShadowElement,
    ) -> ShadowElement {
        let element = match self.prepare(node, NodeKind::VirtualNode) {
            Some(element) => {
                self.context.announce_virtual_node(&element, name, owner);
                element
            }
            None => self.context.create_virtual_node(name, owner),
        };
        self.context
            .associate_value(&element, self.source.associate_value(node));
        if inherit_slots {
            self.context.set_inherit_slots(&element);
        }
        let state = self.source.element_state(node);
        self.set_attributes(&element, &state);
        self.replay_children(node, &element, owner);
        element
    }

    fn replay_component(
        &mut self,
        node: &S::Node,
        options: &ComponentOptions,
        owner: &ShadowElement,
    ) -> ShadowElement {
        let element = match self.prepare(node, NodeKind::Component) {
            Some(element) if element.shadow_root().is_some() => {
                self.context.announce_component(&element, options, owner);
                element
            }
            _ => self.context.create_component(options, owner),
        };
        self.context
            .associate_value(&element, self.source.associate_value(node));
        let state = self.source.element_state(node);
        self.set_attributes(&element, &state);
        for (class, targets) in &state.class_aliases {
            self.context
                .set_class_alias(&element, class, targets.clone());
        }

        // slots live in the shadow tree, so it goes first
        if let (Some(shadow_node), Some(shadow_root)) =
            (self.source.shadow_root(node), element.shadow_root())
        {
            self.replay_node(&shadow_node, &shadow_root);
        }
        self.replay_children(node, &element, owner);
        element
    }

    fn set_attributes(&mut self, element: &ShadowElement, state: &ElementState) {
        if let Some(id) = &state.id {
            if !id.is_empty() {
                self.context.set_id(element, id);
            }
        }
        for class in &state.classes {
            self.context.add_class(element, class);
        }
        for (segment, style) in state.style_segments.iter().enumerate() {
            if !style.is_empty() {
                self.context.set_style(element, style, segment as u32);
            }
        }
        for (name, value) in &state.attributes {
            self.context.set_attribute(element, name, value.clone());
        }
        for (name, value) in &state.dataset {
            self.context.set_dataset(element, name, value.clone());
        }
        for (event_type, capture, mut_level) in collapse_listeners(&state.listeners) {
            self.context
                .set_listener_stats(element, &event_type, capture, mut_level);
        }
        if let Some(slot) = &state.slot {
            if !slot.is_empty() {
                self.context.set_slot(element, slot);
            }
        }
        if let Some(slot_name) = &state.slot_name {
            self.context.set_slot_name(element, slot_name);
        }
    }

    fn replay_children(&mut self, node: &S::Node, parent: &ShadowElement, owner: &ShadowElement) {
        let children = self.source.children(node);
        let elements: Vec<(S::Node, ShadowElement)> = children
            .into_iter()
            .map(|child| {
                let element = self.replay_node(&child, owner);
                (child, element)
            })
            .collect();

        if elements.len() >= self.config.batch_threshold {
            let fragment = self.context.create_fragment();
            for (_, child) in &elements {
                self.context.append_child(&fragment, child);
            }
            self.context.splice_append(parent, &fragment);
            self.context.release(&fragment);
        } else {
            for (_, child) in &elements {
                self.context.append_child(parent, child);
            }
        }

        self.replay_slot_membership(&elements);
    }

    /// Assigns children to their slots, one group per slot in order of
    /// first appearance
    fn replay_slot_membership(&mut self, children: &[(S::Node, ShadowElement)]) {
        let mut groups: Vec<(S::Node, Vec<ShadowElement>)> = Vec::new();
        for (child, element) in children {
            let Some(slot) = self.source.slot_element(child) else {
                continue;
            };
            match groups.iter_mut().find(|(other, _)| *other == slot) {
                Some((_, members)) => members.push(*element),
                None => groups.push((slot, vec![*element])),
            }
        }

        // one message per member, grouping only keeps members of a slot adjacent
        for (slot, members) in groups {
            match self.elements.get(&slot).copied() {
                Some(slot_element) => {
                    for member in members {
                        self.context.set_slot_element(&member, Some(&slot_element));
                    }
                }
                None => {
                    for member in members {
                        self.deferred_slots.push((member, slot.clone()));
                    }
                }
            }
        }
    }

    fn finish(&mut self) {
        for (member, slot) in std::mem::take(&mut self.deferred_slots) {
            match self.elements.get(&slot).copied() {
                Some(slot_element) => self.context.set_slot_element(&member, Some(&slot_element)),
                None => warn!(
                    "slot of {} lies outside the replayed subtree",
                    member.id()
                ),
            }
        }
    }
}

/// Reduces every listener of one event type and phase to the single level
/// covering all of them. Bubble phase is reported before capture phase.
pub fn collapse_listeners(listeners: &[ListenerInfo]) -> Vec<(String, bool, EventMutLevel)> {
    let mut order: Vec<&str> = Vec::new();
    let mut levels: HashMap<(&str, bool), EventMutLevel> = HashMap::new();
    for listener in listeners {
        let event_type = listener.event_type.as_str();
        if !order.contains(&event_type) {
            order.push(event_type);
        }
        let level = levels
            .entry((event_type, listener.capture))
            .or_insert(listener.mut_level);
        if listener.mut_level > *level {
            *level = listener.mut_level;
        }
    }

    let mut collapsed = Vec::new();
    for event_type in order {
        for capture in [false, true] {
            if let Some(level) = levels.get(&(event_type, capture)) {
                collapsed.push((event_type.to_string(), capture, *level));
            }
        }
    }
    collapsed
}

impl ShadowBackendContext {
    /// Announces the given live subtrees to a freshly attached view side and
    /// appends them to the root shadow root.
    ///
    /// Identities are stable within one call only: a node met twice (e.g.
    /// as a child and as a slot) resolves to the same element, but two calls
    /// allocate independently unless the source reports existing elements.
    pub fn replay<S: ReplaySource>(
        &mut self,
        source: &mut S,
        roots: &[S::Node],
        config: &ReplayConfig,
    ) -> Vec<ShadowElement> {
        let root = self.root();
        let mut replayer = Replayer {
            context: self,
            source,
            config,
            elements: HashMap::new(),
            deferred_slots: Vec::new(),
        };

        let mut replayed = Vec::new();
        for node in roots {
            if replayer.source.kind(node) == ReplayNode::ShadowRoot {
                warn!("a shadow root cannot be replayed as a root, skipping it");
                continue;
            }
            let element = replayer.replay_node(node, &root);
            replayer.context.append_child(&root, &element);
            replayed.push(element);
        }
        replayer.finish();
        info!("replayed {} root(s)", replayed.len());
        replayed
    }
}
