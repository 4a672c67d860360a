/// Host-side logical tree for replay tests

use std::collections::HashMap;

use shadow_sync_data::{
    ComponentOptions, ElementState, ListenerInfo, ReplayNode, ReplaySource, ShadowElement,
};
use shadow_sync_shared::{AssociateValueInfo, EventMutLevel};

use crate::shape::Shape;

pub type LogicalNode = usize;

struct LogicalEntry {
    kind: ReplayNode,
    children: Vec<LogicalNode>,
    shadow_root: Option<LogicalNode>,
    slot_element: Option<LogicalNode>,
    state: ElementState,
    is_reflect: bool,
}

/// An arena tree standing in for a host framework's live nodes.
///
/// Remembers the element every node was replayed as, and hands those back
/// on the next replay when `reuse_elements` is set.
#[derive(Default)]
pub struct LogicalTree {
    nodes: Vec<LogicalEntry>,
    replayed: HashMap<LogicalNode, ShadowElement>,
    pub reuse_elements: bool,
}

impl LogicalTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ReplayNode) -> LogicalNode {
        self.nodes.push(LogicalEntry {
            kind,
            children: Vec::new(),
            shadow_root: None,
            slot_element: None,
            state: ElementState::default(),
            is_reflect: false,
        });
        self.nodes.len() - 1
    }

    pub fn element(&mut self, name: &str) -> LogicalNode {
        self.push(ReplayNode::Element {
            logical_name: name.to_string(),
            styling_name: name.to_string(),
        })
    }

    pub fn text(&mut self, text: &str) -> LogicalNode {
        self.push(ReplayNode::Text(text.to_string()))
    }

    pub fn virtual_node(&mut self, name: &str) -> LogicalNode {
        self.push(ReplayNode::Virtual {
            name: name.to_string(),
            inherit_slots: false,
        })
    }

    /// Adds a component together with its shadow root
    pub fn component(&mut self, options: ComponentOptions) -> LogicalNode {
        let component = self.push(ReplayNode::Component(options));
        let shadow_root = self.push(ReplayNode::ShadowRoot);
        self.nodes[component].shadow_root = Some(shadow_root);
        component
    }

    pub fn shadow_root_of(&self, component: LogicalNode) -> Option<LogicalNode> {
        self.nodes[component].shadow_root
    }

    pub fn append(&mut self, parent: LogicalNode, child: LogicalNode) {
        self.nodes[parent].children.push(child);
    }

    pub fn set_id(&mut self, node: LogicalNode, id: &str) {
        self.nodes[node].state.id = Some(id.to_string());
    }

    pub fn add_class(&mut self, node: LogicalNode, class: &str) {
        self.nodes[node].state.classes.push(class.to_string());
    }

    pub fn set_style(&mut self, node: LogicalNode, segments: &[&str]) {
        self.nodes[node].state.style_segments = segments.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_slot(&mut self, node: LogicalNode, name: &str) {
        self.nodes[node].state.slot = Some(name.to_string());
    }

    pub fn set_slot_name(&mut self, node: LogicalNode, name: &str) {
        self.nodes[node].state.slot_name = Some(name.to_string());
    }

    /// Records that `child` is currently distributed into `slot`
    pub fn distribute(&mut self, child: LogicalNode, slot: LogicalNode) {
        self.nodes[child].slot_element = Some(slot);
    }

    pub fn listen(&mut self, node: LogicalNode, event_type: &str, capture: bool, mut_level: EventMutLevel) {
        self.nodes[node].state.listeners.push(ListenerInfo {
            event_type: event_type.to_string(),
            capture,
            mut_level,
        });
    }

    pub fn set_reflect(&mut self, node: LogicalNode, is_reflect: bool) {
        self.nodes[node].is_reflect = is_reflect;
    }

    /// Element a node was last replayed as
    pub fn replayed(&self, node: LogicalNode) -> Option<ShadowElement> {
        self.replayed.get(&node).copied()
    }

    pub fn shape(&self, node: LogicalNode) -> Shape {
        let entry = &self.nodes[node];
        let label = match &entry.kind {
            ReplayNode::Text(text) => format!("text:{}", text),
            ReplayNode::Element { logical_name, .. } => format!("element:{}", logical_name),
            ReplayNode::Virtual { name, .. } => format!("virtual:{}", name),
            ReplayNode::Component(options) => format!("component:{}", options.tag_name),
            ReplayNode::ShadowRoot => "shadow-root".to_string(),
        };
        Shape {
            label,
            id: entry.state.id.clone().filter(|id| !id.is_empty()),
            classes: entry.state.classes.clone(),
            slot: entry.state.slot.clone().filter(|slot| !slot.is_empty()),
            children: entry.children.iter().map(|child| self.shape(*child)).collect(),
            shadow: entry
                .shadow_root
                .map(|shadow_root| Box::new(self.shape(shadow_root))),
        }
    }
}

impl ReplaySource for LogicalTree {
    type Node = LogicalNode;

    fn kind(&self, node: &LogicalNode) -> ReplayNode {
        self.nodes[*node].kind.clone()
    }

    fn children(&self, node: &LogicalNode) -> Vec<LogicalNode> {
        self.nodes[*node].children.clone()
    }

    fn shadow_root(&self, node: &LogicalNode) -> Option<LogicalNode> {
        self.nodes[*node].shadow_root
    }

    fn slot_element(&self, node: &LogicalNode) -> Option<LogicalNode> {
        self.nodes[*node].slot_element
    }

    fn element_state(&self, node: &LogicalNode) -> ElementState {
        self.nodes[*node].state.clone()
    }

    fn associate_value(&self, node: &LogicalNode) -> AssociateValueInfo {
        AssociateValueInfo {
            is_reflect: self.nodes[*node].is_reflect,
        }
    }

    fn existing_element(&self, node: &LogicalNode) -> Option<ShadowElement> {
        if self.reuse_elements {
            self.replayed(*node)
        } else {
            None
        }
    }

    fn after_replay(&mut self, node: &LogicalNode, element: &ShadowElement) {
        self.replayed.insert(*node, *element);
    }
}
