/// In-memory rendering backend for end-to-end tests
/// Keeps a plain arena tree and dispatches events through it

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use shadow_sync_shared::{
    AssociateValueInfo, BoundingClientRect, DataChange, EventMutLevel, EventOptions, PathSegment,
    ThemeInfo, WindowInfo,
};
use shadow_sync_view::{
    ComponentInit, EventListener, OverlayListener, ValueListener, ViewBackend, ViewEvent,
};

use crate::shape::Shape;

pub type MemoryNode = usize;

const ROOT: MemoryNode = 0;

#[derive(Clone, Debug, PartialEq)]
pub enum MemoryKind {
    Root,
    Element { logical_name: String },
    Text(String),
    Virtual(String),
    Component { tag_name: String, external: bool },
    ShadowRoot,
}

#[derive(Clone, Debug)]
pub struct MemoryEntry {
    pub kind: MemoryKind,
    pub parent: Option<MemoryNode>,
    pub children: Vec<MemoryNode>,
    pub shadow_root: Option<MemoryNode>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub styles: BTreeMap<u32, String>,
    pub attributes: BTreeMap<String, Value>,
    pub dataset: BTreeMap<String, Value>,
    pub slot: Option<String>,
    pub slot_name: Option<String>,
    pub slot_element: Option<MemoryNode>,
    pub inherit_slots: bool,
    pub attached: bool,
    pub released: bool,
    pub associated: Option<AssociateValueInfo>,
    pub values: Value,
    pub style_scope: Option<u32>,
}

impl MemoryEntry {
    fn new(kind: MemoryKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            shadow_root: None,
            id: None,
            classes: Vec::new(),
            styles: BTreeMap::new(),
            attributes: BTreeMap::new(),
            dataset: BTreeMap::new(),
            slot: None,
            slot_name: None,
            slot_element: None,
            inherit_slots: false,
            attached: false,
            released: false,
            associated: None,
            values: Value::Null,
            style_scope: None,
        }
    }
}

pub struct MemoryBackend {
    nodes: Vec<MemoryEntry>,
    listeners: HashMap<(MemoryNode, String, bool), (EventMutLevel, EventListener<MemoryNode>)>,
    model_bindings: HashMap<(MemoryNode, String), ValueListener>,
    external_tags: HashSet<String>,
    next_dispatch: u64,
    pub sheet_contents: Vec<(String, Value)>,
    pub style_scopes: Vec<Option<String>>,
    pub style_sheets: Vec<(String, Option<u32>, bool)>,
    pub custom_methods: Vec<(Option<MemoryNode>, Value)>,
    pub render_error: Option<String>,
    pub window: WindowInfo,
    resize_listener: Option<Box<dyn FnMut(WindowInfo)>>,
    overlay_listener: Option<OverlayListener<MemoryNode>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            nodes: vec![MemoryEntry::new(MemoryKind::Root)],
            listeners: HashMap::new(),
            model_bindings: HashMap::new(),
            external_tags: HashSet::new(),
            next_dispatch: 1,
            sheet_contents: Vec::new(),
            style_scopes: Vec::new(),
            style_sheets: Vec::new(),
            custom_methods: Vec::new(),
            render_error: None,
            window: WindowInfo {
                width: 375.0,
                height: 667.0,
                device_pixel_ratio: 2.0,
            },
            resize_listener: None,
            overlay_listener: None,
        }
    }

    /// Tags created as external components when reported as reflecting
    pub fn with_external_tags(mut self, tags: &[&str]) -> Self {
        self.external_tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn entry(&self, node: MemoryNode) -> &MemoryEntry {
        &self.nodes[node]
    }

    pub fn root_children(&self) -> &[MemoryNode] {
        &self.nodes[ROOT].children
    }

    /// Nodes created and not yet released, the root excluded
    pub fn live_nodes(&self) -> usize {
        self.nodes
            .iter()
            .skip(1)
            .filter(|entry| !entry.released)
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_level(
        &self,
        node: MemoryNode,
        event_type: &str,
        capture: bool,
    ) -> Option<EventMutLevel> {
        self.listeners
            .get(&(node, event_type.to_string(), capture))
            .map(|(level, _)| *level)
    }

    fn push(&mut self, kind: MemoryKind) -> MemoryNode {
        self.nodes.push(MemoryEntry::new(kind));
        self.nodes.len() - 1
    }

    fn detach(&mut self, child: MemoryNode) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|other| *other != child);
        }
    }

    /// Snapshot of a subtree, light children and shadow trees included
    pub fn shape(&self, node: MemoryNode) -> Shape {
        let entry = &self.nodes[node];
        let label = match &entry.kind {
            MemoryKind::Root => "root".to_string(),
            MemoryKind::Element { logical_name } => format!("element:{}", logical_name),
            MemoryKind::Text(text) => format!("text:{}", text),
            MemoryKind::Virtual(name) => format!("virtual:{}", name),
            MemoryKind::Component { tag_name, .. } => format!("component:{}", tag_name),
            MemoryKind::ShadowRoot => "shadow-root".to_string(),
        };
        Shape {
            label,
            id: entry.id.clone(),
            classes: entry.classes.clone(),
            slot: entry.slot.clone().filter(|slot| !slot.is_empty()),
            children: entry.children.iter().map(|child| self.shape(*child)).collect(),
            shadow: entry
                .shadow_root
                .map(|shadow_root| Box::new(self.shape(shadow_root))),
        }
    }

    /// Shapes of everything placed directly under the root
    pub fn root_shapes(&self) -> Vec<Shape> {
        self.root_children()
            .iter()
            .map(|child| self.shape(*child))
            .collect()
    }

    /// Dispatches an event at `target`: capture listeners from the root
    /// down, then the target, then bubble listeners back up when
    /// `bubbles` is set
    pub fn dispatch_event(&mut self, target: MemoryNode, name: &str, detail: Value, bubbles: bool) {
        let dispatch_id = self.next_dispatch;
        self.next_dispatch += 1;

        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = self.nodes[current].parent {
            path.push(parent);
            current = parent;
        }

        let notify = |backend: &mut Self, current_target: MemoryNode, capture: bool| {
            let key = (current_target, name.to_string(), capture);
            if let Some((_, listener)) = backend.listeners.get_mut(&key) {
                listener(&ViewEvent {
                    dispatch_id,
                    name: name.to_string(),
                    detail: detail.clone(),
                    options: EventOptions {
                        bubbles,
                        composed: false,
                        extra_fields: Value::Null,
                    },
                    current_target,
                    target,
                    mark: Value::Null,
                    capture,
                });
            }
        };

        for node in path.iter().rev() {
            notify(self, *node, true);
        }
        let bubble_path = if bubbles { &path[..] } else { &path[..1] };
        for node in bubble_path {
            notify(self, *node, false);
        }
    }

    /// Reports a new value for a model-bound attribute
    pub fn change_bound_value(&mut self, node: MemoryNode, attribute: &str, value: Value) -> bool {
        match self.model_bindings.get_mut(&(node, attribute.to_string())) {
            Some(listener) => {
                listener(value);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, window: WindowInfo) {
        self.window = window.clone();
        if let Some(listener) = self.resize_listener.as_mut() {
            listener(window);
        }
    }

    pub fn inspect(&mut self, event: &str, node: Option<MemoryNode>) {
        if let Some(listener) = self.overlay_listener.as_mut() {
            listener(event.to_string(), node);
        }
    }
}

impl ViewBackend for MemoryBackend {
    type Node = MemoryNode;

    fn root(&self) -> MemoryNode {
        ROOT
    }

    fn window_info(&self) -> WindowInfo {
        self.window.clone()
    }

    fn theme(&self) -> ThemeInfo {
        ThemeInfo {
            theme: "dark".to_string(),
        }
    }

    fn on_window_resize(&mut self, listener: Box<dyn FnMut(WindowInfo)>) {
        self.resize_listener = Some(listener);
    }

    fn render(&mut self) -> Result<(), String> {
        match self.render_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn create_element(
        &mut self,
        logical_name: &str,
        _styling_name: &str,
        _owner: Option<&MemoryNode>,
    ) -> MemoryNode {
        self.push(MemoryKind::Element {
            logical_name: logical_name.to_string(),
        })
    }

    fn create_text_node(&mut self, text: &str, _owner: Option<&MemoryNode>) -> MemoryNode {
        self.push(MemoryKind::Text(text.to_string()))
    }

    fn create_virtual_node(&mut self, name: &str, _owner: Option<&MemoryNode>) -> MemoryNode {
        self.push(MemoryKind::Virtual(name.to_string()))
    }

    fn create_component(
        &mut self,
        init: &ComponentInit,
        _owner: Option<&MemoryNode>,
    ) -> (MemoryNode, MemoryNode) {
        let component = self.push(MemoryKind::Component {
            tag_name: init.tag_name.clone(),
            external: false,
        });
        let shadow_root = self.push(MemoryKind::ShadowRoot);
        self.nodes[component].shadow_root = Some(shadow_root);
        self.nodes[component].style_scope = init.style_scope;
        (component, shadow_root)
    }

    fn create_external_component(
        &mut self,
        init: &ComponentInit,
        owner: Option<&MemoryNode>,
    ) -> Option<(MemoryNode, MemoryNode)> {
        if !self.external_tags.contains(&init.tag_name) {
            return None;
        }
        let (component, shadow_root) = self.create_component(init, owner);
        self.nodes[component].kind = MemoryKind::Component {
            tag_name: init.tag_name.clone(),
            external: true,
        };
        Some((component, shadow_root))
    }

    fn release(&mut self, node: &MemoryNode) {
        self.nodes[*node].released = true;
        self.listeners.retain(|(listened, _, _), _| listened != node);
        self.model_bindings.retain(|(bound, _), _| bound != node);
    }

    fn children(&self, parent: &MemoryNode) -> Vec<MemoryNode> {
        self.nodes[*parent].children.clone()
    }

    fn append_child(&mut self, parent: &MemoryNode, child: &MemoryNode) {
        self.detach(*child);
        self.nodes[*parent].children.push(*child);
        self.nodes[*child].parent = Some(*parent);
    }

    fn remove_child(&mut self, parent: &MemoryNode, child: &MemoryNode) {
        self.nodes[*parent].children.retain(|other| other != child);
        self.nodes[*child].parent = None;
    }

    fn insert_before(&mut self, parent: &MemoryNode, child: &MemoryNode, before: &MemoryNode) {
        self.detach(*child);
        let children = &mut self.nodes[*parent].children;
        let index = children
            .iter()
            .position(|other| other == before)
            .unwrap_or(children.len());
        children.insert(index, *child);
        self.nodes[*child].parent = Some(*parent);
    }

    fn replace_child(&mut self, parent: &MemoryNode, child: &MemoryNode, old_child: &MemoryNode) {
        self.detach(*child);
        let children = &mut self.nodes[*parent].children;
        if let Some(index) = children.iter().position(|other| other == old_child) {
            children[index] = *child;
        }
        self.nodes[*old_child].parent = None;
        self.nodes[*child].parent = Some(*parent);
    }

    fn splice_children(
        &mut self,
        parent: &MemoryNode,
        index: usize,
        delete_count: usize,
        insert: &[MemoryNode],
    ) {
        for child in insert {
            self.detach(*child);
        }
        let children = &mut self.nodes[*parent].children;
        let end = (index + delete_count).min(children.len());
        let removed: Vec<MemoryNode> = children
            .splice(index..end, insert.iter().copied())
            .collect();
        for child in removed {
            self.nodes[child].parent = None;
        }
        for child in insert {
            self.nodes[*child].parent = Some(*parent);
        }
    }

    fn set_attached(&mut self, node: &MemoryNode, attached: bool) {
        self.nodes[*node].attached = attached;
    }

    fn set_id(&mut self, node: &MemoryNode, id: &str) {
        self.nodes[*node].id = Some(id.to_string());
    }

    fn set_slot(&mut self, node: &MemoryNode, name: &str) {
        self.nodes[*node].slot = Some(name.to_string());
    }

    fn set_slot_name(&mut self, node: &MemoryNode, name: &str) {
        self.nodes[*node].slot_name = Some(name.to_string());
    }

    fn set_slot_element(&mut self, node: &MemoryNode, slot: Option<&MemoryNode>) {
        self.nodes[*node].slot_element = slot.copied();
    }

    fn set_inherit_slots(&mut self, node: &MemoryNode) {
        self.nodes[*node].inherit_slots = true;
    }

    fn set_style(&mut self, node: &MemoryNode, style: &str, segment: u32) {
        self.nodes[*node].styles.insert(segment, style.to_string());
    }

    fn add_class(&mut self, node: &MemoryNode, class: &str) {
        let classes = &mut self.nodes[*node].classes;
        if !classes.iter().any(|other| other == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: &MemoryNode, class: &str) {
        self.nodes[*node].classes.retain(|other| other != class);
    }

    fn clear_classes(&mut self, node: &MemoryNode) {
        self.nodes[*node].classes.clear();
    }

    fn set_attribute(&mut self, node: &MemoryNode, name: &str, value: &Value) {
        self.nodes[*node]
            .attributes
            .insert(name.to_string(), value.clone());
    }

    fn remove_attribute(&mut self, node: &MemoryNode, name: &str) {
        self.nodes[*node].attributes.remove(name);
    }

    fn set_dataset(&mut self, node: &MemoryNode, name: &str, value: &Value) {
        self.nodes[*node]
            .dataset
            .insert(name.to_string(), value.clone());
    }

    fn set_text(&mut self, node: &MemoryNode, text: &str) {
        if let MemoryKind::Text(current) = &mut self.nodes[*node].kind {
            *current = text.to_string();
        }
    }

    fn set_listener(
        &mut self,
        node: &MemoryNode,
        event_type: &str,
        capture: bool,
        mut_level: EventMutLevel,
        listener: EventListener<MemoryNode>,
    ) {
        self.listeners
            .insert((*node, event_type.to_string(), capture), (mut_level, listener));
    }

    fn remove_listener(&mut self, node: &MemoryNode, event_type: &str, capture: bool) {
        self.listeners
            .remove(&(*node, event_type.to_string(), capture));
    }

    fn set_model_binding_listener(
        &mut self,
        node: &MemoryNode,
        attribute: &str,
        listener: ValueListener,
    ) {
        self.model_bindings
            .insert((*node, attribute.to_string()), listener);
    }

    fn associate_value(&mut self, node: &MemoryNode, info: &AssociateValueInfo) {
        self.nodes[*node].associated = Some(*info);
    }

    fn init_values(&mut self, component: &MemoryNode, values: &Value) {
        self.nodes[*component].values = values.clone();
    }

    fn update_values(&mut self, component: &MemoryNode, changes: &[DataChange]) {
        let values = &mut self.nodes[*component].values;
        if !values.is_object() {
            *values = Value::Object(Default::default());
        }
        for change in changes {
            if let (Some(PathSegment::Field(field)), Some(object)) =
                (change.path.first(), values.as_object_mut())
            {
                object.insert(field.clone(), change.new_value.clone());
            }
        }
    }

    fn register_style_sheet_content(&mut self, path: &str, content: &Value) {
        self.sheet_contents.push((path.to_string(), content.clone()));
    }

    fn register_style_scope(&mut self, prefix: Option<&str>) -> u32 {
        self.style_scopes.push(prefix.map(str::to_string));
        // backend ids start far from the data side's to catch missing translation
        100 + self.style_scopes.len() as u32
    }

    fn append_style_sheet_path(&mut self, path: &str, scope: Option<u32>) -> u32 {
        self.style_sheets.push((path.to_string(), scope, true));
        (self.style_sheets.len() - 1) as u32
    }

    fn disable_style_sheet(&mut self, index: u32) {
        if let Some(sheet) = self.style_sheets.get_mut(index as usize) {
            sheet.2 = false;
        }
    }

    fn get_context(&self, node: &MemoryNode) -> Option<Value> {
        Some(Value::from(*node as u64))
    }

    fn get_bounding_client_rect(&self, node: &MemoryNode) -> Option<BoundingClientRect> {
        let index = self.nodes[*node]
            .parent
            .and_then(|parent| {
                self.nodes[parent]
                    .children
                    .iter()
                    .position(|child| child == node)
            })
            .unwrap_or(0);
        Some(BoundingClientRect {
            left: 0.0,
            top: index as f64 * 10.0,
            width: self.window.width,
            height: 10.0,
        })
    }

    fn start_overlay_inspect(&mut self, listener: OverlayListener<MemoryNode>) {
        self.overlay_listener = Some(listener);
    }

    fn stop_overlay_inspect(&mut self) {
        self.overlay_listener = None;
    }

    fn handle_custom_method(&mut self, node: Option<&MemoryNode>, options: &Value) {
        self.custom_methods.push((node.copied(), options.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_replaces_a_range() {
        let mut backend = MemoryBackend::new();
        let parent = backend.create_element("view", "view", None);
        let children: Vec<MemoryNode> = (0..4)
            .map(|i| backend.create_text_node(&i.to_string(), None))
            .collect();
        for child in &children {
            backend.append_child(&parent, child);
        }
        let inserted = backend.create_text_node("x", None);

        backend.splice_children(&parent, 1, 2, &[inserted]);

        assert_eq!(
            backend.children(&parent),
            vec![children[0], inserted, children[3]]
        );
        assert_eq!(backend.entry(children[1]).parent, None);
    }
}
