use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use log::{debug, info, warn};
use serde_json::Value;

use shadow_sync_shared::{
    AssociateValueInfo, BoundingClientRect, BoxModel, CallbackId, ChannelConfig, ComputedStyles,
    DataChange, DataMessage, DynamicSlotInit, EventMutLevel, IdGenerator, InheritedRules,
    MatchedRules, MediaQueryResult, NodeId, NodeKind, PerformanceStats, Publisher, ScrollOffset,
    SlotId, StyleScopeId, StyleSheetId, ThemeInfo, TraceId, WindowInfo, WireMessage,
};

use crate::{
    channel::{CustomMethodHandler, DynamicSlotUpdate, EventHandler, MessageChannelDataSide},
    dynamic_slot::{DynamicSlot, DynamicSlotHandler, DynamicSlotManager},
    element::{ComponentOptions, Observer, ShadowElement},
    error::{DataChannelError, RenderError},
    style_registry::{StyleRegistry, StyleScopeRegistry},
};

// zero is never issued, so it marks the root shadow root
const ROOT_ID: NodeId = NodeId::new(0);

// virtual name of synthesized dynamic slot placeholders
const DYNAMIC_SLOT_NAME: &str = "slot";

type WindowListener = Box<dyn FnMut(&WindowInfo)>;
type ThemeListener = Box<dyn FnMut(&ThemeInfo)>;

#[derive(Default)]
struct Environment {
    window: WindowInfo,
    theme: ThemeInfo,
    resize_listener: Option<WindowListener>,
    theme_listener: Option<ThemeListener>,
}

impl Environment {
    fn window_resized(environment: &Rc<RefCell<Self>>, window: WindowInfo) {
        let listener = {
            let mut env = environment.borrow_mut();
            env.window = window.clone();
            env.resize_listener.take()
        };
        if let Some(mut listener) = listener {
            listener(&window);
            let mut env = environment.borrow_mut();
            if env.resize_listener.is_none() {
                env.resize_listener = Some(listener);
            }
        }
    }

    fn theme_changed(environment: &Rc<RefCell<Self>>, theme: ThemeInfo) {
        let listener = {
            let mut env = environment.borrow_mut();
            env.theme = theme.clone();
            env.theme_listener.take()
        };
        if let Some(mut listener) = listener {
            listener(&theme);
            let mut env = environment.borrow_mut();
            if env.theme_listener.is_none() {
                env.theme_listener = Some(listener);
            }
        }
    }
}

/// The data side backend of a shadow-sync channel.
///
/// Every tree operation is translated into exactly one channel command. No
/// tree shape is kept locally, only node identities and the registrations a
/// restarted view side would need again.
pub struct ShadowBackendContext {
    channel: MessageChannelDataSide,
    node_ids: IdGenerator<NodeId>,
    trace_ids: IdGenerator<TraceId>,
    nodes: HashMap<NodeId, ShadowElement>,
    styles: StyleRegistry,
    environment: Rc<RefCell<Environment>>,
    environment_callbacks: Vec<CallbackId>,
    reflecting: HashSet<NodeId>,
    dynamic_slots: DynamicSlotManager,
    dynamic_slot_handler: Option<Box<dyn DynamicSlotHandler>>,
}

impl ShadowBackendContext {
    pub fn new(
        publisher: Box<dyn Publisher>,
        scope_registry: Box<dyn StyleScopeRegistry>,
        config: &ChannelConfig,
    ) -> Self {
        let mut context = Self {
            channel: MessageChannelDataSide::new(publisher, config),
            node_ids: IdGenerator::new(&config.id_generator),
            trace_ids: IdGenerator::new(&config.id_generator),
            nodes: HashMap::new(),
            styles: StyleRegistry::new(scope_registry),
            environment: Rc::new(RefCell::new(Environment::default())),
            environment_callbacks: Vec::new(),
            reflecting: HashSet::new(),
            dynamic_slots: DynamicSlotManager::new(),
            dynamic_slot_handler: None,
        };
        context.init_context();
        info!("shadow backend context created");
        context
    }

    fn init_context(&mut self) {
        let environment = self.environment.clone();
        self.channel.create(move |window, theme| {
            let mut env = environment.borrow_mut();
            env.window = window;
            env.theme = theme;
        });
        let environment = self.environment.clone();
        let resize = self
            .channel
            .on_window_resize(move |window| Environment::window_resized(&environment, window));
        let environment = self.environment.clone();
        let theme = self
            .channel
            .on_theme_change(move |theme| Environment::theme_changed(&environment, theme));
        self.environment_callbacks = vec![resize, theme];
    }

    /// Attaches a fresh transport after the view side restarted.
    ///
    /// Re-runs channel initialisation and then publishes every registered
    /// style sheet content, style scope and appended style sheet path in
    /// their original order, followed by the disables of sheets disabled
    /// before the restart. Nodes are not replayed here, see
    /// [`ShadowBackendContext::replay`].
    pub fn reinit_context(&mut self, publisher: Box<dyn Publisher>) {
        for callback in std::mem::take(&mut self.environment_callbacks) {
            self.channel.release_callback(callback);
        }
        self.channel.replace_publisher(publisher);
        self.init_context();
        for message in self.styles.replay_messages() {
            self.channel.publish(message);
        }
        info!("shadow backend context re-initialised");
    }

    /// Applies one message from the view side
    pub fn receive(&mut self, message: &WireMessage) -> Result<(), DataChannelError> {
        self.channel.receive(message)?;
        for update in self.channel.take_dynamic_slot_updates() {
            self.apply_dynamic_slot_update(update);
        }
        Ok(())
    }

    pub fn channel(&self) -> &MessageChannelDataSide {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut MessageChannelDataSide {
        &mut self.channel
    }

    pub fn set_event_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.channel.set_event_handler(handler);
    }

    pub fn set_custom_method_handler(&mut self, handler: CustomMethodHandler) {
        self.channel.set_custom_method_handler(handler);
    }

    pub fn set_dynamic_slot_handler(&mut self, handler: Box<dyn DynamicSlotHandler>) {
        self.dynamic_slot_handler = Some(handler);
    }

    pub fn destroy(&mut self) {
        self.channel.destroy();
    }

    pub fn render<F: FnOnce(Result<(), RenderError>) + 'static>(&mut self, done: F) {
        self.channel.render(done);
    }

    // environment

    pub fn window_width(&self) -> f64 {
        self.environment.borrow().window.width
    }

    pub fn window_height(&self) -> f64 {
        self.environment.borrow().window.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.environment.borrow().window.device_pixel_ratio
    }

    pub fn theme(&self) -> String {
        self.environment.borrow().theme.theme.clone()
    }

    pub fn on_window_resize<F: FnMut(&WindowInfo) + 'static>(&mut self, listener: F) {
        self.environment.borrow_mut().resize_listener = Some(Box::new(listener));
    }

    pub fn on_theme_change<F: FnMut(&ThemeInfo) + 'static>(&mut self, listener: F) {
        self.environment.borrow_mut().theme_listener = Some(Box::new(listener));
    }

    // nodes

    /// The root shadow root. It is never announced, the view side maps it
    /// onto its root container.
    pub fn root(&self) -> ShadowElement {
        ShadowElement::new(ROOT_ID, NodeKind::ShadowRoot)
    }

    pub fn element(&self, id: NodeId) -> Option<ShadowElement> {
        self.nodes.get(&id).copied()
    }

    /// Number of live node ids, fragments and shadow roots included
    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_reflecting(&self, element: &ShadowElement) -> bool {
        self.reflecting.contains(&element.id())
    }

    fn wire_id(element: &ShadowElement) -> Option<NodeId> {
        if element.id() == ROOT_ID {
            None
        } else {
            Some(element.id())
        }
    }

    fn gen_element(&mut self, kind: NodeKind) -> ShadowElement {
        let element = ShadowElement::new(self.node_ids.gen(), kind);
        self.nodes.insert(element.id(), element);
        element
    }

    pub fn create_element(
        &mut self,
        logical_name: &str,
        styling_name: &str,
        owner: &ShadowElement,
    ) -> ShadowElement {
        let element = self.gen_element(NodeKind::Element);
        self.announce_element(&element, logical_name, styling_name, owner);
        element
    }

    pub(crate) fn announce_element(
        &mut self,
        element: &ShadowElement,
        logical_name: &str,
        styling_name: &str,
        owner: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::CreateElement {
            id: element.id(),
            logical_name: logical_name.to_string(),
            styling_name: styling_name.to_string(),
            owner: Self::wire_id(owner),
        });
    }

    pub fn create_text_node(&mut self, text: &str, owner: &ShadowElement) -> ShadowElement {
        let element = self.gen_element(NodeKind::TextNode);
        self.announce_text_node(&element, text, owner);
        element
    }

    pub(crate) fn announce_text_node(
        &mut self,
        element: &ShadowElement,
        text: &str,
        owner: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::CreateTextNode {
            id: element.id(),
            text: text.to_string(),
            owner: Self::wire_id(owner),
        });
    }

    pub fn create_virtual_node(&mut self, name: &str, owner: &ShadowElement) -> ShadowElement {
        let element = self.gen_element(NodeKind::VirtualNode);
        self.announce_virtual_node(&element, name, owner);
        element
    }

    pub(crate) fn announce_virtual_node(
        &mut self,
        element: &ShadowElement,
        name: &str,
        owner: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::CreateVirtualNode {
            id: element.id(),
            name: name.to_string(),
            owner: Self::wire_id(owner),
        });
    }

    /// Creates a component together with its shadow root. Style scopes it
    /// references are registered first when seen for the first time.
    ///
    /// [`ShadowBackendContext::associate_value`] must be called for every
    /// component. Until it arrives the view side holds back every later
    /// command that depends on the component, and the rest of the backlog
    /// queued behind them.
    pub fn create_component(
        &mut self,
        options: &ComponentOptions,
        owner: &ShadowElement,
    ) -> ShadowElement {
        let id = self.node_ids.gen();
        let shadow_root = self.node_ids.gen();
        let element = ShadowElement::component(id, shadow_root);
        self.nodes.insert(id, element);
        self.nodes
            .insert(shadow_root, ShadowElement::new(shadow_root, NodeKind::ShadowRoot));
        self.announce_component(&element, options, owner);
        element
    }

    pub(crate) fn announce_component(
        &mut self,
        element: &ShadowElement,
        options: &ComponentOptions,
        owner: &ShadowElement,
    ) {
        self.check_style_scope(options.style_scope);
        self.check_style_scope(options.extra_style_scope);
        let Some(shadow_root) = element.shadow_root() else {
            warn!("{} announced as a component without a shadow root", element.id());
            return;
        };
        self.channel.publish(DataMessage::CreateComponent {
            id: element.id(),
            shadow_root: shadow_root.id(),
            tag_name: options.tag_name.clone(),
            external: options.external,
            virtual_host: options.virtual_host,
            style_scope: options.style_scope,
            extra_style_scope: options.extra_style_scope,
            external_classes: options.external_classes.clone(),
            slot_mode: options.slot_mode,
            write_id_to_dom: options.write_id_to_dom,
            owner: Self::wire_id(owner),
        });
    }

    pub fn create_fragment(&mut self) -> ShadowElement {
        let element = self.gen_element(NodeKind::Fragment);
        self.channel
            .publish(DataMessage::CreateFragment { id: element.id() });
        element
    }

    /// Releases a node id. Releasing a component also releases its shadow
    /// root and any dynamic slot placeholders synthesized inside it.
    pub fn release(&mut self, element: &ShadowElement) {
        if element.id() == ROOT_ID {
            warn!("the root shadow root cannot be released");
            return;
        }
        if element.kind() == NodeKind::Component {
            for slot in self.dynamic_slots.remove_component(element.id()) {
                self.release_id(slot.placeholder.id());
            }
            if let Some(shadow_root) = element.shadow_root() {
                if self.nodes.contains_key(&shadow_root.id()) {
                    self.release_id(shadow_root.id());
                }
            }
            self.reflecting.remove(&element.id());
        }
        self.release_id(element.id());
    }

    fn release_id(&mut self, id: NodeId) {
        self.nodes.remove(&id);
        self.node_ids.release(id);
        self.channel.publish(DataMessage::Release { id });
    }

    /// Reports the host's decision about a freshly created node
    pub fn associate_value(&mut self, element: &ShadowElement, info: AssociateValueInfo) {
        if info.is_reflect {
            self.reflecting.insert(element.id());
        }
        self.channel.publish(DataMessage::AssociateValue {
            node: element.id(),
            info,
        });
    }

    // structure

    pub fn append_child(&mut self, parent: &ShadowElement, child: &ShadowElement) {
        self.channel.publish(DataMessage::AppendChild {
            parent: Self::wire_id(parent),
            child: child.id(),
        });
    }

    pub fn remove_child(&mut self, parent: &ShadowElement, child: &ShadowElement) {
        self.channel.publish(DataMessage::RemoveChild {
            parent: Self::wire_id(parent),
            child: child.id(),
        });
    }

    pub fn insert_before(
        &mut self,
        parent: &ShadowElement,
        child: &ShadowElement,
        before: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::InsertBefore {
            parent: Self::wire_id(parent),
            child: child.id(),
            before: before.id(),
        });
    }

    pub fn replace_child(
        &mut self,
        parent: &ShadowElement,
        child: &ShadowElement,
        old_child: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::ReplaceChild {
            parent: Self::wire_id(parent),
            child: child.id(),
            old_child: old_child.id(),
        });
    }

    /// Removes `delete_count` children starting at `before`, then moves the
    /// fragment's children into their place
    pub fn splice_before(
        &mut self,
        parent: &ShadowElement,
        before: &ShadowElement,
        delete_count: u32,
        fragment: &ShadowElement,
    ) {
        self.channel.publish(DataMessage::SpliceBefore {
            parent: Self::wire_id(parent),
            before: before.id(),
            delete_count,
            fragment: fragment.id(),
        });
    }

    pub fn splice_append(&mut self, parent: &ShadowElement, fragment: &ShadowElement) {
        self.channel.publish(DataMessage::SpliceAppend {
            parent: Self::wire_id(parent),
            fragment: fragment.id(),
        });
    }

    pub fn splice_remove(&mut self, parent: &ShadowElement, start: &ShadowElement, delete_count: u32) {
        self.channel.publish(DataMessage::SpliceRemove {
            parent: Self::wire_id(parent),
            start: start.id(),
            delete_count,
        });
    }

    // attributes

    pub fn set_id(&mut self, element: &ShadowElement, id: &str) {
        self.channel.publish(DataMessage::SetId {
            node: element.id(),
            id: id.to_string(),
        });
    }

    pub fn set_slot(&mut self, element: &ShadowElement, name: &str) {
        self.channel.publish(DataMessage::SetSlot {
            node: element.id(),
            name: name.to_string(),
        });
    }

    pub fn set_slot_name(&mut self, element: &ShadowElement, name: &str) {
        self.channel.publish(DataMessage::SetSlotName {
            node: element.id(),
            name: name.to_string(),
        });
    }

    pub fn set_slot_element(&mut self, element: &ShadowElement, slot: Option<&ShadowElement>) {
        self.channel.publish(DataMessage::SetSlotElement {
            node: element.id(),
            slot: slot.map(ShadowElement::id),
        });
    }

    pub fn set_inherit_slots(&mut self, element: &ShadowElement) {
        self.channel
            .publish(DataMessage::SetInheritSlots { node: element.id() });
    }

    pub fn set_style(&mut self, element: &ShadowElement, style: &str, segment: u32) {
        self.channel.publish(DataMessage::SetStyle {
            node: element.id(),
            style: style.to_string(),
            segment,
        });
    }

    pub fn add_class(&mut self, element: &ShadowElement, class: &str) {
        self.channel.publish(DataMessage::AddClass {
            node: element.id(),
            class: class.to_string(),
        });
    }

    pub fn remove_class(&mut self, element: &ShadowElement, class: &str) {
        self.channel.publish(DataMessage::RemoveClass {
            node: element.id(),
            class: class.to_string(),
        });
    }

    pub fn clear_classes(&mut self, element: &ShadowElement) {
        self.channel
            .publish(DataMessage::ClearClasses { node: element.id() });
    }

    pub fn set_class_alias(&mut self, element: &ShadowElement, class: &str, targets: Vec<String>) {
        self.channel.publish(DataMessage::SetClassAlias {
            node: element.id(),
            class: class.to_string(),
            targets,
        });
    }

    pub fn set_attribute(&mut self, element: &ShadowElement, name: &str, value: Value) {
        self.channel.publish(DataMessage::SetAttribute {
            node: element.id(),
            name: name.to_string(),
            value,
        });
    }

    pub fn remove_attribute(&mut self, element: &ShadowElement, name: &str) {
        self.channel.publish(DataMessage::RemoveAttribute {
            node: element.id(),
            name: name.to_string(),
        });
    }

    pub fn set_dataset(&mut self, element: &ShadowElement, name: &str, value: Value) {
        self.channel.publish(DataMessage::SetDataset {
            node: element.id(),
            name: name.to_string(),
            value,
        });
    }

    pub fn set_text(&mut self, element: &ShadowElement, text: &str) {
        self.channel.publish(DataMessage::SetText {
            node: element.id(),
            text: text.to_string(),
        });
    }

    pub fn set_listener_stats(
        &mut self,
        element: &ShadowElement,
        event_type: &str,
        capture: bool,
        mut_level: EventMutLevel,
    ) {
        self.channel.publish(DataMessage::SetListenerStats {
            node: element.id(),
            event_type: event_type.to_string(),
            capture,
            mut_level,
        });
    }

    /// Registers a persistent listener for value changes the view side
    /// reports on `attribute`
    pub fn set_model_binding_stat(
        &mut self,
        element: &ShadowElement,
        attribute: &str,
        listener: Box<dyn FnMut(Value)>,
    ) -> CallbackId {
        self.channel
            .set_model_binding_stat(element.id(), attribute.to_string(), listener)
    }

    pub fn init_values(&mut self, element: &ShadowElement, values: Value) {
        self.channel.publish(DataMessage::InitValues {
            node: element.id(),
            values,
        });
    }

    pub fn update_values(&mut self, element: &ShadowElement, changes: Vec<DataChange>) {
        if changes.is_empty() {
            return;
        }
        self.channel.publish(DataMessage::UpdateValues {
            node: element.id(),
            changes,
        });
    }

    // styles

    pub fn register_style_sheet_content(&mut self, path: &str, content: Value) {
        let message = self.styles.register_sheet_content(path, content);
        self.channel.publish(message);
    }

    fn check_style_scope(&mut self, scope: Option<StyleScopeId>) {
        if let Some(message) = self.styles.check_scope(scope) {
            self.channel.publish(message);
        }
    }

    pub fn append_style_sheet_path(
        &mut self,
        path: &str,
        scope: Option<StyleScopeId>,
    ) -> StyleSheetId {
        self.check_style_scope(scope);
        let (sheet, message) = self.styles.append_sheet_path(path, scope);
        self.channel.publish(message);
        sheet
    }

    pub fn disable_style_sheet(&mut self, sheet: StyleSheetId) {
        let message = self.styles.disable_sheet(sheet);
        self.channel.publish(message);
    }

    pub fn replace_style_sheet_all_properties<F: FnOnce(Option<u32>) + 'static>(
        &mut self,
        sheet_index: u32,
        rule_index: u32,
        inline_style: &str,
        done: F,
    ) {
        self.channel.replace_style_sheet_all_properties(
            sheet_index,
            rule_index,
            inline_style.to_string(),
            done,
        );
    }

    // queries

    pub fn get_context<F: FnOnce(Value) + 'static>(&mut self, element: &ShadowElement, done: F) {
        self.channel.get_context(element.id(), done);
    }

    pub fn get_all_computed_styles<F: FnOnce(ComputedStyles) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_all_computed_styles(element.id(), done);
    }

    pub fn get_pseudo_computed_styles<F: FnOnce(ComputedStyles) + 'static>(
        &mut self,
        element: &ShadowElement,
        pseudo_type: &str,
        done: F,
    ) {
        self.channel
            .get_pseudo_computed_styles(element.id(), pseudo_type.to_string(), done);
    }

    pub fn get_inherited_rules<F: FnOnce(InheritedRules) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_inherited_rules(element.id(), done);
    }

    pub fn get_matched_rules<F: FnOnce(MatchedRules) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_matched_rules(element.id(), done);
    }

    pub fn get_bounding_client_rect<F: FnOnce(BoundingClientRect) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_bounding_client_rect(element.id(), done);
    }

    pub fn get_scroll_offset<F: FnOnce(ScrollOffset) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_scroll_offset(element.id(), done);
    }

    pub fn set_scroll_position(&mut self, element: &ShadowElement, left: f64, top: f64, duration: f64) {
        self.channel.publish(DataMessage::SetScrollPosition {
            node: element.id(),
            left,
            top,
            duration,
        });
    }

    pub fn get_box_model<F: FnOnce(BoxModel) + 'static>(&mut self, element: &ShadowElement, done: F) {
        self.channel.get_box_model(element.id(), done);
    }

    pub fn get_pseudo_types<F: FnOnce(Vec<String>) + 'static>(
        &mut self,
        element: &ShadowElement,
        done: F,
    ) {
        self.channel.get_pseudo_types(element.id(), done);
    }

    // observers

    pub fn create_media_query_observer<F: FnMut(MediaQueryResult) + 'static>(
        &mut self,
        status: Value,
        listener: F,
    ) -> Observer {
        Observer::new(self.channel.create_media_query_observer(status, listener))
    }

    pub fn create_intersection_observer<F: FnMut(Value) + 'static>(
        &mut self,
        target: &ShadowElement,
        relative: Option<&ShadowElement>,
        margin: &str,
        thresholds: Vec<f64>,
        listener: F,
    ) -> Observer {
        Observer::new(self.channel.create_intersection_observer(
            target.id(),
            relative.map(ShadowElement::id),
            margin.to_string(),
            thresholds,
            listener,
        ))
    }

    pub fn disconnect_observer(&mut self, observer: Observer) {
        self.channel.disconnect_observer(observer.id());
    }

    // inspection

    pub fn start_overlay_inspect<F: FnMut(String, Option<NodeId>) + 'static>(&mut self, listener: F) {
        self.channel.start_overlay_inspect(listener);
    }

    pub fn stop_overlay_inspect(&mut self) {
        self.channel.stop_overlay_inspect();
    }

    pub fn performance_trace_start(&mut self) -> TraceId {
        let trace = self.trace_ids.gen();
        self.channel
            .publish(DataMessage::PerformanceStartTrace { trace });
        trace
    }

    pub fn performance_trace_end<F: FnOnce(PerformanceStats) + 'static>(
        &mut self,
        trace: TraceId,
        done: F,
    ) {
        self.trace_ids.release(trace);
        self.channel.performance_end_trace(trace, done);
    }

    pub fn call_custom_method(&mut self, element: Option<&ShadowElement>, options: Value) {
        self.channel
            .call_custom_method(element.map(ShadowElement::id), options);
    }

    // dynamic slots

    fn apply_dynamic_slot_update(&mut self, update: DynamicSlotUpdate) {
        match update {
            DynamicSlotUpdate::Insert {
                component,
                index,
                slots,
            } => self.insert_dynamic_slots(component, index, slots),
            DynamicSlotUpdate::Update {
                slot,
                values,
                changed_names,
            } => {
                let Some(entry) = self.dynamic_slots.get_mut(slot) else {
                    warn!("update for unknown dynamic slot {}", slot);
                    return;
                };
                entry.values = values.clone();
                let placeholder = entry.placeholder;
                if let Some(handler) = self.dynamic_slot_handler.as_mut() {
                    handler.slot_updated(slot, placeholder, &values, &changed_names);
                }
            }
            DynamicSlotUpdate::Remove { slots } => {
                for slot in slots {
                    self.remove_dynamic_slot(slot);
                }
            }
        }
    }

    fn insert_dynamic_slots(
        &mut self,
        component: NodeId,
        index: Option<u32>,
        slots: Vec<DynamicSlotInit>,
    ) {
        let Some(shadow_root) = self
            .element(component)
            .filter(|element| self.reflecting.contains(&element.id()))
            .and_then(|element| element.shadow_root())
        else {
            warn!(
                "ignoring dynamic slots for {}, it is not a reflecting component",
                component
            );
            return;
        };
        debug!("inserting {} dynamic slot(s) into {}", slots.len(), component);

        for (offset, init) in slots.into_iter().enumerate() {
            let position = index.map(|index| index + offset as u32);
            let placeholder = self.create_virtual_node(DYNAMIC_SLOT_NAME, &shadow_root);
            self.set_slot_name(&placeholder, &init.name);
            match self.dynamic_slots.anchor(component, position) {
                Some(anchor) => self.insert_before(&shadow_root, &placeholder, &anchor),
                None => self.append_child(&shadow_root, &placeholder),
            }
            if let Some(handler) = self.dynamic_slot_handler.as_mut() {
                handler.slot_inserted(
                    ShadowElement::component(component, shadow_root.id()),
                    init.slot,
                    placeholder,
                    &init.values,
                );
            }
            self.dynamic_slots.insert(
                init.slot,
                position,
                DynamicSlot {
                    component,
                    name: init.name,
                    placeholder,
                    values: init.values,
                },
            );
        }
    }

    fn remove_dynamic_slot(&mut self, slot: SlotId) {
        let Some(entry) = self.dynamic_slots.remove(slot) else {
            warn!("removal of unknown dynamic slot {}", slot);
            return;
        };
        if let Some(shadow_root) = self
            .element(entry.component)
            .and_then(|element| element.shadow_root())
        {
            self.remove_child(&shadow_root, &entry.placeholder);
        }
        self.release(&entry.placeholder);
        if let Some(handler) = self.dynamic_slot_handler.as_mut() {
            handler.slot_removed(slot, entry.placeholder);
        }
    }

    pub fn dynamic_slots(&self, component: &ShadowElement) -> Vec<(SlotId, ShadowElement)> {
        self.dynamic_slots
            .slots_of(component.id())
            .into_iter()
            .filter_map(|slot| {
                self.dynamic_slots
                    .placeholder(slot)
                    .map(|placeholder| (slot, placeholder))
            })
            .collect()
    }
}
