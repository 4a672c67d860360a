use std::{fmt::Debug, hash::Hash};

use serde_json::Value;

use shadow_sync_shared::{
    AssociateValueInfo, BoundingClientRect, BoxModel, ComputedStyles, DataChange, EventMutLevel,
    EventOptions, InheritedRules, MatchedRules, MediaQueryResult, ScrollOffset, SlotMode,
    ThemeInfo, WindowInfo,
};

/// Component creation parameters, with style scopes already translated to
/// the backend's own scope ids
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentInit {
    pub tag_name: String,
    pub external: bool,
    pub virtual_host: bool,
    pub style_scope: Option<u32>,
    pub extra_style_scope: Option<u32>,
    pub external_classes: Option<Vec<String>>,
    pub slot_mode: Option<SlotMode>,
    pub write_id_to_dom: bool,
}

/// One notification of an event dispatched by the backend.
///
/// Every notification belonging to the same dispatch carries the same
/// `dispatch_id`, which is how the relay groups them under one event id.
#[derive(Clone, Debug)]
pub struct ViewEvent<N> {
    pub dispatch_id: u64,
    pub name: String,
    pub detail: Value,
    pub options: EventOptions,
    pub current_target: N,
    pub target: N,
    pub mark: Value,
    pub capture: bool,
}

pub type EventListener<N> = Box<dyn FnMut(&ViewEvent<N>)>;
pub type ValueListener = Box<dyn FnMut(Value)>;
pub type OverlayListener<N> = Box<dyn FnMut(String, Option<N>)>;

/// Handle of a live media query or intersection observer
pub trait ViewObserver {
    fn disconnect(&mut self);
}

/// The concrete tree a view side renders into.
///
/// Structural and attribute operations are required. Environment hooks,
/// observers and introspection have defaults, so a backend lacking one of
/// those capabilities still answers every query with an empty result.
pub trait ViewBackend {
    type Node: Clone + Eq + Hash + Debug + 'static;

    /// Container standing in for the data side's root shadow root
    fn root(&self) -> Self::Node;

    fn window_info(&self) -> WindowInfo {
        WindowInfo::default()
    }

    fn theme(&self) -> ThemeInfo {
        ThemeInfo::default()
    }

    fn on_window_resize(&mut self, _listener: Box<dyn FnMut(WindowInfo)>) {}

    fn on_theme_change(&mut self, _listener: Box<dyn FnMut(ThemeInfo)>) {}

    fn render(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn destroy(&mut self) {}

    // Creation

    fn create_element(
        &mut self,
        logical_name: &str,
        styling_name: &str,
        owner: Option<&Self::Node>,
    ) -> Self::Node;

    fn create_text_node(&mut self, text: &str, owner: Option<&Self::Node>) -> Self::Node;

    fn create_virtual_node(&mut self, name: &str, owner: Option<&Self::Node>) -> Self::Node;

    /// Creates a component rendered by this backend. Returns the component
    /// and its shadow root.
    fn create_component(
        &mut self,
        init: &ComponentInit,
        owner: Option<&Self::Node>,
    ) -> (Self::Node, Self::Node);

    /// Creates a component whose rendering is delegated to the host
    /// framework, `None` when the tag is not known as such
    fn create_external_component(
        &mut self,
        _init: &ComponentInit,
        _owner: Option<&Self::Node>,
    ) -> Option<(Self::Node, Self::Node)> {
        None
    }

    fn release(&mut self, node: &Self::Node);

    // Structure

    fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: &Self::Node);

    fn replace_child(&mut self, parent: &Self::Node, child: &Self::Node, old_child: &Self::Node);

    /// Removes `delete_count` children starting at `index`, then inserts
    /// `insert` at `index`
    fn splice_children(
        &mut self,
        parent: &Self::Node,
        index: usize,
        delete_count: usize,
        insert: &[Self::Node],
    );

    /// Marks a node placed directly under (or removed from) the root
    fn set_attached(&mut self, _node: &Self::Node, _attached: bool) {}

    // Attributes

    fn set_id(&mut self, node: &Self::Node, id: &str);

    fn set_slot(&mut self, node: &Self::Node, name: &str);

    fn set_slot_name(&mut self, node: &Self::Node, name: &str);

    fn set_slot_element(&mut self, node: &Self::Node, slot: Option<&Self::Node>);

    fn set_inherit_slots(&mut self, node: &Self::Node);

    fn set_style(&mut self, node: &Self::Node, style: &str, segment: u32);

    fn add_class(&mut self, node: &Self::Node, class: &str);

    fn remove_class(&mut self, node: &Self::Node, class: &str);

    fn clear_classes(&mut self, node: &Self::Node);

    fn set_class_alias(&mut self, _node: &Self::Node, _class: &str, _targets: &[String]) {}

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &Value);

    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn set_dataset(&mut self, node: &Self::Node, name: &str, value: &Value);

    fn set_text(&mut self, node: &Self::Node, text: &str);

    // Events and values

    /// Registers the relay for one event type and phase. An earlier
    /// registration for the same type and phase is removed before this call.
    fn set_listener(
        &mut self,
        node: &Self::Node,
        event_type: &str,
        capture: bool,
        mut_level: EventMutLevel,
        listener: EventListener<Self::Node>,
    );

    fn remove_listener(&mut self, node: &Self::Node, event_type: &str, capture: bool);

    fn set_model_binding_listener(
        &mut self,
        _node: &Self::Node,
        _attribute: &str,
        _listener: ValueListener,
    ) {
    }

    fn associate_value(&mut self, _node: &Self::Node, _info: &AssociateValueInfo) {}

    fn init_values(&mut self, _component: &Self::Node, _values: &Value) {}

    fn update_values(&mut self, _component: &Self::Node, _changes: &[DataChange]) {}

    // Styles

    fn register_style_sheet_content(&mut self, _path: &str, _content: &Value) {}

    /// Returns the backend's id for the new scope
    fn register_style_scope(&mut self, prefix: Option<&str>) -> u32;

    /// Returns the backend's index of the appended sheet
    fn append_style_sheet_path(&mut self, path: &str, scope: Option<u32>) -> u32;

    fn disable_style_sheet(&mut self, _index: u32) {}

    // Observers

    fn create_media_query_observer(
        &mut self,
        _status: &Value,
        _listener: Box<dyn FnMut(MediaQueryResult)>,
    ) -> Option<Box<dyn ViewObserver>> {
        None
    }

    fn create_intersection_observer(
        &mut self,
        _target: &Self::Node,
        _relative: Option<&Self::Node>,
        _margin: &str,
        _thresholds: &[f64],
        _listener: ValueListener,
    ) -> Option<Box<dyn ViewObserver>> {
        None
    }

    // Introspection

    fn get_context(&self, _node: &Self::Node) -> Option<Value> {
        None
    }

    fn get_all_computed_styles(&self, _node: &Self::Node) -> Option<ComputedStyles> {
        None
    }

    fn get_pseudo_computed_styles(
        &self,
        _node: &Self::Node,
        _pseudo_type: &str,
    ) -> Option<ComputedStyles> {
        None
    }

    fn get_inherited_rules(&self, _node: &Self::Node) -> Option<InheritedRules> {
        None
    }

    fn get_matched_rules(&self, _node: &Self::Node) -> Option<MatchedRules> {
        None
    }

    fn replace_style_sheet_all_properties(
        &mut self,
        _sheet_index: u32,
        _rule_index: u32,
        _inline_style: &str,
    ) -> Option<u32> {
        None
    }

    fn get_bounding_client_rect(&self, _node: &Self::Node) -> Option<BoundingClientRect> {
        None
    }

    fn get_scroll_offset(&self, _node: &Self::Node) -> Option<ScrollOffset> {
        None
    }

    fn get_box_model(&self, _node: &Self::Node) -> Option<BoxModel> {
        None
    }

    fn get_pseudo_types(&self, _node: &Self::Node) -> Option<Vec<String>> {
        None
    }

    fn set_scroll_position(&mut self, _node: &Self::Node, _left: f64, _top: f64, _duration: f64) {
    }

    fn start_overlay_inspect(&mut self, _listener: OverlayListener<Self::Node>) {}

    fn stop_overlay_inspect(&mut self) {}

    fn handle_custom_method(&mut self, _node: Option<&Self::Node>, _options: &Value) {}
}
