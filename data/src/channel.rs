use std::collections::{HashMap, VecDeque};

use log::{debug, error, trace, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use shadow_sync_shared::{
    BoundingClientRect, BoxModel, CallbackId, ChannelConfig, ComputedStyles, DataMessage,
    DynamicSlotInit, EventId, EventInit, InheritedRules, MatchedRules, MediaQueryResult, NodeId,
    PerformanceStats, Publisher, ScrollOffset, SlotId, ThemeInfo, TraceId, ViewMessage,
    WindowInfo, WireMessage,
};

use crate::{
    callback_manager::{Callback, CallbackManager},
    error::{DataChannelError, RenderError},
};

/// One (node, phase) notification of a relayed event
#[derive(Clone, Debug, PartialEq)]
pub struct EventNotification {
    pub current_target: NodeId,
    pub target: NodeId,
    pub mark: Value,
    pub capture: bool,
}

/// Receives events relayed from the view side.
///
/// `create_event` is called once per event id, followed by one
/// `trigger_event` per notification, then `release_event` once the view side
/// has finished dispatching it.
pub trait EventHandler {
    fn create_event(&mut self, _event: EventId, _init: &EventInit) {}

    fn trigger_event(&mut self, event: EventId, init: &EventInit, notification: &EventNotification);

    fn release_event(&mut self, _event: EventId) {}
}

/// Slot placeholder changes announced by the view side, queued until the
/// backend context applies them
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicSlotUpdate {
    Insert {
        component: NodeId,
        index: Option<u32>,
        slots: Vec<DynamicSlotInit>,
    },
    Update {
        slot: SlotId,
        values: Value,
        changed_names: Vec<String>,
    },
    Remove {
        slots: Vec<SlotId>,
    },
}

pub type CustomMethodHandler = Box<dyn FnMut(Option<NodeId>, Value)>;

/// Data side endpoint of a channel: publishes commands, keeps the callback
/// table and the live event table, and applies replies from the view side.
pub struct MessageChannelDataSide {
    publisher: Box<dyn Publisher>,
    callbacks: CallbackManager,
    events: HashMap<EventId, EventInit>,
    event_handler: Option<Box<dyn EventHandler>>,
    custom_method_handler: Option<CustomMethodHandler>,
    overlay_inspect: Option<CallbackId>,
    dynamic_slot_updates: VecDeque<DynamicSlotUpdate>,
}

impl MessageChannelDataSide {
    pub fn new(publisher: Box<dyn Publisher>, config: &ChannelConfig) -> Self {
        Self {
            publisher,
            callbacks: CallbackManager::new(config),
            events: HashMap::new(),
            event_handler: None,
            custom_method_handler: None,
            overlay_inspect: None,
            dynamic_slot_updates: VecDeque::new(),
        }
    }

    /// Swaps the transport, e.g. after the view side restarted. One-shot
    /// callbacks registered through the old transport stay in the table.
    /// Retired persistent ids are recycled, the old view can no longer reply.
    pub fn replace_publisher(&mut self, publisher: Box<dyn Publisher>) {
        self.publisher = publisher;
        self.events.clear();
        if let Some(callback) = self.overlay_inspect.take() {
            self.callbacks.release(callback);
        }
        self.callbacks.recycle_retired();
    }

    pub fn publish(&mut self, message: DataMessage) {
        trace!("publishing {:?}", message.opcode());
        self.publisher.publish(message.to_wire());
    }

    pub fn set_event_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.event_handler = Some(handler);
    }

    pub fn set_custom_method_handler(&mut self, handler: CustomMethodHandler) {
        self.custom_method_handler = Some(handler);
    }

    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Number of events created by the view side and not yet released
    pub fn live_events(&self) -> usize {
        self.events.len()
    }

    /// Drops a persistent callback registered by an earlier request
    pub fn release_callback(&mut self, id: CallbackId) -> bool {
        self.callbacks.release(id)
    }

    pub fn create<F: FnOnce(WindowInfo, ThemeInfo) + 'static>(&mut self, init: F) -> CallbackId {
        let callback = self.callbacks.register(Callback::Create(Box::new(init)));
        self.publish(DataMessage::Create { callback });
        callback
    }

    pub fn destroy(&mut self) {
        self.publish(DataMessage::Destroy);
    }

    pub fn on_window_resize<F: FnMut(WindowInfo) + 'static>(&mut self, listener: F) -> CallbackId {
        let callback = self
            .callbacks
            .register(Callback::WindowResize(Box::new(listener)));
        self.publish(DataMessage::OnWindowResize { callback });
        callback
    }

    pub fn on_theme_change<F: FnMut(ThemeInfo) + 'static>(&mut self, listener: F) -> CallbackId {
        let callback = self
            .callbacks
            .register(Callback::ThemeChange(Box::new(listener)));
        self.publish(DataMessage::OnThemeChange { callback });
        callback
    }

    pub fn render<F: FnOnce(Result<(), RenderError>) + 'static>(&mut self, done: F) {
        let callback = self.callbacks.register(Callback::Render(Box::new(done)));
        self.publish(DataMessage::Render { callback });
    }

    /// The returned id doubles as the observer id
    pub fn create_media_query_observer<F: FnMut(MediaQueryResult) + 'static>(
        &mut self,
        status: Value,
        listener: F,
    ) -> CallbackId {
        let callback = self
            .callbacks
            .register(Callback::MediaQueryObserver(Box::new(listener)));
        self.publish(DataMessage::CreateMediaQueryObserver { status, callback });
        callback
    }

    pub fn create_intersection_observer<F: FnMut(Value) + 'static>(
        &mut self,
        target: NodeId,
        relative: Option<NodeId>,
        margin: String,
        thresholds: Vec<f64>,
        listener: F,
    ) -> CallbackId {
        let callback = self
            .callbacks
            .register(Callback::IntersectionObserver(Box::new(listener)));
        self.publish(DataMessage::CreateIntersectionObserver {
            target,
            relative,
            margin,
            thresholds,
            callback,
        });
        callback
    }

    pub fn disconnect_observer(&mut self, callback: CallbackId) {
        self.publish(DataMessage::DisconnectObserver { callback });
        self.callbacks.release(callback);
    }

    pub fn set_model_binding_stat(
        &mut self,
        node: NodeId,
        attribute: String,
        listener: Box<dyn FnMut(Value)>,
    ) -> CallbackId {
        let callback = self.callbacks.register(Callback::ModelBinding(listener));
        self.publish(DataMessage::SetModelBindingStat {
            node,
            attribute,
            listener: Some(callback),
        });
        callback
    }

    pub fn get_context<F: FnOnce(Value) + 'static>(&mut self, node: NodeId, done: F) {
        let callback = self.callbacks.register(Callback::Context(Box::new(done)));
        self.publish(DataMessage::GetContext { node, callback });
    }

    pub fn get_all_computed_styles<F: FnOnce(ComputedStyles) + 'static>(
        &mut self,
        node: NodeId,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::ComputedStyles(Box::new(done)));
        self.publish(DataMessage::GetAllComputedStyles { node, callback });
    }

    pub fn get_pseudo_computed_styles<F: FnOnce(ComputedStyles) + 'static>(
        &mut self,
        node: NodeId,
        pseudo_type: String,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::ComputedStyles(Box::new(done)));
        self.publish(DataMessage::GetPseudoComputedStyles {
            node,
            pseudo_type,
            callback,
        });
    }

    pub fn get_inherited_rules<F: FnOnce(InheritedRules) + 'static>(
        &mut self,
        node: NodeId,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::InheritedRules(Box::new(done)));
        self.publish(DataMessage::GetInheritedRules { node, callback });
    }

    pub fn get_matched_rules<F: FnOnce(MatchedRules) + 'static>(&mut self, node: NodeId, done: F) {
        let callback = self
            .callbacks
            .register(Callback::MatchedRules(Box::new(done)));
        self.publish(DataMessage::GetMatchedRules { node, callback });
    }

    pub fn replace_style_sheet_all_properties<F: FnOnce(Option<u32>) + 'static>(
        &mut self,
        sheet_index: u32,
        rule_index: u32,
        inline_style: String,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::PropertyIndex(Box::new(done)));
        self.publish(DataMessage::ReplaceStyleSheetAllProperties {
            sheet_index,
            rule_index,
            inline_style,
            callback,
        });
    }

    pub fn get_bounding_client_rect<F: FnOnce(BoundingClientRect) + 'static>(
        &mut self,
        node: NodeId,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::BoundingClientRect(Box::new(done)));
        self.publish(DataMessage::GetBoundingClientRect { node, callback });
    }

    pub fn get_scroll_offset<F: FnOnce(ScrollOffset) + 'static>(&mut self, node: NodeId, done: F) {
        let callback = self
            .callbacks
            .register(Callback::ScrollOffset(Box::new(done)));
        self.publish(DataMessage::GetScrollOffset { node, callback });
    }

    pub fn get_box_model<F: FnOnce(BoxModel) + 'static>(&mut self, node: NodeId, done: F) {
        let callback = self.callbacks.register(Callback::BoxModel(Box::new(done)));
        self.publish(DataMessage::GetBoxModel { node, callback });
    }

    pub fn get_pseudo_types<F: FnOnce(Vec<String>) + 'static>(&mut self, node: NodeId, done: F) {
        let callback = self
            .callbacks
            .register(Callback::PseudoTypes(Box::new(done)));
        self.publish(DataMessage::GetPseudoTypes { node, callback });
    }

    /// Starts overlay inspection. Does nothing while an inspection is
    /// already active.
    pub fn start_overlay_inspect<F: FnMut(String, Option<NodeId>) + 'static>(&mut self, listener: F) {
        if self.overlay_inspect.is_some() {
            return;
        }
        let callback = self
            .callbacks
            .register(Callback::OverlayInspect(Box::new(listener)));
        self.overlay_inspect = Some(callback);
        self.publish(DataMessage::StartOverlayInspect { callback });
    }

    pub fn stop_overlay_inspect(&mut self) {
        let Some(callback) = self.overlay_inspect.take() else {
            return;
        };
        self.callbacks.release(callback);
        self.publish(DataMessage::StopOverlayInspect);
    }

    pub fn performance_end_trace<F: FnOnce(PerformanceStats) + 'static>(
        &mut self,
        trace: TraceId,
        done: F,
    ) {
        let callback = self
            .callbacks
            .register(Callback::PerformanceStats(Box::new(done)));
        self.publish(DataMessage::PerformanceEndTrace { trace, callback });
    }

    pub fn call_custom_method(&mut self, node: Option<NodeId>, options: Value) {
        self.publish(DataMessage::CustomMethod { node, options });
    }

    pub fn take_dynamic_slot_updates(&mut self) -> Vec<DynamicSlotUpdate> {
        self.dynamic_slot_updates.drain(..).collect()
    }

    /// Applies one message from the view side
    pub fn receive(&mut self, message: &WireMessage) -> Result<(), DataChannelError> {
        let message = ViewMessage::from_wire(message).map_err(|err| {
            error!("rejecting message from view side: {}", err);
            err
        })?;
        debug!("received {:?}", message.opcode());

        match message {
            ViewMessage::CreateCallback {
                callback,
                width,
                height,
                device_pixel_ratio,
                theme,
            } => match self.callbacks.take(callback)? {
                Callback::Create(init) => init(
                    WindowInfo {
                        width,
                        height,
                        device_pixel_ratio,
                    },
                    ThemeInfo { theme },
                ),
                other => return Err(mismatch(callback, &other, "create")),
            },
            ViewMessage::WindowResizeCallback {
                callback,
                width,
                height,
                device_pixel_ratio,
            } => match self.callbacks.get_mut(callback) {
                Some(Callback::WindowResize(listener)) => listener(WindowInfo {
                    width,
                    height,
                    device_pixel_ratio,
                }),
                Some(other) => return Err(mismatch(callback, other, "window resize")),
                None => warn_released(callback, "window resize"),
            },
            ViewMessage::ThemeChangeCallback { callback, theme } => {
                match self.callbacks.get_mut(callback) {
                    Some(Callback::ThemeChange(listener)) => listener(ThemeInfo { theme }),
                    Some(other) => return Err(mismatch(callback, other, "theme change")),
                    None => warn_released(callback, "theme change"),
                }
            }
            ViewMessage::RenderCallback {
                callback,
                error: render_error,
            } => match self.callbacks.take(callback)? {
                Callback::Render(done) => done(match render_error {
                    Some(message) => Err(RenderError(message)),
                    None => Ok(()),
                }),
                other => return Err(mismatch(callback, &other, "render")),
            },
            ViewMessage::MediaQueryObserverCallback { callback, result } => {
                let result: MediaQueryResult = parse("media query result", result)?;
                match self.callbacks.get_mut(callback) {
                    Some(Callback::MediaQueryObserver(listener)) => listener(result),
                    Some(other) => return Err(mismatch(callback, other, "media query observer")),
                    None => warn_released(callback, "media query observer"),
                }
            }
            ViewMessage::IntersectionObserverCallback { callback, result } => {
                match self.callbacks.get_mut(callback) {
                    Some(Callback::IntersectionObserver(listener)) => listener(result),
                    Some(other) => {
                        return Err(mismatch(callback, other, "intersection observer"))
                    }
                    None => warn_released(callback, "intersection observer"),
                }
            }
            ViewMessage::ModelBindingStatCallback { callback, value } => {
                match self.callbacks.get_mut(callback) {
                    Some(Callback::ModelBinding(listener)) => listener(value),
                    Some(other) => return Err(mismatch(callback, other, "model binding")),
                    None => warn_released(callback, "model binding"),
                }
            }
            ViewMessage::OverlayInspectCallback {
                callback,
                event,
                node,
            } => match self.callbacks.get_mut(callback) {
                Some(Callback::OverlayInspect(listener)) => listener(event, node),
                Some(other) => return Err(mismatch(callback, other, "overlay inspect")),
                None => warn_released(callback, "overlay inspect"),
            },
            ViewMessage::GetContextCallback { callback, context } => {
                match self.callbacks.take(callback)? {
                    Callback::Context(done) => done(context),
                    other => return Err(mismatch(callback, &other, "context")),
                }
            }
            ViewMessage::AllComputedStylesCallback { callback, styles }
            | ViewMessage::PseudoComputedStylesCallback { callback, styles } => {
                let styles: ComputedStyles = parse("computed styles", styles)?;
                match self.callbacks.take(callback)? {
                    Callback::ComputedStyles(done) => done(styles),
                    other => return Err(mismatch(callback, &other, "computed styles")),
                }
            }
            ViewMessage::InheritedRulesCallback { callback, rules } => {
                let rules: InheritedRules = parse("inherited rules", rules)?;
                match self.callbacks.take(callback)? {
                    Callback::InheritedRules(done) => done(rules),
                    other => return Err(mismatch(callback, &other, "inherited rules")),
                }
            }
            ViewMessage::MatchedRulesCallback { callback, rules } => {
                let rules: MatchedRules = parse("matched rules", rules)?;
                match self.callbacks.take(callback)? {
                    Callback::MatchedRules(done) => done(rules),
                    other => return Err(mismatch(callback, &other, "matched rules")),
                }
            }
            ViewMessage::ReplaceStyleSheetAllPropertiesCallback {
                callback,
                property_index,
            } => match self.callbacks.take(callback)? {
                Callback::PropertyIndex(done) => done(property_index),
                other => return Err(mismatch(callback, &other, "property index")),
            },
            ViewMessage::BoundingClientRectCallback { callback, rect } => {
                match self.callbacks.take(callback)? {
                    Callback::BoundingClientRect(done) => done(rect),
                    other => return Err(mismatch(callback, &other, "bounding client rect")),
                }
            }
            ViewMessage::ScrollOffsetCallback { callback, offset } => {
                match self.callbacks.take(callback)? {
                    Callback::ScrollOffset(done) => done(offset),
                    other => return Err(mismatch(callback, &other, "scroll offset")),
                }
            }
            ViewMessage::BoxModelCallback {
                callback,
                box_model,
            } => {
                let box_model: BoxModel = parse("box model", box_model)?;
                match self.callbacks.take(callback)? {
                    Callback::BoxModel(done) => done(box_model),
                    other => return Err(mismatch(callback, &other, "box model")),
                }
            }
            ViewMessage::PseudoTypesCallback { callback, types } => {
                match self.callbacks.take(callback)? {
                    Callback::PseudoTypes(done) => done(types),
                    other => return Err(mismatch(callback, &other, "pseudo types")),
                }
            }
            ViewMessage::PerformanceStatsCallback {
                callback,
                start_timestamp,
                end_timestamp,
            } => match self.callbacks.take(callback)? {
                Callback::PerformanceStats(done) => done(PerformanceStats {
                    start_timestamp,
                    end_timestamp,
                }),
                other => return Err(mismatch(callback, &other, "performance stats")),
            },
            ViewMessage::CreateEvent {
                event,
                name,
                detail,
                options,
                current_target,
                mark,
                target,
                capture,
            } => {
                let init = EventInit {
                    name,
                    detail,
                    options,
                };
                let notification = EventNotification {
                    current_target,
                    target,
                    mark,
                    capture,
                };
                if let Some(handler) = self.event_handler.as_mut() {
                    handler.create_event(event, &init);
                    handler.trigger_event(event, &init, &notification);
                } else {
                    warn!("event {} relayed without an event handler", event);
                }
                self.events.insert(event, init);
            }
            ViewMessage::Event {
                event,
                current_target,
                mark,
                target,
                capture,
            } => {
                let init = self
                    .events
                    .get(&event)
                    .ok_or(DataChannelError::UnknownEvent { event })?;
                let notification = EventNotification {
                    current_target,
                    target,
                    mark,
                    capture,
                };
                if let Some(handler) = self.event_handler.as_mut() {
                    handler.trigger_event(event, init, &notification);
                }
            }
            ViewMessage::ReleaseEvent { event } => {
                self.events
                    .remove(&event)
                    .ok_or(DataChannelError::UnknownEvent { event })?;
                if let Some(handler) = self.event_handler.as_mut() {
                    handler.release_event(event);
                }
            }
            ViewMessage::InsertDynamicSlot {
                component,
                index,
                slots,
            } => self.dynamic_slot_updates.push_back(DynamicSlotUpdate::Insert {
                component,
                index,
                slots,
            }),
            ViewMessage::UpdateDynamicSlot {
                slot,
                values,
                changed_names,
            } => self.dynamic_slot_updates.push_back(DynamicSlotUpdate::Update {
                slot,
                values,
                changed_names,
            }),
            ViewMessage::RemoveDynamicSlot { slots } => self
                .dynamic_slot_updates
                .push_back(DynamicSlotUpdate::Remove { slots }),
            ViewMessage::CustomMethodNotify { node, options } => {
                match self.custom_method_handler.as_mut() {
                    Some(handler) => handler(node, options),
                    None => debug!("custom method notification without a handler"),
                }
            }
        }
        Ok(())
    }
}

fn mismatch(callback: CallbackId, registered: &Callback, reply: &'static str) -> DataChannelError {
    error!(
        "callback {} expected a {} reply, got {}",
        callback,
        registered.kind(),
        reply
    );
    DataChannelError::CallbackKindMismatch {
        callback,
        expected: registered.kind(),
        actual: reply,
    }
}

// a persistent callback may receive replies the view side sent before it
// processed the release, its id stays retired until the transport is replaced
fn warn_released(callback: CallbackId, reply: &'static str) {
    warn!("dropping {} reply for released callback {}", reply, callback);
}

fn parse<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, DataChannelError> {
    serde_json::from_value(value).map_err(|err| DataChannelError::InvalidPayload {
        kind,
        reason: err.to_string(),
    })
}
