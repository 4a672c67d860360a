use serde_json::Value;

use crate::{
    channel::{
        wire::{ArgReader, ArgWriter, WireMessage},
        ChannelEventType,
    },
    error::ProtocolError,
    event::EventOptions,
    payload::{BoundingClientRect, DynamicSlotInit, ScrollOffset},
    types::{CallbackId, EventId, NodeId, Side, SlotId},
};

/// Messages emitted by the view side: callback replies, event relays and
/// view-managed slot notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewMessage {
    CreateCallback {
        callback: CallbackId,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        theme: String,
    },
    WindowResizeCallback {
        callback: CallbackId,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    },
    ThemeChangeCallback {
        callback: CallbackId,
        theme: String,
    },
    RenderCallback {
        callback: CallbackId,
        error: Option<String>,
    },
    MediaQueryObserverCallback {
        callback: CallbackId,
        result: Value,
    },
    IntersectionObserverCallback {
        callback: CallbackId,
        result: Value,
    },
    CreateEvent {
        event: EventId,
        name: String,
        detail: Value,
        options: EventOptions,
        current_target: NodeId,
        mark: Value,
        target: NodeId,
        capture: bool,
    },
    Event {
        event: EventId,
        current_target: NodeId,
        mark: Value,
        target: NodeId,
        capture: bool,
    },
    ReleaseEvent {
        event: EventId,
    },
    ModelBindingStatCallback {
        callback: CallbackId,
        value: Value,
    },
    GetContextCallback {
        callback: CallbackId,
        context: Value,
    },
    AllComputedStylesCallback {
        callback: CallbackId,
        styles: Value,
    },
    PseudoComputedStylesCallback {
        callback: CallbackId,
        styles: Value,
    },
    InheritedRulesCallback {
        callback: CallbackId,
        rules: Value,
    },
    MatchedRulesCallback {
        callback: CallbackId,
        rules: Value,
    },
    ReplaceStyleSheetAllPropertiesCallback {
        callback: CallbackId,
        property_index: Option<u32>,
    },
    BoundingClientRectCallback {
        callback: CallbackId,
        rect: BoundingClientRect,
    },
    ScrollOffsetCallback {
        callback: CallbackId,
        offset: ScrollOffset,
    },
    BoxModelCallback {
        callback: CallbackId,
        box_model: Value,
    },
    PseudoTypesCallback {
        callback: CallbackId,
        types: Vec<String>,
    },
    OverlayInspectCallback {
        callback: CallbackId,
        event: String,
        node: Option<NodeId>,
    },
    PerformanceStatsCallback {
        callback: CallbackId,
        start_timestamp: f64,
        end_timestamp: f64,
    },
    InsertDynamicSlot {
        component: NodeId,
        /// Position among the component's current dynamic slots, `None` to append
        index: Option<u32>,
        slots: Vec<DynamicSlotInit>,
    },
    UpdateDynamicSlot {
        slot: SlotId,
        values: Value,
        changed_names: Vec<String>,
    },
    RemoveDynamicSlot {
        slots: Vec<SlotId>,
    },
    CustomMethodNotify {
        node: Option<NodeId>,
        options: Value,
    },
}

impl ViewMessage {
    pub fn opcode(&self) -> ChannelEventType {
        use ChannelEventType as T;
        match self {
            ViewMessage::CreateCallback { .. } => T::CreateCallback,
            ViewMessage::WindowResizeCallback { .. } => T::OnWindowResizeCallback,
            ViewMessage::ThemeChangeCallback { .. } => T::OnThemeChangeCallback,
            ViewMessage::RenderCallback { .. } => T::RenderCallback,
            ViewMessage::MediaQueryObserverCallback { .. } => T::MediaQueryObserverCallback,
            ViewMessage::IntersectionObserverCallback { .. } => T::IntersectionObserverCallback,
            ViewMessage::CreateEvent { .. } => T::OnCreateEvent,
            ViewMessage::Event { .. } => T::OnEvent,
            ViewMessage::ReleaseEvent { .. } => T::OnReleaseEvent,
            ViewMessage::ModelBindingStatCallback { .. } => T::SetModelBindingStatCallback,
            ViewMessage::GetContextCallback { .. } => T::GetContextCallback,
            ViewMessage::AllComputedStylesCallback { .. } => T::GetAllComputedStylesCallback,
            ViewMessage::PseudoComputedStylesCallback { .. } => T::GetPseudoComputedStylesCallback,
            ViewMessage::InheritedRulesCallback { .. } => T::GetInheritedRulesCallback,
            ViewMessage::MatchedRulesCallback { .. } => T::GetMatchedRulesCallback,
            ViewMessage::ReplaceStyleSheetAllPropertiesCallback { .. } => {
                T::ReplaceStyleSheetAllPropertiesCallback
            }
            ViewMessage::BoundingClientRectCallback { .. } => T::GetBoundingClientRectCallback,
            ViewMessage::ScrollOffsetCallback { .. } => T::GetScrollOffsetCallback,
            ViewMessage::BoxModelCallback { .. } => T::GetBoxModelCallback,
            ViewMessage::PseudoTypesCallback { .. } => T::GetPseudoTypesCallback,
            ViewMessage::OverlayInspectCallback { .. } => T::StartOverlayInspectCallback,
            ViewMessage::PerformanceStatsCallback { .. } => T::PerformanceStatsCallback,
            ViewMessage::InsertDynamicSlot { .. } => T::InsertDynamicSlot,
            ViewMessage::UpdateDynamicSlot { .. } => T::UpdateDynamicSlot,
            ViewMessage::RemoveDynamicSlot { .. } => T::RemoveDynamicSlot,
            ViewMessage::CustomMethodNotify { .. } => T::CustomMethodNotify,
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        let mut writer = ArgWriter::new(self.opcode());
        self.ser(&mut writer);
        writer.finish()
    }

    /// Decodes a message received by the data side. Unknown opcodes and
    /// opcodes only the data side may emit are rejected.
    pub fn from_wire(message: &WireMessage) -> Result<Self, ProtocolError> {
        let opcode = ChannelEventType::for_receiver(message.raw_opcode()?, Side::Data)?;
        let mut reader = ArgReader::new(opcode, message);
        let decoded = Self::de(&mut reader)?;
        reader.finish()?;
        Ok(decoded)
    }

    fn ser(&self, writer: &mut ArgWriter) {
        match self {
            ViewMessage::CreateCallback {
                callback,
                width,
                height,
                device_pixel_ratio,
                theme,
            } => {
                writer.write(callback);
                writer.write(width);
                writer.write(height);
                writer.write(device_pixel_ratio);
                writer.write(theme);
            }
            ViewMessage::WindowResizeCallback {
                callback,
                width,
                height,
                device_pixel_ratio,
            } => {
                writer.write(callback);
                writer.write(width);
                writer.write(height);
                writer.write(device_pixel_ratio);
            }
            ViewMessage::ThemeChangeCallback { callback, theme } => {
                writer.write(callback);
                writer.write(theme);
            }
            ViewMessage::RenderCallback { callback, error } => {
                writer.write(callback);
                writer.write(error);
            }
            ViewMessage::MediaQueryObserverCallback {
                callback,
                result: payload,
            }
            | ViewMessage::IntersectionObserverCallback {
                callback,
                result: payload,
            }
            | ViewMessage::ModelBindingStatCallback {
                callback,
                value: payload,
            }
            | ViewMessage::GetContextCallback {
                callback,
                context: payload,
            }
            | ViewMessage::AllComputedStylesCallback {
                callback,
                styles: payload,
            }
            | ViewMessage::PseudoComputedStylesCallback {
                callback,
                styles: payload,
            }
            | ViewMessage::InheritedRulesCallback {
                callback,
                rules: payload,
            }
            | ViewMessage::MatchedRulesCallback {
                callback,
                rules: payload,
            }
            | ViewMessage::BoxModelCallback {
                callback,
                box_model: payload,
            } => {
                writer.write(callback);
                writer.write_json(payload);
            }
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
                writer.write(event);
                writer.write(name);
                writer.write_json(detail);
                writer.write_json(&options_to_json(options));
                writer.write(current_target);
                writer.write_json(mark);
                writer.write(target);
                writer.write(capture);
            }
            ViewMessage::Event {
                event,
                current_target,
                mark,
                target,
                capture,
            } => {
                writer.write(event);
                writer.write(current_target);
                writer.write_json(mark);
                writer.write(target);
                writer.write(capture);
            }
            ViewMessage::ReleaseEvent { event } => writer.write(event),
            ViewMessage::ReplaceStyleSheetAllPropertiesCallback {
                callback,
                property_index,
            } => {
                writer.write(callback);
                writer.write(property_index);
            }
            ViewMessage::BoundingClientRectCallback { callback, rect } => {
                writer.write(callback);
                writer.write(&rect.left);
                writer.write(&rect.top);
                writer.write(&rect.width);
                writer.write(&rect.height);
            }
            ViewMessage::ScrollOffsetCallback { callback, offset } => {
                writer.write(callback);
                writer.write(&offset.scroll_left);
                writer.write(&offset.scroll_top);
                writer.write(&offset.scroll_width);
                writer.write(&offset.scroll_height);
            }
            ViewMessage::PseudoTypesCallback { callback, types } => {
                writer.write(callback);
                writer.write(types);
            }
            ViewMessage::OverlayInspectCallback {
                callback,
                event,
                node,
            } => {
                writer.write(callback);
                writer.write(event);
                writer.write(node);
            }
            ViewMessage::PerformanceStatsCallback {
                callback,
                start_timestamp,
                end_timestamp,
            } => {
                writer.write(callback);
                writer.write(start_timestamp);
                writer.write(end_timestamp);
            }
            ViewMessage::InsertDynamicSlot {
                component,
                index,
                slots,
            } => {
                writer.write(component);
                writer.write(index);
                let slots: Vec<Value> = slots
                    .iter()
                    .map(|slot| {
                        Value::Array(vec![
                            Value::from(slot.slot.value()),
                            Value::String(slot.name.clone()),
                            Value::String(slot.values.to_string()),
                        ])
                    })
                    .collect();
                writer.write(&Value::Array(slots));
            }
            ViewMessage::UpdateDynamicSlot {
                slot,
                values,
                changed_names,
            } => {
                writer.write(slot);
                writer.write_json(values);
                writer.write(changed_names);
            }
            ViewMessage::RemoveDynamicSlot { slots } => writer.write(slots),
            ViewMessage::CustomMethodNotify { node, options } => {
                writer.write(node);
                writer.write(options);
            }
        }
    }

    fn de(reader: &mut ArgReader) -> Result<Self, ProtocolError> {
        use ChannelEventType as T;
        let message = match reader.opcode() {
            T::CreateCallback => ViewMessage::CreateCallback {
                callback: reader.read()?,
                width: reader.read()?,
                height: reader.read()?,
                device_pixel_ratio: reader.read()?,
                theme: reader.read()?,
            },
            T::OnWindowResizeCallback => ViewMessage::WindowResizeCallback {
                callback: reader.read()?,
                width: reader.read()?,
                height: reader.read()?,
                device_pixel_ratio: reader.read()?,
            },
            T::OnThemeChangeCallback => ViewMessage::ThemeChangeCallback {
                callback: reader.read()?,
                theme: reader.read()?,
            },
            T::RenderCallback => ViewMessage::RenderCallback {
                callback: reader.read()?,
                error: reader.read()?,
            },
            T::MediaQueryObserverCallback => ViewMessage::MediaQueryObserverCallback {
                callback: reader.read()?,
                result: reader.read_json()?,
            },
            T::IntersectionObserverCallback => ViewMessage::IntersectionObserverCallback {
                callback: reader.read()?,
                result: reader.read_json()?,
            },
            T::OnCreateEvent => {
                let event = reader.read()?;
                let name = reader.read()?;
                let detail = reader.read_json()?;
                let options = serde_json::from_value(reader.read_json()?)
                    .map_err(|err| reader.payload_error(err.to_string()))?;
                ViewMessage::CreateEvent {
                    event,
                    name,
                    detail,
                    options,
                    current_target: reader.read()?,
                    mark: reader.read_json()?,
                    target: reader.read()?,
                    capture: reader.read()?,
                }
            }
            T::OnEvent => ViewMessage::Event {
                event: reader.read()?,
                current_target: reader.read()?,
                mark: reader.read_json()?,
                target: reader.read()?,
                capture: reader.read()?,
            },
            T::OnReleaseEvent => ViewMessage::ReleaseEvent {
                event: reader.read()?,
            },
            T::SetModelBindingStatCallback => ViewMessage::ModelBindingStatCallback {
                callback: reader.read()?,
                value: reader.read_json()?,
            },
            T::GetContextCallback => ViewMessage::GetContextCallback {
                callback: reader.read()?,
                context: reader.read_json()?,
            },
            T::GetAllComputedStylesCallback => ViewMessage::AllComputedStylesCallback {
                callback: reader.read()?,
                styles: reader.read_json()?,
            },
            T::GetPseudoComputedStylesCallback => ViewMessage::PseudoComputedStylesCallback {
                callback: reader.read()?,
                styles: reader.read_json()?,
            },
            T::GetInheritedRulesCallback => ViewMessage::InheritedRulesCallback {
                callback: reader.read()?,
                rules: reader.read_json()?,
            },
            T::GetMatchedRulesCallback => ViewMessage::MatchedRulesCallback {
                callback: reader.read()?,
                rules: reader.read_json()?,
            },
            T::ReplaceStyleSheetAllPropertiesCallback => {
                ViewMessage::ReplaceStyleSheetAllPropertiesCallback {
                    callback: reader.read()?,
                    property_index: reader.read()?,
                }
            }
            T::GetBoundingClientRectCallback => ViewMessage::BoundingClientRectCallback {
                callback: reader.read()?,
                rect: BoundingClientRect {
                    left: reader.read()?,
                    top: reader.read()?,
                    width: reader.read()?,
                    height: reader.read()?,
                },
            },
            T::GetScrollOffsetCallback => ViewMessage::ScrollOffsetCallback {
                callback: reader.read()?,
                offset: ScrollOffset {
                    scroll_left: reader.read()?,
                    scroll_top: reader.read()?,
                    scroll_width: reader.read()?,
                    scroll_height: reader.read()?,
                },
            },
            T::GetBoxModelCallback => ViewMessage::BoxModelCallback {
                callback: reader.read()?,
                box_model: reader.read_json()?,
            },
            T::GetPseudoTypesCallback => ViewMessage::PseudoTypesCallback {
                callback: reader.read()?,
                types: reader.read()?,
            },
            T::StartOverlayInspectCallback => ViewMessage::OverlayInspectCallback {
                callback: reader.read()?,
                event: reader.read()?,
                node: reader.read()?,
            },
            T::PerformanceStatsCallback => ViewMessage::PerformanceStatsCallback {
                callback: reader.read()?,
                start_timestamp: reader.read()?,
                end_timestamp: reader.read()?,
            },
            T::InsertDynamicSlot => {
                let component = reader.read()?;
                let index = reader.read()?;
                let raw: Value = reader.read()?;
                let slots = dynamic_slots_from_json(&raw)
                    .ok_or_else(|| reader.payload_error("malformed dynamic slot list"))?;
                ViewMessage::InsertDynamicSlot {
                    component,
                    index,
                    slots,
                }
            }
            T::UpdateDynamicSlot => ViewMessage::UpdateDynamicSlot {
                slot: reader.read()?,
                values: reader.read_json()?,
                changed_names: reader.read()?,
            },
            T::RemoveDynamicSlot => ViewMessage::RemoveDynamicSlot {
                slots: reader.read()?,
            },
            T::CustomMethodNotify => ViewMessage::CustomMethodNotify {
                node: reader.read()?,
                options: reader.read()?,
            },
            opcode => {
                return Err(ProtocolError::WrongDirection {
                    opcode,
                    sender: Side::Data,
                })
            }
        };
        Ok(message)
    }
}

fn options_to_json(options: &EventOptions) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("bubbles".to_string(), Value::Bool(options.bubbles));
    map.insert("composed".to_string(), Value::Bool(options.composed));
    if !options.extra_fields.is_null() {
        map.insert("extraFields".to_string(), options.extra_fields.clone());
    }
    Value::Object(map)
}

// `[[slotId, name, "<json values>"], ...]`
fn dynamic_slots_from_json(value: &Value) -> Option<Vec<DynamicSlotInit>> {
    value
        .as_array()?
        .iter()
        .map(|entry| {
            let entry = entry.as_array()?;
            let slot = entry
                .first()?
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v != 0)?;
            let name = entry.get(1)?.as_str()?.to_string();
            let values = serde_json::from_str(entry.get(2)?.as_str()?).ok()?;
            Some(DynamicSlotInit {
                slot: SlotId::new(slot),
                name,
                values,
            })
        })
        .collect()
}
