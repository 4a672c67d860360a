use serde_json::Value;

use crate::{
    channel::{
        wire::{ArgReader, ArgWriter, WireMessage},
        ChannelEventType,
    },
    error::ProtocolError,
    event::EventMutLevel,
    payload::{AssociateValueInfo, DataChange, SlotMode},
    types::{CallbackId, NodeId, Side, StyleScopeId, StyleSheetId, TraceId},
};

/// Messages emitted by the data side.
///
/// A parent or owner of `None` denotes the data side's single root shadow
/// root, which the view side represents by its root container.
#[derive(Clone, Debug, PartialEq)]
pub enum DataMessage {
    Create {
        callback: CallbackId,
    },
    Destroy,
    OnWindowResize {
        callback: CallbackId,
    },
    OnThemeChange {
        callback: CallbackId,
    },
    Render {
        callback: CallbackId,
    },
    CreateMediaQueryObserver {
        status: Value,
        callback: CallbackId,
    },
    CreateIntersectionObserver {
        target: NodeId,
        relative: Option<NodeId>,
        margin: String,
        thresholds: Vec<f64>,
        callback: CallbackId,
    },
    DisconnectObserver {
        callback: CallbackId,
    },

    CreateElement {
        id: NodeId,
        logical_name: String,
        styling_name: String,
        owner: Option<NodeId>,
    },
    CreateComponent {
        id: NodeId,
        shadow_root: NodeId,
        tag_name: String,
        external: bool,
        virtual_host: bool,
        style_scope: Option<StyleScopeId>,
        extra_style_scope: Option<StyleScopeId>,
        external_classes: Option<Vec<String>>,
        slot_mode: Option<SlotMode>,
        write_id_to_dom: bool,
        owner: Option<NodeId>,
    },
    CreateTextNode {
        id: NodeId,
        text: String,
        owner: Option<NodeId>,
    },
    CreateVirtualNode {
        id: NodeId,
        name: String,
        owner: Option<NodeId>,
    },
    CreateFragment {
        id: NodeId,
    },
    Release {
        id: NodeId,
    },

    AppendChild {
        parent: Option<NodeId>,
        child: NodeId,
    },
    RemoveChild {
        parent: Option<NodeId>,
        child: NodeId,
    },
    InsertBefore {
        parent: Option<NodeId>,
        child: NodeId,
        before: NodeId,
    },
    ReplaceChild {
        parent: Option<NodeId>,
        child: NodeId,
        old_child: NodeId,
    },
    SpliceBefore {
        parent: Option<NodeId>,
        before: NodeId,
        delete_count: u32,
        fragment: NodeId,
    },
    SpliceAppend {
        parent: Option<NodeId>,
        fragment: NodeId,
    },
    SpliceRemove {
        parent: Option<NodeId>,
        start: NodeId,
        delete_count: u32,
    },

    SetId {
        node: NodeId,
        id: String,
    },
    SetSlot {
        node: NodeId,
        name: String,
    },
    SetSlotName {
        node: NodeId,
        name: String,
    },
    SetSlotElement {
        node: NodeId,
        slot: Option<NodeId>,
    },
    SetInheritSlots {
        node: NodeId,
    },
    RegisterStyleScope {
        scope: StyleScopeId,
        prefix: Option<String>,
    },
    SetStyle {
        node: NodeId,
        style: String,
        segment: u32,
    },
    AddClass {
        node: NodeId,
        class: String,
    },
    RemoveClass {
        node: NodeId,
        class: String,
    },
    ClearClasses {
        node: NodeId,
    },
    SetClassAlias {
        node: NodeId,
        class: String,
        targets: Vec<String>,
    },
    SetAttribute {
        node: NodeId,
        name: String,
        value: Value,
    },
    RemoveAttribute {
        node: NodeId,
        name: String,
    },
    SetDataset {
        node: NodeId,
        name: String,
        value: Value,
    },
    SetText {
        node: NodeId,
        text: String,
    },
    SetListenerStats {
        node: NodeId,
        event_type: String,
        capture: bool,
        mut_level: EventMutLevel,
    },

    SetModelBindingStat {
        node: NodeId,
        attribute: String,
        listener: Option<CallbackId>,
    },
    GetContext {
        node: NodeId,
        callback: CallbackId,
    },

    AssociateValue {
        node: NodeId,
        info: AssociateValueInfo,
    },

    InitValues {
        node: NodeId,
        values: Value,
    },
    UpdateValues {
        node: NodeId,
        changes: Vec<DataChange>,
    },

    RegisterStyleSheetContent {
        path: String,
        content: Value,
    },
    AppendStyleSheetPath {
        sheet: StyleSheetId,
        path: String,
        scope: Option<StyleScopeId>,
    },
    DisableStyleSheet {
        sheet: StyleSheetId,
    },

    GetAllComputedStyles {
        node: NodeId,
        callback: CallbackId,
    },
    GetPseudoComputedStyles {
        node: NodeId,
        pseudo_type: String,
        callback: CallbackId,
    },
    GetInheritedRules {
        node: NodeId,
        callback: CallbackId,
    },
    GetMatchedRules {
        node: NodeId,
        callback: CallbackId,
    },
    ReplaceStyleSheetAllProperties {
        sheet_index: u32,
        rule_index: u32,
        inline_style: String,
        callback: CallbackId,
    },
    GetBoundingClientRect {
        node: NodeId,
        callback: CallbackId,
    },
    GetScrollOffset {
        node: NodeId,
        callback: CallbackId,
    },
    SetScrollPosition {
        node: NodeId,
        left: f64,
        top: f64,
        duration: f64,
    },
    GetBoxModel {
        node: NodeId,
        callback: CallbackId,
    },
    GetPseudoTypes {
        node: NodeId,
        callback: CallbackId,
    },
    StartOverlayInspect {
        callback: CallbackId,
    },
    StopOverlayInspect,

    PerformanceStartTrace {
        trace: TraceId,
    },
    PerformanceEndTrace {
        trace: TraceId,
        callback: CallbackId,
    },

    CustomMethod {
        node: Option<NodeId>,
        options: Value,
    },
}

impl DataMessage {
    pub fn opcode(&self) -> ChannelEventType {
        use ChannelEventType as T;
        match self {
            DataMessage::Create { .. } => T::Create,
            DataMessage::Destroy => T::Destroy,
            DataMessage::OnWindowResize { .. } => T::OnWindowResize,
            DataMessage::OnThemeChange { .. } => T::OnThemeChange,
            DataMessage::Render { .. } => T::Render,
            DataMessage::CreateMediaQueryObserver { .. } => T::CreateMediaQueryObserver,
            DataMessage::CreateIntersectionObserver { .. } => T::CreateIntersectionObserver,
            DataMessage::DisconnectObserver { .. } => T::DisconnectObserver,
            DataMessage::CreateElement { .. } => T::CreateElement,
            DataMessage::CreateComponent { .. } => T::CreateComponent,
            DataMessage::CreateTextNode { .. } => T::CreateTextNode,
            DataMessage::CreateVirtualNode { .. } => T::CreateVirtualNode,
            DataMessage::CreateFragment { .. } => T::CreateFragment,
            DataMessage::Release { .. } => T::Release,
            DataMessage::AppendChild { .. } => T::AppendChild,
            DataMessage::RemoveChild { .. } => T::RemoveChild,
            DataMessage::InsertBefore { .. } => T::InsertBefore,
            DataMessage::ReplaceChild { .. } => T::ReplaceChild,
            DataMessage::SpliceBefore { .. } => T::SpliceBefore,
            DataMessage::SpliceAppend { .. } => T::SpliceAppend,
            DataMessage::SpliceRemove { .. } => T::SpliceRemove,
            DataMessage::SetId { .. } => T::SetId,
            DataMessage::SetSlot { .. } => T::SetSlot,
            DataMessage::SetSlotName { .. } => T::SetSlotName,
            DataMessage::SetSlotElement { .. } => T::SetSlotElement,
            DataMessage::SetInheritSlots { .. } => T::SetInheritSlots,
            DataMessage::RegisterStyleScope { .. } => T::RegisterStyleScope,
            DataMessage::SetStyle { .. } => T::SetStyle,
            DataMessage::AddClass { .. } => T::AddClass,
            DataMessage::RemoveClass { .. } => T::RemoveClass,
            DataMessage::ClearClasses { .. } => T::ClearClasses,
            DataMessage::SetClassAlias { .. } => T::SetClassAlias,
            DataMessage::SetAttribute { .. } => T::SetAttribute,
            DataMessage::RemoveAttribute { .. } => T::RemoveAttribute,
            DataMessage::SetDataset { .. } => T::SetDataset,
            DataMessage::SetText { .. } => T::SetText,
            DataMessage::SetListenerStats { .. } => T::SetListenerStats,
            DataMessage::SetModelBindingStat { .. } => T::SetModelBindingStat,
            DataMessage::GetContext { .. } => T::GetContext,
            DataMessage::AssociateValue { .. } => T::AssociateValue,
            DataMessage::InitValues { .. } => T::InitValues,
            DataMessage::UpdateValues { .. } => T::UpdateValues,
            DataMessage::RegisterStyleSheetContent { .. } => T::RegisterStyleSheetContent,
            DataMessage::AppendStyleSheetPath { .. } => T::AppendStyleSheetPath,
            DataMessage::DisableStyleSheet { .. } => T::DisableStyleSheet,
            DataMessage::GetAllComputedStyles { .. } => T::GetAllComputedStyles,
            DataMessage::GetPseudoComputedStyles { .. } => T::GetPseudoComputedStyles,
            DataMessage::GetInheritedRules { .. } => T::GetInheritedRules,
            DataMessage::GetMatchedRules { .. } => T::GetMatchedRules,
            DataMessage::ReplaceStyleSheetAllProperties { .. } => {
                T::ReplaceStyleSheetAllProperties
            }
            DataMessage::GetBoundingClientRect { .. } => T::GetBoundingClientRect,
            DataMessage::GetScrollOffset { .. } => T::GetScrollOffset,
            DataMessage::SetScrollPosition { .. } => T::SetScrollPosition,
            DataMessage::GetBoxModel { .. } => T::GetBoxModel,
            DataMessage::GetPseudoTypes { .. } => T::GetPseudoTypes,
            DataMessage::StartOverlayInspect { .. } => T::StartOverlayInspect,
            DataMessage::StopOverlayInspect => T::StopOverlayInspect,
            DataMessage::PerformanceStartTrace { .. } => T::PerformanceStartTrace,
            DataMessage::PerformanceEndTrace { .. } => T::PerformanceEndTrace,
            DataMessage::CustomMethod { .. } => T::CustomMethod,
        }
    }

    /// Every node id this message refers to without creating it
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        match self {
            DataMessage::Create { .. }
            | DataMessage::Destroy
            | DataMessage::OnWindowResize { .. }
            | DataMessage::OnThemeChange { .. }
            | DataMessage::Render { .. }
            | DataMessage::CreateMediaQueryObserver { .. }
            | DataMessage::DisconnectObserver { .. }
            | DataMessage::CreateFragment { .. }
            | DataMessage::RegisterStyleScope { .. }
            | DataMessage::RegisterStyleSheetContent { .. }
            | DataMessage::AppendStyleSheetPath { .. }
            | DataMessage::DisableStyleSheet { .. }
            | DataMessage::ReplaceStyleSheetAllProperties { .. }
            | DataMessage::StartOverlayInspect { .. }
            | DataMessage::StopOverlayInspect
            | DataMessage::PerformanceStartTrace { .. }
            | DataMessage::PerformanceEndTrace { .. } => {}
            DataMessage::CreateIntersectionObserver {
                target, relative, ..
            } => {
                nodes.push(*target);
                nodes.extend(relative);
            }
            DataMessage::CreateElement { owner, .. }
            | DataMessage::CreateComponent { owner, .. }
            | DataMessage::CreateTextNode { owner, .. }
            | DataMessage::CreateVirtualNode { owner, .. } => nodes.extend(owner),
            DataMessage::CustomMethod { node, .. } => nodes.extend(node),
            DataMessage::Release { id } => nodes.push(*id),
            DataMessage::AppendChild { parent, child } | DataMessage::RemoveChild { parent, child } => {
                nodes.extend(parent);
                nodes.push(*child);
            }
            DataMessage::InsertBefore {
                parent,
                child,
                before,
            } => {
                nodes.extend(parent);
                nodes.push(*child);
                nodes.push(*before);
            }
            DataMessage::ReplaceChild {
                parent,
                child,
                old_child,
            } => {
                nodes.extend(parent);
                nodes.push(*child);
                nodes.push(*old_child);
            }
            DataMessage::SpliceBefore {
                parent,
                before,
                fragment,
                ..
            } => {
                nodes.extend(parent);
                nodes.push(*before);
                nodes.push(*fragment);
            }
            DataMessage::SpliceAppend { parent, fragment } => {
                nodes.extend(parent);
                nodes.push(*fragment);
            }
            DataMessage::SpliceRemove { parent, start, .. } => {
                nodes.extend(parent);
                nodes.push(*start);
            }
            DataMessage::SetSlotElement { node, slot } => {
                nodes.push(*node);
                nodes.extend(slot);
            }
            DataMessage::SetId { node, .. }
            | DataMessage::SetSlot { node, .. }
            | DataMessage::SetSlotName { node, .. }
            | DataMessage::SetInheritSlots { node }
            | DataMessage::SetStyle { node, .. }
            | DataMessage::AddClass { node, .. }
            | DataMessage::RemoveClass { node, .. }
            | DataMessage::ClearClasses { node }
            | DataMessage::SetClassAlias { node, .. }
            | DataMessage::SetAttribute { node, .. }
            | DataMessage::RemoveAttribute { node, .. }
            | DataMessage::SetDataset { node, .. }
            | DataMessage::SetText { node, .. }
            | DataMessage::SetListenerStats { node, .. }
            | DataMessage::SetModelBindingStat { node, .. }
            | DataMessage::GetContext { node, .. }
            | DataMessage::AssociateValue { node, .. }
            | DataMessage::InitValues { node, .. }
            | DataMessage::UpdateValues { node, .. }
            | DataMessage::GetAllComputedStyles { node, .. }
            | DataMessage::GetPseudoComputedStyles { node, .. }
            | DataMessage::GetInheritedRules { node, .. }
            | DataMessage::GetMatchedRules { node, .. }
            | DataMessage::GetBoundingClientRect { node, .. }
            | DataMessage::GetScrollOffset { node, .. }
            | DataMessage::SetScrollPosition { node, .. }
            | DataMessage::GetBoxModel { node, .. }
            | DataMessage::GetPseudoTypes { node, .. } => nodes.push(*node),
        }
        nodes
    }

    /// Node ids this message brings into existence
    pub fn created_nodes(&self) -> Vec<NodeId> {
        match self {
            DataMessage::CreateElement { id, .. }
            | DataMessage::CreateTextNode { id, .. }
            | DataMessage::CreateVirtualNode { id, .. }
            | DataMessage::CreateFragment { id } => vec![*id],
            DataMessage::CreateComponent {
                id, shadow_root, ..
            } => vec![*id, *shadow_root],
            _ => Vec::new(),
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        let mut writer = ArgWriter::new(self.opcode());
        self.ser(&mut writer);
        writer.finish()
    }

    /// Decodes a message received by the view side. Unknown opcodes and
    /// opcodes only the view side may emit are rejected.
    pub fn from_wire(message: &WireMessage) -> Result<Self, ProtocolError> {
        let opcode = ChannelEventType::for_receiver(message.raw_opcode()?, Side::View)?;
        let mut reader = ArgReader::new(opcode, message);
        let decoded = Self::de(&mut reader)?;
        reader.finish()?;
        Ok(decoded)
    }

    fn ser(&self, writer: &mut ArgWriter) {
        match self {
            DataMessage::Create { callback }
            | DataMessage::OnWindowResize { callback }
            | DataMessage::OnThemeChange { callback }
            | DataMessage::Render { callback }
            | DataMessage::DisconnectObserver { callback }
            | DataMessage::StartOverlayInspect { callback } => writer.write(callback),
            DataMessage::Destroy | DataMessage::StopOverlayInspect => {}
            DataMessage::CreateMediaQueryObserver { status, callback } => {
                writer.write_json(status);
                writer.write(callback);
            }
            DataMessage::CreateIntersectionObserver {
                target,
                relative,
                margin,
                thresholds,
                callback,
            } => {
                writer.write(target);
                writer.write(relative);
                writer.write(margin);
                writer.write(thresholds);
                writer.write(callback);
            }
            DataMessage::CreateElement {
                id,
                logical_name,
                styling_name,
                owner,
            } => {
                writer.write(id);
                writer.write(logical_name);
                writer.write(styling_name);
                writer.write(owner);
            }
            DataMessage::CreateComponent {
                id,
                shadow_root,
                tag_name,
                external,
                virtual_host,
                style_scope,
                extra_style_scope,
                external_classes,
                slot_mode,
                write_id_to_dom,
                owner,
            } => {
                writer.write(id);
                writer.write(shadow_root);
                writer.write(tag_name);
                writer.write(external);
                writer.write(virtual_host);
                writer.write(style_scope);
                writer.write(extra_style_scope);
                writer.write(external_classes);
                writer.write(slot_mode);
                writer.write(write_id_to_dom);
                writer.write(owner);
            }
            DataMessage::CreateTextNode {
                id,
                text: value,
                owner,
            }
            | DataMessage::CreateVirtualNode {
                id,
                name: value,
                owner,
            } => {
                writer.write(id);
                writer.write(value);
                writer.write(owner);
            }
            DataMessage::CreateFragment { id } | DataMessage::Release { id } => writer.write(id),
            DataMessage::AppendChild { parent, child } | DataMessage::RemoveChild { parent, child } => {
                writer.write(parent);
                writer.write(child);
            }
            DataMessage::InsertBefore {
                parent,
                child,
                before: other,
            }
            | DataMessage::ReplaceChild {
                parent,
                child,
                old_child: other,
            } => {
                writer.write(parent);
                writer.write(child);
                writer.write(other);
            }
            DataMessage::SpliceBefore {
                parent,
                before,
                delete_count,
                fragment,
            } => {
                writer.write(parent);
                writer.write(before);
                writer.write(delete_count);
                writer.write(fragment);
            }
            DataMessage::SpliceAppend { parent, fragment } => {
                writer.write(parent);
                writer.write(fragment);
            }
            DataMessage::SpliceRemove {
                parent,
                start,
                delete_count,
            } => {
                writer.write(parent);
                writer.write(start);
                writer.write(delete_count);
            }
            DataMessage::SetId { node, id: text }
            | DataMessage::SetSlot { node, name: text }
            | DataMessage::SetSlotName { node, name: text }
            | DataMessage::AddClass { node, class: text }
            | DataMessage::RemoveClass { node, class: text }
            | DataMessage::RemoveAttribute { node, name: text }
            | DataMessage::SetText { node, text } => {
                writer.write(node);
                writer.write(text);
            }
            DataMessage::GetPseudoComputedStyles {
                node,
                pseudo_type,
                callback,
            } => {
                writer.write(node);
                writer.write(pseudo_type);
                writer.write(callback);
            }
            DataMessage::SetSlotElement { node, slot } => {
                writer.write(node);
                writer.write(slot);
            }
            DataMessage::SetInheritSlots { node } | DataMessage::ClearClasses { node } => {
                writer.write(node)
            }
            DataMessage::RegisterStyleScope { scope, prefix } => {
                writer.write(scope);
                writer.write(prefix);
            }
            DataMessage::SetStyle {
                node,
                style,
                segment,
            } => {
                writer.write(node);
                writer.write(style);
                writer.write(segment);
            }
            DataMessage::SetClassAlias {
                node,
                class,
                targets,
            } => {
                writer.write(node);
                writer.write(class);
                writer.write(targets);
            }
            DataMessage::SetAttribute { node, name, value }
            | DataMessage::SetDataset { node, name, value } => {
                writer.write(node);
                writer.write(name);
                writer.write(value);
            }
            DataMessage::SetListenerStats {
                node,
                event_type,
                capture,
                mut_level,
            } => {
                writer.write(node);
                writer.write(event_type);
                writer.write(capture);
                writer.write(mut_level);
            }
            DataMessage::SetModelBindingStat {
                node,
                attribute,
                listener,
            } => {
                writer.write(node);
                writer.write(attribute);
                writer.write(listener);
            }
            DataMessage::GetContext { node, callback }
            | DataMessage::GetAllComputedStyles { node, callback }
            | DataMessage::GetInheritedRules { node, callback }
            | DataMessage::GetMatchedRules { node, callback }
            | DataMessage::GetBoundingClientRect { node, callback }
            | DataMessage::GetScrollOffset { node, callback }
            | DataMessage::GetBoxModel { node, callback }
            | DataMessage::GetPseudoTypes { node, callback } => {
                writer.write(node);
                writer.write(callback);
            }
            DataMessage::AssociateValue { node, info } => {
                writer.write(node);
                writer.write_json(&info.to_json());
            }
            DataMessage::InitValues { node, values } => {
                writer.write(node);
                writer.write_json(values);
            }
            DataMessage::UpdateValues { node, changes } => {
                writer.write(node);
                writer.write_json(&DataChange::list_to_json(changes));
            }
            DataMessage::RegisterStyleSheetContent { path, content } => {
                writer.write(path);
                writer.write_json(content);
            }
            DataMessage::AppendStyleSheetPath { sheet, path, scope } => {
                writer.write(sheet);
                writer.write(path);
                writer.write(scope);
            }
            DataMessage::DisableStyleSheet { sheet } => writer.write(sheet),
            DataMessage::ReplaceStyleSheetAllProperties {
                sheet_index,
                rule_index,
                inline_style,
                callback,
            } => {
                writer.write(sheet_index);
                writer.write(rule_index);
                writer.write(inline_style);
                writer.write(callback);
            }
            DataMessage::SetScrollPosition {
                node,
                left,
                top,
                duration,
            } => {
                writer.write(node);
                writer.write(left);
                writer.write(top);
                writer.write(duration);
            }
            DataMessage::PerformanceStartTrace { trace } => writer.write(trace),
            DataMessage::PerformanceEndTrace { trace, callback } => {
                writer.write(trace);
                writer.write(callback);
            }
            DataMessage::CustomMethod { node, options } => {
                writer.write(node);
                writer.write(options);
            }
        }
    }

    fn de(reader: &mut ArgReader) -> Result<Self, ProtocolError> {
        use ChannelEventType as T;
        let message = match reader.opcode() {
            T::Create => DataMessage::Create {
                callback: reader.read()?,
            },
            T::Destroy => DataMessage::Destroy,
            T::OnWindowResize => DataMessage::OnWindowResize {
                callback: reader.read()?,
            },
            T::OnThemeChange => DataMessage::OnThemeChange {
                callback: reader.read()?,
            },
            T::Render => DataMessage::Render {
                callback: reader.read()?,
            },
            T::CreateMediaQueryObserver => DataMessage::CreateMediaQueryObserver {
                status: reader.read_json()?,
                callback: reader.read()?,
            },
            T::CreateIntersectionObserver => DataMessage::CreateIntersectionObserver {
                target: reader.read()?,
                relative: reader.read()?,
                margin: reader.read()?,
                thresholds: reader.read()?,
                callback: reader.read()?,
            },
            T::DisconnectObserver => DataMessage::DisconnectObserver {
                callback: reader.read()?,
            },
            T::CreateElement => DataMessage::CreateElement {
                id: reader.read()?,
                logical_name: reader.read()?,
                styling_name: reader.read()?,
                owner: reader.read()?,
            },
            T::CreateComponent => DataMessage::CreateComponent {
                id: reader.read()?,
                shadow_root: reader.read()?,
                tag_name: reader.read()?,
                external: reader.read()?,
                virtual_host: reader.read()?,
                style_scope: reader.read()?,
                extra_style_scope: reader.read()?,
                external_classes: reader.read()?,
                slot_mode: reader.read()?,
                write_id_to_dom: reader.read()?,
                owner: reader.read()?,
            },
            T::CreateTextNode => DataMessage::CreateTextNode {
                id: reader.read()?,
                text: reader.read()?,
                owner: reader.read()?,
            },
            T::CreateVirtualNode => DataMessage::CreateVirtualNode {
                id: reader.read()?,
                name: reader.read()?,
                owner: reader.read()?,
            },
            T::CreateFragment => DataMessage::CreateFragment { id: reader.read()? },
            T::Release => DataMessage::Release { id: reader.read()? },
            T::AppendChild => DataMessage::AppendChild {
                parent: reader.read()?,
                child: reader.read()?,
            },
            T::RemoveChild => DataMessage::RemoveChild {
                parent: reader.read()?,
                child: reader.read()?,
            },
            T::InsertBefore => DataMessage::InsertBefore {
                parent: reader.read()?,
                child: reader.read()?,
                before: reader.read()?,
            },
            T::ReplaceChild => DataMessage::ReplaceChild {
                parent: reader.read()?,
                child: reader.read()?,
                old_child: reader.read()?,
            },
            T::SpliceBefore => DataMessage::SpliceBefore {
                parent: reader.read()?,
                before: reader.read()?,
                delete_count: reader.read()?,
                fragment: reader.read()?,
            },
            T::SpliceAppend => DataMessage::SpliceAppend {
                parent: reader.read()?,
                fragment: reader.read()?,
            },
            T::SpliceRemove => DataMessage::SpliceRemove {
                parent: reader.read()?,
                start: reader.read()?,
                delete_count: reader.read()?,
            },
            T::SetId => DataMessage::SetId {
                node: reader.read()?,
                id: reader.read()?,
            },
            T::SetSlot => DataMessage::SetSlot {
                node: reader.read()?,
                name: reader.read()?,
            },
            T::SetSlotName => DataMessage::SetSlotName {
                node: reader.read()?,
                name: reader.read()?,
            },
            T::SetSlotElement => DataMessage::SetSlotElement {
                node: reader.read()?,
                slot: reader.read()?,
            },
            T::SetInheritSlots => DataMessage::SetInheritSlots {
                node: reader.read()?,
            },
            T::RegisterStyleScope => DataMessage::RegisterStyleScope {
                scope: reader.read()?,
                prefix: reader.read_optional()?,
            },
            T::SetStyle => DataMessage::SetStyle {
                node: reader.read()?,
                style: reader.read()?,
                segment: reader.read()?,
            },
            T::AddClass => DataMessage::AddClass {
                node: reader.read()?,
                class: reader.read()?,
            },
            T::RemoveClass => DataMessage::RemoveClass {
                node: reader.read()?,
                class: reader.read()?,
            },
            T::ClearClasses => DataMessage::ClearClasses {
                node: reader.read()?,
            },
            T::SetClassAlias => DataMessage::SetClassAlias {
                node: reader.read()?,
                class: reader.read()?,
                targets: reader.read()?,
            },
            T::SetAttribute => DataMessage::SetAttribute {
                node: reader.read()?,
                name: reader.read()?,
                value: reader.read()?,
            },
            T::RemoveAttribute => DataMessage::RemoveAttribute {
                node: reader.read()?,
                name: reader.read()?,
            },
            T::SetDataset => DataMessage::SetDataset {
                node: reader.read()?,
                name: reader.read()?,
                value: reader.read()?,
            },
            T::SetText => DataMessage::SetText {
                node: reader.read()?,
                text: reader.read()?,
            },
            T::SetListenerStats => DataMessage::SetListenerStats {
                node: reader.read()?,
                event_type: reader.read()?,
                capture: reader.read()?,
                mut_level: reader.read()?,
            },
            T::SetModelBindingStat => DataMessage::SetModelBindingStat {
                node: reader.read()?,
                attribute: reader.read()?,
                listener: reader.read()?,
            },
            T::GetContext => DataMessage::GetContext {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::AssociateValue => DataMessage::AssociateValue {
                node: reader.read()?,
                info: AssociateValueInfo::from_json(&reader.read_json()?),
            },
            T::InitValues => DataMessage::InitValues {
                node: reader.read()?,
                values: reader.read_json()?,
            },
            T::UpdateValues => {
                let node = reader.read()?;
                let changes = DataChange::list_from_json(&reader.read_json()?)
                    .ok_or_else(|| reader.payload_error("malformed data change list"))?;
                DataMessage::UpdateValues { node, changes }
            }
            T::RegisterStyleSheetContent => DataMessage::RegisterStyleSheetContent {
                path: reader.read()?,
                content: reader.read_json()?,
            },
            T::AppendStyleSheetPath => DataMessage::AppendStyleSheetPath {
                sheet: reader.read()?,
                path: reader.read()?,
                scope: reader.read_optional()?,
            },
            T::DisableStyleSheet => DataMessage::DisableStyleSheet {
                sheet: reader.read()?,
            },
            T::GetAllComputedStyles => DataMessage::GetAllComputedStyles {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::GetPseudoComputedStyles => DataMessage::GetPseudoComputedStyles {
                node: reader.read()?,
                pseudo_type: reader.read()?,
                callback: reader.read()?,
            },
            T::GetInheritedRules => DataMessage::GetInheritedRules {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::GetMatchedRules => DataMessage::GetMatchedRules {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::ReplaceStyleSheetAllProperties => DataMessage::ReplaceStyleSheetAllProperties {
                sheet_index: reader.read()?,
                rule_index: reader.read()?,
                inline_style: reader.read()?,
                callback: reader.read()?,
            },
            T::GetBoundingClientRect => DataMessage::GetBoundingClientRect {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::GetScrollOffset => DataMessage::GetScrollOffset {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::SetScrollPosition => DataMessage::SetScrollPosition {
                node: reader.read()?,
                left: reader.read()?,
                top: reader.read()?,
                duration: reader.read()?,
            },
            T::GetBoxModel => DataMessage::GetBoxModel {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::GetPseudoTypes => DataMessage::GetPseudoTypes {
                node: reader.read()?,
                callback: reader.read()?,
            },
            T::StartOverlayInspect => DataMessage::StartOverlayInspect {
                callback: reader.read()?,
            },
            T::StopOverlayInspect => DataMessage::StopOverlayInspect,
            T::PerformanceStartTrace => DataMessage::PerformanceStartTrace {
                trace: reader.read()?,
            },
            T::PerformanceEndTrace => DataMessage::PerformanceEndTrace {
                trace: reader.read()?,
                callback: reader.read()?,
            },
            T::CustomMethod => DataMessage::CustomMethod {
                node: reader.read()?,
                options: reader.read()?,
            },
            T::CreateCallback
            | T::OnWindowResizeCallback
            | T::OnThemeChangeCallback
            | T::RenderCallback
            | T::MediaQueryObserverCallback
            | T::IntersectionObserverCallback
            | T::OnCreateEvent
            | T::OnEvent
            | T::OnReleaseEvent
            | T::SetModelBindingStatCallback
            | T::GetContextCallback
            | T::GetAllComputedStylesCallback
            | T::GetPseudoComputedStylesCallback
            | T::GetInheritedRulesCallback
            | T::GetMatchedRulesCallback
            | T::ReplaceStyleSheetAllPropertiesCallback
            | T::GetBoundingClientRectCallback
            | T::GetScrollOffsetCallback
            | T::GetBoxModelCallback
            | T::GetPseudoTypesCallback
            | T::StartOverlayInspectCallback
            | T::PerformanceStatsCallback
            | T::InsertDynamicSlot
            | T::UpdateDynamicSlot
            | T::RemoveDynamicSlot
            | T::CustomMethodNotify => {
                return Err(ProtocolError::WrongDirection {
                    opcode: reader.opcode(),
                    sender: Side::View,
                })
            }
        };
        Ok(message)
    }
}
