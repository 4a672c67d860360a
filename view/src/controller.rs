use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use shadow_sync_shared::{
    AssociateValueInfo, CallbackId, ChannelConfig, DataMessage, MediaQueryResult, NodeId,
    StyleScopeId, StyleSheetId, ThemeInfo, Timestamp, TraceId, ViewMessage, WindowInfo,
};

use crate::{
    backend::{ComponentInit, ViewBackend, ViewObserver},
    error::ViewError,
    event_relay::{publish, relay_listener, EventRelay, SharedPublisher},
    pending_component::{ComponentState, ComponentTable, PendingComponent},
    registry::{Entry, NodeRegistry},
};

fn to_json<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Applies data side commands to a [`ViewBackend`] and answers its queries.
///
/// Holds the id registry, the translation tables for style scopes and
/// sheets, and everything registered on behalf of a callback id.
pub struct ViewController<B: ViewBackend> {
    backend: B,
    publisher: SharedPublisher,
    registry: NodeRegistry<B::Node>,
    components: ComponentTable,
    relay: Rc<RefCell<EventRelay>>,
    listeners: HashSet<(NodeId, String, bool)>,
    style_scopes: HashMap<StyleScopeId, u32>,
    style_sheets: HashMap<StyleSheetId, u32>,
    traces: HashMap<TraceId, f64>,
    observers: HashMap<CallbackId, Box<dyn ViewObserver>>,
}

impl<B: ViewBackend> ViewController<B> {
    pub(crate) fn new(backend: B, publisher: SharedPublisher, config: &ChannelConfig) -> Self {
        let relay = EventRelay::new(publisher.clone(), &config.id_generator);
        Self {
            backend,
            publisher,
            registry: NodeRegistry::new(),
            components: ComponentTable::new(),
            relay: Rc::new(RefCell::new(relay)),
            listeners: HashSet::new(),
            style_scopes: HashMap::new(),
            style_sheets: HashMap::new(),
            traces: HashMap::new(),
            observers: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Backend node created for a channel id
    pub fn node(&self, id: NodeId) -> Option<B::Node> {
        self.registry.node(id).ok()
    }

    pub fn id_of(&self, node: &B::Node) -> Option<NodeId> {
        self.registry.id_of(node)
    }

    pub fn live_nodes(&self) -> usize {
        self.registry.len()
    }

    pub fn component_state(&self, id: NodeId) -> Option<ComponentState> {
        self.components.state(id)
    }

    pub fn has_pending_components(&self) -> bool {
        self.components.has_pending()
    }

    pub(crate) fn is_pending(&self, id: NodeId) -> bool {
        self.components.is_pending(id)
    }

    /// Shadow root of a component still awaiting its associate value
    pub(crate) fn pending_shadow_root(&self, component: NodeId) -> Option<NodeId> {
        self.components
            .pending(component)
            .map(|pending| pending.shadow_root)
    }

    pub(crate) fn flush_event_releases(&mut self) {
        self.relay.borrow_mut().flush_releases();
    }

    pub(crate) fn live_events(&self) -> usize {
        self.relay.borrow().live_events()
    }

    fn reply(&self, message: ViewMessage) {
        publish(&self.publisher, message);
    }

    fn lookup(&self, id: NodeId) -> Result<B::Node, ViewError> {
        self.registry.node(id)
    }

    /// `None` addresses the root container
    fn parent(&self, parent: Option<NodeId>) -> Result<B::Node, ViewError> {
        match parent {
            Some(id) => self.lookup(id),
            None => Ok(self.backend.root()),
        }
    }

    fn lookup_optional(&self, id: Option<NodeId>) -> Result<Option<B::Node>, ViewError> {
        id.map(|id| self.lookup(id)).transpose()
    }

    fn scope(&self, scope: Option<StyleScopeId>) -> Option<u32> {
        let scope = scope?;
        match self.style_scopes.get(&scope) {
            Some(id) => Some(*id),
            None => {
                warn!("style scope {} used before registration", scope);
                None
            }
        }
    }

    fn child_index(&self, parent: &B::Node, child: NodeId) -> Result<(Vec<B::Node>, usize), ViewError> {
        let node = self.lookup(child)?;
        let children = self.backend.children(parent);
        let index = children
            .iter()
            .position(|other| *other == node)
            .ok_or(ViewError::NotAChild { node: child })?;
        Ok((children, index))
    }

    fn splice(
        &mut self,
        parent: Option<NodeId>,
        anchor: Option<NodeId>,
        delete_count: usize,
        fragment: Option<NodeId>,
    ) -> Result<(), ViewError> {
        let parent_node = self.parent(parent)?;
        let (children, index) = match anchor {
            Some(anchor) => self.child_index(&parent_node, anchor)?,
            None => {
                let children = self.backend.children(&parent_node);
                let len = children.len();
                (children, len)
            }
        };
        let inserted = match fragment {
            Some(fragment) => self.registry.take_fragment(fragment)?,
            None => Vec::new(),
        };
        self.backend
            .splice_children(&parent_node, index, delete_count, &inserted);
        if parent.is_none() {
            for removed in children.iter().skip(index).take(delete_count) {
                self.backend.set_attached(removed, false);
            }
            for added in &inserted {
                self.backend.set_attached(added, true);
            }
        }
        Ok(())
    }

    fn resolve_component(
        &mut self,
        pending: PendingComponent,
        info: &AssociateValueInfo,
    ) -> Result<(), ViewError> {
        let owner = self.lookup_optional(pending.owner)?;
        let external = if info.is_reflect {
            self.backend
                .create_external_component(&pending.init, owner.as_ref())
        } else {
            None
        };
        let is_external = external.is_some();
        let (component, shadow_root) = match external {
            Some(created) => created,
            None => self.backend.create_component(&pending.init, owner.as_ref()),
        };
        debug!(
            "component {} `{}` resolved, external: {}",
            pending.id, pending.init.tag_name, is_external
        );

        self.registry.insert_node(pending.id, component.clone());
        if pending.shadow_root_released {
            self.backend.release(&shadow_root);
        } else {
            self.registry.insert_node(pending.shadow_root, shadow_root);
        }
        self.components.resolve(pending.id, is_external);
        self.backend.associate_value(&component, info);
        Ok(())
    }

    fn release(&mut self, id: NodeId) -> Result<(), ViewError> {
        let was_pending = self.components.is_pending(id);
        if let Some(cancelled) = self.components.release(id) {
            debug!("component {} released before it was resolved", cancelled.id);
            return Ok(());
        }
        match self.registry.remove(id) {
            Some(Entry::Node(node)) => {
                self.listeners.retain(|(listened, _, _)| *listened != id);
                self.backend.release(&node);
                Ok(())
            }
            Some(Entry::Fragment(_)) => Ok(()),
            None if was_pending => Ok(()),
            None => Err(ViewError::UnknownNode { node: id }),
        }
    }

    /// Applies one command. Callers make sure no node it references is
    /// still awaiting its associate value.
    pub(crate) fn apply(&mut self, message: DataMessage) -> Result<(), ViewError> {
        match message {
            // environment
            DataMessage::Create { callback } => {
                let window = self.backend.window_info();
                let theme = self.backend.theme();
                self.reply(ViewMessage::CreateCallback {
                    callback,
                    width: window.width,
                    height: window.height,
                    device_pixel_ratio: window.device_pixel_ratio,
                    theme: theme.theme,
                });
            }
            DataMessage::Destroy => self.backend.destroy(),
            DataMessage::OnWindowResize { callback } => {
                let publisher = self.publisher.clone();
                self.backend
                    .on_window_resize(Box::new(move |window: WindowInfo| {
                        publish(
                            &publisher,
                            ViewMessage::WindowResizeCallback {
                                callback,
                                width: window.width,
                                height: window.height,
                                device_pixel_ratio: window.device_pixel_ratio,
                            },
                        )
                    }));
            }
            DataMessage::OnThemeChange { callback } => {
                let publisher = self.publisher.clone();
                self.backend
                    .on_theme_change(Box::new(move |theme: ThemeInfo| {
                        publish(
                            &publisher,
                            ViewMessage::ThemeChangeCallback {
                                callback,
                                theme: theme.theme,
                            },
                        )
                    }));
            }
            DataMessage::Render { callback } => {
                let error = self.backend.render().err();
                self.reply(ViewMessage::RenderCallback { callback, error });
            }
            DataMessage::CreateMediaQueryObserver { status, callback } => {
                let publisher = self.publisher.clone();
                let observer = self.backend.create_media_query_observer(
                    &status,
                    Box::new(move |result: MediaQueryResult| {
                        publish(
                            &publisher,
                            ViewMessage::MediaQueryObserverCallback {
                                callback,
                                result: to_json(result),
                            },
                        )
                    }),
                );
                if let Some(observer) = observer {
                    self.observers.insert(callback, observer);
                }
            }
            DataMessage::CreateIntersectionObserver {
                target,
                relative,
                margin,
                thresholds,
                callback,
            } => {
                let target = self.lookup(target)?;
                let relative = self.lookup_optional(relative)?;
                let publisher = self.publisher.clone();
                let observer = self.backend.create_intersection_observer(
                    &target,
                    relative.as_ref(),
                    &margin,
                    &thresholds,
                    Box::new(move |result| {
                        publish(
                            &publisher,
                            ViewMessage::IntersectionObserverCallback { callback, result },
                        )
                    }),
                );
                if let Some(observer) = observer {
                    self.observers.insert(callback, observer);
                }
            }
            DataMessage::DisconnectObserver { callback } => match self.observers.remove(&callback)
            {
                Some(mut observer) => observer.disconnect(),
                None => debug!("no observer registered under {}", callback),
            },

            // creation
            DataMessage::CreateElement {
                id,
                logical_name,
                styling_name,
                owner,
            } => {
                let owner = self.lookup_optional(owner)?;
                let node = self
                    .backend
                    .create_element(&logical_name, &styling_name, owner.as_ref());
                self.registry.insert_node(id, node);
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
                let init = ComponentInit {
                    tag_name,
                    external,
                    virtual_host,
                    style_scope: self.scope(style_scope),
                    extra_style_scope: self.scope(extra_style_scope),
                    external_classes,
                    slot_mode,
                    write_id_to_dom,
                };
                self.components.begin(id, shadow_root, init, owner);
            }
            DataMessage::CreateTextNode { id, text, owner } => {
                let owner = self.lookup_optional(owner)?;
                let node = self.backend.create_text_node(&text, owner.as_ref());
                self.registry.insert_node(id, node);
            }
            DataMessage::CreateVirtualNode { id, name, owner } => {
                let owner = self.lookup_optional(owner)?;
                let node = self.backend.create_virtual_node(&name, owner.as_ref());
                self.registry.insert_node(id, node);
            }
            DataMessage::CreateFragment { id } => self.registry.insert_fragment(id),
            DataMessage::Release { id } => self.release(id)?,

            // structure
            DataMessage::AppendChild { parent, child } => {
                let child_node = self.lookup(child)?;
                match parent {
                    Some(fragment) if self.registry.is_fragment(fragment) => {
                        self.registry.fragment_mut(fragment)?.push(child_node);
                    }
                    _ => {
                        let parent_node = self.parent(parent)?;
                        self.backend.append_child(&parent_node, &child_node);
                        if parent.is_none() {
                            self.backend.set_attached(&child_node, true);
                        }
                    }
                }
            }
            DataMessage::RemoveChild { parent, child } => {
                let parent_node = self.parent(parent)?;
                let child_node = self.lookup(child)?;
                self.backend.remove_child(&parent_node, &child_node);
                if parent.is_none() {
                    self.backend.set_attached(&child_node, false);
                }
            }
            DataMessage::InsertBefore {
                parent,
                child,
                before,
            } => {
                let parent_node = self.parent(parent)?;
                let child_node = self.lookup(child)?;
                let before_node = self.lookup(before)?;
                self.backend
                    .insert_before(&parent_node, &child_node, &before_node);
                if parent.is_none() {
                    self.backend.set_attached(&child_node, true);
                }
            }
            DataMessage::ReplaceChild {
                parent,
                child,
                old_child,
            } => {
                let parent_node = self.parent(parent)?;
                let child_node = self.lookup(child)?;
                let old_node = self.lookup(old_child)?;
                self.backend
                    .replace_child(&parent_node, &child_node, &old_node);
                if parent.is_none() {
                    self.backend.set_attached(&old_node, false);
                    self.backend.set_attached(&child_node, true);
                }
            }
            DataMessage::SpliceBefore {
                parent,
                before,
                delete_count,
                fragment,
            } => self.splice(parent, Some(before), delete_count as usize, Some(fragment))?,
            DataMessage::SpliceAppend { parent, fragment } => {
                self.splice(parent, None, 0, Some(fragment))?
            }
            DataMessage::SpliceRemove {
                parent,
                start,
                delete_count,
            } => self.splice(parent, Some(start), delete_count as usize, None)?,

            // attributes
            DataMessage::SetId { node, id } => {
                let node = self.lookup(node)?;
                self.backend.set_id(&node, &id);
            }
            DataMessage::SetSlot { node, name } => {
                let node = self.lookup(node)?;
                self.backend.set_slot(&node, &name);
            }
            DataMessage::SetSlotName { node, name } => {
                let node = self.lookup(node)?;
                self.backend.set_slot_name(&node, &name);
            }
            DataMessage::SetSlotElement { node, slot } => {
                let node = self.lookup(node)?;
                let slot = self.lookup_optional(slot)?;
                self.backend.set_slot_element(&node, slot.as_ref());
            }
            DataMessage::SetInheritSlots { node } => {
                let node = self.lookup(node)?;
                self.backend.set_inherit_slots(&node);
            }
            DataMessage::RegisterStyleScope { scope, prefix } => {
                let id = self.backend.register_style_scope(prefix.as_deref());
                self.style_scopes.insert(scope, id);
            }
            DataMessage::SetStyle {
                node,
                style,
                segment,
            } => {
                let node = self.lookup(node)?;
                self.backend.set_style(&node, &style, segment);
            }
            DataMessage::AddClass { node, class } => {
                let node = self.lookup(node)?;
                self.backend.add_class(&node, &class);
            }
            DataMessage::RemoveClass { node, class } => {
                let node = self.lookup(node)?;
                self.backend.remove_class(&node, &class);
            }
            DataMessage::ClearClasses { node } => {
                let node = self.lookup(node)?;
                self.backend.clear_classes(&node);
            }
            DataMessage::SetClassAlias {
                node,
                class,
                targets,
            } => {
                let node = self.lookup(node)?;
                self.backend.set_class_alias(&node, &class, &targets);
            }
            DataMessage::SetAttribute { node, name, value } => {
                let node = self.lookup(node)?;
                self.backend.set_attribute(&node, &name, &value);
            }
            DataMessage::RemoveAttribute { node, name } => {
                let node = self.lookup(node)?;
                self.backend.remove_attribute(&node, &name);
            }
            DataMessage::SetDataset { node, name, value } => {
                let node = self.lookup(node)?;
                self.backend.set_dataset(&node, &name, &value);
            }
            DataMessage::SetText { node, text } => {
                let node = self.lookup(node)?;
                self.backend.set_text(&node, &text);
            }

            // events and values
            DataMessage::SetListenerStats {
                node: id,
                event_type,
                capture,
                mut_level,
            } => {
                let node = self.lookup(id)?;
                let registered = !self.listeners.insert((id, event_type.clone(), capture));
                if registered {
                    self.backend.remove_listener(&node, &event_type, capture);
                }
                let listener = relay_listener(&self.relay, &self.registry.index());
                self.backend
                    .set_listener(&node, &event_type, capture, mut_level, listener);
            }
            DataMessage::SetModelBindingStat {
                node: id,
                attribute,
                listener,
            } => {
                let callback = listener.ok_or_else(|| ViewError::MissingModelBindingListener {
                    node: id,
                    attribute: attribute.clone(),
                })?;
                let node = self.lookup(id)?;
                let publisher = self.publisher.clone();
                self.backend.set_model_binding_listener(
                    &node,
                    &attribute,
                    Box::new(move |value| {
                        publish(
                            &publisher,
                            ViewMessage::ModelBindingStatCallback { callback, value },
                        )
                    }),
                );
            }
            DataMessage::GetContext { node, callback } => {
                let node = self.lookup(node)?;
                let context = self.backend.get_context(&node).unwrap_or(Value::Null);
                self.reply(ViewMessage::GetContextCallback { callback, context });
            }
            DataMessage::AssociateValue { node, info } => {
                match self.components.pending(node).cloned() {
                    Some(pending) => self.resolve_component(pending, &info)?,
                    None => {
                        let node = self.lookup(node)?;
                        self.backend.associate_value(&node, &info);
                    }
                }
            }
            DataMessage::InitValues { node, values } => {
                let node = self.lookup(node)?;
                self.backend.init_values(&node, &values);
            }
            DataMessage::UpdateValues { node, changes } => {
                let node = self.lookup(node)?;
                self.backend.update_values(&node, &changes);
            }

            // style sheets
            DataMessage::RegisterStyleSheetContent { path, content } => {
                self.backend.register_style_sheet_content(&path, &content);
            }
            DataMessage::AppendStyleSheetPath { sheet, path, scope } => {
                let scope = self.scope(scope);
                let index = self.backend.append_style_sheet_path(&path, scope);
                self.style_sheets.insert(sheet, index);
            }
            DataMessage::DisableStyleSheet { sheet } => {
                let index = self
                    .style_sheets
                    .get(&sheet)
                    .copied()
                    .ok_or(ViewError::UnknownStyleSheet { sheet })?;
                self.backend.disable_style_sheet(index);
            }

            // introspection
            DataMessage::GetAllComputedStyles { node, callback } => {
                let node = self.lookup(node)?;
                let styles = self.backend.get_all_computed_styles(&node);
                self.reply(ViewMessage::AllComputedStylesCallback {
                    callback,
                    styles: to_json(styles.unwrap_or_default()),
                });
            }
            DataMessage::GetPseudoComputedStyles {
                node,
                pseudo_type,
                callback,
            } => {
                let node = self.lookup(node)?;
                let styles = self.backend.get_pseudo_computed_styles(&node, &pseudo_type);
                self.reply(ViewMessage::PseudoComputedStylesCallback {
                    callback,
                    styles: to_json(styles.unwrap_or_default()),
                });
            }
            DataMessage::GetInheritedRules { node, callback } => {
                let node = self.lookup(node)?;
                let rules = self.backend.get_inherited_rules(&node);
                self.reply(ViewMessage::InheritedRulesCallback {
                    callback,
                    rules: to_json(rules.unwrap_or_default()),
                });
            }
            DataMessage::GetMatchedRules { node, callback } => {
                let node = self.lookup(node)?;
                let rules = self.backend.get_matched_rules(&node);
                self.reply(ViewMessage::MatchedRulesCallback {
                    callback,
                    rules: to_json(rules.unwrap_or_default()),
                });
            }
            DataMessage::ReplaceStyleSheetAllProperties {
                sheet_index,
                rule_index,
                inline_style,
                callback,
            } => {
                let property_index = self.backend.replace_style_sheet_all_properties(
                    sheet_index,
                    rule_index,
                    &inline_style,
                );
                self.reply(ViewMessage::ReplaceStyleSheetAllPropertiesCallback {
                    callback,
                    property_index,
                });
            }
            DataMessage::GetBoundingClientRect { node, callback } => {
                let node = self.lookup(node)?;
                let rect = self.backend.get_bounding_client_rect(&node);
                self.reply(ViewMessage::BoundingClientRectCallback {
                    callback,
                    rect: rect.unwrap_or_default(),
                });
            }
            DataMessage::GetScrollOffset { node, callback } => {
                let node = self.lookup(node)?;
                let offset = self.backend.get_scroll_offset(&node);
                self.reply(ViewMessage::ScrollOffsetCallback {
                    callback,
                    offset: offset.unwrap_or_default(),
                });
            }
            DataMessage::SetScrollPosition {
                node,
                left,
                top,
                duration,
            } => {
                let node = self.lookup(node)?;
                self.backend.set_scroll_position(&node, left, top, duration);
            }
            DataMessage::GetBoxModel { node, callback } => {
                let node = self.lookup(node)?;
                let box_model = self.backend.get_box_model(&node);
                self.reply(ViewMessage::BoxModelCallback {
                    callback,
                    box_model: to_json(box_model.unwrap_or_default()),
                });
            }
            DataMessage::GetPseudoTypes { node, callback } => {
                let node = self.lookup(node)?;
                let types = self.backend.get_pseudo_types(&node);
                self.reply(ViewMessage::PseudoTypesCallback {
                    callback,
                    types: types.unwrap_or_default(),
                });
            }
            DataMessage::StartOverlayInspect { callback } => {
                let publisher = self.publisher.clone();
                let index = self.registry.index();
                self.backend
                    .start_overlay_inspect(Box::new(move |event, node| {
                        let node = node.and_then(|node| index.borrow().get(&node).copied());
                        publish(
                            &publisher,
                            ViewMessage::OverlayInspectCallback {
                                callback,
                                event,
                                node,
                            },
                        )
                    }));
            }
            DataMessage::StopOverlayInspect => self.backend.stop_overlay_inspect(),
            DataMessage::PerformanceStartTrace { trace } => {
                self.traces.insert(trace, Timestamp::now_millis());
            }
            DataMessage::PerformanceEndTrace { trace, callback } => {
                let start_timestamp = self
                    .traces
                    .remove(&trace)
                    .ok_or(ViewError::UnknownTrace { trace })?;
                self.reply(ViewMessage::PerformanceStatsCallback {
                    callback,
                    start_timestamp,
                    end_timestamp: Timestamp::now_millis(),
                });
            }
            DataMessage::CustomMethod { node, options } => {
                let node = self.lookup_optional(node)?;
                self.backend.handle_custom_method(node.as_ref(), &options);
            }
        }
        Ok(())
    }
}
