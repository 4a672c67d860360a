use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
    rc::Rc,
};

use log::{debug, error, info, trace};
use serde_json::Value;

use shadow_sync_shared::{
    ChannelConfig, DataMessage, DynamicSlotInit, IdGenerator, NodeId, Publisher, SlotId,
    ViewMessage, WireMessage,
};

use crate::{
    backend::ViewBackend,
    controller::ViewController,
    error::ViewError,
    event_relay::{publish, SharedPublisher},
    pending_component::ComponentState,
};

/// View side endpoint of a channel.
///
/// Commands are applied in arrival order. A command that references a
/// component still awaiting its associate value is held back, together with
/// every command received after it, until that component is resolved.
pub struct MessageChannelViewSide<B: ViewBackend> {
    controller: ViewController<B>,
    publisher: SharedPublisher,
    backlog: VecDeque<DataMessage>,
    slot_ids: IdGenerator<SlotId>,
    dynamic_slots: HashMap<SlotId, NodeId>,
}

impl<B: ViewBackend> MessageChannelViewSide<B> {
    pub fn new(backend: B, publisher: Box<dyn Publisher>, config: &ChannelConfig) -> Self {
        info!("view side channel created");
        let publisher: SharedPublisher = Rc::new(RefCell::new(publisher));
        Self {
            controller: ViewController::new(backend, publisher.clone(), config),
            publisher,
            backlog: VecDeque::new(),
            slot_ids: IdGenerator::new(&config.id_generator),
            dynamic_slots: HashMap::new(),
        }
    }

    pub fn controller(&self) -> &ViewController<B> {
        &self.controller
    }

    pub fn backend(&self) -> &B {
        self.controller.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.controller.backend_mut()
    }

    pub fn node(&self, id: NodeId) -> Option<B::Node> {
        self.controller.node(id)
    }

    pub fn component_state(&self, id: NodeId) -> Option<ComponentState> {
        self.controller.component_state(id)
    }

    /// Commands held back behind a pending component
    pub fn pending_commands(&self) -> usize {
        self.backlog.len()
    }

    pub fn live_events(&self) -> usize {
        self.controller.live_events()
    }

    /// Applies one message from the data side
    pub fn receive(&mut self, message: &WireMessage) -> Result<(), ViewError> {
        let message = DataMessage::from_wire(message).map_err(|err| {
            error!("rejecting message from data side: {}", err);
            err
        })?;
        debug!("received {:?}", message.opcode());

        let resolves_pending = match &message {
            DataMessage::AssociateValue { node, .. } | DataMessage::Release { id: node } => {
                self.controller.is_pending(*node)
            }
            _ => false,
        };
        if resolves_pending {
            self.apply(message)?;
        } else if !self.backlog.is_empty() || self.is_blocked(&message) {
            trace!("holding back {:?}", message.opcode());
            self.backlog.push_back(message);
            return Ok(());
        } else {
            self.apply(message)?;
        }
        self.drain_backlog()
    }

    /// Runs the work a host would schedule after the current dispatch:
    /// releases the ids of events that finished dispatching
    pub fn run_microtasks(&mut self) {
        self.controller.flush_event_releases();
    }

    fn is_blocked(&self, message: &DataMessage) -> bool {
        match message {
            DataMessage::AssociateValue { node, .. } | DataMessage::Release { id: node }
                if self.controller.is_pending(*node) =>
            {
                false
            }
            _ => message
                .referenced_nodes()
                .iter()
                .any(|id| self.controller.is_pending(*id)),
        }
    }

    fn drain_backlog(&mut self) -> Result<(), ViewError> {
        while let Some(front) = self.backlog.front() {
            if self.is_blocked(front) {
                break;
            }
            if let Some(message) = self.backlog.pop_front() {
                self.apply(message)?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, message: DataMessage) -> Result<(), ViewError> {
        if let DataMessage::Release { id } = &message {
            let id = *id;
            let cancelled = self.controller.pending_shadow_root(id);
            self.release_dynamic_slots_of(id);
            self.controller.apply(message)?;
            if let Some(shadow_root) = cancelled {
                self.drop_commands_of(id, shadow_root);
            }
            return Ok(());
        }
        self.controller.apply(message)
    }

    fn release_dynamic_slots_of(&mut self, component: NodeId) {
        let slots: Vec<SlotId> = self
            .dynamic_slots
            .iter()
            .filter(|(_, owner)| **owner == component)
            .map(|(slot, _)| *slot)
            .collect();
        for slot in slots {
            self.dynamic_slots.remove(&slot);
            self.slot_ids.release(slot);
        }
    }

    /// Drops held back commands that can no longer be applied because they
    /// depend on a component released before it was resolved
    fn drop_commands_of(&mut self, component: NodeId, shadow_root: NodeId) {
        let mut gone: HashSet<NodeId> = [component, shadow_root].into_iter().collect();
        let before = self.backlog.len();
        self.backlog.retain(|message| {
            if message
                .referenced_nodes()
                .iter()
                .any(|id| gone.contains(id))
            {
                gone.extend(message.created_nodes());
                false
            } else {
                true
            }
        });
        debug!(
            "dropped {} commands depending on released component {}",
            before - self.backlog.len(),
            component
        );
    }

    /// Announces new dynamic slot placeholders of a reflecting component
    /// and returns their ids
    pub fn insert_dynamic_slots(
        &mut self,
        component: NodeId,
        index: Option<u32>,
        slots: Vec<(String, Value)>,
    ) -> Vec<SlotId> {
        let slots: Vec<DynamicSlotInit> = slots
            .into_iter()
            .map(|(name, values)| DynamicSlotInit {
                slot: self.slot_ids.gen(),
                name,
                values,
            })
            .collect();
        let ids: Vec<SlotId> = slots.iter().map(|slot| slot.slot).collect();
        for id in &ids {
            self.dynamic_slots.insert(*id, component);
        }
        publish(
            &self.publisher,
            ViewMessage::InsertDynamicSlot {
                component,
                index,
                slots,
            },
        );
        ids
    }

    pub fn update_dynamic_slot(
        &mut self,
        slot: SlotId,
        values: Value,
        changed_names: Vec<String>,
    ) -> Result<(), ViewError> {
        if !self.dynamic_slots.contains_key(&slot) {
            return Err(ViewError::UnknownSlot { slot });
        }
        publish(
            &self.publisher,
            ViewMessage::UpdateDynamicSlot {
                slot,
                values,
                changed_names,
            },
        );
        Ok(())
    }

    pub fn remove_dynamic_slots(&mut self, slots: &[SlotId]) -> Result<(), ViewError> {
        if let Some(slot) = slots
            .iter()
            .find(|slot| !self.dynamic_slots.contains_key(*slot))
        {
            return Err(ViewError::UnknownSlot { slot: *slot });
        }
        for slot in slots {
            self.dynamic_slots.remove(slot);
            self.slot_ids.release(*slot);
        }
        publish(
            &self.publisher,
            ViewMessage::RemoveDynamicSlot {
                slots: slots.to_vec(),
            },
        );
        Ok(())
    }

    /// Calls the data side's custom method handler
    pub fn notify_custom_method(&mut self, node: Option<NodeId>, options: Value) {
        publish(
            &self.publisher,
            ViewMessage::CustomMethodNotify { node, options },
        );
    }
}
