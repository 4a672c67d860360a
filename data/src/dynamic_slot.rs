use std::collections::HashMap;

use serde_json::Value;

use shadow_sync_shared::{NodeId, SlotId};

use crate::element::ShadowElement;

/// Host hooks for slot placeholders synthesized on behalf of the view side
pub trait DynamicSlotHandler {
    fn slot_inserted(
        &mut self,
        _component: ShadowElement,
        _slot: SlotId,
        _placeholder: ShadowElement,
        _values: &Value,
    ) {
    }

    fn slot_updated(
        &mut self,
        _slot: SlotId,
        _placeholder: ShadowElement,
        _values: &Value,
        _changed_names: &[String],
    ) {
    }

    fn slot_removed(&mut self, _slot: SlotId, _placeholder: ShadowElement) {}
}

pub struct DynamicSlot {
    pub component: NodeId,
    pub name: String,
    pub placeholder: ShadowElement,
    pub values: Value,
}

/// Placeholders of every reflecting component, in shadow root order
#[derive(Default)]
pub struct DynamicSlotManager {
    slots: HashMap<SlotId, DynamicSlot>,
    order: HashMap<NodeId, Vec<SlotId>>,
}

impl DynamicSlotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder the new slot has to be inserted before, `None` to append
    pub fn anchor(&self, component: NodeId, index: Option<u32>) -> Option<ShadowElement> {
        let index = index? as usize;
        let slot = self.order.get(&component)?.get(index)?;
        self.placeholder(*slot)
    }

    pub fn insert(&mut self, slot: SlotId, position: Option<u32>, entry: DynamicSlot) {
        let order = self.order.entry(entry.component).or_default();
        match position {
            Some(index) if (index as usize) < order.len() => order.insert(index as usize, slot),
            _ => order.push(slot),
        }
        self.slots.insert(slot, entry);
    }

    pub fn placeholder(&self, slot: SlotId) -> Option<ShadowElement> {
        self.slots.get(&slot).map(|entry| entry.placeholder)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut DynamicSlot> {
        self.slots.get_mut(&slot)
    }

    pub fn remove(&mut self, slot: SlotId) -> Option<DynamicSlot> {
        let entry = self.slots.remove(&slot)?;
        if let Some(order) = self.order.get_mut(&entry.component) {
            order.retain(|other| *other != slot);
            if order.is_empty() {
                self.order.remove(&entry.component);
            }
        }
        Some(entry)
    }

    /// Forgets every slot of a released component
    pub fn remove_component(&mut self, component: NodeId) -> Vec<DynamicSlot> {
        let Some(order) = self.order.remove(&component) else {
            return Vec::new();
        };
        order
            .into_iter()
            .filter_map(|slot| self.slots.remove(&slot))
            .collect()
    }

    pub fn slots_of(&self, component: NodeId) -> Vec<SlotId> {
        self.order.get(&component).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
