use std::collections::HashMap;

use shadow_sync_shared::NodeId;

use crate::backend::ComponentInit;

/// Creation state of a component announced by the data side.
///
/// A component stays `AwaitingDecision` until `associate_value` reports
/// whether it is rendered by the host framework. Only then is the backend
/// asked to create it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentState {
    AwaitingDecision,
    Resolved { external: bool },
}

/// Everything needed to create the component once it is resolved
#[derive(Clone, Debug)]
pub(crate) struct PendingComponent {
    pub id: NodeId,
    pub shadow_root: NodeId,
    pub init: ComponentInit,
    pub owner: Option<NodeId>,
    pub shadow_root_released: bool,
}

enum Phase {
    AwaitingDecision(Box<PendingComponent>),
    Resolved { external: bool },
}

#[derive(Default)]
pub(crate) struct ComponentTable {
    components: HashMap<NodeId, Phase>,
    shadow_roots: HashMap<NodeId, NodeId>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, id: NodeId, shadow_root: NodeId, init: ComponentInit, owner: Option<NodeId>) {
        self.shadow_roots.insert(shadow_root, id);
        self.components.insert(
            id,
            Phase::AwaitingDecision(Box::new(PendingComponent {
                id,
                shadow_root,
                init,
                owner,
                shadow_root_released: false,
            })),
        );
    }

    /// Component id for either the component itself or its shadow root
    fn component_of(&self, id: NodeId) -> NodeId {
        self.shadow_roots.get(&id).copied().unwrap_or(id)
    }

    pub fn state(&self, id: NodeId) -> Option<ComponentState> {
        match self.components.get(&id)? {
            Phase::AwaitingDecision(_) => Some(ComponentState::AwaitingDecision),
            Phase::Resolved { external } => Some(ComponentState::Resolved {
                external: *external,
            }),
        }
    }

    pub fn pending(&self, id: NodeId) -> Option<&PendingComponent> {
        match self.components.get(&id)? {
            Phase::AwaitingDecision(pending) => Some(pending),
            Phase::Resolved { .. } => None,
        }
    }

    /// Whether `id` is a component, or the shadow root of one, that has not
    /// been created on the backend yet
    pub fn is_pending(&self, id: NodeId) -> bool {
        matches!(
            self.components.get(&self.component_of(id)),
            Some(Phase::AwaitingDecision(_))
        )
    }

    pub fn has_pending(&self) -> bool {
        self.components
            .values()
            .any(|phase| matches!(phase, Phase::AwaitingDecision(_)))
    }

    /// `AwaitingDecision -> Resolved`. Returns the creation parameters, or
    /// `None` if the component was not awaiting a decision.
    pub fn resolve(&mut self, id: NodeId, external: bool) -> Option<PendingComponent> {
        let phase = self.components.get_mut(&id)?;
        if !matches!(phase, Phase::AwaitingDecision(_)) {
            return None;
        }
        let pending = match std::mem::replace(phase, Phase::Resolved { external }) {
            Phase::AwaitingDecision(pending) => *pending,
            Phase::Resolved { .. } => return None,
        };
        if pending.shadow_root_released {
            self.shadow_roots.remove(&pending.shadow_root);
        }
        Some(pending)
    }

    /// Forgets a released component or shadow root. Returns the pending
    /// creation when a component is released before being resolved.
    pub fn release(&mut self, id: NodeId) -> Option<PendingComponent> {
        if let Some(component) = self.shadow_roots.get(&id).copied() {
            // kept while pending, commands created inside it are still held back
            match self.components.get_mut(&component) {
                Some(Phase::AwaitingDecision(pending)) => pending.shadow_root_released = true,
                _ => {
                    self.shadow_roots.remove(&id);
                }
            }
            return None;
        }
        match self.components.remove(&id)? {
            Phase::AwaitingDecision(pending) => {
                self.shadow_roots.remove(&pending.shadow_root);
                Some(*pending)
            }
            Phase::Resolved { .. } => None,
        }
    }
}
