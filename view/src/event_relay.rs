use std::{cell::RefCell, collections::HashMap, hash::Hash, rc::Rc};

use log::{trace, warn};

use shadow_sync_shared::{EventId, IdGenerator, IdGeneratorConfig, Publisher, ViewMessage};

use crate::{
    backend::{EventListener, ViewEvent},
    registry::NodeIndex,
};

pub(crate) type SharedPublisher = Rc<RefCell<Box<dyn Publisher>>>;

pub(crate) fn publish(publisher: &SharedPublisher, message: ViewMessage) {
    trace!("publishing {:?}", message.opcode());
    publisher.borrow_mut().publish(message.to_wire());
}

/// Forwards backend events to the data side.
///
/// The first notification of a dispatch allocates an event id and carries
/// the full event description. Later notifications of the same dispatch only
/// carry the id. Ids are released once the host runs its microtasks, after
/// the dispatch has finished.
pub(crate) struct EventRelay {
    publisher: SharedPublisher,
    event_ids: IdGenerator<EventId>,
    live: HashMap<u64, EventId>,
    releases: Vec<u64>,
}

impl EventRelay {
    pub fn new(publisher: SharedPublisher, config: &IdGeneratorConfig) -> Self {
        Self {
            publisher,
            event_ids: IdGenerator::new(config),
            live: HashMap::new(),
            releases: Vec::new(),
        }
    }

    pub fn notify<N: Eq + Hash>(&mut self, index: &NodeIndex<N>, event: &ViewEvent<N>) {
        let ids = {
            let index = index.borrow();
            index
                .get(&event.current_target)
                .copied()
                .zip(index.get(&event.target).copied())
        };
        let Some((current_target, target)) = ids else {
            trace!("event `{}` on a node unknown to the channel", event.name);
            return;
        };

        let message = match self.live.get(&event.dispatch_id) {
            Some(id) => ViewMessage::Event {
                event: *id,
                current_target,
                mark: event.mark.clone(),
                target,
                capture: event.capture,
            },
            None => {
                let id = self.event_ids.gen();
                self.live.insert(event.dispatch_id, id);
                self.releases.push(event.dispatch_id);
                ViewMessage::CreateEvent {
                    event: id,
                    name: event.name.clone(),
                    detail: event.detail.clone(),
                    options: event.options.clone(),
                    current_target,
                    mark: event.mark.clone(),
                    target,
                    capture: event.capture,
                }
            }
        };
        publish(&self.publisher, message);
    }

    /// Releases every event id allocated since the last call
    pub fn flush_releases(&mut self) {
        for dispatch_id in std::mem::take(&mut self.releases) {
            match self.live.remove(&dispatch_id) {
                Some(event) => {
                    publish(&self.publisher, ViewMessage::ReleaseEvent { event });
                    self.event_ids.release(event);
                }
                None => warn!("dispatch {} released twice", dispatch_id),
            }
        }
    }

    pub fn live_events(&self) -> usize {
        self.live.len()
    }
}

/// Listener handed to the backend for every registered event type
pub(crate) fn relay_listener<N: Eq + Hash + 'static>(
    relay: &Rc<RefCell<EventRelay>>,
    index: &NodeIndex<N>,
) -> EventListener<N> {
    let relay = relay.clone();
    let index = index.clone();
    Box::new(move |event| relay.borrow_mut().notify(&index, event))
}
