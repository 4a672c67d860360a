use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::channel::WireMessage;

/// Outgoing half of a channel transport.
///
/// Delivery must be in-order and lossless. Messages published by one side are
/// handed to the other side's `receive` in the same order.
pub trait Publisher {
    fn publish(&mut self, message: WireMessage);
}

impl<F: FnMut(WireMessage)> Publisher for F {
    fn publish(&mut self, message: WireMessage) {
        self(message)
    }
}

/// A [`Publisher`] that only queues messages, to be drained by whoever owns
/// the other end.
#[derive(Clone, Default)]
pub struct QueuePublisher {
    queue: Arc<Mutex<VecDeque<WireMessage>>>,
}

impl QueuePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<WireMessage> {
        match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Publisher for QueuePublisher {
    fn publish(&mut self, message: WireMessage) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(message);
        }
    }
}
