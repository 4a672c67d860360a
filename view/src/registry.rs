use std::{cell::RefCell, collections::HashMap, hash::Hash, rc::Rc};

use shadow_sync_shared::NodeId;

use crate::error::ViewError;

/// Reverse lookup from backend nodes to channel ids, shared with the
/// listeners the controller hands to the backend
pub(crate) type NodeIndex<N> = Rc<RefCell<HashMap<N, NodeId>>>;

pub(crate) enum Entry<N> {
    Node(N),
    /// Children collected for a single splice, never a backend node
    Fragment(Vec<N>),
}

impl<N> Entry<N> {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Node(_) => "node",
            Entry::Fragment(_) => "fragment",
        }
    }
}

/// Maps every live channel id to what the backend created for it
pub(crate) struct NodeRegistry<N: Clone + Eq + Hash> {
    entries: HashMap<NodeId, Entry<N>>,
    index: NodeIndex<N>,
}

impl<N: Clone + Eq + Hash> NodeRegistry<N> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            index: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn index(&self) -> NodeIndex<N> {
        self.index.clone()
    }

    pub fn insert_node(&mut self, id: NodeId, node: N) {
        self.index.borrow_mut().insert(node.clone(), id);
        self.entries.insert(id, Entry::Node(node));
    }

    pub fn insert_fragment(&mut self, id: NodeId) {
        self.entries.insert(id, Entry::Fragment(Vec::new()));
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.entries.get(&id), Some(Entry::Fragment(_)))
    }

    pub fn node(&self, id: NodeId) -> Result<N, ViewError> {
        match self.entries.get(&id) {
            Some(Entry::Node(node)) => Ok(node.clone()),
            Some(other) => Err(ViewError::WrongEntryKind {
                node: id,
                expected: "node",
                actual: other.kind(),
            }),
            None => Err(ViewError::UnknownNode { node: id }),
        }
    }

    pub fn fragment_mut(&mut self, id: NodeId) -> Result<&mut Vec<N>, ViewError> {
        match self.entries.get_mut(&id) {
            Some(Entry::Fragment(children)) => Ok(children),
            Some(other) => Err(ViewError::WrongEntryKind {
                node: id,
                expected: "fragment",
                actual: other.kind(),
            }),
            None => Err(ViewError::UnknownNode { node: id }),
        }
    }

    /// Empties a fragment, returning the children it collected
    pub fn take_fragment(&mut self, id: NodeId) -> Result<Vec<N>, ViewError> {
        self.fragment_mut(id).map(std::mem::take)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Entry<N>> {
        let entry = self.entries.remove(&id)?;
        if let Entry::Node(node) = &entry {
            let mut index = self.index.borrow_mut();
            if index.get(node) == Some(&id) {
                index.remove(node);
            }
        }
        Some(entry)
    }

    pub fn id_of(&self, node: &N) -> Option<NodeId> {
        self.index.borrow().get(node).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
