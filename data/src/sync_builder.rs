use std::{cell::RefCell, rc::Rc};

use serde_json::{Map, Value};

use shadow_sync_shared::{DataChange, PathSegment};

use crate::{context::ShadowBackendContext, element::ShadowElement};

pub type FieldObserver = Box<dyn FnMut(&ShadowElement, &Value)>;

/// Declaration surface of a host component definition
pub trait BehaviorBuilder {
    fn property(&mut self, name: &str, default: Value);

    fn static_data(&mut self, data: &Map<String, Value>);

    /// `observer` runs with the component's element whenever the field changes
    fn observer(&mut self, name: &str, observer: FieldObserver);
}

#[derive(Default)]
struct PendingChanges {
    changes: Vec<(ShadowElement, Vec<DataChange>)>,
}

impl PendingChanges {
    fn push(&mut self, element: &ShadowElement, change: DataChange) {
        match self
            .changes
            .iter_mut()
            .find(|(other, _)| other.id() == element.id())
        {
            Some((_, changes)) => changes.push(change),
            None => self.changes.push((*element, vec![change])),
        }
    }
}

/// Forwards every declaration to the wrapped builder and additionally
/// observes each declared property and static data field, so that changes
/// reach the view side as `update_values` batches.
pub struct SyncedBehaviorBuilder<B: BehaviorBuilder> {
    inner: B,
    fields: Vec<String>,
    pending: Rc<RefCell<PendingChanges>>,
}

impl<B: BehaviorBuilder> SyncedBehaviorBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            fields: Vec::new(),
            pending: Rc::new(RefCell::new(PendingChanges::default())),
        }
    }

    fn sync_field(&mut self, name: &str) {
        self.fields.push(name.to_string());
        let pending = self.pending.clone();
        let field = name.to_string();
        self.inner.observer(
            name,
            Box::new(move |element, value| {
                pending.borrow_mut().push(
                    element,
                    DataChange::replace(vec![PathSegment::Field(field.clone())], value.clone()),
                );
            }),
        );
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.borrow().changes.is_empty()
    }

    /// Publishes one `update_values` per changed component, in order of
    /// first change
    pub fn flush(&self, context: &mut ShadowBackendContext) {
        let changes = std::mem::take(&mut self.pending.borrow_mut().changes);
        for (element, changes) in changes {
            context.update_values(&element, changes);
        }
    }

    /// Values of every synced field, taken from the component's data
    pub fn initial_values(&self, data: &Map<String, Value>) -> Value {
        let values: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|field| data.get(field).map(|value| (field.clone(), value.clone())))
            .collect();
        Value::Object(values)
    }

    /// To be called once the component instance has been created
    pub fn init_component(
        &self,
        context: &mut ShadowBackendContext,
        element: &ShadowElement,
        data: &Map<String, Value>,
    ) {
        context.init_values(element, self.initial_values(data));
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: BehaviorBuilder> BehaviorBuilder for SyncedBehaviorBuilder<B> {
    fn property(&mut self, name: &str, default: Value) {
        self.inner.property(name, default);
        self.sync_field(name);
    }

    fn static_data(&mut self, data: &Map<String, Value>) {
        self.inner.static_data(data);
        for key in data.keys() {
            self.sync_field(key);
        }
    }

    fn observer(&mut self, name: &str, observer: FieldObserver) {
        self.inner.observer(name, observer);
    }
}
