/// Slot placeholders announced by the view side for reflecting components.

use std::{cell::RefCell, rc::Rc};

use serde_json::{json, Value};

use shadow_sync_data::{ComponentOptions, DynamicSlotHandler, ShadowElement};
use shadow_sync_shared::{AssociateValueInfo, SlotId, SlotMode};
use shadow_sync_test::{Harness, MemoryBackend};
use shadow_sync_view::ViewError;

#[derive(Clone, Default)]
struct SlotLog {
    events: Rc<RefCell<Vec<String>>>,
}

impl DynamicSlotHandler for SlotLog {
    fn slot_inserted(
        &mut self,
        _component: ShadowElement,
        slot: SlotId,
        _placeholder: ShadowElement,
        values: &Value,
    ) {
        self.events
            .borrow_mut()
            .push(format!("insert {} {}", slot.value(), values));
    }

    fn slot_updated(
        &mut self,
        slot: SlotId,
        _placeholder: ShadowElement,
        values: &Value,
        changed_names: &[String],
    ) {
        self.events.borrow_mut().push(format!(
            "update {} {} {}",
            slot.value(),
            values,
            changed_names.join(",")
        ));
    }

    fn slot_removed(&mut self, slot: SlotId, _placeholder: ShadowElement) {
        self.events
            .borrow_mut()
            .push(format!("remove {}", slot.value()));
    }
}

fn init() -> (Harness, SlotLog, ShadowElement) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = Harness::with_backend(MemoryBackend::new().with_external_tags(&["list"]));
    let log = SlotLog::default();
    harness.data.set_dynamic_slot_handler(Box::new(log.clone()));

    let root = harness.data.root();
    let mut options = ComponentOptions::new("list");
    options.slot_mode = Some(SlotMode::Dynamic);
    let list = harness.data.create_component(&options, &root);
    harness
        .data
        .associate_value(&list, AssociateValueInfo { is_reflect: true });
    harness.data.append_child(&root, &list);
    harness.pump().unwrap();
    (harness, log, list)
}

fn placeholder_names(harness: &Harness, list: &ShadowElement) -> Vec<String> {
    let shadow_root = harness
        .view
        .node(list.shadow_root().unwrap().id())
        .unwrap();
    let backend = harness.backend();
    backend
        .entry(shadow_root)
        .children
        .iter()
        .map(|child| backend.entry(*child).slot_name.clone().unwrap_or_default())
        .collect()
}

#[test]
fn inserted_slots_become_placeholders() {
    let (mut harness, log, list) = init();

    let slots = harness.view.insert_dynamic_slots(
        list.id(),
        None,
        vec![
            ("a".to_string(), json!({ "x": 1 })),
            ("b".to_string(), json!({})),
        ],
    );
    harness.pump().unwrap();
    assert_eq!(placeholder_names(&harness, &list), vec!["a", "b"]);

    let front = harness
        .view
        .insert_dynamic_slots(list.id(), Some(0), vec![("c".to_string(), json!(null))]);
    harness.pump().unwrap();
    assert_eq!(placeholder_names(&harness, &list), vec!["c", "a", "b"]);

    let known: Vec<SlotId> = harness
        .data
        .dynamic_slots(&list)
        .into_iter()
        .map(|(slot, _)| slot)
        .collect();
    assert_eq!(known, vec![front[0], slots[0], slots[1]]);
    assert_eq!(log.events.borrow().len(), 3);
    assert_eq!(
        log.events.borrow()[0],
        format!("insert {} {}", slots[0].value(), json!({ "x": 1 }))
    );

    let shadow_root = harness
        .view
        .node(list.shadow_root().unwrap().id())
        .unwrap();
    let first = harness.backend().entry(shadow_root).children[0];
    assert_eq!(
        harness.backend().shape(first).label,
        "virtual:slot".to_string()
    );
}

#[test]
fn updates_and_removals_reach_the_data_side() {
    let (mut harness, log, list) = init();
    let slots = harness.view.insert_dynamic_slots(
        list.id(),
        None,
        vec![("a".to_string(), json!({})), ("b".to_string(), json!({}))],
    );
    harness.pump().unwrap();

    harness
        .view
        .update_dynamic_slot(slots[0], json!({ "x": 2 }), vec!["x".to_string()])
        .unwrap();
    harness.view.remove_dynamic_slots(&[slots[1]]).unwrap();
    harness.pump().unwrap();

    assert_eq!(placeholder_names(&harness, &list), vec!["a"]);
    let events = log.events.borrow();
    assert_eq!(
        events[2],
        format!("update {} {} x", slots[0].value(), json!({ "x": 2 }))
    );
    assert_eq!(events[3], format!("remove {}", slots[1].value()));
    assert_eq!(harness.data.dynamic_slots(&list).len(), 1);

    assert_eq!(
        harness.view.remove_dynamic_slots(&[slots[1]]),
        Err(ViewError::UnknownSlot { slot: slots[1] })
    );
}

#[test]
fn releasing_the_component_drops_its_slots() {
    let (mut harness, _log, list) = init();
    let slots = harness
        .view
        .insert_dynamic_slots(list.id(), None, vec![("a".to_string(), json!({}))]);
    harness.pump().unwrap();
    assert_eq!(harness.data.live_nodes(), 3);

    harness.data.release(&list);
    harness.pump().unwrap();

    assert!(harness.data.dynamic_slots(&list).is_empty());
    assert_eq!(harness.data.live_nodes(), 0);
    assert_eq!(harness.view.controller().live_nodes(), 0);
    assert_eq!(
        harness
            .view
            .update_dynamic_slot(slots[0], json!({}), Vec::new()),
        Err(ViewError::UnknownSlot { slot: slots[0] })
    );
}

#[test]
fn non_reflecting_components_ignore_slot_requests() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = Harness::new();
    let root = harness.data.root();
    let card = harness
        .data
        .create_component(&ComponentOptions::new("card"), &root);
    harness
        .data
        .associate_value(&card, AssociateValueInfo::default());
    harness.pump().unwrap();

    harness
        .view
        .insert_dynamic_slots(card.id(), None, vec![("a".to_string(), json!({}))]);
    harness.pump().unwrap();

    assert!(harness.data.dynamic_slots(&card).is_empty());
    assert_eq!(harness.data.live_nodes(), 2);
}
