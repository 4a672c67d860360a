/// Replay of a live logical tree into a freshly attached view side.

use shadow_sync_data::ComponentOptions;
use shadow_sync_shared::{EventMutLevel, ReplayConfig};
use shadow_sync_test::{Harness, LogicalNode, LogicalTree, MemoryBackend};

struct Page {
    tree: LogicalTree,
    page: LogicalNode,
    card: LogicalNode,
    slot: LogicalNode,
    slotted: LogicalNode,
}

// page#page.main
//   text "hello"
//   card
//     shadow: slot(name=body)
//     light: view[slot=body] distributed into the slot
//   list with six items
fn page() -> Page {
    let mut tree = LogicalTree::new();
    let page = tree.element("view");
    tree.set_id(page, "page");
    tree.add_class(page, "main");
    tree.set_style(page, &["color: red", "", "margin: 0"]);
    tree.listen(page, "tap", false, EventMutLevel::None);
    tree.listen(page, "tap", false, EventMutLevel::Mut);

    let hello = tree.text("hello");
    tree.append(page, hello);

    let card = tree.component(ComponentOptions::new("card"));
    let shadow_root = tree.shadow_root_of(card).unwrap();
    let slot = tree.element("slot");
    tree.set_slot_name(slot, "body");
    tree.append(shadow_root, slot);
    let slotted = tree.element("view");
    tree.set_slot(slotted, "body");
    tree.distribute(slotted, slot);
    tree.append(card, slotted);
    tree.append(page, card);

    let list = tree.element("list");
    for i in 0..6 {
        let item = tree.text(&format!("item {}", i));
        tree.append(list, item);
    }
    tree.append(page, list);

    Page {
        tree,
        page,
        card,
        slot,
        slotted,
    }
}

fn init() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = Harness::new();
    harness.pump().unwrap();
    harness
}

#[test]
fn replayed_tree_matches_the_logical_tree() {
    let mut harness = init();
    let mut page = page();

    let roots = harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    assert_eq!(roots.len(), 1);
    assert_eq!(harness.backend().root_shapes(), vec![page.tree.shape(page.page)]);
    assert!(!harness.view.controller().has_pending_components());

    // the batching fragment is gone on both sides
    assert_eq!(harness.data.live_nodes(), harness.view.controller().live_nodes());
}

#[test]
fn replay_restores_attributes_listeners_and_slots() {
    let mut harness = init();
    let mut page = page();
    harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    let element = |node: LogicalNode| page.tree.replayed(node).unwrap();
    let page_node = harness.view.node(element(page.page).id()).unwrap();
    let entry = harness.backend().entry(page_node);
    assert_eq!(entry.styles.get(&0).map(String::as_str), Some("color: red"));
    assert!(!entry.styles.contains_key(&1));
    assert_eq!(entry.styles.get(&2).map(String::as_str), Some("margin: 0"));
    assert!(entry.attached);
    assert_eq!(
        harness.backend().listener_level(page_node, "tap", false),
        Some(EventMutLevel::Mut)
    );
    assert_eq!(harness.backend().listener_count(), 1);

    let slot_node = harness.view.node(element(page.slot).id()).unwrap();
    let slotted_node = harness.view.node(element(page.slotted).id()).unwrap();
    assert_eq!(
        harness.backend().entry(slot_node).slot_name.as_deref(),
        Some("body")
    );
    assert_eq!(
        harness.backend().entry(slotted_node).slot_element,
        Some(slot_node)
    );

    let card_node = harness.view.node(element(page.card).id()).unwrap();
    assert!(harness.backend().entry(card_node).associated.is_some());
}

#[test]
fn replay_into_a_restarted_view_reuses_ids() {
    let mut harness = init();
    let mut page = page();
    let first = harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();
    let card = page.tree.replayed(page.card).unwrap();

    let old_view = harness.restart_view(MemoryBackend::new());
    page.tree.reuse_elements = true;
    let second = harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    assert_eq!(first, second);
    assert_eq!(page.tree.replayed(page.card), Some(card));
    assert_eq!(
        harness.backend().root_shapes(),
        old_view.backend().root_shapes()
    );
    assert_eq!(
        harness.view.controller().live_nodes(),
        old_view.controller().live_nodes()
    );
}

#[test]
fn replay_without_reuse_allocates_fresh_ids() {
    let mut harness = init();
    let mut page = page();
    let first = harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    harness.restart_view(MemoryBackend::new());
    let second = harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    assert_ne!(first[0].id(), second[0].id());
    assert_eq!(harness.backend().root_shapes(), vec![page.tree.shape(page.page)]);
}

#[test]
fn small_batch_threshold_still_yields_the_same_tree() {
    let mut harness = init();
    let mut page = page();
    let config = ReplayConfig { batch_threshold: 1 };
    harness.data.replay(&mut page.tree, &[page.page], &config);
    harness.pump().unwrap();

    assert_eq!(harness.backend().root_shapes(), vec![page.tree.shape(page.page)]);
}

#[test]
fn reflecting_components_replay_as_external() {
    let mut harness = Harness::with_backend(MemoryBackend::new().with_external_tags(&["card"]));
    harness.pump().unwrap();
    let mut page = page();
    page.tree.set_reflect(page.card, true);

    harness
        .data
        .replay(&mut page.tree, &[page.page], &ReplayConfig::default());
    harness.pump().unwrap();

    let card = page.tree.replayed(page.card).unwrap();
    assert!(harness.data.is_reflecting(&card));
    assert_eq!(
        harness.view.component_state(card.id()),
        Some(shadow_sync_view::ComponentState::Resolved { external: true })
    );
    assert_eq!(harness.backend().root_shapes(), vec![page.tree.shape(page.page)]);
}
