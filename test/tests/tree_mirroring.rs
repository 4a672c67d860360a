/// End-to-end tests for tree commands: every operation issued on the data
/// side must leave the view side's tree in the matching shape.

use serde_json::json;

use shadow_sync_data::ShadowElement;
use shadow_sync_shared::{AssociateValueInfo, NodeId};
use shadow_sync_test::{Harness, MemoryKind, Shape};

fn init() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = Harness::new();
    harness.pump().expect("handshake failed");
    harness
}

fn labels(shapes: &[Shape]) -> Vec<String> {
    shapes.iter().map(|shape| shape.label.clone()).collect()
}

fn children_of(harness: &Harness, element: &ShadowElement) -> Vec<String> {
    let node = harness.view.node(element.id()).expect("node not mirrored");
    labels(&harness.backend().shape(node).children)
}

#[test]
fn handshake_fills_the_environment() {
    let harness = init();

    assert_eq!(harness.data.window_width(), 375.0);
    assert_eq!(harness.data.window_height(), 667.0);
    assert_eq!(harness.data.device_pixel_ratio(), 2.0);
    assert_eq!(harness.data.theme(), "dark");
}

#[test]
fn element_with_text_child_under_the_root() {
    let mut harness = init();
    let root = harness.data.root();

    let view = harness.data.create_element("view", "view", &root);
    let text = harness.data.create_text_node("hello", &root);
    harness.data.append_child(&view, &text);
    harness.data.append_child(&root, &view);
    harness.pump().unwrap();

    assert_eq!(view.id(), NodeId::new(1));
    assert_eq!(text.id(), NodeId::new(2));

    let shapes = harness.backend().root_shapes();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].label, "element:view");
    assert_eq!(labels(&shapes[0].children), vec!["text:hello"]);

    let view_node = harness.view.node(view.id()).unwrap();
    let text_node = harness.view.node(text.id()).unwrap();
    assert!(harness.backend().entry(view_node).attached);
    assert!(!harness.backend().entry(text_node).attached);
    assert_eq!(harness.view.controller().id_of(&view_node), Some(view.id()));
}

#[test]
fn structural_operations_keep_child_order() {
    let mut harness = init();
    let root = harness.data.root();
    let parent = harness.data.create_element("view", "view", &root);
    harness.data.append_child(&root, &parent);

    let texts: Vec<ShadowElement> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| harness.data.create_text_node(name, &root))
        .collect();
    for text in &texts {
        harness.data.append_child(&parent, text);
    }

    let x = harness.data.create_text_node("x", &root);
    harness.data.insert_before(&parent, &x, &texts[1]);
    let y = harness.data.create_text_node("y", &root);
    harness.data.replace_child(&parent, &y, &texts[2]);
    harness.data.remove_child(&parent, &texts[0]);
    harness.pump().unwrap();
    assert_eq!(
        children_of(&harness, &parent),
        vec!["text:x", "text:b", "text:y", "text:d"]
    );

    let fragment = harness.data.create_fragment();
    let z1 = harness.data.create_text_node("z1", &root);
    let z2 = harness.data.create_text_node("z2", &root);
    harness.data.append_child(&fragment, &z1);
    harness.data.append_child(&fragment, &z2);
    harness.data.splice_before(&parent, &texts[1], 2, &fragment);
    harness.data.release(&fragment);
    harness.pump().unwrap();
    assert_eq!(
        children_of(&harness, &parent),
        vec!["text:x", "text:z1", "text:z2", "text:d"]
    );

    harness.data.splice_remove(&parent, &z1, 2);
    let tail = harness.data.create_fragment();
    let w = harness.data.create_text_node("w", &root);
    harness.data.append_child(&tail, &w);
    harness.data.splice_append(&parent, &tail);
    harness.data.release(&tail);
    harness.pump().unwrap();
    assert_eq!(
        children_of(&harness, &parent),
        vec!["text:x", "text:d", "text:w"]
    );
}

#[test]
fn root_replacement_moves_the_attached_flag() {
    let mut harness = init();
    let root = harness.data.root();
    let first = harness.data.create_element("view", "view", &root);
    let second = harness.data.create_element("image", "image", &root);
    harness.data.append_child(&root, &first);
    harness.data.replace_child(&root, &second, &first);
    harness.pump().unwrap();

    let first_node = harness.view.node(first.id()).unwrap();
    let second_node = harness.view.node(second.id()).unwrap();
    assert!(!harness.backend().entry(first_node).attached);
    assert!(harness.backend().entry(second_node).attached);
    assert_eq!(labels(&harness.backend().root_shapes()), vec!["element:image"]);
}

#[test]
fn attributes_reach_the_view_side() {
    let mut harness = init();
    let root = harness.data.root();
    let element = harness.data.create_element("view", "view", &root);
    harness.data.set_id(&element, "header");
    harness.data.add_class(&element, "a");
    harness.data.add_class(&element, "b");
    harness.data.remove_class(&element, "a");
    harness.data.set_style(&element, "color: red", 0);
    harness.data.set_style(&element, "display: none", 1);
    harness.data.set_attribute(&element, "hidden", json!(true));
    harness.data.set_attribute(&element, "title", json!("t"));
    harness.data.remove_attribute(&element, "title");
    harness.data.set_dataset(&element, "index", json!(3));
    harness.data.set_slot(&element, "footer");
    harness.pump().unwrap();

    let node = harness.view.node(element.id()).unwrap();
    let entry = harness.backend().entry(node);
    assert_eq!(entry.id.as_deref(), Some("header"));
    assert_eq!(entry.classes, vec!["b".to_string()]);
    assert_eq!(entry.styles.get(&0).map(String::as_str), Some("color: red"));
    assert_eq!(entry.styles.get(&1).map(String::as_str), Some("display: none"));
    assert_eq!(entry.attributes.get("hidden"), Some(&json!(true)));
    assert!(!entry.attributes.contains_key("title"));
    assert_eq!(entry.dataset.get("index"), Some(&json!(3)));
    assert_eq!(entry.slot.as_deref(), Some("footer"));

    harness.data.clear_classes(&element);
    harness.pump().unwrap();
    assert!(harness.backend().entry(node).classes.is_empty());
}

#[test]
fn text_updates_and_virtual_nodes() {
    let mut harness = init();
    let root = harness.data.root();
    let wrapper = harness.data.create_virtual_node("wx:if", &root);
    let text = harness.data.create_text_node("before", &root);
    harness.data.append_child(&wrapper, &text);
    harness.data.append_child(&root, &wrapper);
    harness.data.set_inherit_slots(&wrapper);
    harness.data.set_text(&text, "after");
    harness.pump().unwrap();

    let shapes = harness.backend().root_shapes();
    assert_eq!(shapes[0].label, "virtual:wx:if");
    assert_eq!(labels(&shapes[0].children), vec!["text:after"]);
    let wrapper_node = harness.view.node(wrapper.id()).unwrap();
    assert!(harness.backend().entry(wrapper_node).inherit_slots);
}

#[test]
fn components_mirror_with_their_shadow_tree() {
    let mut harness = init();
    let root = harness.data.root();
    let mut options = shadow_sync_data::ComponentOptions::new("card");
    options.virtual_host = true;
    let card = harness.data.create_component(&options, &root);
    harness
        .data
        .associate_value(&card, AssociateValueInfo::default());
    let shadow_root = card.shadow_root().unwrap();
    let title = harness.data.create_text_node("title", &shadow_root);
    harness.data.append_child(&shadow_root, &title);
    let light = harness.data.create_text_node("light", &root);
    harness.data.append_child(&card, &light);
    harness.data.append_child(&root, &card);
    harness.pump().unwrap();

    let shapes = harness.backend().root_shapes();
    assert_eq!(shapes[0].label, "component:card");
    assert_eq!(labels(&shapes[0].children), vec!["text:light"]);
    let shadow = shapes[0].shadow.as_ref().unwrap();
    assert_eq!(shadow.label, "shadow-root");
    assert_eq!(labels(&shadow.children), vec!["text:title"]);

    let card_node = harness.view.node(card.id()).unwrap();
    assert_eq!(
        harness.backend().entry(card_node).kind,
        MemoryKind::Component {
            tag_name: "card".to_string(),
            external: false
        }
    );
}

#[test]
fn release_frees_ids_on_both_sides() {
    let mut harness = init();
    let root = harness.data.root();
    let card = harness
        .data
        .create_component(&shadow_sync_data::ComponentOptions::new("card"), &root);
    harness
        .data
        .associate_value(&card, AssociateValueInfo::default());
    let text = harness.data.create_text_node("t", &root);
    harness.pump().unwrap();
    assert_eq!(harness.data.live_nodes(), 3);
    assert_eq!(harness.view.controller().live_nodes(), 3);

    harness.data.release(&card);
    harness.data.release(&text);
    harness.pump().unwrap();

    assert_eq!(harness.data.live_nodes(), 0);
    assert_eq!(harness.view.controller().live_nodes(), 0);
    assert_eq!(harness.backend().live_nodes(), 0);

    // released ids are handed out again
    let reused = harness.data.create_text_node("again", &root);
    assert!(reused.id().value() <= 3);
}
