/// Random edit sequences applied on the data side must leave the view side
/// with exactly the tree a plain model predicts.

use proptest::prelude::*;

use shadow_sync_data::ShadowElement;
use shadow_sync_test::{Harness, Shape};

#[derive(Clone, Debug)]
enum Op {
    CreateElement,
    CreateText,
    Append { parent: usize, child: usize },
    InsertBefore { parent: usize, child: usize, before: usize },
    Remove { child: usize },
    Release { node: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::CreateElement),
        2 => Just(Op::CreateText),
        4 => (any::<usize>(), any::<usize>()).prop_map(|(parent, child)| Op::Append { parent, child }),
        2 => (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(parent, child, before)| Op::InsertBefore { parent, child, before }),
        1 => any::<usize>().prop_map(|child| Op::Remove { child }),
        1 => any::<usize>().prop_map(|node| Op::Release { node }),
    ]
}

struct ModelNode {
    element: ShadowElement,
    label: String,
    is_element: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    released: bool,
}

/// Index 0 is the root, every other entry mirrors one data side node
struct Model {
    nodes: Vec<ModelNode>,
}

impl Model {
    fn new(root: ShadowElement) -> Self {
        Self {
            nodes: vec![ModelNode {
                element: root,
                label: "root".to_string(),
                is_element: true,
                parent: None,
                children: Vec::new(),
                released: false,
            }],
        }
    }

    fn live(&self) -> Vec<usize> {
        (1..self.nodes.len())
            .filter(|index| !self.nodes[*index].released)
            .collect()
    }

    fn containers(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|index| self.nodes[*index].is_element && !self.nodes[*index].released)
            .collect()
    }

    fn is_ancestor(&self, ancestor: usize, mut node: usize) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: usize) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|other| *other != child);
        }
    }

    fn shape(&self, index: usize) -> Shape {
        let node = &self.nodes[index];
        Shape {
            label: node.label.clone(),
            id: None,
            classes: Vec::new(),
            slot: None,
            children: node.children.iter().map(|child| self.shape(*child)).collect(),
            shadow: None,
        }
    }
}

fn pick(items: &[usize], seed: usize) -> Option<usize> {
    if items.is_empty() {
        None
    } else {
        Some(items[seed % items.len()])
    }
}

fn apply(harness: &mut Harness, model: &mut Model, op: Op) {
    let root = model.nodes[0].element;
    match op {
        Op::CreateElement | Op::CreateText => {
            let count = model.nodes.len();
            let is_element = matches!(op, Op::CreateElement);
            let (element, label) = if is_element {
                (
                    harness.data.create_element("view", "view", &root),
                    "element:view".to_string(),
                )
            } else {
                let text = format!("t{}", count);
                (
                    harness.data.create_text_node(&text, &root),
                    format!("text:{}", text),
                )
            };
            model.nodes.push(ModelNode {
                element,
                label,
                is_element,
                parent: None,
                children: Vec::new(),
                released: false,
            });
        }
        Op::Append { parent, child } => {
            let (Some(parent), Some(child)) = (pick(&model.containers(), parent), pick(&model.live(), child))
            else {
                return;
            };
            if model.is_ancestor(child, parent) {
                return;
            }
            let (parent_element, child_element) = (model.nodes[parent].element, model.nodes[child].element);
            harness.data.append_child(&parent_element, &child_element);
            model.detach(child);
            model.nodes[parent].children.push(child);
            model.nodes[child].parent = Some(parent);
        }
        Op::InsertBefore { parent, child, before } => {
            let Some(parent) = pick(&model.containers(), parent) else {
                return;
            };
            let siblings = model.nodes[parent].children.clone();
            let (Some(before), Some(child)) = (pick(&siblings, before), pick(&model.live(), child))
            else {
                return;
            };
            if child == before || model.is_ancestor(child, parent) {
                return;
            }
            harness.data.insert_before(
                &model.nodes[parent].element,
                &model.nodes[child].element,
                &model.nodes[before].element,
            );
            model.detach(child);
            let children = &mut model.nodes[parent].children;
            let index = children
                .iter()
                .position(|other| *other == before)
                .unwrap_or(children.len());
            children.insert(index, child);
            model.nodes[child].parent = Some(parent);
        }
        Op::Remove { child } => {
            let attached: Vec<usize> = model
                .live()
                .into_iter()
                .filter(|index| model.nodes[*index].parent.is_some())
                .collect();
            let Some(child) = pick(&attached, child) else {
                return;
            };
            let Some(parent) = model.nodes[child].parent else {
                return;
            };
            harness
                .data
                .remove_child(&model.nodes[parent].element, &model.nodes[child].element);
            model.detach(child);
        }
        Op::Release { node } => {
            // only detached leaves, so no released node stays in the tree
            let free: Vec<usize> = model
                .live()
                .into_iter()
                .filter(|index| {
                    model.nodes[*index].parent.is_none() && model.nodes[*index].children.is_empty()
                })
                .collect();
            let Some(node) = pick(&free, node) else {
                return;
            };
            harness.data.release(&model.nodes[node].element);
            model.nodes[node].released = true;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_edits_keep_both_trees_isomorphic(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut harness = Harness::new();
        let mut model = Model::new(harness.data.root());

        for op in ops {
            apply(&mut harness, &mut model, op);
        }
        harness.pump().unwrap();

        prop_assert_eq!(harness.backend().root_shapes(), model.shape(0).children);
        prop_assert_eq!(harness.data.live_nodes(), model.live().len());
        prop_assert_eq!(harness.view.controller().live_nodes(), model.live().len());
    }
}
