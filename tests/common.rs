//! Common test utilities for building datasets and store stubs.
use racine::config::{parse_formula_tokens, ConditionRecord};
use racine::node::NodeType;
use racine::prelude::*;
use std::cell::RefCell;

/// Creates a bare leaf field node.
#[allow(dead_code)]
pub fn leaf(id: &str, label: &str) -> Node {
    Node {
        id: id.to_string(),
        node_type: NodeType::Leaf,
        sub_type: None,
        label: label.to_string(),
        order: 0,
        is_required: false,
        is_visible: true,
        is_active: true,
        parent_id: None,
        tree_id: None,
        is_shared_reference: false,
        shared_reference_ids: Vec::new(),
        capacity: None,
        field_config: None,
    }
}

/// Creates a formula from a raw JSON token array.
#[allow(dead_code)]
pub fn formula(id: &str, node_id: &str, tokens: serde_json::Value) -> Formula {
    Formula {
        id: id.to_string(),
        node_id: node_id.to_string(),
        tokens: parse_formula_tokens(&tokens).unwrap(),
    }
}

/// The electricity-price scenario used across the integration tests.
///
/// `prix-kwh` is a field guarded by a condition: when the user entered a
/// price it is used directly, otherwise the price is derived as
/// `cout / conso` through the `f-cout` formula owned by `prix-calc`.
///
/// Submission `s1` has cost and consumption but no entered price;
/// submission `s2` additionally has `prix-kwh = 0.25`.
#[allow(dead_code)]
pub fn prix_kwh_dataset() -> Dataset {
    let mut data = Dataset::new();

    data.nodes.push(leaf("cout", "Cout"));
    data.nodes.push(leaf("conso", "Consommation"));
    data.nodes.push(leaf("prix-kwh", "Prix Kw/h"));
    let mut calc = leaf("prix-calc", "Prix calculé");
    calc.node_type = NodeType::Formula;
    data.nodes.push(calc);

    data.formulas.push(formula(
        "f-cout",
        "prix-calc",
        serde_json::json!(["ref:cout", "/", "ref:conso"]),
    ));

    let set: ConditionSet = serde_json::from_value(serde_json::json!({
        "branches": [{
            "when": { "left": { "ref": "@value.prix-kwh" }, "op": "isNotEmpty" },
            "actions": [{ "nodeIds": ["prix-kwh"] }]
        }],
        "fallback": { "actions": [{ "nodeIds": ["node-formula:f-cout"] }] }
    }))
    .unwrap();
    data.conditions.push(ConditionRecord {
        id: "c-prix".to_string(),
        node_id: "prix-kwh".to_string(),
        set,
    });

    data.set_value("s1", "cout", 4000.0);
    data.set_value("s1", "conso", 1000.0);

    data.set_value("s2", "cout", 4000.0);
    data.set_value("s2", "conso", 1000.0);
    data.set_value("s2", "prix-kwh", 0.25);

    data
}

/// A submission store that counts how many times the backing store is
/// actually consulted, to assert the once-per-node-per-pass cache property.
#[allow(dead_code)]
pub struct CountingStore {
    pub inner: Dataset,
    pub reads: RefCell<usize>,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(inner: Dataset) -> Self {
        Self {
            inner,
            reads: RefCell::new(0),
        }
    }

    pub fn read_count(&self) -> usize {
        *self.reads.borrow()
    }
}

impl SubmissionStore for CountingStore {
    fn value(&self, submission_id: &str, node_id: &str) -> Option<Value> {
        *self.reads.borrow_mut() += 1;
        self.inner.value(submission_id, node_id)
    }
}
