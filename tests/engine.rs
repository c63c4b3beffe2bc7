//! End-to-end evaluation tests over in-memory datasets.
mod common;

use common::*;
use racine::config::Operand;
use racine::node::{Table, TableConfig};
use racine::prelude::*;
use racine::store::TableConfigRecord;

#[test]
fn folds_strictly_left_to_right_without_precedence() {
    let mut data = Dataset::new();
    data.formulas
        .push(formula("f", "n", serde_json::json!([2, "+", 3, "*", 4])));

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("formula:f", "s1");

    // (2 + 3) * 4, not 2 + (3 * 4)
    assert_eq!(evaluation.result, Some(20.0));
    assert_eq!(evaluation.rendered(), "2 (+) 3 (*) 4 (=) Result (20.0000)");
}

#[test]
fn renders_labels_and_values_for_node_operands() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let evaluation = engine.evaluate_ref("formula:f-cout", "s1");

    assert_eq!(evaluation.result, Some(4.0));
    assert_eq!(
        evaluation.rendered(),
        "Cout (4000) (/) Consommation (1000) (=) Result (4.0000)"
    );
    assert!(evaluation.faults.is_empty());
}

#[test]
fn condition_fails_open_to_fallback_when_value_absent() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let evaluation = engine.evaluate_ref("condition:c-prix", "s1");

    assert_eq!(evaluation.result, Some(4.0));
    assert_eq!(
        evaluation.rendered(),
        "Si Prix Kw/h n'est pas vide ; alors Prix Kw/h (\u{26a0}\u{fe0f} aucune donnée) \
         ; Sinon Cout (4000) (/) Consommation (1000) (=) Result (4.0000)"
    );
}

#[test]
fn condition_selects_branch_when_value_present() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let evaluation = engine.evaluate_ref("condition:c-prix", "s2");

    assert_eq!(evaluation.result, Some(0.25));
    assert_eq!(
        evaluation.rendered(),
        "Si Prix Kw/h n'est pas vide ; alors Prix Kw/h (0.25) \
         ; Sinon Cout (4000) (/) Consommation (1000) (=) Result (0.2500)"
    );
}

#[test]
fn bare_node_ref_resolves_the_default_capacity() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    // prix-calc has no entered value; its formula is evaluated instead.
    let evaluation = engine.evaluate_ref("prix-calc", "s1");
    assert_eq!(evaluation.result, Some(4.0));

    // prix-kwh has no entered value either; its condition takes over.
    let evaluation = engine.evaluate_ref("prix-kwh", "s1");
    assert_eq!(evaluation.result, Some(4.0));
}

#[test]
fn store_is_read_once_per_node_per_pass() {
    let mut data = Dataset::new();
    data.nodes.push(leaf("a", "A"));
    data.formulas.push(formula(
        "f-sum",
        "n",
        serde_json::json!(["ref:a", "+", "ref:a", "+", "ref:a"]),
    ));
    data.set_value("s1", "a", 1.0);

    let counting = CountingStore::new(data.clone());
    let engine = Engine::new(&data, &counting, &data, &data);

    let evaluation = engine.evaluate_ref("formula:f-sum", "s1");
    assert_eq!(evaluation.result, Some(3.0));
    assert_eq!(counting.read_count(), 1);
}

#[test]
fn passes_are_isolated_across_submissions() {
    let mut data = Dataset::new();
    data.nodes.push(leaf("a", "A"));
    data.formulas
        .push(formula("f", "n", serde_json::json!(["ref:a", "*", 2])));
    data.set_value("s1", "a", 1.0);
    data.set_value("s2", "a", 5.0);

    let engine = Engine::over(&data);
    assert_eq!(engine.evaluate_ref("formula:f", "s1").result, Some(2.0));
    assert_eq!(engine.evaluate_ref("formula:f", "s2").result, Some(10.0));
}

#[test]
fn missing_operand_poisons_the_result() {
    let mut data = Dataset::new();
    data.formulas
        .push(formula("f", "n", serde_json::json!(["ref:absent", "+", 1])));

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("formula:f", "s1");

    assert_eq!(evaluation.result, None);
    assert!(evaluation
        .faults
        .contains(&EvalFault::MissingValue {
            node_id: "absent".to_string()
        }));
    let rendered = evaluation.rendered();
    assert!(rendered.contains("Node absent (\u{26a0}\u{fe0f} aucune donnée)"));
    assert!(!rendered.contains("Result"));
}

#[test]
fn division_by_zero_is_reported_inline() {
    let mut data = prix_kwh_dataset();
    data.formulas
        .push(formula("f-zero", "n", serde_json::json!(["ref:cout", "/", 0])));

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("formula:f-zero", "s1");

    assert_eq!(evaluation.result, None);
    assert!(matches!(
        evaluation.faults.as_slice(),
        [EvalFault::DivisionByZero { .. }]
    ));
    assert!(evaluation.rendered().contains("division par zéro"));
}

#[test]
fn cyclic_formulas_terminate_with_a_fault() {
    let mut data = Dataset::new();
    data.formulas
        .push(formula("f1", "n1", serde_json::json!([1, "+", "formula-ref:f2"])));
    data.formulas
        .push(formula("f2", "n2", serde_json::json!(["formula-ref:f3", "+", 1])));
    data.formulas
        .push(formula("f3", "n3", serde_json::json!(["formula-ref:f1", "*", 2])));

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("formula:f1", "s1");

    assert_eq!(evaluation.result, None);
    assert!(evaluation.faults.contains(&EvalFault::CyclicReference {
        reference_id: "f1".to_string()
    }));
    assert!(evaluation.rendered().contains("référence cyclique"));
}

#[test]
fn malformed_token_sequence_falls_back_to_raw_text() {
    let mut data = Dataset::new();
    data.formulas
        .push(formula("f-bad", "n", serde_json::json!(["ref:cout", "+"])));

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("formula:f-bad", "s1");

    assert_eq!(evaluation.result, None);
    assert_eq!(evaluation.rendered(), "ref:cout +");
    assert!(matches!(
        evaluation.faults.as_slice(),
        [EvalFault::MalformedTokenSequence { .. }]
    ));
}

fn onduleur_dataset() -> Dataset {
    let mut data = Dataset::new();
    data.nodes.push(leaf("puissance", "Puissance"));
    data.tables.push(Table {
        name: "onduleurs".to_string(),
        headers: vec!["kw".to_string(), "prix".to_string()],
        rows: vec![
            vec!["10".to_string(), "1200".to_string()],
            vec!["20".to_string(), "2100".to_string()],
        ],
    });
    data.table_configs.push(TableConfigRecord {
        id: "t-ond".to_string(),
        node_id: "onduleur".to_string(),
        config: TableConfig {
            table_name: "onduleurs".to_string(),
            row: Operand::node("puissance"),
            column: Operand::constant("prix"),
        },
    });
    data
}

#[test]
fn table_lookup_resolves_a_cell() {
    let mut data = onduleur_dataset();
    data.set_value("s1", "puissance", 10.0);

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("table:t-ond", "s1");

    assert_eq!(evaluation.result, Some(1200.0));
    assert_eq!(evaluation.rendered(), "Tableau onduleurs[10][prix] = 1200");
    assert!(evaluation.faults.is_empty());
}

#[test]
fn table_lookup_miss_renders_the_marker() {
    let mut data = onduleur_dataset();
    data.set_value("s1", "puissance", 15.0);

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("table:t-ond", "s1");

    assert_eq!(evaluation.result, None);
    assert_eq!(
        evaluation.rendered(),
        "Tableau onduleurs[15] = \u{26a0}\u{fe0f} introuvable"
    );
    assert_eq!(
        evaluation.faults,
        vec![EvalFault::TableLookupMiss {
            table: "onduleurs".to_string(),
            row: "15".to_string(),
            column: "prix".to_string(),
        }]
    );
}

#[test]
fn shared_reference_takes_definition_from_template_and_value_from_site() {
    let mut data = Dataset::new();
    let mut site = leaf("site-prix", "Prix local");
    site.is_shared_reference = true;
    site.shared_reference_ids = vec!["t-prix".to_string()];
    data.nodes.push(site);
    data.templates.push(SharedReferenceTemplate {
        id: "t-prix".to_string(),
        label: "Prix Kw/h (standard)".to_string(),
        description: String::new(),
        capacity: Some(CapacityConfig::Formula(formula(
            "f-std",
            "t-prix",
            serde_json::json!([0.2, "*", 2]),
        ))),
        usage_count: 0,
        usages: Vec::new(),
    });

    let engine = Engine::over(&data);

    // No value at the usage site: the template's capacity is evaluated.
    let evaluation = engine.evaluate_ref("site-prix", "s1");
    assert_eq!(evaluation.result, Some(0.4));

    // With a value at the usage site, the template only contributes its label.
    let mut data = data;
    data.set_value("s1", "site-prix", 0.3);
    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("site-prix", "s1");
    assert_eq!(evaluation.result, Some(0.3));
    assert_eq!(evaluation.rendered(), "Prix Kw/h (standard) (0.3)");
}

#[test]
fn missing_template_degrades_to_a_placeholder() {
    let mut data = Dataset::new();
    let mut site = leaf("site-prix", "Prix local");
    site.is_shared_reference = true;
    site.shared_reference_ids = vec!["t-gone".to_string()];
    data.nodes.push(site);

    let engine = Engine::over(&data);
    let evaluation = engine.evaluate_ref("site-prix", "s1");

    assert_eq!(evaluation.result, None);
    assert!(evaluation.rendered().starts_with("Node site-pri"));
    assert!(matches!(
        evaluation.faults.as_slice(),
        [EvalFault::UnresolvedReference { .. }]
    ));
}

#[test]
fn subtree_evaluates_capacity_nodes_in_sibling_order() {
    let mut data = Dataset::new();
    let mut root = leaf("root", "Racine");
    root.node_type = racine::node::NodeType::Branch;
    data.nodes.push(root);

    let mut second = leaf("c-deux", "Deux");
    second.parent_id = Some("root".to_string());
    second.order = 2;
    data.nodes.push(second);

    let mut first = leaf("c-un", "Un");
    first.parent_id = Some("root".to_string());
    first.order = 1;
    data.nodes.push(first);

    data.formulas
        .push(formula("f-un", "c-un", serde_json::json!([1, "+", 1])));
    data.formulas
        .push(formula("f-deux", "c-deux", serde_json::json!([2, "*", 3])));

    let engine = Engine::over(&data);
    let outcomes = engine.evaluate_subtree("root", "s1");

    let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["c-un", "c-deux"]);
    assert_eq!(outcomes[0].1.result, Some(2.0));
    assert_eq!(outcomes[1].1.result, Some(6.0));
}
