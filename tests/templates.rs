//! Template authoring consistency rules on the in-memory store.
mod common;

use common::*;
use racine::prelude::*;

fn template(id: &str, label: &str) -> SharedReferenceTemplate {
    SharedReferenceTemplate {
        id: id.to_string(),
        label: label.to_string(),
        description: String::new(),
        capacity: None,
        usage_count: 0,
        usages: Vec::new(),
    }
}

fn authoring_dataset() -> Dataset {
    let mut data = Dataset::new();
    data.nodes.push(leaf("a", "Champ A"));
    data.nodes.push(leaf("b", "Champ B"));
    data.templates.push(template("t-1", "Prix Kw/h"));
    data
}

#[test]
fn linking_marks_the_node_and_tracks_usage() {
    let mut data = authoring_dataset();

    data.link_template("a", "t-1").unwrap();

    let node = data.nodes.iter().find(|n| n.id == "a").unwrap();
    assert!(node.is_shared_reference);
    assert_eq!(node.shared_reference_ids, vec!["t-1".to_string()]);

    let template = data.templates.iter().find(|t| t.id == "t-1").unwrap();
    assert_eq!(template.usage_count, 1);
    assert_eq!(template.usages[0].path, "Champ A");
}

#[test]
fn linking_is_idempotent() {
    let mut data = authoring_dataset();

    data.link_template("a", "t-1").unwrap();
    data.link_template("a", "t-1").unwrap();

    let node = data.nodes.iter().find(|n| n.id == "a").unwrap();
    assert_eq!(node.shared_reference_ids.len(), 1);
    assert_eq!(data.template_usage("t-1"), 1);
}

#[test]
fn linking_unknown_ids_is_refused() {
    let mut data = authoring_dataset();

    assert_eq!(
        data.link_template("a", "t-missing"),
        Err(ConfigError::UnknownTemplate("t-missing".to_string()))
    );
    assert_eq!(
        data.link_template("missing", "t-1"),
        Err(ConfigError::UnknownNode("missing".to_string()))
    );
}

#[test]
fn unlinking_the_last_reference_restores_independence() {
    let mut data = authoring_dataset();
    data.link_template("a", "t-1").unwrap();

    data.unlink_template("a", "t-1").unwrap();

    let node = data.nodes.iter().find(|n| n.id == "a").unwrap();
    assert!(!node.is_shared_reference);
    assert!(node.shared_reference_ids.is_empty());
    assert_eq!(data.template_usage("t-1"), 0);
}

#[test]
fn deleting_a_linked_template_requires_confirmation() {
    let mut data = authoring_dataset();
    data.link_template("a", "t-1").unwrap();
    data.link_template("b", "t-1").unwrap();

    assert_eq!(
        data.delete_template("t-1", false),
        Err(ConfigError::TemplateInUse {
            template_id: "t-1".to_string(),
            usage_count: 2,
        })
    );
    // Nothing was touched by the refused delete.
    assert_eq!(data.templates.len(), 1);
    assert_eq!(data.template_usage("t-1"), 2);
}

#[test]
fn confirmed_delete_cascade_clears_every_referencing_node() {
    let mut data = authoring_dataset();
    data.link_template("a", "t-1").unwrap();
    data.link_template("b", "t-1").unwrap();

    data.delete_template("t-1", true).unwrap();

    assert!(data.templates.is_empty());
    for id in ["a", "b"] {
        let node = data.nodes.iter().find(|n| n.id == id).unwrap();
        assert!(!node.is_shared_reference);
        assert!(node.shared_reference_ids.is_empty());
    }
}

#[test]
fn deleting_an_unused_template_needs_no_confirmation() {
    let mut data = authoring_dataset();

    data.delete_template("t-1", false).unwrap();
    assert!(data.templates.is_empty());
}
