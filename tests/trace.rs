//! Trace construction and rendering properties.
mod common;

use common::*;
use racine::prelude::*;

#[test]
fn rendering_is_idempotent() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let evaluation = engine.evaluate_ref("condition:c-prix", "s1");
    let first = evaluation.rendered();
    let second = evaluation.rendered();
    assert_eq!(first, second);

    // A fresh pass over unchanged data yields the exact same trace and text.
    let again = engine.evaluate_ref("condition:c-prix", "s1");
    assert_eq!(again.trace, evaluation.trace);
    assert_eq!(again.rendered(), first);
}

#[test]
fn segments_are_inspectable_without_rendering() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let evaluation = engine.evaluate_ref("condition:c-prix", "s1");
    let segments = evaluation.trace.segments();

    assert!(matches!(segments[0], TraceSegment::Test { .. }));
    assert!(matches!(segments[1], TraceSegment::Then));
    assert!(matches!(
        segments.last(),
        Some(TraceSegment::Result(n)) if *n == 4.0
    ));
}

#[test]
fn without_result_strips_nested_markers_too() {
    let inner: Trace = vec![
        TraceSegment::Literal(2.0),
        TraceSegment::Result(2.0),
    ]
    .into();
    let outer: Trace = vec![
        TraceSegment::Nested(inner),
        TraceSegment::Result(2.0),
    ]
    .into();

    let stripped = outer.without_result();
    assert_eq!(stripped.render(), "2");
}

#[test]
fn branch_results_appear_once_in_condition_prose() {
    let data = prix_kwh_dataset();
    let engine = Engine::over(&data);

    let rendered = engine.evaluate_ref("condition:c-prix", "s1").rendered();
    assert_eq!(rendered.matches("Result").count(), 1);
    assert!(rendered.ends_with("(=) Result (4.0000)"));
}
