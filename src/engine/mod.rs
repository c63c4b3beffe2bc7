//! The evaluation engine.
//!
//! One [`Engine`] borrows the four collaborator stores and exposes the
//! evaluate-and-explain surface. Every public call runs as a single
//! *evaluation pass*: a fresh per-pass cache and cycle guard are created,
//! the relevant evaluator walks the capacity structure depth-first, and the
//! same resolved values feed both the numeric result and the prose trace.

mod condition;
mod formula;
mod pass;
mod reference;
mod table;

use crate::config::CapacityConfig;
use crate::error::EvalFault;
use crate::node::{placeholder_label, CapacityRef, Value};
use crate::store::{Dataset, NodeStore, SubmissionStore, TableStore, TemplateStore};
use crate::trace::{Trace, TraceSegment};
use log::debug;
use pass::PassState;

/// The outcome of one evaluation pass over a capacity.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The numeric result, `None` when no finite value could be computed
    /// (missing data, a fault, or a non-numeric capacity).
    pub result: Option<f64>,
    /// The typed derivation trace; render with [`Trace::render`].
    pub trace: Trace,
    /// Every recoverable fault met during the pass, in encounter order.
    pub faults: Vec<EvalFault>,
}

impl Evaluation {
    /// The rendered prose form of the trace.
    pub fn rendered(&self) -> String {
        self.trace.render()
    }
}

/// Evaluates node capacities against one submission's values.
pub struct Engine<'a> {
    pub(crate) nodes: &'a dyn NodeStore,
    pub(crate) submissions: &'a dyn SubmissionStore,
    pub(crate) tables: &'a dyn TableStore,
    pub(crate) templates: &'a dyn TemplateStore,
}

impl<'a> Engine<'a> {
    pub fn new(
        nodes: &'a dyn NodeStore,
        submissions: &'a dyn SubmissionStore,
        tables: &'a dyn TableStore,
        templates: &'a dyn TemplateStore,
    ) -> Self {
        Self {
            nodes,
            submissions,
            tables,
            templates,
        }
    }

    /// Convenience constructor over an in-memory dataset, which implements
    /// all four collaborator traits.
    pub fn over(dataset: &'a Dataset) -> Self {
        Self::new(dataset, dataset, dataset, dataset)
    }

    /// Evaluates a capacity reference (`formula:<id>`, `condition:<id>`,
    /// `table:<id>` or a bare node id) for one submission.
    pub fn evaluate_ref(&self, source_ref: &str, submission_id: &str) -> Evaluation {
        let target = CapacityRef::parse(source_ref);
        debug!("evaluating {} for submission {}", target, submission_id);
        let mut pass = PassState::new(submission_id);
        let (result, trace) = self.eval_target(&target, &mut pass);
        Evaluation {
            result,
            trace,
            faults: pass.faults,
        }
    }

    /// Evaluates an already-parsed capacity configuration for one submission.
    pub fn evaluate_and_explain(
        &self,
        config: &CapacityConfig,
        submission_id: &str,
    ) -> Evaluation {
        debug!(
            "evaluating {:?} capacity for submission {}",
            config.kind(),
            submission_id
        );
        let mut pass = PassState::new(submission_id);
        let (result, trace) = self.eval_config(config, &mut pass);
        Evaluation {
            result,
            trace,
            faults: pass.faults,
        }
    }

    /// The prose-only variant: renders the trace and discards the number.
    ///
    /// Idempotent by construction — same config and unchanged submission
    /// data yield byte-identical output.
    pub fn explain(&self, config: &CapacityConfig, submission_id: &str) -> String {
        self.evaluate_and_explain(config, submission_id).rendered()
    }

    /// Bulk variant: evaluates every capacity-bearing node in the subtree
    /// rooted at `node_id`, depth-first in sibling order, sharing one pass
    /// cache across the whole walk.
    pub fn evaluate_subtree(
        &self,
        node_id: &str,
        submission_id: &str,
    ) -> Vec<(String, Evaluation)> {
        let mut pass = PassState::new(submission_id);
        let mut out = Vec::new();
        self.walk_subtree(node_id, &mut pass, &mut out);
        out
    }

    fn walk_subtree(
        &self,
        node_id: &str,
        pass: &mut PassState,
        out: &mut Vec<(String, Evaluation)>,
    ) {
        if let Some(node) = self.nodes.node(node_id) {
            if node.capacity.is_some() || node.is_shared_reference {
                let before = pass.faults.len();
                let (result, trace) =
                    self.eval_target(&CapacityRef::Node(node.id.clone()), pass);
                out.push((
                    node.id.clone(),
                    Evaluation {
                        result,
                        trace,
                        faults: pass.faults[before..].to_vec(),
                    },
                ));
            }
        }
        let mut children = self.nodes.children(node_id);
        children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        for child in children {
            self.walk_subtree(&child.id, pass, out);
        }
    }

    // --- Shared resolution helpers ------------------------------------------

    /// Dispatches an evaluation over the closed capacity union.
    pub(crate) fn eval_config(
        &self,
        config: &CapacityConfig,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        match config {
            CapacityConfig::Formula(f) => self.eval_formula(f, pass),
            CapacityConfig::Condition(c) => self.eval_condition(c, pass),
            CapacityConfig::Table(t) => self.eval_table(t, pass),
        }
    }

    /// Evaluates one capacity reference. Formula/condition/table ids fall
    /// back to the owning node's default capacity when no record carries the
    /// id itself, matching how source refs were authored historically.
    pub(crate) fn eval_target(
        &self,
        target: &CapacityRef,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        match target {
            CapacityRef::Formula(id) => match self.lookup_formula(id) {
                Some(formula) => self.eval_formula(&formula, pass),
                None => self.unresolved(id, "formula", pass),
            },
            CapacityRef::Condition(id) => {
                let guard = format!("condition:{}", id);
                if !pass.enter(&guard) {
                    return self.cycle(id, pass);
                }
                let out = match self.lookup_condition(id) {
                    Some(set) => self.eval_condition(&set, pass),
                    None => self.unresolved(id, "condition", pass),
                };
                pass.leave(&guard);
                out
            }
            CapacityRef::Table(id) => match self.lookup_table_config(id) {
                Some(config) => self.eval_table(&config, pass),
                None => self.unresolved(id, "table", pass),
            },
            CapacityRef::Node(id) => self.eval_node_target(id, pass),
        }
    }

    /// A plain node reference: an entered value wins, otherwise the node's
    /// effective capacity is evaluated, otherwise the field renders with its
    /// absent-value sentinel.
    fn eval_node_target(&self, node_id: &str, pass: &mut PassState) -> (Option<f64>, Trace) {
        let mut trace = Trace::new();
        let Some(node) = self.nodes.node(node_id) else {
            let value = self.resolve_node_value(node_id, pass);
            let result = value.as_ref().and_then(Value::as_number);
            trace.push(TraceSegment::Operand {
                label: placeholder_label(node_id),
                value,
            });
            return (result, trace);
        };
        match self.resolve_reference(&node) {
            Err(fault) => {
                pass.fault(fault);
                trace.push(TraceSegment::Operand {
                    label: placeholder_label(node_id),
                    value: None,
                });
                (None, trace)
            }
            Ok(effective) => {
                let value = self.resolve_node_value(&effective.value_node_id, pass);
                if let Some(value) = value {
                    let result = value.as_number();
                    trace.push(TraceSegment::Operand {
                        label: effective.label,
                        value: Some(value),
                    });
                    return (result, trace);
                }
                if let Some(capacity) = effective.capacity {
                    let guard = format!("node:{}", node.id);
                    if !pass.enter(&guard) {
                        return self.cycle(&node.id, pass);
                    }
                    let out = self.eval_config(&capacity, pass);
                    pass.leave(&guard);
                    return out;
                }
                trace.push(TraceSegment::Operand {
                    label: effective.label,
                    value: None,
                });
                (None, trace)
            }
        }
    }

    /// A field shown as a plain operand: label plus live value, no capacity
    /// evaluation. Used for action targets, where a node id names the field
    /// to display (the node's capacity may be the very condition being
    /// evaluated).
    pub(crate) fn field_operand(
        &self,
        node_id: &str,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        let (label, value) = self.operand_info(node_id, pass);
        let result = value.as_ref().and_then(Value::as_number);
        let mut trace = Trace::new();
        trace.push(TraceSegment::Operand { label, value });
        (result, trace)
    }

    /// The single chokepoint for submission-value reads: at most one
    /// underlying store fetch per (submission, node) within a pass. A stored
    /// explicit null counts as absent.
    pub(crate) fn resolve_node_value(
        &self,
        node_id: &str,
        pass: &mut PassState,
    ) -> Option<Value> {
        if let Some(cached) = pass.cached(node_id) {
            return cached;
        }
        let fetched = self
            .submissions
            .value(&pass.submission_id, node_id)
            .filter(|v| !matches!(v, Value::Null));
        pass.remember(node_id, fetched.clone());
        fetched
    }

    /// Label and live value of a node reference, after shared-reference
    /// resolution. An unresolvable reference yields a placeholder label and
    /// an absent value, never an error.
    pub(crate) fn operand_info(
        &self,
        node_id: &str,
        pass: &mut PassState,
    ) -> (String, Option<Value>) {
        match self.nodes.node(node_id) {
            Some(node) => match self.resolve_reference(&node) {
                Ok(effective) => {
                    let value = self.resolve_node_value(&effective.value_node_id, pass);
                    (effective.label, value)
                }
                Err(fault) => {
                    pass.fault(fault);
                    (placeholder_label(node_id), None)
                }
            },
            None => {
                let value = self.resolve_node_value(node_id, pass);
                (placeholder_label(node_id), value)
            }
        }
    }

    /// Display label of a node, for trace text that does not need the value.
    pub(crate) fn label_for(&self, node_id: &str, pass: &mut PassState) -> String {
        match self.nodes.node(node_id) {
            Some(node) => match self.resolve_reference(&node) {
                Ok(effective) => effective.label,
                Err(fault) => {
                    pass.fault(fault);
                    placeholder_label(node_id)
                }
            },
            None => placeholder_label(node_id),
        }
    }

    pub(crate) fn lookup_formula(&self, id: &str) -> Option<crate::config::Formula> {
        self.nodes.formula(id).or_else(|| {
            self.nodes.node(id).and_then(|n| match n.capacity {
                Some(CapacityConfig::Formula(f)) => Some(f),
                _ => None,
            })
        })
    }

    pub(crate) fn lookup_condition(&self, id: &str) -> Option<crate::config::ConditionSet> {
        self.nodes.condition(id).or_else(|| {
            self.nodes.node(id).and_then(|n| match n.capacity {
                Some(CapacityConfig::Condition(c)) => Some(c),
                _ => None,
            })
        })
    }

    pub(crate) fn lookup_table_config(&self, id: &str) -> Option<crate::node::TableConfig> {
        self.nodes.table_config(id).or_else(|| {
            self.nodes.node(id).and_then(|n| match n.capacity {
                Some(CapacityConfig::Table(t)) => Some(t),
                _ => None,
            })
        })
    }

    fn unresolved(&self, id: &str, used_by: &str, pass: &mut PassState) -> (Option<f64>, Trace) {
        let fault = EvalFault::UnresolvedReference {
            reference_id: id.to_string(),
            used_by: used_by.to_string(),
        };
        pass.fault(fault.clone());
        let mut trace = Trace::new();
        trace.push(TraceSegment::Fault(fault));
        (None, trace)
    }

    pub(crate) fn cycle(&self, id: &str, pass: &mut PassState) -> (Option<f64>, Trace) {
        let fault = EvalFault::CyclicReference {
            reference_id: id.to_string(),
        };
        pass.fault(fault.clone());
        let mut trace = Trace::new();
        trace.push(TraceSegment::Fault(fault));
        (None, trace)
    }
}
