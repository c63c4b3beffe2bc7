use crate::config::{Action, ConditionOp, ConditionSet, Operand, WhenClause};
use crate::engine::pass::PassState;
use crate::engine::Engine;
use crate::node::{CapacityRef, Value};
use crate::trace::{Trace, TraceSegment};

impl<'a> Engine<'a> {
    /// Evaluates a condition set against the live submission values.
    ///
    /// Both branch texts are always rendered (`Si ...; alors ...; Sinon ...`)
    /// so the reader sees the untaken path too; only the selected branch
    /// contributes the numeric result. A test whose left value cannot be
    /// resolved fails open to the fallback, never to an error.
    pub(crate) fn eval_condition(
        &self,
        set: &ConditionSet,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        let mut trace = Trace::new();
        let Some(branch) = set.first_branch() else {
            trace.push(TraceSegment::Raw("Condition invalide".into()));
            return (None, trace);
        };

        let holds = self.test_when(&branch.when, pass);
        trace.push(self.describe_when(&branch.when, pass));

        let (then_result, then_trace) = self.translate_actions(&branch.actions, pass);
        let (else_result, else_trace) = self.translate_actions(set.fallback_actions(), pass);

        trace.push(TraceSegment::Then);
        push_branch_text(&mut trace, then_trace);
        trace.push(TraceSegment::Else);
        push_branch_text(&mut trace, else_trace);

        let chosen = if holds { then_result } else { else_result };
        if let Some(result) = chosen.filter(|r| r.is_finite()) {
            trace.push(TraceSegment::Result(result));
            (Some(result), trace)
        } else {
            (None, trace)
        }
    }

    /// Runs the boolean test. An absent left value makes every test false,
    /// except `isEmpty` for which absence is emptiness.
    fn test_when(&self, when: &WhenClause, pass: &mut PassState) -> bool {
        let left = self.operand_value(&when.left, pass);
        let right = when
            .right
            .as_ref()
            .and_then(|operand| self.operand_value(operand, pass));

        match when.op {
            ConditionOp::IsEmpty => left.as_ref().map_or(true, Value::is_empty),
            ConditionOp::IsNotEmpty => left.as_ref().map_or(false, |v| !v.is_empty()),
            ConditionOp::Equals => soft_equals(left.as_ref(), right.as_ref()),
            ConditionOp::NotEquals => {
                left.is_some() && !soft_equals(left.as_ref(), right.as_ref())
            }
            ConditionOp::GreaterThan => numeric_pair(left, right).map_or(false, |(l, r)| l > r),
            ConditionOp::LessThan => numeric_pair(left, right).map_or(false, |(l, r)| l < r),
            ConditionOp::Contains => match (left, right) {
                (Some(l), Some(r)) => l
                    .to_string()
                    .to_lowercase()
                    .contains(&r.to_string().to_lowercase()),
                _ => false,
            },
        }
    }

    fn operand_value(&self, operand: &Operand, pass: &mut PassState) -> Option<Value> {
        match operand {
            Operand::NodeValue { node_id } => self.resolve_node_value(node_id, pass),
            Operand::Constant { value } => Some(value.clone()),
        }
    }

    /// The `Si <label> <phrase> [<right>]` segment of the trace.
    fn describe_when(&self, when: &WhenClause, pass: &mut PassState) -> TraceSegment {
        let label = match &when.left {
            Operand::NodeValue { node_id } => self.label_for(node_id, pass),
            Operand::Constant { value } => value.to_string(),
        };
        let right = when
            .right
            .as_ref()
            .filter(|_| when.op.takes_right())
            .map(|operand| match operand {
                Operand::NodeValue { node_id } => self.label_for(node_id, pass),
                Operand::Constant { value } => value.to_string(),
            });
        TraceSegment::Test {
            label,
            op: when.op,
            right,
        }
    }

    /// Evaluates every target of an action list, splicing each target's
    /// sub-trace and remembering the branch's numeric outcome.
    ///
    /// Capacity targets (formula, condition, table) take priority as the
    /// branch result; a plain field value is only the result when no
    /// capacity produced one.
    pub(crate) fn translate_actions(
        &self,
        actions: &[Action],
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        let mut trace = Trace::new();
        let mut from_capacity: Option<f64> = None;
        let mut from_field: Option<f64> = None;

        for target in actions.iter().flat_map(|a| a.targets.iter()) {
            if !trace.is_empty() {
                trace.push(TraceSegment::Separator);
            }
            // A bare node id inside an action names a field to display, not a
            // capacity to re-enter.
            let (result, sub_trace) = match target {
                CapacityRef::Node(id) => self.field_operand(id, pass),
                other => self.eval_target(other, pass),
            };
            trace.push(TraceSegment::Nested(sub_trace));
            if let Some(n) = result {
                match target {
                    CapacityRef::Node(_) => from_field = from_field.or(Some(n)),
                    _ => from_capacity = from_capacity.or(Some(n)),
                }
            }
        }

        (from_capacity.or(from_field), trace)
    }
}

fn push_branch_text(trace: &mut Trace, branch: Trace) {
    if branch.is_empty() {
        trace.push(TraceSegment::Raw("\u{2014}".into()));
    } else {
        // Inner result markers are stripped; the condition appends its own.
        trace.push(TraceSegment::Nested(branch.without_result()));
    }
}

/// Loose comparison matching how authored values meet entered ones: numeric
/// when both sides parse as numbers, otherwise trimmed case-insensitive text.
fn soft_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l == r;
    }
    left.to_string().trim().to_lowercase() == right.to_string().trim().to_lowercase()
}

fn numeric_pair(left: Option<Value>, right: Option<Value>) -> Option<(f64, f64)> {
    Some((left?.as_number()?, right?.as_number()?))
}
