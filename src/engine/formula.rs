use crate::config::{Formula, FormulaOp, FormulaToken};
use crate::engine::pass::PassState;
use crate::engine::Engine;
use crate::error::EvalFault;
use crate::node::Value;
use crate::trace::{Trace, TraceSegment};
use log::warn;

impl<'a> Engine<'a> {
    /// Evaluates a formula as a strict left-to-right fold over its token
    /// sequence, emitting one trace segment per token as it goes.
    ///
    /// Any unusable operand (missing value, non-numeric text, unresolvable
    /// sub-formula, division by zero) poisons the accumulator: the remaining
    /// tokens are still walked so the trace stays complete, but the pass
    /// produces no result marker.
    pub(crate) fn eval_formula(
        &self,
        formula: &Formula,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        let mut trace = Trace::new();

        let guard = format!("formula:{}", formula.id);
        if !pass.enter(&guard) {
            return self.cycle(&formula.id, pass);
        }

        if !formula.is_well_formed() {
            warn!("formula '{}' has a malformed token sequence", formula.id);
            pass.fault(EvalFault::MalformedTokenSequence {
                formula_id: formula.id.clone(),
            });
            trace.push(TraceSegment::Raw(formula.raw_text()));
            pass.leave(&guard);
            return (None, trace);
        }

        let mut acc: Option<f64> = None;
        let mut pending: Option<FormulaOp> = None;
        let mut poisoned = false;

        for token in &formula.tokens {
            let operand = match token {
                FormulaToken::Op(op) => {
                    pending = Some(*op);
                    trace.push(TraceSegment::Operator(*op));
                    continue;
                }
                FormulaToken::Literal(n) => {
                    trace.push(TraceSegment::Literal(*n));
                    Some(*n)
                }
                FormulaToken::NodeRef(id) => {
                    let (label, value) = self.operand_info(id, pass);
                    if value.is_none() {
                        pass.fault(EvalFault::MissingValue {
                            node_id: id.clone(),
                        });
                    }
                    let number = value.as_ref().and_then(Value::as_number);
                    trace.push(TraceSegment::Operand { label, value });
                    number
                }
                FormulaToken::FormulaRef(id) => match self.lookup_formula(id) {
                    Some(sub) => {
                        let (sub_result, sub_trace) = self.eval_formula(&sub, pass);
                        trace.push(TraceSegment::Nested(sub_trace));
                        sub_result
                    }
                    None => {
                        let fault = EvalFault::UnresolvedReference {
                            reference_id: id.clone(),
                            used_by: formula.id.clone(),
                        };
                        pass.fault(fault.clone());
                        trace.push(TraceSegment::Fault(fault));
                        None
                    }
                },
            };

            if poisoned {
                continue;
            }
            match operand {
                None => {
                    poisoned = true;
                    acc = None;
                }
                Some(rhs) => {
                    acc = match (acc, pending.take()) {
                        (None, _) => Some(rhs),
                        (Some(_), Some(FormulaOp::Div)) if rhs == 0.0 => {
                            let fault = EvalFault::DivisionByZero {
                                formula_id: formula.id.clone(),
                            };
                            pass.fault(fault.clone());
                            trace.push(TraceSegment::Fault(fault));
                            poisoned = true;
                            None
                        }
                        (Some(lhs), Some(op)) => Some(apply(op, lhs, rhs)),
                        // Unreachable for a well-formed sequence.
                        (Some(lhs), None) => Some(lhs),
                    };
                }
            }
        }

        pass.leave(&guard);

        match acc.filter(|r| r.is_finite()) {
            Some(result) if !poisoned => {
                trace.push(TraceSegment::Result(result));
                (Some(result), trace)
            }
            _ => (None, trace),
        }
    }
}

fn apply(op: FormulaOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        FormulaOp::Add => lhs + rhs,
        FormulaOp::Sub => lhs - rhs,
        FormulaOp::Mul => lhs * rhs,
        FormulaOp::Div => lhs / rhs,
    }
}
