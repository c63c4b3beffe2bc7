use crate::error::EvalFault;
use crate::node::Value;
use crate::trace::{Trace, TraceSegment};
use std::fmt::Write;

/// Renders typed trace segments into the final French prose.
///
/// Rendering is a pure function of the segment list: same trace in, same
/// string out, byte for byte.
pub struct TraceFormatter;

impl TraceFormatter {
    pub fn format(trace: &Trace) -> String {
        let mut out = String::new();
        Self::write_segments(&mut out, trace);
        out
    }

    fn write_segments(out: &mut String, trace: &Trace) {
        for segment in trace.segments() {
            Self::write_segment(out, segment);
        }
    }

    fn write_segment(out: &mut String, segment: &TraceSegment) {
        match segment {
            TraceSegment::Operand { label, value } => match value {
                Some(v) => {
                    let _ = write!(out, "{} ({})", label, Self::format_value(v));
                }
                None => {
                    let _ = write!(out, "{} (\u{26a0}\u{fe0f} aucune donnée)", label);
                }
            },
            TraceSegment::Literal(n) => {
                let _ = write!(out, "{}", Self::format_number(*n));
            }
            TraceSegment::Operator(op) => {
                let _ = write!(out, " ({}) ", op.symbol());
            }
            TraceSegment::Test { label, op, right } => {
                let _ = write!(out, "Si {} {}", label, op.phrase());
                if let Some(right) = right {
                    let _ = write!(out, " {}", right);
                }
            }
            TraceSegment::Then => out.push_str(" ; alors "),
            TraceSegment::Else => out.push_str(" ; Sinon "),
            TraceSegment::Separator => out.push_str(", "),
            TraceSegment::Nested(inner) => Self::write_segments(out, inner),
            TraceSegment::TableHit {
                table,
                row,
                column,
                value,
            } => {
                let _ = write!(
                    out,
                    "Tableau {}[{}][{}] = {}",
                    table,
                    row,
                    column,
                    Self::format_value(value)
                );
            }
            TraceSegment::Fault(fault) => Self::write_fault(out, fault),
            TraceSegment::Raw(text) => out.push_str(text),
            TraceSegment::Result(n) => {
                let _ = write!(out, " (=) Result ({:.4})", n);
            }
        }
    }

    fn write_fault(out: &mut String, fault: &EvalFault) {
        match fault {
            EvalFault::TableLookupMiss { table, row, .. } => {
                let _ = write!(
                    out,
                    "Tableau {}[{}] = \u{26a0}\u{fe0f} introuvable",
                    table, row
                );
            }
            EvalFault::DivisionByZero { .. } => {
                out.push_str("\u{26a0}\u{fe0f} division par zéro");
            }
            EvalFault::CyclicReference { .. } => {
                out.push_str("\u{26a0}\u{fe0f} référence cyclique");
            }
            EvalFault::MissingValue { .. } => {
                out.push_str("\u{26a0}\u{fe0f} aucune donnée");
            }
            EvalFault::DanglingReference { .. } | EvalFault::UnresolvedReference { .. } => {
                out.push_str("\u{26a0}\u{fe0f} référence introuvable");
            }
            EvalFault::MalformedTokenSequence { .. } => {
                out.push_str("\u{26a0}\u{fe0f} formule illisible");
            }
        }
    }

    fn format_value(value: &Value) -> String {
        value.to_string()
    }

    fn format_number(n: f64) -> String {
        if n.fract() == 0.0 && n.is_finite() {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}
