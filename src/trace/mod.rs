//! Typed evaluation traces.
//!
//! Evaluators never concatenate prose. They push typed [`TraceSegment`]s
//! while they work, and the text is produced only at the very end by the
//! [`formatter`]. That keeps rendering deterministic (idempotence is a
//! tested property) and lets the segment list be inspected independently of
//! string formatting.

pub mod formatter;

pub use formatter::TraceFormatter;

use crate::config::{ConditionOp, FormulaOp};
use crate::error::EvalFault;
use crate::node::Value;

/// One typed piece of a derivation trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceSegment {
    /// A resolved node reference: label plus live value, `None` when the
    /// submission holds no value (rendered as the no-data sentinel).
    Operand {
        label: String,
        value: Option<Value>,
    },
    /// A literal operand inside a formula.
    Literal(f64),
    /// A formula operator, rendered `(+)`, `(-)`, `(*)`, `(/)`.
    Operator(FormulaOp),
    /// The boolean test of a condition: `Si <label> <phrase>`.
    Test {
        label: String,
        op: ConditionOp,
        right: Option<String>,
    },
    /// Separates the test from the true-branch text: `; alors`.
    Then,
    /// Separates the true branch from the fallback text: `; Sinon`.
    Else,
    /// Separates multiple action results within a branch.
    Separator,
    /// A spliced sub-trace (nested formula or capacity).
    Nested(Trace),
    /// A successful table lookup.
    TableHit {
        table: String,
        row: String,
        column: String,
        value: Value,
    },
    /// A recoverable fault rendered inline as an explicit marker.
    Fault(EvalFault),
    /// Raw unparsed text, the fallback for malformed token sequences.
    Raw(String),
    /// The final numeric outcome: `(=) Result (x.xxxx)`.
    Result(f64),
}

/// An ordered list of trace segments, built during evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    segments: Vec<TraceSegment>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: TraceSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[TraceSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Copy of this trace without its result markers, including those of
    /// nested sub-traces. Used when a sub-result is spliced into a larger
    /// sentence that appends its own single result.
    pub fn without_result(&self) -> Trace {
        Trace {
            segments: self
                .segments
                .iter()
                .filter(|s| !matches!(s, TraceSegment::Result(_)))
                .map(|s| match s {
                    TraceSegment::Nested(inner) => TraceSegment::Nested(inner.without_result()),
                    other => other.clone(),
                })
                .collect(),
        }
    }

    /// Renders the trace to its final prose form.
    pub fn render(&self) -> String {
        TraceFormatter::format(self)
    }
}

impl From<Vec<TraceSegment>> for Trace {
    fn from(segments: Vec<TraceSegment>) -> Self {
        Trace { segments }
    }
}
