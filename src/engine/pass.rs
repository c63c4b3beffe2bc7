use crate::error::EvalFault;
use crate::node::Value;
use ahash::{AHashMap, AHashSet};

/// Per-pass evaluation state.
///
/// Created at the start of one evaluate-and-explain invocation and discarded
/// at the end. Never shared across submissions: the memo is keyed by node id
/// within a single submission, and cross-submission reuse would be a
/// correctness bug.
pub(crate) struct PassState {
    pub(crate) submission_id: String,
    /// Memo of already-fetched submission values. `Some(None)` means "looked
    /// up, nothing entered" — absence is cached too, so the external store is
    /// consulted at most once per node per pass.
    values: AHashMap<String, Option<Value>>,
    /// References currently being resolved on the call stack, checked before
    /// each recursive descent to fail fast on cycles.
    in_flight: AHashSet<String>,
    /// Every recoverable fault met during the pass, in encounter order.
    pub(crate) faults: Vec<EvalFault>,
}

impl PassState {
    pub(crate) fn new(submission_id: &str) -> Self {
        Self {
            submission_id: submission_id.to_string(),
            values: AHashMap::new(),
            in_flight: AHashSet::new(),
            faults: Vec::new(),
        }
    }

    pub(crate) fn cached(&self, node_id: &str) -> Option<Option<Value>> {
        self.values.get(node_id).cloned()
    }

    pub(crate) fn remember(&mut self, node_id: &str, value: Option<Value>) {
        self.values.insert(node_id.to_string(), value);
    }

    /// Marks a reference as being resolved. Returns `false` when it is
    /// already on the active call stack, which means a cycle.
    pub(crate) fn enter(&mut self, reference_id: &str) -> bool {
        self.in_flight.insert(reference_id.to_string())
    }

    pub(crate) fn leave(&mut self, reference_id: &str) {
        self.in_flight.remove(reference_id);
    }

    pub(crate) fn fault(&mut self, fault: EvalFault) {
        self.faults.push(fault);
    }
}
