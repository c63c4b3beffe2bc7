//! Collaborator seams toward the systems that own the data.
//!
//! The engine is a library consumed by a request layer; nodes, submission
//! values, tables and templates live elsewhere (a database in production).
//! These traits are the whole contract: lookups return owned snapshots, and
//! `None` means not-found/absent, which is a state, never an error. Hard
//! transport failures are the adapter's concern, outside this crate.

pub mod memory;

pub use memory::{Dataset, SubmissionRecord, TableConfigRecord};

use crate::config::{ConditionSet, Formula};
use crate::node::{Node, SharedReferenceTemplate, Table, TableConfig, Value};

/// Access to the authored rule tree and its capacity records.
pub trait NodeStore {
    fn node(&self, node_id: &str) -> Option<Node>;
    fn formula(&self, formula_id: &str) -> Option<Formula>;
    fn condition(&self, condition_id: &str) -> Option<ConditionSet>;
    fn table_config(&self, config_id: &str) -> Option<TableConfig>;
    /// Direct children of a node, in no particular order; the engine sorts.
    fn children(&self, node_id: &str) -> Vec<Node>;
}

/// Access to one submission's entered values.
pub trait SubmissionStore {
    /// The value entered for `(submission_id, node_id)`, or `None` when
    /// nothing has been entered. Absence is a valid state.
    fn value(&self, submission_id: &str, node_id: &str) -> Option<Value>;
}

/// Access to named lookup tables.
pub trait TableStore {
    fn table(&self, name: &str) -> Option<Table>;
}

/// Access to canonical shared-reference templates.
pub trait TemplateStore {
    fn template(&self, template_id: &str) -> Option<SharedReferenceTemplate>;
}
