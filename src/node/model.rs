use crate::config::{CapacityConfig, Operand};
use serde::{Deserialize, Serialize};

/// The kind of a vertex in the authored rule tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Branch,
    Leaf,
    Condition,
    Formula,
    Table,
    Api,
    Link,
}

/// Optional refinement of a node's kind, mostly relevant to the authoring UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSubType {
    Option,
    Field,
    Data,
    Calculation,
}

/// A vertex in the authored rule tree.
///
/// Nodes are long-lived records owned by the (out-of-scope) authoring tools;
/// the engine treats them as read-only snapshots. A node marked as a shared
/// reference delegates its definition to the first template in
/// `shared_reference_ids`, while its *value* is still recorded under the
/// node's own id in the submission data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<NodeSubType>,
    pub label: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Missing parents are tolerated: a node whose parent was deleted still
    /// evaluates on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default)]
    pub is_shared_reference: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_reference_ids: Vec<String>,
    /// The node's own capacity, if any. Parsed once from raw config into the
    /// closed union; the engine never touches loose JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityConfig>,
    /// Free-form field configuration, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_config: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl Node {
    /// The primary template this node delegates to, when it is a shared
    /// reference. Evaluation is defined against this single id; the rest of
    /// the list is informational.
    pub fn primary_reference(&self) -> Option<&str> {
        if self.is_shared_reference {
            self.shared_reference_ids.first().map(String::as_str)
        } else {
            None
        }
    }

    /// Template ids beyond the primary one. Kept for UI display and audits,
    /// never consulted by the evaluators.
    pub fn secondary_references(&self) -> &[String] {
        if self.is_shared_reference && !self.shared_reference_ids.is_empty() {
            &self.shared_reference_ids[1..]
        } else {
            &[]
        }
    }
}

/// A canonical, reusable node definition that concrete tree nodes can
/// delegate to instead of holding an independent copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedReferenceTemplate {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityConfig>,
    /// Derived: number of live nodes whose `shared_reference_ids` contain
    /// this template. Maintained by the store's authoring operations.
    #[serde(default)]
    pub usage_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usages: Vec<TemplateUsage>,
}

/// One audit entry for a template usage: which tree, and where in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    pub path: String,
}

/// A named two-dimensional lookup table.
///
/// `headers[0]` labels the row-key column; each row's first cell is its key.
/// The remaining headers name the value columns addressed by `column_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Looks up a cell by row key and column name. Keys compare trimmed and
    /// case-insensitively, numerically when both sides parse as numbers
    /// (so `"10"` matches `"10.0"`).
    pub fn cell(&self, row_key: &str, column_key: &str) -> Option<&str> {
        let col = self
            .headers
            .iter()
            .position(|h| keys_match(h, column_key))?;
        let row = self
            .rows
            .iter()
            .find(|r| r.first().is_some_and(|k| keys_match(k, row_key)))?;
        row.get(col).map(String::as_str)
    }
}

fn keys_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if let (Ok(na), Ok(nb)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return na == nb;
    }
    a.eq_ignore_ascii_case(b)
}

/// Configuration of a table capacity: which table to consult, and where the
/// row/column keys come from (a node's live value or a constant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub table_name: String,
    pub row: Operand,
    pub column: Operand,
}
