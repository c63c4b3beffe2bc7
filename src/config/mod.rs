pub mod condition;
pub mod formula;
pub mod parse;

pub use condition::*;
pub use formula::*;
pub use parse::{parse_capacity, parse_formula_tokens};

use crate::node::TableConfig;
use serde::{Deserialize, Serialize};

/// The kind of a capacity, used when dispatching raw config at the parse
/// seam and in the public evaluate-and-explain surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityKind {
    Formula,
    Condition,
    Table,
}

/// A node's evaluable capacity, as a closed tagged union.
///
/// This replaces the loose per-type JSON blobs of the source system: every
/// evaluator matches exhaustively on this enum, and malformed configuration
/// is caught once at [`parse::parse_capacity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CapacityConfig {
    Formula(Formula),
    Condition(ConditionSet),
    Table(TableConfig),
}

impl CapacityConfig {
    pub fn kind(&self) -> CapacityKind {
        match self {
            CapacityConfig::Formula(_) => CapacityKind::Formula,
            CapacityConfig::Condition(_) => CapacityKind::Condition,
            CapacityConfig::Table(_) => CapacityKind::Table,
        }
    }
}
