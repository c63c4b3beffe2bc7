use crate::node::{normalize_ref_id, CapacityRef, Value};
use serde::{Deserialize, Deserializer, Serialize};

/// The boolean test operators available in a `when` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOp {
    IsNotEmpty,
    IsEmpty,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

impl ConditionOp {
    /// The French phrase used when rendering the test in a trace.
    pub fn phrase(&self) -> &'static str {
        match self {
            ConditionOp::IsNotEmpty => "n'est pas vide",
            ConditionOp::IsEmpty => "est vide",
            ConditionOp::Equals => "=",
            ConditionOp::NotEquals => "\u{2260}",
            ConditionOp::GreaterThan => ">",
            ConditionOp::LessThan => "<",
            ConditionOp::Contains => "contient",
        }
    }

    /// Whether the operator needs a right-hand side.
    pub fn takes_right(&self) -> bool {
        !matches!(self, ConditionOp::IsNotEmpty | ConditionOp::IsEmpty)
    }
}

/// One side of a comparison: a node's live value, or a constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    NodeValue {
        #[serde(rename = "ref")]
        node_id: String,
    },
    Constant {
        value: Value,
    },
}

impl Operand {
    pub fn node(id: impl Into<String>) -> Self {
        Operand::NodeValue {
            node_id: id.into(),
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Operand::Constant {
            value: value.into(),
        }
    }
}

// Refs arrive as "@value.<id>" from the authoring UI; normalize on the way in.
impl<'de> Deserialize<'de> for Operand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Ref {
                #[serde(rename = "ref")]
                node_id: String,
            },
            Const {
                value: Value,
            },
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Ref { node_id } => Operand::NodeValue {
                node_id: normalize_ref_id(&node_id).to_string(),
            },
            Raw::Const { value } => Operand::Constant { value },
        })
    }
}

/// The boolean test of a condition branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhenClause {
    pub left: Operand,
    pub op: ConditionOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Operand>,
}

/// One action: a list of capacity targets to evaluate and splice into the
/// selected branch's result.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub targets: Vec<CapacityRef>,
}

// Actions are stored as `{"nodeIds": ["node-formula:<id>", "<plainId>", ...]}`;
// the prefixes are parsed into `CapacityRef`s once, here.
impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(rename = "nodeIds", alias = "targets")]
            node_ids: Vec<String>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Action {
            targets: raw.node_ids.iter().map(|s| CapacityRef::parse(s)).collect(),
        })
    }
}

/// A condition branch: a test and the actions selected when it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionBranch {
    pub when: WhenClause,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// The fallback action list selected when no branch holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fallback {
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A full condition set as authored.
///
/// The data model keeps the plural `branches` the authoring UI produces, but
/// evaluation consumes only the first branch (first-match semantics observed
/// in production; see DESIGN.md). `first_branch` is the single seam a future
/// if/elseif chain would widen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSet {
    #[serde(default)]
    pub branches: Vec<ConditionBranch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl ConditionSet {
    pub fn first_branch(&self) -> Option<&ConditionBranch> {
        self.branches.first()
    }

    pub fn fallback_actions(&self) -> &[Action] {
        self.fallback.as_ref().map_or(&[], |f| f.actions.as_slice())
    }
}

/// A stored condition record: the set plus its identity and owning node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: String,
    pub node_id: String,
    pub set: ConditionSet,
}
