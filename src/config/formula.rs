use crate::node::normalize_ref_id;
use itertools::Itertools;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The closed operator set of a formula. Evaluation is a strict
/// left-to-right fold; there is no precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl FormulaOp {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "+" => Some(FormulaOp::Add),
            "-" => Some(FormulaOp::Sub),
            "*" => Some(FormulaOp::Mul),
            "/" => Some(FormulaOp::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            FormulaOp::Add => "+",
            FormulaOp::Sub => "-",
            FormulaOp::Mul => "*",
            FormulaOp::Div => "/",
        }
    }
}

impl fmt::Display for FormulaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One element of a formula's operand/operator sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaToken {
    Literal(f64),
    /// A reference to another node's resolved value.
    NodeRef(String),
    /// A reference to another formula, evaluated recursively.
    FormulaRef(String),
    Op(FormulaOp),
}

impl FormulaToken {
    /// Converts one raw JSON scalar into a token. Accepted spellings are
    /// numbers, operator symbols, `ref:<id>` / `@value.<id>` node
    /// references and `formula-ref:<id>` / `node-formula:<id>` formula
    /// references. Numeric strings count as literals.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, String> {
        match raw {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(FormulaToken::Literal)
                .ok_or_else(|| format!("non-finite number: {}", n)),
            serde_json::Value::String(s) => Self::from_text(s),
            other => Err(format!("unsupported token shape: {}", other)),
        }
    }

    fn from_text(s: &str) -> Result<Self, String> {
        let t = s.trim();
        if let Some(op) = FormulaOp::parse(t) {
            return Ok(FormulaToken::Op(op));
        }
        if let Some(id) = t.strip_prefix("ref:") {
            return Ok(FormulaToken::NodeRef(id.to_string()));
        }
        if let Some(id) = t.strip_prefix("@value.") {
            return Ok(FormulaToken::NodeRef(id.to_string()));
        }
        if let Some(id) = t
            .strip_prefix("formula-ref:")
            .or_else(|| t.strip_prefix("node-formula:"))
        {
            return Ok(FormulaToken::FormulaRef(normalize_ref_id(id).to_string()));
        }
        if let Ok(n) = t.parse::<f64>() {
            return Ok(FormulaToken::Literal(n));
        }
        Err(format!("unrecognized token: '{}'", s))
    }

    pub fn is_operand(&self) -> bool {
        !matches!(self, FormulaToken::Op(_))
    }
}

impl fmt::Display for FormulaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaToken::Literal(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FormulaToken::NodeRef(id) => write!(f, "ref:{}", id),
            FormulaToken::FormulaRef(id) => write!(f, "formula-ref:{}", id),
            FormulaToken::Op(op) => write!(f, "{}", op.symbol()),
        }
    }
}

impl Serialize for FormulaToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormulaToken::Literal(n) => serializer.serialize_f64(*n),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FormulaToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        FormulaToken::from_json(&raw).map_err(D::Error::custom)
    }
}

/// A tokenized formula owned by a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub id: String,
    pub node_id: String,
    pub tokens: Vec<FormulaToken>,
}

impl Formula {
    /// A valid token sequence alternates operand, operator, operand, ...
    /// starting and ending on an operand.
    pub fn is_well_formed(&self) -> bool {
        if self.tokens.is_empty() {
            return false;
        }
        self.tokens
            .iter()
            .enumerate()
            .all(|(i, t)| t.is_operand() == (i % 2 == 0))
            && self.tokens.len() % 2 == 1
    }

    /// The raw token list as text, used as the trace fallback when the
    /// sequence is malformed.
    pub fn raw_text(&self) -> String {
        self.tokens.iter().map(ToString::to_string).join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(tokens: Vec<FormulaToken>) -> Formula {
        Formula {
            id: "f".into(),
            node_id: "n".into(),
            tokens,
        }
    }

    #[test]
    fn token_parsing_accepts_all_spellings() {
        let raw = serde_json::json!(["ref:a", "/", "@value.b", "*", 2, "formula-ref:f2"]);
        let tokens: Vec<FormulaToken> = raw
            .as_array()
            .unwrap()
            .iter()
            .map(|v| FormulaToken::from_json(v).unwrap())
            .collect();
        assert_eq!(tokens[0], FormulaToken::NodeRef("a".into()));
        assert_eq!(tokens[1], FormulaToken::Op(FormulaOp::Div));
        assert_eq!(tokens[2], FormulaToken::NodeRef("b".into()));
        assert_eq!(tokens[4], FormulaToken::Literal(2.0));
        assert_eq!(tokens[5], FormulaToken::FormulaRef("f2".into()));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(FormulaToken::from_json(&serde_json::json!("%")).is_err());
        assert!(FormulaToken::from_json(&serde_json::json!({"op": "+"})).is_err());
    }

    #[test]
    fn well_formed_requires_alternation() {
        let good = formula(vec![
            FormulaToken::NodeRef("a".into()),
            FormulaToken::Op(FormulaOp::Add),
            FormulaToken::Literal(1.0),
        ]);
        assert!(good.is_well_formed());

        let trailing_op = formula(vec![
            FormulaToken::NodeRef("a".into()),
            FormulaToken::Op(FormulaOp::Add),
        ]);
        assert!(!trailing_op.is_well_formed());

        let doubled = formula(vec![
            FormulaToken::Literal(1.0),
            FormulaToken::Literal(2.0),
        ]);
        assert!(!doubled.is_well_formed());

        assert!(!formula(vec![]).is_well_formed());
    }

    #[test]
    fn raw_text_round_trips_tokens() {
        let f = formula(vec![
            FormulaToken::NodeRef("a".into()),
            FormulaToken::Op(FormulaOp::Div),
            FormulaToken::Literal(1000.0),
        ]);
        assert_eq!(f.raw_text(), "ref:a / 1000");
    }
}
