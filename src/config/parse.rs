//! The single seam where raw capacity configuration becomes typed.
//!
//! Everything upstream of the engine (HTTP payloads, database blobs, CLI
//! input) carries capacity config as loose JSON. It is converted here, once,
//! into the closed [`CapacityConfig`] union; malformed shapes surface as
//! [`ConfigError`] at this boundary instead of scattering null-checks
//! through the evaluators.

use crate::config::{CapacityConfig, CapacityKind, Formula, FormulaToken};
use crate::error::ConfigError;
use crate::node::TableConfig;

/// Parses a raw token array into typed formula tokens.
pub fn parse_formula_tokens(raw: &serde_json::Value) -> Result<Vec<FormulaToken>, ConfigError> {
    let items = raw
        .as_array()
        .ok_or_else(|| ConfigError::BadConfig(format!("formula tokens must be an array: {}", raw)))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            FormulaToken::from_json(item).map_err(|_| ConfigError::BadToken {
                index,
                token: item.to_string(),
            })
        })
        .collect()
}

/// Parses one raw capacity blob into the closed union for the given kind.
pub fn parse_capacity(
    kind: CapacityKind,
    id: &str,
    node_id: &str,
    raw: &serde_json::Value,
) -> Result<CapacityConfig, ConfigError> {
    match kind {
        CapacityKind::Formula => {
            let tokens = parse_formula_tokens(raw)?;
            Ok(CapacityConfig::Formula(Formula {
                id: id.to_string(),
                node_id: node_id.to_string(),
                tokens,
            }))
        }
        CapacityKind::Condition => serde_json::from_value(raw.clone())
            .map(CapacityConfig::Condition)
            .map_err(|e| ConfigError::BadConfig(e.to_string())),
        CapacityKind::Table => serde_json::from_value::<TableConfig>(raw.clone())
            .map(CapacityConfig::Table)
            .map_err(|e| ConfigError::BadConfig(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formula_capacity() {
        let raw = serde_json::json!(["ref:a", "/", "ref:b"]);
        let parsed = parse_capacity(CapacityKind::Formula, "f1", "n1", &raw).unwrap();
        match parsed {
            CapacityConfig::Formula(f) => {
                assert_eq!(f.id, "f1");
                assert_eq!(f.tokens.len(), 3);
            }
            other => panic!("expected formula, got {:?}", other),
        }
    }

    #[test]
    fn bad_token_reports_position() {
        let raw = serde_json::json!(["ref:a", "%", "ref:b"]);
        let err = parse_formula_tokens(&raw).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BadToken {
                index: 1,
                token: "\"%\"".to_string()
            }
        );
    }

    #[test]
    fn non_array_tokens_are_rejected() {
        let err = parse_formula_tokens(&serde_json::json!({"a": 1})).unwrap_err();
        assert!(matches!(err, ConfigError::BadConfig(_)));
    }

    #[test]
    fn parses_condition_capacity() {
        let raw = serde_json::json!({
            "branches": [{
                "when": { "left": { "ref": "x" }, "op": "isEmpty" },
                "actions": []
            }]
        });
        let parsed = parse_capacity(CapacityKind::Condition, "c1", "n1", &raw).unwrap();
        assert!(matches!(parsed, CapacityConfig::Condition(_)));
    }

    #[test]
    fn parses_table_capacity() {
        let raw = serde_json::json!({
            "table_name": "onduleurs",
            "row": { "ref": "puissance" },
            "column": { "value": "prix" }
        });
        let parsed = parse_capacity(CapacityKind::Table, "t1", "n1", &raw).unwrap();
        assert!(matches!(parsed, CapacityConfig::Table(_)));
    }
}
