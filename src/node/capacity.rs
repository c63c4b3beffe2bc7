use std::fmt;

/// A parsed capacity reference.
///
/// Source refs arrive as prefixed strings (`formula:<id>`, `condition:<id>`,
/// `table:<id>`, or their `node-*:` variants pointing at the owning node) or
/// as a bare node id, which denotes a plain field. Parsing happens once here;
/// the engine dispatches on the variant and never re-inspects the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum CapacityRef {
    Formula(String),
    Condition(String),
    Table(String),
    Node(String),
}

impl CapacityRef {
    /// Parses a source ref. Never fails: anything without a recognized
    /// prefix is a plain node reference.
    pub fn parse(source_ref: &str) -> Self {
        let trimmed = source_ref.trim();
        match trimmed.split_once(':') {
            Some((prefix, id)) if !id.is_empty() => {
                match prefix.to_ascii_lowercase().as_str() {
                    "formula" | "node-formula" => CapacityRef::Formula(id.to_string()),
                    "condition" | "node-condition" => CapacityRef::Condition(id.to_string()),
                    "table" | "node-table" => CapacityRef::Table(id.to_string()),
                    _ => CapacityRef::Node(trimmed.to_string()),
                }
            }
            _ => CapacityRef::Node(normalize_ref_id(trimmed).to_string()),
        }
    }

    /// The referenced identifier, whatever the kind.
    pub fn id(&self) -> &str {
        match self {
            CapacityRef::Formula(id)
            | CapacityRef::Condition(id)
            | CapacityRef::Table(id)
            | CapacityRef::Node(id) => id,
        }
    }
}

impl fmt::Display for CapacityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityRef::Formula(id) => write!(f, "formula:{}", id),
            CapacityRef::Condition(id) => write!(f, "condition:{}", id),
            CapacityRef::Table(id) => write!(f, "table:{}", id),
            CapacityRef::Node(id) => write!(f, "{}", id),
        }
    }
}

/// Strips the `@value.` marker the authoring UI stores inside refs, leaving
/// the bare node id.
pub fn normalize_ref_id(raw: &str) -> &str {
    raw.trim().strip_prefix("@value.").unwrap_or(raw.trim())
}

/// Placeholder label for a node that could not be resolved: `"Node <shortId>"`.
pub fn placeholder_label(node_id: &str) -> String {
    let short: String = node_id.chars().take(8).collect();
    format!("Node {}", short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_refs() {
        assert_eq!(
            CapacityRef::parse("formula:f-1"),
            CapacityRef::Formula("f-1".into())
        );
        assert_eq!(
            CapacityRef::parse("node-condition:c-9"),
            CapacityRef::Condition("c-9".into())
        );
        assert_eq!(
            CapacityRef::parse("TABLE:onduleurs"),
            CapacityRef::Table("onduleurs".into())
        );
    }

    #[test]
    fn bare_ids_are_node_refs() {
        assert_eq!(
            CapacityRef::parse("abc-123"),
            CapacityRef::Node("abc-123".into())
        );
    }

    #[test]
    fn normalizes_value_markers() {
        assert_eq!(normalize_ref_id("@value.abc"), "abc");
        assert_eq!(normalize_ref_id("  abc "), "abc");
    }

    #[test]
    fn placeholder_truncates_long_ids() {
        assert_eq!(placeholder_label("0123456789abcdef"), "Node 01234567");
        assert_eq!(placeholder_label("id"), "Node id");
    }
}
