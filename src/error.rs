use thiserror::Error;

/// Errors raised at the configuration-parsing seam or by authoring operations.
///
/// These indicate a caller contract violation (malformed raw config, unknown
/// identifiers passed to authoring calls) and are returned as hard errors.
/// Everything that can go wrong with *data during evaluation* lives in
/// [`EvalFault`] instead and never crosses the evaluate/explain boundary as
/// an `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unrecognized formula operator: '{0}'")]
    UnknownOperator(String),

    #[error("unrecognized condition operator: '{0}'")]
    UnknownConditionOp(String),

    #[error("formula token at index {index} is not an operand, operator or reference: {token}")]
    BadToken { index: usize, token: String },

    #[error("capacity configuration is not valid for its kind: {0}")]
    BadConfig(String),

    #[error("node '{0}' not found")]
    UnknownNode(String),

    #[error("template '{0}' not found")]
    UnknownTemplate(String),

    #[error(
        "template '{template_id}' is still linked by {usage_count} node(s); deletion requires explicit confirmation"
    )]
    TemplateInUse {
        template_id: String,
        usage_count: usize,
    },
}

/// The recoverable fault taxonomy of an evaluation pass.
///
/// Faults are data, not exceptions: they are collected on the evaluation
/// result and rendered inline in the trace so a partial, still-useful
/// derivation is always produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalFault {
    #[error("node '{node_id}' is marked as a shared reference but lists no template ids")]
    DanglingReference { node_id: String },

    #[error("reference '{reference_id}' used by '{used_by}' was not found in the store")]
    UnresolvedReference {
        reference_id: String,
        used_by: String,
    },

    #[error("no value recorded for node '{node_id}' in this submission")]
    MissingValue { node_id: String },

    #[error("division by zero in formula '{formula_id}'")]
    DivisionByZero { formula_id: String },

    #[error("cyclic reference detected while resolving '{reference_id}'")]
    CyclicReference { reference_id: String },

    #[error("table '{table}' has no cell at row '{row}', column '{column}'")]
    TableLookupMiss {
        table: String,
        row: String,
        column: String,
    },

    #[error("formula '{formula_id}' tokens are not a valid operand/operator alternation")]
    MalformedTokenSequence { formula_id: String },
}
