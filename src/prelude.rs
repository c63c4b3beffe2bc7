//! Prelude module for convenient imports.
//!
//! Re-exports the types most callers need: the engine, the value and node
//! model, the capacity configuration union and the store seams.
//!
//! # Example
//!
//! ```rust,no_run
//! use racine::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let dataset = Dataset::from_file("path/to/dataset.json")?;
//! let engine = Engine::over(&dataset);
//!
//! let evaluation = engine.evaluate_ref("formula:prix-kwh", "submission-1");
//! println!("{}", evaluation.rendered());
//! # Ok(())
//! # }
//! ```

// Engine surface
pub use crate::engine::{Engine, Evaluation};

// Node and value model
pub use crate::node::{CapacityRef, Node, SharedReferenceTemplate, Table, TableConfig, Value};

// Capacity configuration
pub use crate::config::{
    parse_capacity, CapacityConfig, CapacityKind, ConditionSet, Formula, FormulaToken,
};

// Store seams and the in-memory reference implementation
pub use crate::store::{Dataset, NodeStore, SubmissionStore, TableStore, TemplateStore};

// Error types
pub use crate::error::{ConfigError, EvalFault};

// Trace types
pub use crate::trace::{Trace, TraceFormatter, TraceSegment};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
