//! # Racine - Tree-Structured Business-Rule Evaluation Engine
//!
//! **Racine** evaluates the calculated fields of node-based questionnaires
//! (pricing models, sizing forms, eligibility trees) and explains every
//! result in human-readable French prose. Each capacity-bearing node carries
//! a formula, a condition set or a table lookup; the engine resolves live
//! submission values through shared-reference templates, folds formulas
//! strictly left to right, and renders a derivation trace alongside the
//! number.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Data**: parse nodes, capacities, tables, templates and
//!     submission values into a [`store::Dataset`], or back the four store
//!     traits with your own persistence layer.
//! 2.  **Create an Engine**: [`engine::Engine`] borrows the stores; it holds
//!     no state of its own between calls.
//! 3.  **Evaluate**: point the engine at a capacity reference and a
//!     submission id. You get back the numeric result, the typed trace and
//!     every fault met along the way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use racine::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let dataset = Dataset::from_file("dataset.json")?;
//!     let engine = Engine::over(&dataset);
//!
//!     // Evaluate one capacity for one submission.
//!     let evaluation = engine.evaluate_ref("formula:f-prix-kwh", "submission-1");
//!
//!     match evaluation.result {
//!         Some(n) => println!("result: {n}"),
//!         None => println!("no result (see trace)"),
//!     }
//!     // e.g. "Cout (4000) (/) Consommation (1000) (=) Result (4.0000)"
//!     println!("{}", evaluation.rendered());
//!
//!     // Or sweep a whole subtree with one shared per-pass cache.
//!     for (node_id, eval) in engine.evaluate_subtree("root", "submission-1") {
//!         println!("{node_id}: {}", eval.rendered());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod prelude;
pub mod store;
pub mod trace;
