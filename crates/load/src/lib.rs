//! Load stage: bootstrap the destination schema, then bulk-load each
//! destination table from its pre-computed columnar partition.
//!
//! Table loads are isolated from each other: one table's failure is
//! recorded in its [`LoadOutcome`] and the loader moves on. Only schema
//! bootstrap failures are fatal for the run.

pub mod convert;
pub mod engine;
pub mod error;
pub mod loader;
pub mod report;
pub mod schema;

pub use engine::Engine;
pub use error::{EngineError, SchemaError, TableLoadError};
pub use loader::{load_all, LoadOutcome};
pub use report::{append_run_report, RunReport};
pub use schema::bootstrap;
