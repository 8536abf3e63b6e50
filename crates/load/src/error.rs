use std::path::PathBuf;

use thiserror::Error;

/// Errors from the columnar engine session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine session: {0}")]
    Session(String),

    #[error("partition not found: {0}")]
    PartitionNotFound(PathBuf),

    #[error("parquet read error at {path}: {detail}")]
    Parquet { path: PathBuf, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Schema bootstrap failures. Any of these abort the run: no table load
/// proceeds without a confirmed schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("could not connect to the relational store: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("schema bootstrap failed: {}",
        .failed.iter().map(|(t, e)| format!("{t} ({e})")).collect::<Vec<_>>().join("; "))]
    Ddl { failed: Vec<(String, String)> },
}

/// A single table's load failure. Captured into that table's outcome,
/// never propagated past its own load call.
#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("partition read task failed: {0}")]
    Join(String),

    #[error("column {column} missing from partition for table {table}")]
    MissingColumn { table: String, column: String },

    #[error("column {column} of table {table} has incompatible type: expected {expected}, partition holds {actual}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    #[error("write failed: {0}")]
    Write(#[from] sqlx::Error),
}
