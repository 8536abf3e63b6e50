//! Per-table load orchestration.
//!
//! Tables are loaded one after another; each load reads its columnar
//! partition through the engine session and bulk-writes the rows into
//! the relational store under the spec's write mode. Every error is
//! folded into that table's [`LoadOutcome`] — a failing table never
//! prevents the remaining tables from being attempted, and the caller
//! always receives one outcome per spec.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use trackwerk_core::config::PostgresConfig;
use trackwerk_core::{StageLog, TableSpec, WriteMode};

use crate::convert::{batch_to_rows, SqlValue};
use crate::engine::Engine;
use crate::error::TableLoadError;

/// Rows bound per INSERT statement. Keeps the bind-parameter count well
/// under the wire protocol's limit at the widest table (12 columns).
const INSERT_CHUNK_ROWS: usize = 500;

/// Result of one table's load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub table: String,
    pub mode: WriteMode,
    pub rows_written: Option<u64>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Load every table, independently, and report every outcome.
pub async fn load_all(
    log: &dyn StageLog,
    engine: &Engine,
    pg: &PostgresConfig,
    tables: &[TableSpec],
    input_dir: &Path,
) -> Vec<LoadOutcome> {
    let mut outcomes = Vec::with_capacity(tables.len());

    for spec in tables {
        let started = Instant::now();
        let outcome = match load_table(engine, pg, spec, input_dir).await {
            Ok(rows_written) => {
                log.info(&format!(
                    "loaded {} ({} rows, mode={})",
                    spec.name, rows_written, spec.mode
                ));
                LoadOutcome {
                    table: spec.name.clone(),
                    mode: spec.mode,
                    rows_written: Some(rows_written),
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: None,
                }
            }
            Err(e) => {
                log.error(&format!("loading {} failed: {e}", spec.name));
                LoadOutcome {
                    table: spec.name.clone(),
                    mode: spec.mode,
                    rows_written: None,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// Read one partition and write it under the spec's mode. Opens its own
/// scoped connection pool, closed on success and failure alike.
async fn load_table(
    engine: &Engine,
    pg: &PostgresConfig,
    spec: &TableSpec,
    input_dir: &Path,
) -> Result<u64, TableLoadError> {
    let partition_dir = input_dir.join(&spec.partition);
    let engine = engine.clone();
    let batches = tokio::task::spawn_blocking(move || engine.read_partition(&partition_dir))
        .await
        .map_err(|e| TableLoadError::Join(e.to_string()))??;

    let mut rows = Vec::new();
    for batch in &batches {
        rows.extend(batch_to_rows(&spec.name, batch, &spec.columns)?);
    }

    let pool = PgPoolOptions::new()
        .max_connections(pg.max_connections.max(1))
        .connect(&pg.connection_string())
        .await?;
    let result = write_rows(&pool, spec, &rows).await;
    pool.close().await;
    result
}

/// Bulk-write rows inside a single transaction: overwrite truncates
/// first, append leaves existing rows in place.
async fn write_rows(
    pool: &PgPool,
    spec: &TableSpec,
    rows: &[Vec<SqlValue>],
) -> Result<u64, TableLoadError> {
    let mut tx = pool.begin().await?;

    if spec.mode == WriteMode::Overwrite {
        sqlx::query(&format!("TRUNCATE TABLE {}", spec.name))
            .execute(&mut *tx)
            .await?;
    }

    let column_list = spec.column_names().join(", ");
    for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            spec.name, column_list
        ));
        builder.push_values(chunk, |mut b, row| {
            for value in row {
                match value {
                    SqlValue::Int(v) => {
                        b.push_bind(*v);
                    }
                    SqlValue::Double(v) => {
                        b.push_bind(*v);
                    }
                    SqlValue::Text(v) => {
                        b.push_bind(v.clone());
                    }
                    SqlValue::TextArray(v) => {
                        b.push_bind(v.clone());
                    }
                }
            }
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_success_flag_follows_error_field() {
        let ok = LoadOutcome {
            table: "artist_track".into(),
            mode: WriteMode::Overwrite,
            rows_written: Some(10),
            duration_ms: 5,
            error: None,
        };
        let failed = LoadOutcome {
            table: "master_table".into(),
            mode: WriteMode::Append,
            rows_written: None,
            duration_ms: 5,
            error: Some("partition not found".into()),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }

    #[test]
    fn outcome_serializes_for_the_report() {
        let outcome = LoadOutcome {
            table: "track_metadata".into(),
            mode: WriteMode::Overwrite,
            rows_written: Some(3),
            duration_ms: 12,
            error: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""table":"track_metadata""#));
        assert!(json.contains(r#""mode":"overwrite""#));
        assert!(json.contains(r#""rows_written":3"#));
    }
}
