//! Destination schema bootstrap.
//!
//! Every run starts by issuing `CREATE TABLE IF NOT EXISTS` for each
//! destination table. The statements are attempted best-effort: a
//! failing statement does not stop the remaining ones from running, but
//! any failure at all ends the run before table loads begin.

use sqlx::postgres::PgPoolOptions;

use trackwerk_core::config::PostgresConfig;
use trackwerk_core::{StageLog, TableSpec};

use crate::error::SchemaError;

/// Ensure every destination table exists. Safe to invoke on every run.
pub async fn bootstrap(
    log: &dyn StageLog,
    pg: &PostgresConfig,
    tables: &[TableSpec],
) -> Result<(), SchemaError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&pg.connection_string())
        .await
        .map_err(SchemaError::Connect)?;

    let mut failed: Vec<(String, String)> = Vec::new();

    for spec in tables {
        match sqlx::query(&spec.create_table_sql()).execute(&pool).await {
            Ok(_) => log.debug(&format!("table {} present", spec.name)),
            Err(e) => {
                log.error(&format!("creating table {} failed: {e}", spec.name));
                failed.push((spec.name.clone(), e.to_string()));
            }
        }
    }

    pool.close().await;

    if failed.is_empty() {
        log.info(&format!("schema ready: {} tables", tables.len()));
        Ok(())
    } else {
        Err(SchemaError::Ddl { failed })
    }
}
