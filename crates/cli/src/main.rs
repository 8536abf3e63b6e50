//! trackwerk — staged dataset ingestion pipeline.
//!
//! Two entry points mirror the two halves of the pipeline:
//! - `extract`: download the archive, unpack it, normalize the nested
//!   artist mapping into line-delimited records.
//! - `load`: bootstrap the destination schema, then bulk-load every
//!   destination table from its pre-computed columnar partition.
//! `run` chains both against one working directory.
//!
//! Connection parameters and engine sizing come from the environment
//! (see `trackwerk_core::config`); a `.env` file is honored.
//!
//! A working directory belongs to exactly one run. Nothing locks it:
//! concurrent runs against the same directory race.

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;

use trackwerk_core::config::{self, Config};
use trackwerk_core::table::default_tables;
use trackwerk_core::{StageLog, TracingLog};
use trackwerk_extract::{archive, fetch, normalize, RAW_DICT_FILENAME};
use trackwerk_load::{append_run_report, bootstrap, load_all, Engine, RunReport};

// ── CLI ─────────────────────────────────────────────────────────────

/// Staged ingestion pipeline: fetch, extract, normalize, bulk-load.
#[derive(Parser, Debug)]
#[command(name = "trackwerk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download, unpack and normalize the source dataset.
    Extract {
        /// Working directory for this run's artifacts.
        working_dir: PathBuf,

        /// Source archive URL (overrides SOURCE_URL).
        #[arg(long)]
        url: Option<String>,
    },
    /// Bootstrap the schema and load all destination tables.
    Load {
        /// Directory holding the pre-computed columnar partitions.
        input_dir: PathBuf,
    },
    /// Extract, then load, against one working directory.
    Run {
        /// Working directory for this run's artifacts and partitions.
        working_dir: PathBuf,

        /// Source archive URL (overrides SOURCE_URL).
        #[arg(long)]
        url: Option<String>,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    let log = TracingLog;

    match cli.command {
        Command::Extract { working_dir, url } => {
            run_extract(&log, &config, &working_dir, url).await?;
        }
        Command::Load { input_dir } => {
            run_load(&log, &config, &input_dir).await?;
        }
        Command::Run { working_dir, url } => {
            run_extract(&log, &config, &working_dir, url).await?;
            run_load(&log, &config, &working_dir).await?;
        }
    }

    Ok(())
}

// ── Stages ──────────────────────────────────────────────────────────

async fn run_extract(
    log: &TracingLog,
    config: &Config,
    working_dir: &Path,
    url: Option<String>,
) -> anyhow::Result<()> {
    let url = url.unwrap_or_else(|| config.source.archive_url.clone());
    log.info("extraction stage started");

    let asset = fetch::fetch(log, &url, working_dir)
        .await
        .context("archive download failed")?;

    let stage_log = *log;
    let archive_path = asset.path.clone();
    let dest = working_dir.to_path_buf();
    tokio::task::spawn_blocking(move || archive::extract(&stage_log, &archive_path, &dest))
        .await
        .context("extraction task failed")?
        .context("archive extraction failed")?;

    let raw_path = working_dir.join(RAW_DICT_FILENAME);
    let out_dir = working_dir.to_path_buf();
    let count =
        tokio::task::spawn_blocking(move || normalize::normalize(&stage_log, &raw_path, &out_dir))
            .await
            .context("normalization task failed")?
            .context("normalization failed")?;
    ensure!(count > 0, "normalization produced no records");

    log.info("extraction stage completed");
    Ok(())
}

async fn run_load(log: &TracingLog, config: &Config, input_dir: &Path) -> anyhow::Result<()> {
    if !input_dir.is_dir() {
        bail!("input directory does not exist: {}", input_dir.display());
    }

    log.info("load stage started");
    config.log_summary();
    if !config.postgres.is_configured() {
        warn!("PG_USERNAME not set — connecting with defaults");
    }

    let tables = default_tables();
    let engine = Engine::connect(log, &config.engine).context("engine session failed")?;

    bootstrap(log, &config.postgres, &tables)
        .await
        .context("schema bootstrap failed")?;

    let started_at = Utc::now();
    let outcomes = load_all(log, &engine, &config.postgres, &tables, input_dir).await;
    let report = RunReport::new(started_at, Utc::now(), outcomes);
    append_run_report(log, input_dir, &report);

    for outcome in &report.outcomes {
        match &outcome.error {
            None => log.info(&format!(
                "  {}: ok ({} rows, {} ms)",
                outcome.table,
                outcome.rows_written.unwrap_or(0),
                outcome.duration_ms
            )),
            Some(error) => log.error(&format!("  {}: FAILED — {}", outcome.table, error)),
        }
    }
    log.info(&format!(
        "load stage completed: {} loaded, {} failed (run {})",
        report.tables_loaded, report.tables_failed, report.run_id
    ));

    Ok(())
}
