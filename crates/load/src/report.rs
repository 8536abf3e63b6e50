//! Run report persistence.
//!
//! Each load run appends one JSONL line to `load_report.jsonl` in the
//! input directory, so operators can see every table's outcome for
//! every run — including partial successes. Report writing is
//! best-effort: a failure here warns and never aborts the run.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use trackwerk_core::StageLog;

use crate::loader::LoadOutcome;

pub const REPORT_FILENAME: &str = "load_report.jsonl";

/// Serializable summary of one load run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub tables_loaded: usize,
    pub tables_failed: usize,
    pub outcomes: Vec<LoadOutcome>,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        outcomes: Vec<LoadOutcome>,
    ) -> Self {
        let tables_loaded = outcomes.iter().filter(|o| o.is_success()).count();
        let tables_failed = outcomes.len() - tables_loaded;
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            completed_at,
            tables_loaded,
            tables_failed,
            outcomes,
        }
    }
}

/// Append the report as one JSONL line. Never fails the run.
pub fn append_run_report(log: &dyn StageLog, input_dir: &Path, report: &RunReport) {
    let path = input_dir.join(REPORT_FILENAME);

    let line = match serde_json::to_string(report) {
        Ok(l) => l,
        Err(e) => {
            log.error(&format!("failed to serialize run report: {e}"));
            return;
        }
    };

    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| writeln!(file, "{line}"));

    match result {
        Ok(()) => log.debug(&format!("run report appended to {}", path.display())),
        Err(e) => log.error(&format!(
            "failed to append run report to {}: {e}",
            path.display()
        )),
    }
}
