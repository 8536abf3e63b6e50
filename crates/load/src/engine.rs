//! Columnar compute session.
//!
//! The pipeline delegates partition reads to an engine session sized by
//! externally-supplied resource parameters; the session parallelizes
//! across its own worker pool and the caller treats it as a black box.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use walkdir::WalkDir;

use trackwerk_core::config::EngineConfig;
use trackwerk_core::StageLog;

use crate::error::EngineError;

/// A connected engine session. Cheap to clone; clones share the worker
/// pool.
#[derive(Clone)]
pub struct Engine {
    pool: Arc<rayon::ThreadPool>,
    config: EngineConfig,
}

impl Engine {
    /// Start a session against the configured coordinator with the
    /// configured executor sizing.
    pub fn connect(log: &dyn StageLog, config: &EngineConfig) -> Result<Self, EngineError> {
        let workers = config.total_cores();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("engine-worker-{i}"))
            .build()
            .map_err(|e| EngineError::Session(e.to_string()))?;

        log.info(&format!(
            "engine session started: master={}, {} worker slots ({}x{} cores)",
            config.master_url, workers, config.executor_instances, config.executor_cores
        ));
        log.debug(&format!(
            "engine memory: driver={}, executor={}",
            config.driver_memory, config.executor_memory
        ));

        Ok(Self {
            pool: Arc::new(pool),
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read every parquet file under the partition directory, in
    /// parallel across the session's worker pool.
    ///
    /// A missing directory is an error; a directory with no parquet
    /// files yields no batches (an empty partition is valid output of
    /// the upstream transformation).
    pub fn read_partition(&self, dir: &Path) -> Result<Vec<RecordBatch>, EngineError> {
        if !dir.is_dir() {
            return Err(EngineError::PartitionNotFound(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "parquet"))
            .collect();
        files.sort();

        let nested: Vec<Vec<RecordBatch>> = self.pool.install(|| {
            files
                .par_iter()
                .map(|path| read_parquet_file(path))
                .collect::<Result<Vec<_>, EngineError>>()
        })?;

        Ok(nested.into_iter().flatten().collect())
    }
}

fn read_parquet_file(path: &Path) -> Result<Vec<RecordBatch>, EngineError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| EngineError::Parquet {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
        .build()
        .map_err(|e| EngineError::Parquet {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    reader
        .into_iter()
        .map(|batch| {
            batch.map_err(|e| EngineError::Parquet {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        })
        .collect()
}
