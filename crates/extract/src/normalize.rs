use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trackwerk_core::StageLog;

use crate::error::ExtractError;

/// Name of the irregular nested file as shipped in the archive.
pub const RAW_DICT_FILENAME: &str = "dict_artists.json";

/// Name of the normalized line-delimited output.
pub const NORMALIZED_FILENAME: &str = "fixed_da.json";

/// One flattened unit of the source mapping: an entity id and its
/// ordered related ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub id: String,
    pub related_ids: Vec<String>,
}

/// Rewrite the raw id → related-ids mapping as one JSON object per line.
///
/// The whole file is parsed up front; anything that is not a JSON object
/// of string keys to string arrays is malformed input. The output file
/// gets a distinct name, and the raw source is deleted only after the
/// writer has been flushed and closed — a failed run leaves the source
/// untouched. The downstream load stage needs line-oriented records: a
/// single monolithic document cannot be split for parallel ingestion.
///
/// Returns the number of records emitted.
pub fn normalize(
    log: &dyn StageLog,
    raw_path: &Path,
    output_dir: &Path,
) -> Result<u64, ExtractError> {
    let raw = fs::read_to_string(raw_path)?;
    let records: IndexMap<String, Vec<String>> =
        serde_json::from_str(&raw).map_err(|e| ExtractError::MalformedInput {
            path: raw_path.to_path_buf(),
            detail: format!("expected a JSON object of id -> related id list: {e}"),
        })?;

    let out_path = output_dir.join(NORMALIZED_FILENAME);
    let mut writer = BufWriter::new(fs::File::create(&out_path)?);
    let mut count: u64 = 0;

    for (id, related_ids) in records {
        let record = NormalizedRecord { id, related_ids };
        let line = serde_json::to_string(&record).map_err(std::io::Error::from)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    drop(writer);

    log.info(&format!(
        "normalized {} records to {}",
        count,
        out_path.display()
    ));

    fs::remove_file(raw_path)?;
    log.debug(&format!("removed raw file {}", raw_path.display()));

    Ok(count)
}
