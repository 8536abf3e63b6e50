use std::fs;
use std::io;
use std::path::Path;

use zip::ZipArchive;

use trackwerk_core::StageLog;

use crate::error::ExtractError;

/// Unpack every entry of the archive into `dest_dir`, preserving the
/// archive's internal relative paths, then delete the archive.
///
/// Deletion is a separate final step: the archive survives any failure,
/// so a retry sees the original input. Entries whose names would escape
/// `dest_dir` are rejected outright.
pub fn extract(
    log: &dyn StageLog,
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<(), ExtractError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;
    let entry_count = archive.len();

    for i in 0..entry_count {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ExtractError::UnsafeEntry(entry.name().to_string()));
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| ExtractError::CorruptArchive(zip::result::ZipError::Io(e)))?;
    }

    log.info(&format!(
        "extracted {} entries to {}",
        entry_count,
        dest_dir.display()
    ));

    fs::remove_file(archive_path)?;
    log.debug(&format!("removed archive {}", archive_path.display()));

    Ok(())
}
