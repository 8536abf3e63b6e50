//! End-to-end extraction stage: unpack an archive containing the raw
//! nested file, then normalize it, checking the working-directory
//! contents after each step.

use std::fs;
use std::io::Write;

use trackwerk_core::MemoryLog;
use trackwerk_extract::{extract, normalize, NormalizedRecord, NORMALIZED_FILENAME, RAW_DICT_FILENAME};
use zip::write::SimpleFileOptions;

#[test]
fn unpack_then_normalize_leaves_only_final_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("downloaded.zip");

    let raw = r#"{"artist-1": ["artist-2", "artist-3"], "artist-9": []}"#;
    {
        let file = fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer.start_file(RAW_DICT_FILENAME, options).unwrap();
        writer.write_all(raw.as_bytes()).unwrap();
        writer.start_file("tracks.csv", options).unwrap();
        writer.write_all(b"id\n1\n").unwrap();
        writer.finish().unwrap();
    }

    let log = MemoryLog::new();

    extract(&log, &archive_path, dir.path()).unwrap();
    assert!(!archive_path.exists());
    assert!(dir.path().join(RAW_DICT_FILENAME).exists());
    assert!(dir.path().join("tracks.csv").exists());

    let raw_path = dir.path().join(RAW_DICT_FILENAME);
    let count = normalize(&log, &raw_path, dir.path()).unwrap();
    assert_eq!(count, 2);
    assert!(!raw_path.exists());

    let lines: Vec<NormalizedRecord> = fs::read_to_string(dir.path().join(NORMALIZED_FILENAME))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|r| r.id == "artist-1"
        && r.related_ids == vec!["artist-2".to_string(), "artist-3".to_string()]));
    assert!(lines.iter().any(|r| r.id == "artist-9" && r.related_ids.is_empty()));
}
