use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use trackwerk_core::StageLog;

use crate::error::ExtractError;

/// Fixed name of the downloaded archive inside the working directory.
pub const ARCHIVE_FILENAME: &str = "downloaded.zip";

/// A downloaded archive on local disk, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveAsset {
    pub source_url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Stream the remote archive into `dest_dir/downloaded.zip`.
///
/// The response status is checked before the local file is created, so a
/// failed retrieval never leaves an empty artifact behind. The body is
/// written chunk by chunk; memory use does not depend on archive size.
/// A transfer interrupted mid-stream leaves the partial file for the
/// caller to clean up.
pub async fn fetch(
    log: &dyn StageLog,
    url: &str,
    dest_dir: &Path,
) -> Result<ArchiveAsset, ExtractError> {
    tokio::fs::create_dir_all(dest_dir).await?;

    // No overall timeout: the source imposes none, so a slow mirror
    // stalls the run rather than failing it.
    log.debug(&format!("starting unbounded download of {url}"));
    let response = reqwest::Client::new().get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Retrieval {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let path = dest_dir.join(ARCHIVE_FILENAME);
    let mut file = tokio::fs::File::create(&path).await?;
    let mut stream = response.bytes_stream();
    let mut bytes: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;

    log.info(&format!(
        "downloaded archive: {} ({} bytes)",
        path.display(),
        bytes
    ));

    Ok(ArchiveAsset {
        source_url: url.to_string(),
        path,
        bytes,
    })
}
