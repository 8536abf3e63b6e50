//! Fetch tests against a minimal local HTTP stub.
//!
//! A plain TCP listener on a loopback port answers exactly one request,
//! which keeps these tests hermetic — no network, no external fixtures.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use trackwerk_core::MemoryLog;
use trackwerk_extract::{fetch, ExtractError, ARCHIVE_FILENAME};

/// Serve one canned HTTP response, returning the URL to request.
fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);

        let header = format!(
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
    });

    format!("http://{addr}/dataset.zip")
}

#[tokio::test]
async fn fetch_streams_body_to_fixed_filename() {
    let url = serve_once("HTTP/1.1 200 OK", b"archive-bytes");
    let dir = tempfile::tempdir().unwrap();
    let log = MemoryLog::new();

    let asset = fetch(&log, &url, dir.path()).await.unwrap();

    assert_eq!(asset.source_url, url);
    assert_eq!(asset.bytes, 13);
    assert_eq!(asset.path, dir.path().join(ARCHIVE_FILENAME));
    assert_eq!(std::fs::read(&asset.path).unwrap(), b"archive-bytes");
    assert!(log.contains("downloaded archive"));
}

#[tokio::test]
async fn fetch_creates_missing_destination_directory() {
    let url = serve_once("HTTP/1.1 200 OK", b"x");
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("deep/nested/run");
    let log = MemoryLog::new();

    let asset = fetch(&log, &url, &dest).await.unwrap();
    assert!(asset.path.starts_with(&dest));
    assert!(asset.path.exists());
}

#[tokio::test]
async fn not_found_raises_retrieval_and_leaves_no_artifact() {
    let url = serve_once("HTTP/1.1 404 Not Found", b"missing");
    let dir = tempfile::tempdir().unwrap();
    let log = MemoryLog::new();

    let err = fetch(&log, &url, dir.path()).await.unwrap_err();

    match err {
        ExtractError::Retrieval { status, url: u } => {
            assert_eq!(status, 404);
            assert_eq!(u, url);
        }
        other => panic!("expected Retrieval error, got {other:?}"),
    }
    assert!(!dir.path().join(ARCHIVE_FILENAME).exists());
}

#[tokio::test]
async fn server_error_status_is_surfaced() {
    let url = serve_once("HTTP/1.1 503 Service Unavailable", b"");
    let dir = tempfile::tempdir().unwrap();
    let log = MemoryLog::new();

    let err = fetch(&log, &url, dir.path()).await.unwrap_err();
    assert!(matches!(err, ExtractError::Retrieval { status: 503, .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_download_error() {
    // Bind-then-drop guarantees a port nothing is listening on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();
    let log = MemoryLog::new();

    let err = fetch(&log, &format!("http://127.0.0.1:{port}/x.zip"), dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Download(_)));
}
