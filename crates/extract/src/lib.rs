//! Extraction stage: fetch the remote archive, unpack it, and normalize
//! the irregular nested JSON file into line-delimited records.
//!
//! The three steps are strictly sequential and each consumes the
//! previous step's output: [`fetch::fetch`] produces the archive,
//! [`archive::extract`] unpacks and deletes it, [`normalize::normalize`]
//! rewrites `dict_artists.json` and deletes the raw file.

pub mod archive;
pub mod error;
pub mod fetch;
pub mod normalize;

pub use archive::extract;
pub use error::ExtractError;
pub use fetch::{fetch, ArchiveAsset, ARCHIVE_FILENAME};
pub use normalize::{normalize, NormalizedRecord, NORMALIZED_FILENAME, RAW_DICT_FILENAME};
