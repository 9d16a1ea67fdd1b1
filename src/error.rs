//! Error types for each fallible pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving the remote record list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} is not a JSON array")]
    NotAnArray { url: String },

    #[error("element {index} in response from {url} is not a JSON object")]
    NotAnObject { url: String, index: usize },
}

/// Failure while reading or writing the local CSV artifact.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache CSV {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failure while replacing the relation in the analytical store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store location cannot be opened or written.
    #[error("cannot write store {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The table cannot be expressed as a relational schema.
    #[error("schema error: {0}")]
    Schema(String),
}

/// Any error that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
