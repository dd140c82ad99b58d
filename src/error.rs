use std::path::PathBuf;
use thiserror::Error;

/// Failure of the network call itself. A response with an error status is
/// not a transport failure; it is handed to the response interpreter.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
    #[error("request task aborted: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum AnimationError {
    #[error("failed to read animation asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid animation definition in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("animation {0} has no frames")]
    Empty(PathBuf),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("no download directory available")]
    NoDirectory,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
