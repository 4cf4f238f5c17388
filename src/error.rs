//! Run-fatal error types.
//!
//! Probe failures are not errors here: they become `ProbeOutcome` values and
//! end up as Offline rows.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the target configuration, detected before any probe runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("infrastructure target {0} has no name/location metadata")]
    MissingMetadata(String),

    #[error("camera range {start}..={end} is empty")]
    EmptyCameraRange { start: u32, end: u32 },

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("max_concurrency {requested} exceeds the limit of {max}")]
    ConcurrencyTooHigh { requested: usize, max: usize },
}

/// The rendered report could not be persisted.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to encode report for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
