//! Typed errors for the classifier and for per-file processing failures.

use std::path::PathBuf;
use thiserror::Error;

/// Raised by the cutoff classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutoffError {
    /// The cycle length must be a positive number of seconds.
    #[error("invalid configuration: cycle length must be positive, got {cycle_length}s")]
    InvalidConfiguration { cycle_length: i64 },
}

/// A failure confined to a single archive file.
///
/// The collection driver logs these, records the file as failed and carries
/// on with the next file. No partial counts are kept for the file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("failed to decompress {path}: {source}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("query tool exited with {status} on {path}: {stderr}")]
    QueryFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("could not launch query tool for {path}: {source}")]
    QueryLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unparseable query output: {0}")]
    Unparseable(String),
}
