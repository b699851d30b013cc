//! Library error type for hotgraph.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by loading, configuration and export.
///
/// Analysis itself never fails: unparsable units are skipped and reported,
/// and an empty project yields an empty report.
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing was supplied to analyze at all.
    #[error("no input: provide at least one source file, folder, workspace manifest or declaration dump")]
    NoInput,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid declaration dump {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
