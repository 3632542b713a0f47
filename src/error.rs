//! Error taxonomy for the manifest core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    /// A snapshot or manifest line that is not a usable item record
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// The playlist has never been backed up
    #[error("no manifest for playlist {title:?} at {path:?}")]
    ManifestNotFound { title: String, path: PathBuf },

    #[error("manifest already exists for playlist {title:?} at {path:?}")]
    ManifestExists { title: String, path: PathBuf },

    /// The external downloader exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    /// The external downloader failed while its output went to the terminal
    #[error("{tool} exited with {status}")]
    ExternalToolStatus { tool: String, status: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Attach a 1-based line position to a malformed record error
    pub fn at_line(self, line: usize) -> Self {
        match self {
            MirrorError::MalformedRecord { reason } => MirrorError::MalformedRecord {
                reason: format!("line {}: {}", line, reason),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
