// src/analysis/error.rs

//! Errors of the analysis pipeline.

use crate::analysis::engine::EngineStatus;
use crate::common::{errorkind_is_decode, FileTypeArchive};

use std::io::{Error, ErrorKind};

/// An error of opening, scanning, or tailing a log file.
///
/// Holds a message `String` rather than the originating [`Error`] so that
/// an `AnalysisError` may be cloned into each diagnostics subscriber.
/// Annoyingly, cannot [Clone or Copy `Error`].
///
/// [`Error`]: std::io::Error
/// [Clone or Copy `Error`]: https://github.com/rust-lang/rust/issues/24135
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// path does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// path is not readable
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// compressed file failed to decode
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),
    /// I/O error in the middle of a full scan; the scan was discarded
    #[error("scan failed: {0}")]
    ScanFailed(String),
    /// I/O error during one tail poll; tailing continues
    #[error("tail poll failed: {0}")]
    TailPollFailed(String),
    /// the operation is not allowed in the current engine state
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineStatus,
    },
    /// any other I/O error while opening
    #[error("{0}")]
    Io(String),
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Map an `Error` from opening a file of type `archive`.
    pub fn from_open(error: &Error, archive: FileTypeArchive) -> AnalysisError {
        match error.kind() {
            ErrorKind::NotFound => AnalysisError::NotFound(error.to_string()),
            ErrorKind::PermissionDenied => AnalysisError::PermissionDenied(error.to_string()),
            kind if archive.is_compressed() && errorkind_is_decode(kind) => {
                AnalysisError::CorruptArchive(error.to_string())
            }
            _ => AnalysisError::Io(error.to_string()),
        }
    }

    /// Map an `Error` from the middle of a full scan of a file of type
    /// `archive`.
    pub fn from_scan(error: &Error, archive: FileTypeArchive) -> AnalysisError {
        match error.kind() {
            kind if archive.is_compressed() && errorkind_is_decode(kind) => {
                AnalysisError::CorruptArchive(error.to_string())
            }
            _ => AnalysisError::ScanFailed(error.to_string()),
        }
    }

    /// Map an `Error` from a tail poll.
    pub fn from_tail(error: &Error) -> AnalysisError {
        AnalysisError::TailPollFailed(error.to_string())
    }

    /// Is this error transient, i.e. tailing continues after it?
    pub const fn is_transient(&self) -> bool {
        matches!(self, AnalysisError::TailPollFailed(_))
    }
}
