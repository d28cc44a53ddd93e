// src/common.rs

//! Common imports, type aliases, and other globals for _salib_
//! (avoids circular imports).

use std::fmt;
use std::io::{Error, ErrorKind};

pub use std::fs::File;
pub use std::path::Path;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;
pub type FileMetadata = std::fs::Metadata;
pub type FileOpenOptions = std::fs::OpenOptions;

/// Offset into a (decompressed) file in bytes
pub type FileOffset = u64;

/// File size in bytes
pub type FileSz = u64;

/// A general-purpose counting type
pub type Count = u64;

/// Sequence of Bytes
pub type Bytes = Vec<u8>;

/// Single-byte newLine char as u8
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = 10;
/// Carriage return char as u8
#[allow(non_upper_case_globals)]
pub const CRu8: u8 = 13;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// archive types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The compression "wrapper" of a log file.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FileTypeArchive {
    /// plain text, not compressed
    #[default]
    Normal,
    /// a `.bz2` file
    Bz2,
    /// a `.gz` file
    Gz,
    /// a `.lz4` file
    Lz4,
}

impl FileTypeArchive {
    /// Is this any compressed type?
    pub const fn is_compressed(&self) -> bool {
        !matches!(self, FileTypeArchive::Normal)
    }

    /// The file name suffix that implies this archive type.
    pub const fn suffix(&self) -> &'static str {
        match self {
            FileTypeArchive::Normal => "",
            FileTypeArchive::Bz2 => ".bz2",
            FileTypeArchive::Gz => ".gz",
            FileTypeArchive::Lz4 => ".lz4",
        }
    }
}

impl fmt::Display for FileTypeArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTypeArchive::Normal => write!(f, "plain"),
            FileTypeArchive::Bz2 => write!(f, "bzip2"),
            FileTypeArchive::Gz => write!(f, "gzip"),
            FileTypeArchive::Lz4 => write!(f, "lz4"),
        }
    }
}

/// User hint about the compression of a file.
///
/// `Infer` decides by the file name extension.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    Infer,
    /// caller knows the file is gzip compressed
    Gzip,
    /// caller knows the file is plain text, regardless of extension
    Plain,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Create a new `Error` with the same `ErrorKind` as `error` and a message
/// that includes the `path` and the optional `mesg`.
pub fn err_from_err_path(
    error: &Error,
    path: &FPath,
    mesg: Option<&str>,
) -> Error {
    match mesg {
        Some(mesg_) => Error::new(error.kind(), format!("{} ({}) for file {:?}", error, mesg_, path)),
        None => Error::new(error.kind(), format!("{} for file {:?}", error, path)),
    }
}

/// Wrapper of [`err_from_err_path`] that returns a `Result::Err`.
pub fn err_from_err_path_result<T>(
    error: &Error,
    path: &FPath,
    mesg: Option<&str>,
) -> std::io::Result<T> {
    Err(err_from_err_path(error, path, mesg))
}

/// Is this `ErrorKind` one a decompressor returns for bad input data?
pub const fn errorkind_is_decode(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof)
}
