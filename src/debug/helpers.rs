// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::{FPath, FileOpenOptions};

#[allow(unused_imports)] // XXX: clippy wrongly marks this as unused
use std::io::Write; // for `NamedTempFile.write_all`

use ::flate2::write::GzEncoder;
use ::lazy_static::lazy_static;
use ::lz4_flex::frame::FrameEncoder;

#[doc(hidden)]
pub use ::tempfile::tempdir;
#[doc(hidden)]
pub use ::tempfile::NamedTempFile;
#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile instances default to this file name prefix.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-sla-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
}

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    FPath::from(ntf.path().to_str().unwrap())
}

/// Testing helper function to write `data` to a temporary file with
/// file name `suffix`.
pub fn create_temp_file_with_suffix(data: &[u8], suffix: &str) -> NamedTempFile {
    let mut ntf = match ::tempfile::Builder::new()
        // use known prefix for easier cleanup
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .suffix(suffix)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::new()..tempfile() return Err {}", err);
        }
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }
    match ntf.flush() {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::flush() return Err {}", err);
        }
    }

    ntf
}

/// Testing helper function to write a `str` to a temporary `.log` file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_with_suffix(data.as_bytes(), ".log")
}

/// Testing helper function to gzip compress a `str` to a temporary `.gz`
/// file.
pub fn create_temp_file_gz(data: &str) -> NamedTempFile {
    create_temp_file_with_suffix(&gz_compress(data), ".gz")
}

/// Testing helper function to write a multi-member gzip file, one member
/// per `str` of `members`, to a temporary `.gz` file.
pub fn create_temp_file_gz_members(members: &[&str]) -> NamedTempFile {
    let compressed: Vec<u8> = members
        .iter()
        .flat_map(|member| gz_compress(member))
        .collect();

    create_temp_file_with_suffix(&compressed, ".gz")
}

/// gzip compress `data` as one gzip member.
pub fn gz_compress(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), ::flate2::Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();

    encoder.finish().unwrap()
}

/// Testing helper function to lz4 frame compress a `str` to a temporary
/// `.lz4` file.
pub fn create_temp_file_lz4(data: &str) -> NamedTempFile {
    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(data.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    create_temp_file_with_suffix(&compressed, ".lz4")
}

/// Testing helper to append `data` to the file at `path`.
pub fn append_to_file(path: &FPath, data: &str) {
    let mut file = FileOpenOptions::new()
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(data.as_bytes()).unwrap();
    file.flush().unwrap();
}

/// Testing helper to replace the contents of the file at `path` with `data`.
pub fn rewrite_file(path: &FPath, data: &str) {
    let mut file = FileOpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .unwrap();
    file.write_all(data.as_bytes()).unwrap();
    file.flush().unwrap();
}
