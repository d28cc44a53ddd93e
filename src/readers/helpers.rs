// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use crate::common::{
    Compression,
    FPath,
    FileSz,
    FileTypeArchive,
};

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    let mut riter = path.rsplit(std::path::MAIN_SEPARATOR);

    FPath::from(riter.next().unwrap_or(""))
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &std::path::Path {
    std::path::Path::new(path)
}

/// Return the size of the file.
pub fn path_filesz(path: &std::path::Path) -> Option<FileSz> {
    defn!("({:?})", path);
    let metadata = match std::fs::metadata(path) {
        Ok(val) => val,
        Err(_err) => {
            defx!("error {}, return None", _err);
            return None;
        }
    };
    let len: FileSz = metadata.len();
    defx!("return {}", len);

    Some(len)
}

/// Determine the [`FileTypeArchive`] of `path` from the user-passed
/// [`Compression`] hint and the file name extension.
///
/// The extension test is case-insensitive, e.g. `syslog.1.GZ` is gzip.
pub fn fpath_to_filetypearchive(path: &FPath, compression: Compression) -> FileTypeArchive {
    match compression {
        Compression::Gzip => return FileTypeArchive::Gz,
        Compression::Plain => return FileTypeArchive::Normal,
        Compression::Infer => {}
    }
    let name: String = basename(path).to_lowercase();
    for archive in [FileTypeArchive::Gz, FileTypeArchive::Bz2, FileTypeArchive::Lz4] {
        if name.ends_with(archive.suffix()) {
            defñ!("{:?} is {:?}", path, archive);
            return archive;
        }
    }

    FileTypeArchive::Normal
}

/// Render a byte count as a short human-readable size, e.g. `"1.5 MB"`.
pub fn format_size(size: FileSz) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value: f64 = size as f64;
    for unit in UNITS.iter().take(UNITS.len() - 1) {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }

    format!("{:.1} {}", value, UNITS[UNITS.len() - 1])
}
