// src/readers/logsource.rs

//! Implements a [`LogSource`], a uniform line reader over plain or
//! compressed log files.
//!
//! A `LogSource` does not hold the file open. Each call to
//! [`read_all`], [`read_from`], or [`tail_from`] opens the file and returns a
//! [`LogLineIter`] which owns the file handle. The handle is dropped when the
//! iterator is exhausted or when the caller drops the iterator.
//!
//! Compressed files are decompressed while streaming, one buffer at a time;
//! the whole file is never read into memory. All offsets are in
//! _decompressed_ bytes.
//!
//! [`read_all`]: LogSource::read_all
//! [`read_from`]: LogSource::read_from
//! [`tail_from`]: LogSource::tail_from

use crate::common::{
    err_from_err_path,
    err_from_err_path_result,
    Bytes,
    Compression,
    CRu8,
    FPath,
    File,
    FileOffset,
    FileOpenOptions,
    FileSz,
    FileTypeArchive,
    NLu8,
};
use crate::data::logline::LogLine;
use crate::readers::helpers::{fpath_to_filetypearchive, fpath_to_path};

use std::fmt;
use std::io::{BufRead, BufReader, Error, ErrorKind, Read, Result, Seek, SeekFrom};

use ::bzip2_rs::DecoderReader as Bz2DecoderReader;
// `flate2` is for gzip files.
use ::flate2::read::MultiGzDecoder;
// `lz4_flex` is for lz4 files.
use ::lz4_flex::frame::FrameDecoder as Lz4FrameDecoder;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Size of the read buffer wrapped around the file or decoder
pub const READ_BUF_SZ: usize = 65536;

/// gzip magic bytes, <https://datatracker.ietf.org/doc/html/rfc1952#page-5>
pub const MAGIC_GZ: [u8; 2] = [0x1F, 0x8B];
/// bzip2 magic bytes, `"BZh"`
pub const MAGIC_BZ2: [u8; 3] = [0x42, 0x5A, 0x68];
/// lz4 frame magic number `0x184D2204`, little endian
pub const MAGIC_LZ4: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// A boxed reader of decompressed bytes. `Send` so an iterator may be moved
/// to a worker thread.
type LineBufRead = Box<dyn BufRead + Send>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogSource
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A readable log file, plain or compressed.
#[derive(Clone, PartialEq, Eq)]
pub struct LogSource {
    path: FPath,
    archive: FileTypeArchive,
}

impl fmt::Debug for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSource")
            .field("path", &self.path)
            .field("archive", &self.archive)
            .finish()
    }
}

impl LogSource {
    /// Check that `path` is a readable file and, when compressed, begins
    /// with the expected magic bytes.
    ///
    /// Returns an `Error` with `ErrorKind::NotFound` or
    /// `ErrorKind::PermissionDenied` as the OS reports. Bad magic bytes
    /// are `ErrorKind::InvalidData`.
    pub fn open(path: &FPath, compression: Compression) -> Result<LogSource> {
        defn!("({:?}, {:?})", path, compression);
        let archive: FileTypeArchive = fpath_to_filetypearchive(path, compression);
        let mut file: File = Self::open_file(path)?;
        let metadata = match file.metadata() {
            Ok(val) => val,
            Err(err) => {
                defx!("file.metadata() Error, return {:?}", err);
                return err_from_err_path_result(&err, path, Some("metadata failed"));
            }
        };
        if metadata.is_dir() {
            defx!("is a directory, return Err");
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Path is a directory {:?}", path),
            ));
        }
        if archive.is_compressed() && metadata.len() > 0 {
            Self::check_magic(&mut file, path, archive)?;
        }
        defx!("return Ok({:?})", archive);

        Ok(LogSource {
            path: path.clone(),
            archive,
        })
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub const fn archive(&self) -> FileTypeArchive {
        self.archive
    }

    /// Lazy sequence of every line in the file.
    pub fn read_all(&self) -> Result<LogLineIter> {
        self.read_from(0)
    }

    /// Lazy sequence of lines starting at decompressed byte `offset`.
    ///
    /// A final line without a terminating newline is returned.
    /// `read_from(0)` is the same as [`read_all`](LogSource::read_all).
    pub fn read_from(&self, offset: FileOffset) -> Result<LogLineIter> {
        self.iter_from(offset, false)
    }

    /// Lazy sequence of _complete_ lines starting at decompressed byte
    /// `offset`.
    ///
    /// A final line without a terminating newline is not returned; it may
    /// still be in the middle of being written.
    pub fn tail_from(&self, offset: FileOffset) -> Result<LogLineIter> {
        self.iter_from(offset, true)
    }

    /// The size of the decompressed file data.
    ///
    /// A compressed file is decompressed and counted. The gzip `ISIZE`
    /// trailer is not used; it describes only the last member of a
    /// multi-member file and wraps at 2<sup>32</sup>.
    pub fn logical_size(&self) -> Result<FileSz> {
        defn!("({:?})", self.path);
        let file: File = Self::open_file(&self.path)?;
        let filesz: FileSz = match file.metadata() {
            Ok(val) => val.len(),
            Err(err) => {
                defx!("file.metadata() Error, return {:?}", err);
                return err_from_err_path_result(&err, &self.path, Some("metadata failed"));
            }
        };
        if filesz == 0 {
            defx!("empty file, return Ok(0)");
            return Ok(0);
        }
        let size: FileSz = match self.archive {
            FileTypeArchive::Normal => filesz,
            FileTypeArchive::Bz2 | FileTypeArchive::Gz | FileTypeArchive::Lz4 => {
                let mut reader: LineBufRead = Self::decoder(file, self.archive);
                match std::io::copy(&mut reader, &mut std::io::sink()) {
                    Ok(val) => val,
                    Err(err) => {
                        defx!("io::copy Error, return {:?}", err);
                        return err_from_err_path_result(&err, &self.path, Some("decompress failed"));
                    }
                }
            }
        };
        defx!("return Ok({})", size);

        Ok(size)
    }

    fn open_file(path: &FPath) -> Result<File> {
        match FileOpenOptions::new()
            .read(true)
            .open(fpath_to_path(path))
        {
            Ok(val) => Ok(val),
            Err(err) => {
                defñ!("open Error {:?}", err);
                Err(err_from_err_path(&err, path, None))
            }
        }
    }

    /// Read the first bytes of `file` and compare to the magic bytes of
    /// `archive`. Resets the file position to the start.
    fn check_magic(file: &mut File, path: &FPath, archive: FileTypeArchive) -> Result<()> {
        let magic: &[u8] = match archive {
            FileTypeArchive::Normal => return Ok(()),
            FileTypeArchive::Bz2 => &MAGIC_BZ2,
            FileTypeArchive::Gz => &MAGIC_GZ,
            FileTypeArchive::Lz4 => &MAGIC_LZ4,
        };
        let mut buf: [u8; 4] = [0; 4];
        let mut read_total: usize = 0;
        while read_total < magic.len() {
            match file.read(&mut buf[read_total..magic.len()]) {
                Ok(0) => break,
                Ok(sz) => read_total += sz,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return err_from_err_path_result(&err, path, Some("read magic bytes failed"));
                }
            }
        }
        if &buf[..read_total] != magic {
            defo!("bad magic {:?} for {}", &buf[..read_total], archive);
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("invalid {} magic bytes {:02X?} for file {:?}", archive, &buf[..read_total], path),
            ));
        }
        if let Err(err) = file.seek(SeekFrom::Start(0)) {
            return err_from_err_path_result(&err, path, Some("seek failed"));
        }

        Ok(())
    }

    /// Wrap `file` in the decoder for `archive`.
    fn decoder(file: File, archive: FileTypeArchive) -> LineBufRead {
        match archive {
            FileTypeArchive::Normal => Box::new(BufReader::with_capacity(READ_BUF_SZ, file)),
            FileTypeArchive::Bz2 => Box::new(BufReader::with_capacity(
                READ_BUF_SZ,
                Bz2DecoderReader::new(file),
            )),
            FileTypeArchive::Gz => Box::new(BufReader::with_capacity(
                READ_BUF_SZ,
                MultiGzDecoder::new(BufReader::new(file)),
            )),
            FileTypeArchive::Lz4 => Box::new(BufReader::with_capacity(
                READ_BUF_SZ,
                Lz4FrameDecoder::new(BufReader::new(file)),
            )),
        }
    }

    fn iter_from(&self, offset: FileOffset, complete_lines_only: bool) -> Result<LogLineIter> {
        defn!("({:?}, {}, complete_lines_only {})", self.path, offset, complete_lines_only);
        let mut file: File = Self::open_file(&self.path)?;
        let filesz: FileSz = match file.metadata() {
            Ok(val) => val.len(),
            Err(err) => {
                return err_from_err_path_result(&err, &self.path, Some("metadata failed"));
            }
        };
        if filesz == 0 {
            // an empty compressed file is an empty log, not a broken archive
            defx!("empty file, return empty LogLineIter");
            return Ok(LogLineIter::new(None, self.path.clone(), offset, complete_lines_only));
        }
        let reader: LineBufRead = match self.archive {
            FileTypeArchive::Normal => {
                if offset > 0 {
                    if let Err(err) = file.seek(SeekFrom::Start(offset)) {
                        defx!("file.seek({}) Error, return {:?}", offset, err);
                        return err_from_err_path_result(&err, &self.path, Some("seek failed"));
                    }
                }
                Self::decoder(file, self.archive)
            }
            FileTypeArchive::Bz2 | FileTypeArchive::Gz | FileTypeArchive::Lz4 => {
                let mut reader: LineBufRead = Self::decoder(file, self.archive);
                if offset > 0 {
                    // decompressed streams cannot seek; decode and discard
                    match std::io::copy(&mut reader.by_ref().take(offset), &mut std::io::sink()) {
                        Ok(_skipped) => {
                            defo!("skipped {} of {} bytes", _skipped, offset);
                        }
                        Err(err) => {
                            defx!("skip Error, return {:?}", err);
                            return err_from_err_path_result(&err, &self.path, Some("decompress failed"));
                        }
                    }
                }
                reader
            }
        };
        defx!();

        Ok(LogLineIter::new(Some(reader), self.path.clone(), offset, complete_lines_only))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogLineIter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Iterator of [`LogLine`] created by a [`LogSource`].
///
/// Yields `Err` at most once; after an `Err` or after the last line the
/// underlying file handle is dropped and the iterator returns `None`.
pub struct LogLineIter {
    reader: Option<LineBufRead>,
    path: FPath,
    /// offset of the next byte to read
    offset: FileOffset,
    complete_lines_only: bool,
    buf: Bytes,
}

impl LogLineIter {
    fn new(
        reader: Option<LineBufRead>,
        path: FPath,
        offset: FileOffset,
        complete_lines_only: bool,
    ) -> LogLineIter {
        LogLineIter {
            reader,
            path,
            offset,
            complete_lines_only,
            buf: Bytes::with_capacity(1024),
        }
    }

    /// Offset of the byte after the last returned line.
    pub const fn offset(&self) -> FileOffset {
        self.offset
    }

    /// Drop the underlying file handle now.
    pub fn close(&mut self) {
        self.reader = None;
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl fmt::Debug for LogLineIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLineIter")
            .field("path", &self.path)
            .field("offset", &self.offset)
            .field("complete_lines_only", &self.complete_lines_only)
            .field("closed", &self.reader.is_none())
            .finish()
    }
}

impl Iterator for LogLineIter {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader: &mut LineBufRead = self.reader.as_mut()?;
        self.buf.clear();
        let readsz: usize = match reader.read_until(NLu8, &mut self.buf) {
            Ok(val) => val,
            Err(err) => {
                defñ!("read_until Error {:?}", err);
                self.close();
                return Some(Err(err_from_err_path(&err, &self.path, Some("read line failed"))));
            }
        };
        if readsz == 0 {
            self.close();
            return None;
        }
        let terminated: bool = self.buf.last() == Some(&NLu8);
        if !terminated && self.complete_lines_only {
            defñ!("partial line of {} bytes at {}, stop", readsz, self.offset);
            self.close();
            return None;
        }
        let mut end: usize = self.buf.len();
        if terminated {
            end -= 1;
            if end > 0 && self.buf[end - 1] == CRu8 {
                end -= 1;
            }
        }
        let raw: String = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        let line: LogLine = if terminated {
            LogLine::new(raw, self.offset, readsz as FileSz)
        } else {
            LogLine::new_unterminated(raw, self.offset, readsz as FileSz)
        };
        self.offset += readsz as FileOffset;

        Some(Ok(line))
    }
}
