// src/data/logline.rs

//! Implement [`LogLine`], one line of text from a log file.

use crate::common::{FileOffset, FileSz};
use crate::data::datetime::{extract_hour, extract_timestamp, DateTimeLOpt, Hour};

use std::fmt;

/// One line of a log file.
///
/// Produced by a [`LogSource`], consumed by the analysis pipeline, and then
/// dropped. A `LogLine` is never modified once created.
///
/// [`LogSource`]: crate::readers::logsource::LogSource
#[derive(Clone, PartialEq, Eq)]
pub struct LogLine {
    /// the line text without the trailing `"\n"` (or `"\r\n"`)
    raw: String,
    /// byte offset of the first byte of the line
    offset: FileOffset,
    /// count of bytes the line consumed in the file, including the newline
    len: FileSz,
    /// hour-of-day found by [`extract_hour`]
    hour: Option<Hour>,
    /// datetime found by [`extract_timestamp`]
    timestamp: DateTimeLOpt,
    /// `false` for a final line of a file with no `"\n"`
    terminated: bool,
}

impl LogLine {
    /// Create a new `LogLine` from the `raw` text found at `offset`.
    /// `len` is the count of bytes consumed from the file.
    pub fn new(raw: String, offset: FileOffset, len: FileSz) -> LogLine {
        let hour = extract_hour(&raw);
        let timestamp = extract_timestamp(&raw);

        LogLine {
            raw,
            offset,
            len,
            hour,
            timestamp,
            terminated: true,
        }
    }

    /// Like [`new`](LogLine::new) for the final line of a file that has no
    /// terminating newline. The line may still be in the middle of being
    /// written.
    pub fn new_unterminated(raw: String, offset: FileOffset, len: FileSz) -> LogLine {
        LogLine {
            terminated: false,
            ..LogLine::new(raw, offset, len)
        }
    }

    pub fn raw(&self) -> &str {
        self.raw.as_str()
    }

    pub const fn offset(&self) -> FileOffset {
        self.offset
    }

    /// Byte offset one past the end of this line (including the newline).
    pub const fn offset_next(&self) -> FileOffset {
        self.offset + self.len
    }

    pub const fn len(&self) -> FileSz {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn hour(&self) -> Option<Hour> {
        self.hour
    }

    pub const fn timestamp(&self) -> DateTimeLOpt {
        self.timestamp
    }

    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl fmt::Debug for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLine")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("hour", &self.hour)
            .field("timestamp", &self.timestamp)
            .field("terminated", &self.terminated)
            .field("raw", &self.raw)
            .finish()
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
