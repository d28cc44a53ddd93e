// src/data/mod.rs

//! The `data` module is specialized data containers for
//! [`LogLine`]s and the datetime helpers that fill them.
//!
//! ## Definitions of data
//!
//! ### LogLine
//!
//! A "line" is a sequence of bytes in the decompressed file that:
//!
//! * begin after a prior "line" or the beginning of a file.
//! * end with a newline character `'\n'` or the end of a file.
//!
//! A "line" is represented by a [`LogLine`] and produced by a
//! [`LogSource`]. The bytes are decoded as UTF-8, lossy.
//!
//! A `LogLine` may carry an hour-of-day and a full datetime when either was
//! found within the line. Both are "best effort"; there is no
//! requirement that a line have either.
//!
//! [`LogLine`]: crate::data::logline::LogLine
//! [`LogSource`]: crate::readers::logsource::LogSource

pub mod datetime;
pub mod logline;
