// src/readers/mod.rs

//! "Readers" for _salib_.
//!
//! ## Overview of readers
//!
//! * A [`LogSource`] opens a plain or compressed file and creates a
//!   [`LogLineIter`] which derives [`LogLine`s].
//! * [`discover_logs`] finds files worth reading within a directory.
//!
//! <br/>
//!
//! A `LogLineIter` is a rust [`Iterator`]; it reads one line at a time
//! and holds the file handle only while iterating.
//!
//! Also see [_Definitions of data_].
//!
//! [_Definitions of data_]: crate::data
//! [`LogLine`s]: crate::data::logline::LogLine
//! [`LogSource`]: crate::readers::logsource::LogSource
//! [`LogLineIter`]: crate::readers::logsource::LogLineIter
//! [`discover_logs`]: crate::readers::discovery::discover_logs

pub mod discovery;
pub mod helpers;
pub mod logsource;
