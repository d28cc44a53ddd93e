// src/lib.rs

//! _salib_ is the library of _sla_, the syslog analytics tool.
//!
//! _salib_ reads a plain or compressed log file one line at a time,
//! classifies each line, and keeps four reports: message frequency,
//! hour-of-day histogram, IPv4 address registry, and an error summary per
//! category. After a full scan the file may be followed ("tailed") for
//! appended lines.
//!
//! See [`AnalysisEngine`] for the driver of an analysis.
//!
//! [`AnalysisEngine`]: crate::analysis::engine::AnalysisEngine

pub mod analysis;
pub mod common;
pub mod data;
pub mod debug;
pub mod readers;
#[cfg(test)]
pub mod tests;
