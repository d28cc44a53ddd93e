// src/analysis/config.rs

//! Settings of an [`AnalysisEngine`].
//!
//! [`AnalysisEngine`]: crate::analysis::engine::AnalysisEngine

use crate::common::Compression;

use std::time::Duration;

/// Default time between tail polls
pub const POLL_INTERVAL_DEFAULT: Duration = Duration::from_secs(1);
/// Smallest allowed time between tail polls
pub const POLL_INTERVAL_MIN: Duration = Duration::from_millis(10);
/// Default count of rows of a message frequency report
pub const TOP_N_DEFAULT: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnalysisConfig {
    /// time between tail polls; also the longest `stop_tail` may take
    pub poll_interval: Duration,
    /// compression hint for opened files
    pub compression: Compression,
    /// count of rows of the message frequency report when the caller does
    /// not pass one
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> AnalysisConfig {
        AnalysisConfig {
            poll_interval: POLL_INTERVAL_DEFAULT,
            compression: Compression::Infer,
            top_n: TOP_N_DEFAULT,
        }
    }
}

impl AnalysisConfig {
    /// Builder-style setter; values below [`POLL_INTERVAL_MIN`] are raised
    /// to it.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> AnalysisConfig {
        self.poll_interval = poll_interval.max(POLL_INTERVAL_MIN);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> AnalysisConfig {
        self.compression = compression;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> AnalysisConfig {
        self.top_n = top_n;
        self
    }
}
