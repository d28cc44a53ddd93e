// src/analysis/histogram.rs

//! Hour-of-day histogram of log lines.

use crate::common::Count;
use crate::data::datetime::{extract_hour, Hour, HOURS_PER_DAY};

/// Count of y-axis labels returned by [`HourHistogram::axis_labels`]
pub const AXIS_LABELS: usize = 5;

/// Snapshot of a [`TimeHistogramAggregator`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HourHistogram {
    /// index is the hour-of-day
    pub buckets: [Count; HOURS_PER_DAY],
    /// largest bucket value, for scaling a rendering
    pub max_bucket: Count,
}

impl HourHistogram {
    pub fn total(&self) -> Count {
        self.buckets.iter().sum()
    }

    /// Evenly spaced y-axis labels from `0` to `max_bucket`.
    pub fn axis_labels(&self) -> [Count; AXIS_LABELS] {
        let mut labels: [Count; AXIS_LABELS] = [0; AXIS_LABELS];
        let steps: Count = (AXIS_LABELS - 1) as Count;
        for (i, label) in labels.iter_mut().enumerate() {
            *label = (i as Count * self.max_bucket) / steps;
        }

        labels
    }

    /// Bar length of `hour` scaled so `max_bucket` is `width`.
    pub fn bar_len(&self, hour: usize, width: usize) -> usize {
        if self.max_bucket == 0 || hour >= HOURS_PER_DAY {
            return 0;
        }

        ((self.buckets[hour] as u128 * width as u128) / self.max_bucket as u128) as usize
    }
}

/// 24 counters, one per hour-of-day.
///
/// A line without an `HH:MM:SS` substring does not change any counter.
#[derive(Clone, Debug, Default)]
pub struct TimeHistogramAggregator {
    buckets: [Count; HOURS_PER_DAY],
}

impl TimeHistogramAggregator {
    pub fn new() -> TimeHistogramAggregator {
        TimeHistogramAggregator::default()
    }

    /// Count a line of which the hour was already extracted.
    pub fn observe_hour(&mut self, hour: Option<Hour>) {
        if let Some(hour) = hour {
            // `extract_hour` never returns more than 23
            if let Some(bucket) = self.buckets.get_mut(hour as usize) {
                *bucket += 1;
            }
        }
    }

    /// Extract the hour of `line` and count it.
    pub fn observe(&mut self, line: &str) {
        self.observe_hour(extract_hour(line));
    }

    pub fn snapshot(&self) -> HourHistogram {
        HourHistogram {
            buckets: self.buckets,
            max_bucket: self.buckets.iter().copied().max().unwrap_or(0),
        }
    }
}
