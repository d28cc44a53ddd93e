// src/analysis/frequency.rs

//! Count how often each normalized message occurs.

use crate::common::Count;

use std::collections::HashMap;

use ::more_asserts::debug_assert_le;

/// Separator after a syslog-style `"host process[pid]"` prefix
pub const MESSAGE_PREFIX_END: &str = "]: ";

/// Strip surrounding whitespace and everything up to and including the
/// first `"]: "`.
///
/// For example `"Jan 5 10:15:32 host sshd[123]: Accepted key"` becomes
/// `"Accepted key"`. A line without `"]: "` is returned trimmed.
pub fn normalize_message(line: &str) -> &str {
    let line: &str = line.trim();
    match line.find(MESSAGE_PREFIX_END) {
        Some(at) => &line[at + MESSAGE_PREFIX_END.len()..],
        None => line,
    }
}

/// Percentage of `count` in `total`, rounded to 2 decimal places.
pub fn percentage(count: Count, total: Count) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct: f64 = (count as f64) / (total as f64) * 100.0;

    (pct * 100.0).round() / 100.0
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct FrequencyCount {
    count: Count,
    /// order of first occurrence, for tie-breaking
    first_seen: Count,
}

/// One row of [`FrequencyAggregator::top_n`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyReportEntry {
    pub message: String,
    pub count: Count,
    /// `count / total_observed * 100`, rounded to 2 decimals
    pub percentage: f64,
}

/// Normalized message to count.
#[derive(Clone, Debug, Default)]
pub struct FrequencyAggregator {
    counts: HashMap<String, FrequencyCount>,
    /// incremented on every `observe`
    total_observed: Count,
}

impl FrequencyAggregator {
    pub fn new() -> FrequencyAggregator {
        FrequencyAggregator::default()
    }

    pub fn observe(&mut self, line: &str) {
        let message: &str = normalize_message(line);
        let first_seen: Count = self.counts.len() as Count;
        match self.counts.get_mut(message) {
            Some(entry) => entry.count += 1,
            None => {
                self.counts.insert(
                    message.to_string(),
                    FrequencyCount {
                        count: 1,
                        first_seen,
                    },
                );
            }
        }
        self.total_observed += 1;
        debug_assert_le!(self.counts.len() as Count, self.total_observed);
    }

    /// Count of lines observed.
    pub const fn total_observed(&self) -> Count {
        self.total_observed
    }

    /// Count of distinct normalized messages.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all message counts. Always equals `total_observed`.
    pub fn sum_counts(&self) -> Count {
        self.counts.values().map(|entry| entry.count).sum()
    }

    /// Count of the normalized form of `line`, `0` if never observed.
    pub fn count_of(&self, line: &str) -> Count {
        self.counts
            .get(normalize_message(line))
            .map_or(0, |entry| entry.count)
    }

    /// The `n` most frequent messages, descending by count.
    /// Ties are in order of first occurrence.
    pub fn top_n(&self, n: usize) -> Vec<FrequencyReportEntry> {
        let mut ranked: Vec<(&String, &FrequencyCount)> = self.counts.iter().collect();
        ranked.sort_unstable_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        ranked
            .into_iter()
            .take(n)
            .map(|(message, entry)| FrequencyReportEntry {
                message: message.clone(),
                count: entry.count,
                percentage: percentage(entry.count, self.total_observed),
            })
            .collect()
    }
}
