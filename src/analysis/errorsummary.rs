// src/analysis/errorsummary.rs

//! Per-category tally of error-class lines, with a few example lines.

use crate::analysis::classifier::{Category, Severity};
use crate::common::Count;

use std::collections::BTreeMap;

use ::more_asserts::debug_assert_le;

/// Maximum example lines kept per category
pub const EXAMPLES_MAX: usize = 3;

/// One category of an [`ErrorSummaryReport`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorSummaryEntry {
    pub count: Count,
    /// the first (up to) [`EXAMPLES_MAX`] lines, trimmed
    pub examples: Vec<String>,
}

/// Ordered by `Category` declaration order.
pub type ErrorSummaryReport = BTreeMap<Category, ErrorSummaryEntry>;

#[derive(Clone, Debug, Default)]
pub struct ErrorSummaryAggregator {
    categories: ErrorSummaryReport,
}

impl ErrorSummaryAggregator {
    pub fn new() -> ErrorSummaryAggregator {
        ErrorSummaryAggregator::default()
    }

    /// Tally `line` if `severity` is error-class. `Info` lines are ignored.
    pub fn observe(&mut self, line: &str, severity: Severity, category: Category) {
        if !severity.is_error_class() {
            return;
        }
        let entry: &mut ErrorSummaryEntry = self.categories.entry(category).or_default();
        entry.count += 1;
        if entry.examples.len() < EXAMPLES_MAX {
            entry.examples.push(line.trim().to_string());
        }
        debug_assert_le!(entry.examples.len(), EXAMPLES_MAX);
    }

    /// Categories seen at least once.
    pub fn report(&self) -> ErrorSummaryReport {
        self.categories.clone()
    }

    /// Sum of all category counts.
    pub fn total(&self) -> Count {
        self.categories.values().map(|entry| entry.count).sum()
    }
}
