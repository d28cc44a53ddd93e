// src/analysis/mod.rs

//! The `analysis` module classifies and aggregates [`LogLine`s].
//!
//! ## Overview of analysis
//!
//! * A [`Classifier`] assigns each line a [`Severity`] and a [`Category`]
//!   using the ordered rules of a [`RuleTable`].
//! * Four aggregators each consume every line once:
//!   * [`FrequencyAggregator`] counts normalized messages.
//!   * [`TimeHistogramAggregator`] counts lines per hour-of-day.
//!   * [`IPRegistryAggregator`] counts IPv4 addresses and when each was
//!     last seen.
//!   * [`ErrorSummaryAggregator`] counts error-class lines per category.
//! * An [`AnalysisEngine`] drives a [`LogSource`] through the classifier
//!   and aggregators, first with a full scan and then, optionally, by
//!   tailing the file.
//!
//! <br/>
//!
//! [`LogLine`s]: crate::data::logline::LogLine
//! [`LogSource`]: crate::readers::logsource::LogSource
//! [`Classifier`]: crate::analysis::classifier::Classifier
//! [`Severity`]: crate::analysis::classifier::Severity
//! [`Category`]: crate::analysis::classifier::Category
//! [`RuleTable`]: crate::analysis::classifier::RuleTable
//! [`FrequencyAggregator`]: crate::analysis::frequency::FrequencyAggregator
//! [`TimeHistogramAggregator`]: crate::analysis::histogram::TimeHistogramAggregator
//! [`IPRegistryAggregator`]: crate::analysis::ipregistry::IPRegistryAggregator
//! [`ErrorSummaryAggregator`]: crate::analysis::errorsummary::ErrorSummaryAggregator
//! [`AnalysisEngine`]: crate::analysis::engine::AnalysisEngine

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod errorsummary;
pub mod frequency;
pub mod histogram;
pub mod ipregistry;
pub mod search;
