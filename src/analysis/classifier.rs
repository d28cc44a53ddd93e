// src/analysis/classifier.rs

//! Classify a free-text log line into a [`Severity`] and a [`Category`].
//!
//! Classification is by ordered, case-insensitive regex rules. The rules
//! are compiled once into a [`RuleTable`] and a [`Classifier`] borrows the
//! table. The first matching rule wins.
//!
//! Severity rules and category rules are independent; a line is assigned
//! both.

use std::fmt;

use ::regex::{Regex, RegexBuilder};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Severity and Category
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Coarse urgency of a log line.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Error,
    Warning,
    Fail,
    Info,
}

impl Severity {
    /// `Error`, `Warning`, and `Fail` lines are "error-class"; these are the
    /// lines tallied by the error summary.
    pub const fn is_error_class(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Fail => "Fail",
            Severity::Info => "Info",
        };
        write!(f, "{}", s)
    }
}

/// Topic of a log line.
///
/// The declaration order is the rule evaluation order and the report order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Category {
    System,
    Authentication,
    Network,
    Hardware,
    Application,
    Security,
    /// no category rule matched
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::System,
        Category::Authentication,
        Category::Network,
        Category::Hardware,
        Category::Application,
        Category::Security,
        Category::Uncategorized,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            Category::System => "System",
            Category::Authentication => "Authentication",
            Category::Network => "Network",
            Category::Hardware => "Hardware",
            Category::Application => "Application",
            Category::Security => "Security",
            Category::Uncategorized => "Uncategorized",
        };
        write!(f, "{}", s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// rule tables
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Regex pattern and the `Severity` it implies.
pub type SeverityPattern = (&'static str, Severity);
/// Regex pattern and the `Category` it implies.
pub type CategoryPattern = (&'static str, Category);

/// Severity rules, in evaluation order.
pub const SEVERITY_PATTERNS: &[SeverityPattern] = &[
    ("error|critical|emergency|alert", Severity::Error),
    ("fail", Severity::Fail),
    ("warning", Severity::Warning),
];

/// Category rules, in evaluation order.
///
/// Order matters for lines matching more than one rule, e.g.
/// `"network security breach"` is `Network`.
pub const CATEGORY_PATTERNS: &[CategoryPattern] = &[
    ("system|kernel|daemon", Category::System),
    ("auth|login|password", Category::Authentication),
    ("network|connection|interface|eth|wlan", Category::Network),
    ("device|driver|hardware|usb|disk", Category::Hardware),
    ("segfault|crash|exception|error", Category::Application),
    ("security|firewall|permission|denied", Category::Security),
];

/// Pattern of lines returned by an error search. Broader than the
/// error-class severity rules.
pub const ERROR_SEARCH_PATTERN: &str =
    r"error|fail|critical|emergency|alert|warning|exception|\bE\b";

/// One compiled classification rule, `(pattern, label)`.
#[derive(Clone, Debug)]
pub struct ClassificationRule<T> {
    pub regex: Regex,
    pub label: T,
}

impl<T: Copy> ClassificationRule<T> {
    pub fn new(pattern: &str, label: T) -> Result<ClassificationRule<T>, ::regex::Error> {
        let regex: Regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()?;

        Ok(ClassificationRule { regex, label })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Immutable, ordered rule tables; created once and shared by reference.
#[derive(Clone, Debug)]
pub struct RuleTable {
    severity_rules: Vec<ClassificationRule<Severity>>,
    category_rules: Vec<ClassificationRule<Category>>,
    error_search: Regex,
}

impl RuleTable {
    /// Compile the passed patterns. Each pattern is case-insensitive.
    pub fn from_patterns(
        severity_patterns: &[SeverityPattern],
        category_patterns: &[CategoryPattern],
        error_search_pattern: &str,
    ) -> Result<RuleTable, ::regex::Error> {
        defn!();
        let severity_rules = severity_patterns
            .iter()
            .map(|(pattern, severity)| ClassificationRule::new(pattern, *severity))
            .collect::<Result<Vec<_>, _>>()?;
        let category_rules = category_patterns
            .iter()
            .map(|(pattern, category)| ClassificationRule::new(pattern, *category))
            .collect::<Result<Vec<_>, _>>()?;
        let error_search: Regex = RegexBuilder::new(error_search_pattern)
            .case_insensitive(true)
            .build()?;
        defx!("{} severity rules, {} category rules", severity_rules.len(), category_rules.len());

        Ok(RuleTable {
            severity_rules,
            category_rules,
            error_search,
        })
    }

    pub fn severity_rules(&self) -> &[ClassificationRule<Severity>] {
        &self.severity_rules
    }

    pub fn category_rules(&self) -> &[ClassificationRule<Category>] {
        &self.category_rules
    }

    pub fn error_search(&self) -> &Regex {
        &self.error_search
    }
}

impl Default for RuleTable {
    /// The built-in rules. The patterns are constants known to compile.
    fn default() -> RuleTable {
        RuleTable::from_patterns(SEVERITY_PATTERNS, CATEGORY_PATTERNS, ERROR_SEARCH_PATTERN)
            .unwrap()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Classifier
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pure line classifier over a borrowed [`RuleTable`].
#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    rules: &'a RuleTable,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a RuleTable) -> Classifier<'a> {
        Classifier { rules }
    }

    /// First matching severity rule, else `Info`.
    pub fn severity(&self, line: &str) -> Severity {
        self.rules
            .severity_rules
            .iter()
            .find(|rule| rule.is_match(line))
            .map_or(Severity::Info, |rule| rule.label)
    }

    /// First matching category rule, else `Uncategorized`.
    pub fn category(&self, line: &str) -> Category {
        self.rules
            .category_rules
            .iter()
            .find(|rule| rule.is_match(line))
            .map_or(Category::Uncategorized, |rule| rule.label)
    }

    /// Classify `line`. Never fails.
    pub fn classify(&self, line: &str) -> (Severity, Category) {
        (self.severity(line), self.category(line))
    }

    /// Does `line` match the error search pattern?
    pub fn is_error_search_match(&self, line: &str) -> bool {
        self.rules.error_search.is_match(line)
    }
}
