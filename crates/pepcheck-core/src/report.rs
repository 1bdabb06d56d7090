//! Report aggregation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{Category, Severity, Violation};

/// Aggregated result of evaluating one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Identifier of the evaluated source.
    pub identifier: String,
    /// Violations ordered by line, then column, then catalog order.
    pub violations: Vec<Violation>,
    /// Total number of violations.
    pub total: usize,
    /// Violation counts per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Violation counts per category.
    pub by_category: BTreeMap<Category, usize>,
    /// True iff there are no error-severity violations.
    pub clean: bool,
}

impl Report {
    /// Returns true if the report has no error-severity violations.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    /// Number of violations with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Number of violations in the given category.
    #[must_use]
    pub fn count_category(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    /// Checks if any violation meets or exceeds the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Iterates over the violations produced by one rule id.
    pub fn violations_of<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.rule == rule)
    }
}

/// Builds a [`Report`] from a violation stream.
///
/// Violations are stable-sorted by (line, column) so that ties keep the
/// order they arrived in, which the evaluator guarantees is catalog order.
/// Exact duplicates of (rule id, line, column) are dropped.
#[must_use]
pub fn aggregate(identifier: impl Into<String>, mut violations: Vec<Violation>) -> Report {
    violations.sort_by_key(Violation::position);

    let mut seen = HashSet::new();
    violations.retain(|v| seen.insert((v.rule.clone(), v.location.line, v.location.column)));

    let mut by_severity = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    for v in &violations {
        *by_severity.entry(v.severity).or_insert(0) += 1;
        *by_category.entry(v.category).or_insert(0) += 1;
    }

    Report {
        identifier: identifier.into(),
        total: violations.len(),
        clean: !violations.iter().any(|v| v.severity == Severity::Error),
        violations,
        by_severity,
        by_category,
    }
}
