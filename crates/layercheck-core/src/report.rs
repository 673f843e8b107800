//! Violation aggregation: deduplication, ordering, and summary counts.
//!
//! The [`Report`] is the sole externally observable result of the core.
//! Aggregation is a pure function of its inputs, so repeated runs over an
//! unchanged tree produce byte-identical reports.

use crate::types::{RuleCategory, RunStatus, Severity, Violation};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Summary counts over the final violation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    /// Violations per rule name.
    pub by_rule: BTreeMap<String, usize>,
    /// Error-severity violations.
    pub errors: usize,
    /// Warning-severity violations.
    pub warnings: usize,
    /// Info-severity violations.
    pub infos: usize,
}

/// Aggregated result of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Terminal run status.
    pub status: RunStatus,
    /// Deduplicated violations, sorted by (severity desc, path, range).
    pub violations: Vec<Violation>,
    /// Number of files ingested.
    pub files_checked: usize,
    /// Files whose facts are partial because extraction failed.
    pub parse_failures: Vec<PathBuf>,
    /// Summary counts.
    pub counts: ReportCounts,
    /// Diagnostic context for `config-error` and `internal-error` runs.
    pub diagnostic: Option<String>,
}

impl Report {
    /// Aggregates rule output into the final report.
    ///
    /// Removes exact duplicates (same category, path, and range; the
    /// highest-severity duplicate survives), sorts, and counts. Status is
    /// [`RunStatus::Clean`] only when no violation of any severity remains.
    #[must_use]
    pub fn from_violations(
        mut violations: Vec<Violation>,
        files_checked: usize,
        mut parse_failures: Vec<PathBuf>,
    ) -> Self {
        // Group duplicates together with the highest severity first, so
        // dedup keeps the most severe finding for each site.
        violations.sort_by(|a, b| {
            a.dedup_key()
                .cmp(&b.dedup_key())
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.message.cmp(&b.message))
        });
        violations.dedup_by(|a, b| a.dedup_key() == b.dedup_key());

        violations.sort_by(|a, b| {
            Reverse(a.severity)
                .cmp(&Reverse(b.severity))
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.range.cmp(&b.range))
                .then_with(|| a.category.cmp(&b.category))
        });

        parse_failures.sort();
        parse_failures.dedup();

        let counts = count(&violations);
        let status = if violations.is_empty() {
            RunStatus::Clean
        } else {
            RunStatus::ViolationsFound
        };

        Self {
            status,
            violations,
            files_checked,
            parse_failures,
            counts,
            diagnostic: None,
        }
    }

    /// Report for a run that exceeded its deadline. No partial violation
    /// list is carried; partial rule results are not trustworthy.
    #[must_use]
    pub fn timeout(files_checked: usize) -> Self {
        Self::empty(RunStatus::Timeout, files_checked, None)
    }

    /// Report for a policy rejected at load time.
    #[must_use]
    pub fn config_error(diagnostic: impl Into<String>) -> Self {
        Self::empty(RunStatus::ConfigError, 0, Some(diagnostic.into()))
    }

    /// Report for a broken internal invariant.
    #[must_use]
    pub fn internal_error(diagnostic: impl Into<String>) -> Self {
        Self::empty(RunStatus::InternalError, 0, Some(diagnostic.into()))
    }

    fn empty(status: RunStatus, files_checked: usize, diagnostic: Option<String>) -> Self {
        Self {
            status,
            violations: Vec::new(),
            files_checked,
            parse_failures: Vec::new(),
            counts: ReportCounts::default(),
            diagnostic,
        }
    }

    /// Returns true if any error-severity violation remains.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    /// Violations of a single category.
    #[must_use]
    pub fn by_category(&self, category: RuleCategory) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.category == category)
            .collect()
    }
}

fn count(violations: &[Violation]) -> ReportCounts {
    let mut counts = ReportCounts::default();
    for v in violations {
        *counts
            .by_rule
            .entry(v.category.name().to_string())
            .or_insert(0) += 1;
        match v.severity {
            Severity::Error => counts.errors += 1,
            Severity::Warning => counts.warnings += 1,
            Severity::Info => counts.infos += 1,
        }
    }
    counts
}
