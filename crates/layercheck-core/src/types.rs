//! Violation, severity, and run-status types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, does not fail analysis.
    Info,
    /// Finding that should be addressed.
    Warning,
    /// Finding that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Inclusive 1-indexed line range a violation points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct LineRange {
    /// First line of the range.
    pub start: usize,
    /// Last line of the range.
    pub end: usize,
}

impl LineRange {
    /// Range covering a single line.
    #[must_use]
    pub fn line(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

impl std::fmt::Display for LineRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// The closed set of rule categories the analyzer can report on.
///
/// The reporter matches on this exhaustively; adding a category is a
/// deliberate API change, not an open-ended dispatch point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// A dependency edge pointing against the allowed layer direction.
    Direction,
    /// A deny-listed I/O primitive used inside a pure layer.
    IoIsolation,
    /// A cross-feature import bypassing the feature's public API file.
    Boundary,
    /// An error-handling construct with an empty body.
    ErrorShape,
    /// A module participating in a circular-dependency group.
    Cycle,
    /// An import specifier that matched more than one candidate file.
    Resolution,
    /// A module not covered by any configured layer pattern.
    ConfigGap,
}

impl RuleCategory {
    /// Stable rule code (e.g. `DIR001`) for machine consumers.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Direction => "DIR001",
            Self::IoIsolation => "IO001",
            Self::Boundary => "BOUND001",
            Self::ErrorShape => "ERR001",
            Self::Cycle => "CYCLE001",
            Self::Resolution => "RES001",
            Self::ConfigGap => "GAP001",
        }
    }

    /// Kebab-case rule name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Direction => "dependency-direction",
            Self::IoIsolation => "io-isolation",
            Self::Boundary => "module-boundary",
            Self::ErrorShape => "error-handling-shape",
            Self::Cycle => "circular-dependency",
            Self::Resolution => "ambiguous-resolution",
            Self::ConfigGap => "configuration-gap",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single architecture-conformance finding.
///
/// Immutable once produced; the reporter deduplicates on
/// `(category, path, range)` and sorts by severity, path, range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Which rule produced this finding.
    pub category: RuleCategory,
    /// Severity of the finding.
    pub severity: Severity,
    /// Path of the offending file, relative to the analysis root.
    pub path: PathBuf,
    /// Line range, when the finding points at a specific location.
    pub range: Option<LineRange>,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        category: RuleCategory,
        severity: Severity,
        path: impl Into<PathBuf>,
        range: Option<LineRange>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            path: path.into(),
            range,
            message: message.into(),
        }
    }

    /// Key the reporter deduplicates on.
    #[must_use]
    pub fn dedup_key(&self) -> (RuleCategory, &PathBuf, Option<LineRange>) {
        (self.category, &self.path, self.range)
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(range) = &self.range {
            write!(f, ":{range}")?;
        }
        write!(
            f,
            ": {} [{}] {}",
            self.severity,
            self.category.code(),
            self.message
        )
    }
}

/// Terminal status of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// No violations found.
    Clean,
    /// One or more violations found (any severity).
    ViolationsFound,
    /// The configured deadline elapsed before analysis completed.
    Timeout,
    /// The policy was rejected before any file was touched.
    ConfigError,
    /// An internal invariant was broken; results are not trustworthy.
    InternalError,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::ViolationsFound => "violations-found",
            Self::Timeout => "timeout",
            Self::ConfigError => "config-error",
            Self::InternalError => "internal-error",
        };
        write!(f, "{s}")
    }
}
