//! # layercheck
//!
//! Architecture conformance analysis for polyglot codebases.
//!
//! layercheck ingests a source tree (JavaScript/TypeScript and Python),
//! builds a module dependency graph, classifies each module into a
//! configured architecture layer, and evaluates a fixed set of
//! conformance rules over the graph. The result is a deterministic
//! report: the same tree and policy always produce the same violations
//! in the same order.
//!
//! ```no_run
//! use layercheck::{LayerPolicy, Runner, RunStatus};
//!
//! # fn main() -> Result<(), layercheck::PolicyError> {
//! let policy = LayerPolicy::parse(r#"
//! [[layers]]
//! name = "business"
//! paths = ["business/**"]
//!
//! [[layers]]
//! name = "infrastructure"
//! paths = ["infra/**"]
//!
//! [dependencies]
//! business = []
//! infrastructure = ["business"]
//! "#)?;
//!
//! let report = Runner::new("path/to/project", policy).run();
//! if report.status != RunStatus::Clean {
//!     for violation in &report.violations {
//!         eprintln!("{violation}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod runner;

pub use runner::Runner;

pub use layercheck_core::{
    AnalyzerPolicy, BoundaryPolicy, CyclePolicy, IoPolicy, LayerDef, LayerMatcher, LayerPolicy,
    LineRange, PolicyError, Report, ReportCounts, ResolutionPolicy, RuleCategory, RunStatus,
    Severity, Violation,
};
pub use layercheck_graph::{BuildOutput, GraphBuilder, Module, ModuleGraph, ModuleId};
pub use layercheck_ingest::{CallSite, FileFacts, ImportRef, Ingestor, Language};
pub use layercheck_rules::{
    CircularDependency, ConfigurationGap, DependencyDirection, ErrorShape, GraphRule, IoIsolation,
    ModuleBoundary, RuleEngine,
};
