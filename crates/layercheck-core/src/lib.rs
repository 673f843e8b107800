//! # layercheck-core
//!
//! Core types for the layercheck architecture-conformance analyzer.
//!
//! This crate defines the vocabulary shared by the ingestion, graph, and
//! rule crates:
//!
//! - [`Violation`], [`Severity`], [`RuleCategory`] for findings
//! - [`LayerPolicy`] for the validated analysis configuration
//! - [`LayerMatcher`] for path-to-layer classification
//! - [`Report`] and [`RunStatus`] for the aggregated result
//!
//! It contains no I/O beyond reading a policy file; everything here is a
//! pure value type so the same policy can drive multiple analyses in one
//! process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod policy;
mod report;
mod types;

pub use policy::{
    AnalyzerPolicy, BoundaryPolicy, CyclePolicy, IoPolicy, LayerDef, LayerMatcher, LayerPolicy,
    PolicyError, ResolutionPolicy,
};
pub use report::{Report, ReportCounts};
pub use types::{LineRange, RuleCategory, RunStatus, Severity, Violation};
