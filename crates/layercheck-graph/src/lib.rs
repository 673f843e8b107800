//! # layercheck-graph
//!
//! The module dependency graph: one node per ingested file, one edge per
//! import that resolves to another in-root module.
//!
//! The graph is an arena of nodes with index-based edges, so cyclic
//! graphs are a first-class input rather than a bug; cycle detection is
//! itself one of the analyzer's rules. Once built the graph is read-only
//! for the remainder of the run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod classify;
mod graph;
mod scc;

pub use builder::{BuildOutput, GraphBuilder};
pub use classify::classify;
pub use graph::{DependencyEdge, GraphError, Module, ModuleGraph, ModuleId};
pub use scc::circular_groups;
