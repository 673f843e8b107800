//! # layercheck-rules
//!
//! The architecture-conformance rule set. Every rule reads the
//! classified module graph plus the policy and emits violations; rules
//! never mutate shared state, so their evaluation order is irrelevant to
//! the final report.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod boundary;
mod config_gap;
mod cycles;
mod direction;
mod engine;
mod error_shape;
mod io_isolation;
mod rule;

#[cfg(test)]
mod testutil;

pub use boundary::ModuleBoundary;
pub use config_gap::ConfigurationGap;
pub use cycles::CircularDependency;
pub use direction::DependencyDirection;
pub use engine::RuleEngine;
pub use error_shape::ErrorShape;
pub use io_isolation::IoIsolation;
pub use rule::{GraphRule, RuleBox};
