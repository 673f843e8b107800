//! The rule trait every conformance check implements.

use layercheck_core::{LayerPolicy, RuleCategory, Violation};
use layercheck_graph::ModuleGraph;

/// One architecture-conformance rule.
///
/// Rules are pure: they read the classified graph and the policy and
/// emit violations, never mutating either. The engine may therefore run
/// them in any order without changing the report.
pub trait GraphRule: Send + Sync {
    /// Kebab-case rule name (e.g. `dependency-direction`).
    fn name(&self) -> &'static str;

    /// Category this rule reports under.
    fn category(&self) -> RuleCategory;

    /// Evaluates the rule over the whole graph.
    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation>;
}

/// Boxed rule, as stored in the engine.
pub type RuleBox = Box<dyn GraphRule>;
