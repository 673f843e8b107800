//! Rule engine: runs the rule set over a classified graph.

use tracing::{debug, info};

use layercheck_core::{LayerPolicy, Violation};
use layercheck_graph::ModuleGraph;

use crate::boundary::ModuleBoundary;
use crate::config_gap::ConfigurationGap;
use crate::cycles::CircularDependency;
use crate::direction::DependencyDirection;
use crate::error_shape::ErrorShape;
use crate::io_isolation::IoIsolation;
use crate::rule::{GraphRule, RuleBox};

/// Holds the rule set and evaluates it.
///
/// Rules are independent; the engine concatenates their findings and
/// leaves ordering and deduplication to the reporter, so the rule
/// registration order never shows in the report.
#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<RuleBox>,
}

impl RuleEngine {
    /// An engine with no rules; useful for tests that add one rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full built-in rule set.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add(Box::new(DependencyDirection));
        engine.add(Box::new(IoIsolation));
        engine.add(Box::new(ModuleBoundary));
        engine.add(Box::new(ErrorShape));
        engine.add(Box::new(CircularDependency));
        engine.add(Box::new(ConfigurationGap));
        engine
    }

    /// Registers a rule.
    pub fn add(&mut self, rule: RuleBox) {
        self.rules.push(rule);
    }

    /// Registered rule names, in registration order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule and concatenates the findings.
    #[must_use]
    pub fn evaluate(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            let found = rule.check(graph, policy);
            debug!(rule = rule.name(), findings = found.len(), "rule evaluated");
            violations.extend(found);
        }
        info!(
            rules = self.rules.len(),
            violations = violations.len(),
            "rule evaluation complete"
        );
        violations
    }
}
