//! Configuration-gap rule (`GAP001`).

use layercheck_core::{LayerPolicy, RuleCategory, Severity, Violation};
use layercheck_graph::ModuleGraph;

use crate::rule::GraphRule;

/// Flags modules no layer pattern covers, one warning per module.
///
/// An unclassified module is invisible to the direction and isolation
/// rules, so silence here would let coverage rot without anyone
/// noticing.
pub struct ConfigurationGap;

impl GraphRule for ConfigurationGap {
    fn name(&self) -> &'static str {
        "configuration-gap"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::ConfigGap
    }

    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        // A policy with no layers at all is a deliberate graph-only run,
        // not a gap.
        if policy.layers.is_empty() {
            return Vec::new();
        }

        graph
            .modules()
            .filter(|(_, module)| module.layer.is_none())
            .map(|(_, module)| {
                Violation::new(
                    RuleCategory::ConfigGap,
                    Severity::Warning,
                    module.path.clone(),
                    None,
                    "module matches no configured layer pattern".to_string(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{classified, file, layered_policy};
    use layercheck_core::LayerPolicy;

    #[test]
    fn uncovered_module_warns() {
        let policy = layered_policy();
        let graph = classified(
            &policy,
            vec![file("business/order.ts", &[]), file("scripts/gen.ts", &[])],
        );
        let violations = ConfigurationGap.check(&graph, &policy);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(violations[0].path.display().to_string(), "scripts/gen.ts");
    }

    #[test]
    fn fully_covered_tree_is_clean() {
        let policy = layered_policy();
        let graph = classified(
            &policy,
            vec![file("business/order.ts", &[]), file("infra/db.ts", &[])],
        );
        assert!(ConfigurationGap.check(&graph, &policy).is_empty());
    }

    #[test]
    fn layerless_policy_reports_nothing() {
        let policy = LayerPolicy::default();
        let graph = classified(&policy, vec![file("anything.ts", &[])]);
        assert!(ConfigurationGap.check(&graph, &policy).is_empty());
    }
}
