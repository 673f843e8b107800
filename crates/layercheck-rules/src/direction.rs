//! Dependency-direction rule (`DIR001`).

use layercheck_core::{LayerPolicy, LineRange, RuleCategory, Severity, Violation};
use layercheck_graph::ModuleGraph;

use crate::rule::GraphRule;

/// Flags edges whose target layer is not in the source layer's
/// allowed-target set.
///
/// Same-layer edges are always allowed. Edges into or out of an
/// unclassified module are skipped here; the configuration-gap rule owns
/// those. An offending edge into a module that exports symbols but
/// contains at most `analyzer.type_only_max_call_sites` call sites is
/// downgraded to a warning, on the theory that importing types from the
/// wrong layer is coupling to fix, not behavior to fear.
pub struct DependencyDirection;

impl GraphRule for DependencyDirection {
    fn name(&self) -> &'static str {
        "dependency-direction"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Direction
    }

    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();

        for edge in graph.edges() {
            let from = graph.module(edge.from);
            let to = graph.module(edge.to);
            let (Some(from_layer), Some(to_layer)) = (&from.layer, &to.layer) else {
                continue;
            };
            if from_layer == to_layer {
                continue;
            }
            if policy
                .allowed_targets(from_layer)
                .iter()
                .any(|t| t == to_layer)
            {
                continue;
            }

            let type_only = !to.facts.exports.is_empty()
                && to.facts.call_site_count <= policy.analyzer.type_only_max_call_sites;
            let severity = if type_only {
                Severity::Warning
            } else {
                Severity::Error
            };

            violations.push(Violation::new(
                RuleCategory::Direction,
                severity,
                from.path.clone(),
                Some(LineRange::line(edge.line)),
                format!(
                    "layer '{from_layer}' must not depend on layer '{to_layer}' \
                     (import '{}' resolves to {})",
                    edge.specifier,
                    to.path.display()
                ),
            ));
        }

        violations
    }
}
