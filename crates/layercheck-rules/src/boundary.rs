//! Module-boundary rule (`BOUND001`).

use glob::Pattern;

use layercheck_core::{LayerPolicy, LineRange, RuleCategory, Severity, Violation};
use layercheck_graph::ModuleGraph;

use crate::rule::GraphRule;

/// Flags cross-feature imports that bypass the target feature's public
/// API file.
///
/// A feature is a top-level directory; its public API files are those
/// whose filename matches `boundary.public_api` (or the per-feature
/// override). Imports within one feature and imports of root-level files
/// are unrestricted.
pub struct ModuleBoundary;

impl GraphRule for ModuleBoundary {
    fn name(&self) -> &'static str {
        "module-boundary"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Boundary
    }

    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();

        for edge in graph.edges() {
            let from = graph.module(edge.from);
            let to = graph.module(edge.to);

            let Some(to_feature) = to.feature() else {
                continue;
            };
            if from.feature() == Some(to_feature) {
                continue;
            }

            let pattern = policy.public_api_pattern(to_feature);
            let filename = to
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            // The pattern was validated with the policy; a compile
            // failure here means no file can be public, so every
            // cross-feature edge is flagged.
            let is_public = Pattern::new(pattern)
                .map(|p| p.matches(filename))
                .unwrap_or(false);
            if is_public {
                continue;
            }

            violations.push(Violation::new(
                RuleCategory::Boundary,
                Severity::Error,
                from.path.clone(),
                Some(LineRange::line(edge.line)),
                format!(
                    "import of '{}' reaches into feature '{to_feature}' past its \
                     public API ('{pattern}')",
                    to.path.display()
                ),
            ));
        }

        violations
    }
}
