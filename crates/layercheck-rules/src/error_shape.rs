//! Error-handling-shape rule (`ERR001`).

use layercheck_core::{LayerPolicy, LineRange, RuleCategory, Severity, Violation};
use layercheck_graph::ModuleGraph;

use crate::rule::GraphRule;

/// Flags error-handling constructs with empty bodies, one warning per
/// site. The ingestors record these (`catch {}` in EcmaScript, an
/// `except` whose body is only `pass`/`...` in Python); this rule only
/// reports them.
pub struct ErrorShape;

impl GraphRule for ErrorShape {
    fn name(&self) -> &'static str {
        "error-handling-shape"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::ErrorShape
    }

    fn check(&self, graph: &ModuleGraph, _policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (_, module) in graph.modules() {
            for site in &module.facts.empty_handler_sites {
                violations.push(Violation::new(
                    RuleCategory::ErrorShape,
                    Severity::Warning,
                    module.path.clone(),
                    Some(LineRange::line(site.line)),
                    format!("empty '{}' handler swallows errors", site.callee),
                ));
            }
        }
        violations
    }
}
