//! I/O isolation rule (`IO001`).

use layercheck_core::{LayerPolicy, LineRange, RuleCategory, Severity, Violation};
use layercheck_graph::ModuleGraph;

use crate::rule::GraphRule;

/// Flags deny-listed I/O inside pure layers.
///
/// Two kinds of finding, both errors: a call site matching the
/// language's `deny_calls` patterns, and an external import matching
/// `deny_imports` (a specifier matches a pattern when it equals it or
/// starts with `pattern + "/"`).
pub struct IoIsolation;

impl GraphRule for IoIsolation {
    fn name(&self) -> &'static str {
        "io-isolation"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::IoIsolation
    }

    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (_, module) in graph.modules() {
            let Some(layer) = &module.layer else {
                continue;
            };
            if !policy.io.pure_layers.iter().any(|l| l == layer) {
                continue;
            }

            for site in &module.facts.io_call_sites {
                violations.push(Violation::new(
                    RuleCategory::IoIsolation,
                    Severity::Error,
                    module.path.clone(),
                    Some(LineRange::line(site.line)),
                    format!(
                        "layer '{layer}' is pure but calls '{}'",
                        site.callee
                    ),
                ));
            }

            for import in &module.externals {
                if deny_import_matches(&policy.io.deny_imports, &import.specifier) {
                    violations.push(Violation::new(
                        RuleCategory::IoIsolation,
                        Severity::Error,
                        module.path.clone(),
                        Some(LineRange::line(import.line)),
                        format!(
                            "layer '{layer}' is pure but imports '{}'",
                            import.specifier
                        ),
                    ));
                }
            }
        }

        violations
    }
}

fn deny_import_matches(patterns: &[String], specifier: &str) -> bool {
    patterns.iter().any(|pattern| {
        specifier == pattern
            || specifier
                .strip_prefix(pattern.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{classified, file, layered_policy};
    use layercheck_ingest::CallSite;

    #[test]
    fn deny_listed_call_in_pure_layer() {
        let policy = layered_policy();
        let mut order = file("business/order.ts", &[]);
        order.io_call_sites.push(CallSite {
            line: 9,
            column: 4,
            callee: "fs.readFileSync".to_string(),
        });
        let graph = classified(&policy, vec![order]);
        let violations = IoIsolation.check(&graph, &policy);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[0].range, Some(LineRange::line(9)));
        assert!(violations[0].message.contains("fs.readFileSync"));
    }

    #[test]
    fn deny_listed_import_in_pure_layer() {
        let policy = layered_policy();
        let graph = classified(&policy, vec![file("business/order.ts", &["pg"])]);
        let violations = IoIsolation.check(&graph, &policy);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'pg'"));
    }

    #[test]
    fn deny_import_matches_subpath() {
        let policy = layered_policy();
        let graph = classified(&policy, vec![file("business/order.ts", &["pg/native"])]);
        assert_eq!(IoIsolation.check(&graph, &policy).len(), 1);
    }

    #[test]
    fn prefix_without_separator_does_not_match() {
        let policy = layered_policy();
        // `pglite` shares a prefix with the `pg` pattern but is a
        // different package.
        let graph = classified(&policy, vec![file("business/order.ts", &["pglite"])]);
        assert!(IoIsolation.check(&graph, &policy).is_empty());
    }

    #[test]
    fn impure_layer_may_do_io() {
        let policy = layered_policy();
        let mut db = file("infra/db.ts", &["pg"]);
        db.io_call_sites.push(CallSite {
            line: 3,
            column: 0,
            callee: "fs.readFileSync".to_string(),
        });
        let graph = classified(&policy, vec![db]);
        assert!(IoIsolation.check(&graph, &policy).is_empty());
    }

    #[test]
    fn unclassified_module_is_skipped() {
        let policy = layered_policy();
        let mut script = file("scripts/gen.ts", &["pg"]);
        script.io_call_sites.push(CallSite {
            line: 1,
            column: 0,
            callee: "fetch".to_string(),
        });
        let graph = classified(&policy, vec![script]);
        assert!(IoIsolation.check(&graph, &policy).is_empty());
    }
}
