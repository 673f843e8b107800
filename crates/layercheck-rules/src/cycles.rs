//! Circular-dependency rule (`CYCLE001`).

use std::path::PathBuf;

use layercheck_core::{LayerPolicy, RuleCategory, Severity, Violation};
use layercheck_graph::{circular_groups, ModuleGraph, ModuleId};

use crate::rule::GraphRule;

/// Flags every member of a circular-dependency group.
///
/// Each member gets one error naming the whole group, so a fix in any
/// file is visible from every other. A group is suppressed only when
/// every unordered pair of its members appears in `cycles.allow`; a
/// partial allow-list leaves the group flagged.
pub struct CircularDependency;

impl GraphRule for CircularDependency {
    fn name(&self) -> &'static str {
        "circular-dependency"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Cycle
    }

    fn check(&self, graph: &ModuleGraph, policy: &LayerPolicy) -> Vec<Violation> {
        let mut violations = Vec::new();

        for group in circular_groups(graph) {
            if group_allowed(graph, &group, policy) {
                continue;
            }

            let members: Vec<String> = group
                .iter()
                .map(|&id| graph.module(id).path.display().to_string())
                .collect();
            let listing = members.join(", ");

            for &id in &group {
                violations.push(Violation::new(
                    RuleCategory::Cycle,
                    Severity::Error,
                    graph.module(id).path.clone(),
                    None,
                    format!(
                        "module participates in a dependency cycle of {}: {listing}",
                        members.len()
                    ),
                ));
            }
        }

        violations
    }
}

fn group_allowed(graph: &ModuleGraph, group: &[ModuleId], policy: &LayerPolicy) -> bool {
    let paths: Vec<&PathBuf> = group.iter().map(|&id| &graph.module(id).path).collect();
    for i in 0..paths.len() {
        for j in i + 1..paths.len() {
            let (a, b) = (paths[i], paths[j]);
            let listed = policy
                .cycles
                .allow
                .iter()
                .any(|(x, y)| (x == a && y == b) || (x == b && y == a));
            if !listed {
                return false;
            }
        }
    }
    true
}
