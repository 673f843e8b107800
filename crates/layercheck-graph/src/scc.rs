//! Cycle detection via Tarjan's strongly connected components.

use crate::graph::{ModuleGraph, ModuleId};

/// Finds every circular-dependency group in the graph.
///
/// Returns the strongly connected components with more than one member
/// (self-edges are dropped at build time, so a single module can never
/// form a cycle). Members within a group and groups among themselves are
/// ordered by module id, so the output is a pure function of the graph.
#[must_use]
pub fn circular_groups(graph: &ModuleGraph) -> Vec<Vec<ModuleId>> {
    let adjacency = graph.adjacency();
    let n = adjacency.len();

    let mut state = Tarjan {
        adjacency: &adjacency,
        index: vec![usize::MAX; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        groups: Vec::new(),
    };

    for node in 0..n {
        if state.index[node] == usize::MAX {
            state.visit(node);
        }
    }

    let mut groups: Vec<Vec<ModuleId>> = state
        .groups
        .into_iter()
        .filter(|group| group.len() > 1)
        .map(|mut group| {
            group.sort_unstable();
            group.into_iter().map(ModuleId).collect()
        })
        .collect();
    groups.sort();
    groups
}

struct Tarjan<'a> {
    adjacency: &'a [Vec<usize>],
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    groups: Vec<Vec<usize>>,
}

impl Tarjan<'_> {
    fn visit(&mut self, node: usize) {
        self.index[node] = self.next_index;
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        for &next in &self.adjacency[node] {
            if self.index[next] == usize::MAX {
                self.visit(next);
                self.lowlink[node] = self.lowlink[node].min(self.lowlink[next]);
            } else if self.on_stack[next] {
                self.lowlink[node] = self.lowlink[node].min(self.index[next]);
            }
        }

        if self.lowlink[node] == self.index[node] {
            let mut group = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                group.push(member);
                if member == node {
                    break;
                }
            }
            self.groups.push(group);
        }
    }
}
