//! Shared fixtures for rule tests.

use layercheck_core::{LayerMatcher, LayerPolicy};
use layercheck_graph::{classify, GraphBuilder, ModuleGraph};
use layercheck_ingest::{FileFacts, ImportRef, Language};

/// A three-layer policy used across the rule tests: contracts at the
/// bottom, business above it, infrastructure on top.
pub fn layered_policy() -> LayerPolicy {
    let policy = LayerPolicy::parse(
        r#"
[[layers]]
name = "contracts"
paths = ["contracts/**"]

[[layers]]
name = "business"
paths = ["business/**"]

[[layers]]
name = "infrastructure"
paths = ["infra/**"]

[dependencies]
contracts = []
business = ["contracts"]
infrastructure = ["contracts", "business"]

[io]
pure_layers = ["business"]
deny_imports = ["pg", "fs"]

[io.deny_calls]
ecmascript = ["fs.", "fetch", "Date.now"]
python = ["open", "requests."]
"#,
    )
    .unwrap();
    policy.validate().unwrap();
    policy
}

/// Facts for an EcmaScript file with the given import specifiers.
pub fn file(path: &str, imports: &[&str]) -> FileFacts {
    let mut facts = FileFacts::new(path, Language::EcmaScript);
    facts.imports = imports
        .iter()
        .enumerate()
        .map(|(i, spec)| ImportRef {
            specifier: (*spec).to_string(),
            line: i + 1,
            column: 0,
            symbols: Vec::new(),
        })
        .collect();
    facts
}

/// Builds and classifies a graph from facts, panicking on bad fixtures.
pub fn classified(policy: &LayerPolicy, facts: Vec<FileFacts>) -> ModuleGraph {
    let mut facts = facts;
    facts.sort_by(|a, b| a.path.cmp(&b.path));
    let mut output = GraphBuilder::new(policy).build(facts);
    let matcher = LayerMatcher::new(policy).unwrap();
    classify(&mut output.graph, &matcher);
    output.graph
}
