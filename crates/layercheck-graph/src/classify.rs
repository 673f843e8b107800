//! Layer classification over a built graph.

use tracing::debug;

use layercheck_core::LayerMatcher;

use crate::graph::ModuleGraph;

/// Labels every module with its layer, first matching policy pattern
/// wins. Modules no pattern covers keep `layer = None`; the
/// configuration-gap rule reports those.
pub fn classify(graph: &mut ModuleGraph, matcher: &LayerMatcher) {
    for module in graph.modules_mut() {
        module.layer = matcher.classify(&module.path).map(ToString::to_string);
        debug!(
            path = %module.path.display(),
            layer = module.layer.as_deref().unwrap_or("<none>"),
            "classified"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use layercheck_core::LayerPolicy;
    use layercheck_ingest::{FileFacts, Language};

    #[test]
    fn classifies_modules_by_policy_globs() {
        let policy = LayerPolicy::parse(
            r#"
[[layers]]
name = "business"
paths = ["business/**"]

[[layers]]
name = "infrastructure"
paths = ["infra/**"]

[dependencies]
business = []
infrastructure = ["business"]
"#,
        )
        .unwrap();
        let files = vec![
            FileFacts::new("business/order.ts", Language::EcmaScript),
            FileFacts::new("infra/db.ts", Language::EcmaScript),
            FileFacts::new("scripts/build.ts", Language::EcmaScript),
        ];
        let mut output = GraphBuilder::new(&policy).build(files);
        let matcher = LayerMatcher::new(&policy).unwrap();
        classify(&mut output.graph, &matcher);

        let layers: Vec<Option<String>> = output
            .graph
            .modules()
            .map(|(_, m)| m.layer.clone())
            .collect();
        assert_eq!(
            layers,
            vec![
                Some("business".to_string()),
                Some("infrastructure".to_string()),
                None
            ]
        );
    }
}
