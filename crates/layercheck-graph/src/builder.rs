//! Builds the module graph from ingested facts.
//!
//! Resolution is deliberately simple and fully deterministic:
//!
//! 1. Relative specifiers (`./x`, `../y/z`) resolve against the importer's
//!    directory.
//! 2. Alias prefixes from `[resolution.roots]` rewrite to root-relative
//!    directories.
//! 3. Anything else is probed root-relative; a miss makes the import
//!    external.
//!
//! Extensionless specifiers probe the configured extension list plus the
//! directory forms (`x/index.ts`, `x/__init__.py`). A specifier matching
//! more than one on-disk candidate never becomes an edge; it is reported
//! as an ambiguous-resolution warning instead of silently picking one.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use layercheck_core::{LayerPolicy, LineRange, RuleCategory, Severity, Violation};
use layercheck_ingest::FileFacts;

use crate::graph::{DependencyEdge, Module, ModuleGraph, ModuleId};

/// A built graph plus the warnings resolution produced along the way.
#[derive(Debug)]
pub struct BuildOutput {
    /// The module graph.
    pub graph: ModuleGraph,
    /// Ambiguous-resolution warnings, one per offending import.
    pub warnings: Vec<Violation>,
}

/// Turns sorted [`FileFacts`] into a [`ModuleGraph`].
pub struct GraphBuilder<'a> {
    policy: &'a LayerPolicy,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder using the policy's resolution settings.
    #[must_use]
    pub fn new(policy: &'a LayerPolicy) -> Self {
        Self { policy }
    }

    /// Builds the graph. `facts` must already be sorted by path; module
    /// ids are assigned in that order, which fixes every downstream
    /// ordering.
    #[must_use]
    pub fn build(&self, facts: Vec<FileFacts>) -> BuildOutput {
        let mut index: BTreeMap<PathBuf, ModuleId> = BTreeMap::new();
        for (i, file) in facts.iter().enumerate() {
            index.insert(file.path.clone(), ModuleId(i));
        }

        let mut modules: Vec<Module> = Vec::with_capacity(facts.len());
        let mut edges: Vec<DependencyEdge> = Vec::new();
        let mut warnings: Vec<Violation> = Vec::new();

        for (i, file) in facts.into_iter().enumerate() {
            let from = ModuleId(i);
            let mut externals = Vec::new();

            for import in &file.imports {
                match self.resolve(&file.path, &import.specifier, &index) {
                    Resolution::Internal(to) => {
                        // A file importing itself carries no architectural
                        // signal.
                        if to == from {
                            continue;
                        }
                        edges.push(DependencyEdge {
                            from,
                            to,
                            specifier: import.specifier.clone(),
                            line: import.line,
                            symbols: import.symbols.clone(),
                        });
                    }
                    Resolution::External => externals.push(import.clone()),
                    Resolution::Ambiguous(candidates) => {
                        debug!(
                            importer = %file.path.display(),
                            specifier = %import.specifier,
                            "ambiguous import"
                        );
                        warnings.push(Violation::new(
                            RuleCategory::Resolution,
                            Severity::Warning,
                            file.path.clone(),
                            Some(LineRange::line(import.line)),
                            format!(
                                "import '{}' matches multiple files: {}",
                                import.specifier,
                                candidates
                                    .iter()
                                    .map(|p| p.display().to_string())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        ));
                        externals.push(import.clone());
                    }
                }
            }

            modules.push(Module {
                path: file.path.clone(),
                layer: None,
                facts: file,
                externals,
            });
        }

        info!(
            modules = modules.len(),
            edges = edges.len(),
            warnings = warnings.len(),
            "graph built"
        );

        BuildOutput {
            graph: ModuleGraph::new(modules, edges, index),
            warnings,
        }
    }

    fn resolve(
        &self,
        importer: &Path,
        specifier: &str,
        index: &BTreeMap<PathBuf, ModuleId>,
    ) -> Resolution {
        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = importer.parent().unwrap_or_else(|| Path::new(""));
            let Some(joined) = normalize(&dir.join(specifier)) else {
                // Escapes the analysis root.
                return Resolution::External;
            };
            Some(joined)
        } else if let Some(aliased) = self.apply_alias(specifier) {
            normalize(&aliased)
        } else {
            // Bare specifier: probe root-relative before declaring it
            // external.
            normalize(Path::new(specifier))
        };
        let Some(base) = base else {
            return Resolution::External;
        };

        let mut matches: Vec<PathBuf> = self
            .candidates(&base)
            .into_iter()
            .filter(|candidate| index.contains_key(candidate))
            .collect();
        matches.dedup();

        match matches.len() {
            0 => Resolution::External,
            1 => Resolution::Internal(index[&matches[0]]),
            _ => Resolution::Ambiguous(matches),
        }
    }

    /// Rewrites an alias-prefixed specifier (`@app/x` under
    /// `roots = { "@app" = "src" }` becomes `src/x`).
    fn apply_alias(&self, specifier: &str) -> Option<PathBuf> {
        for (alias, target) in &self.policy.resolution.roots {
            if specifier == alias {
                return Some(PathBuf::from(target));
            }
            if let Some(rest) = specifier.strip_prefix(&format!("{alias}/")) {
                return Some(Path::new(target).join(rest));
            }
        }
        None
    }

    /// Probe list for a normalized base path, in deterministic order:
    /// the path itself, then extension probes, then directory forms.
    fn candidates(&self, base: &Path) -> Vec<PathBuf> {
        let mut out = vec![base.to_path_buf()];
        let base_str = base.to_string_lossy();
        for ext in &self.policy.resolution.extensions {
            out.push(PathBuf::from(format!("{base_str}{ext}")));
        }
        for ext in &self.policy.resolution.extensions {
            out.push(base.join(format!("index{ext}")));
        }
        out.push(base.join("__init__.py"));
        out
    }
}

enum Resolution {
    Internal(ModuleId),
    External,
    Ambiguous(Vec<PathBuf>),
}

/// Lexically resolves `.` and `..` components. Returns `None` when the
/// path would climb above the analysis root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
