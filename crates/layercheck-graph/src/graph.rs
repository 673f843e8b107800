//! Arena-based module graph types.

use layercheck_ingest::{FileFacts, ImportRef};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Index of a module in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Arena index of this module.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node in the dependency graph: a single source file.
#[derive(Debug, Clone)]
pub struct Module {
    /// Path relative to the analysis root.
    pub path: PathBuf,
    /// Layer label; `None` until classification, or unclassified.
    pub layer: Option<String>,
    /// Immutable facts from ingestion.
    pub facts: FileFacts,
    /// Imports that did not resolve to an in-root module. These never
    /// become edges but feed the I/O-isolation checks.
    pub externals: Vec<ImportRef>,
}

impl Module {
    /// Top-level feature directory of this module, when it lives inside
    /// one (`feature_a/internal.ts` -> `feature_a`).
    #[must_use]
    pub fn feature(&self) -> Option<&str> {
        let mut components = self.path.components();
        let first = components.next()?;
        // A root-level file belongs to no feature.
        components.next()?;
        first.as_os_str().to_str()
    }
}

/// A directed dependency from an importing module to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// Importing module.
    pub from: ModuleId,
    /// Imported module.
    pub to: ModuleId,
    /// The specifier as written in the importing file.
    pub specifier: String,
    /// Line of the import statement (1-indexed).
    pub line: usize,
    /// Symbols the import names, when the statement lists any.
    pub symbols: Vec<String>,
}

/// Internal invariant violations in a built graph.
///
/// These are programming errors, never user errors; the runner aborts
/// with `internal-error` when one surfaces.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An edge references a module index outside the arena.
    #[error("dangling edge {from} -> {to}: arena holds {len} modules")]
    DanglingEdge {
        /// Source index.
        from: usize,
        /// Target index.
        to: usize,
        /// Arena size.
        len: usize,
    },
    /// Two modules share one path.
    #[error("duplicate module path {0}")]
    DuplicatePath(PathBuf),
}

/// The complete, immutable module graph.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    edges: Vec<DependencyEdge>,
    index: BTreeMap<PathBuf, ModuleId>,
}

impl ModuleGraph {
    pub(crate) fn new(
        modules: Vec<Module>,
        edges: Vec<DependencyEdge>,
        index: BTreeMap<PathBuf, ModuleId>,
    ) -> Self {
        Self {
            modules,
            edges,
            index,
        }
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when the graph holds no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The module behind an id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this graph; [`Self::validate`]
    /// runs before rules so this cannot happen on a validated graph.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    /// All modules in path order (ids are assigned in path order).
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId(i), m))
    }

    /// All edges, in deterministic order.
    #[must_use]
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Id of the module at a root-relative path.
    #[must_use]
    pub fn module_id(&self, path: &Path) -> Option<ModuleId> {
        self.index.get(path).copied()
    }

    /// Adjacency lists by arena index, for traversal.
    #[must_use]
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.modules.len()];
        for edge in &self.edges {
            adj[edge.from.0].push(edge.to.0);
        }
        for targets in &mut adj {
            targets.sort_unstable();
            targets.dedup();
        }
        adj
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    /// Checks internal invariants: every edge points into the arena and
    /// module paths are unique.
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant with full context.
    pub fn validate(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            if edge.from.0 >= self.modules.len() || edge.to.0 >= self.modules.len() {
                return Err(GraphError::DanglingEdge {
                    from: edge.from.0,
                    to: edge.to.0,
                    len: self.modules.len(),
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for module in &self.modules {
            if !seen.insert(&module.path) {
                return Err(GraphError::DuplicatePath(module.path.clone()));
            }
        }
        Ok(())
    }
}
