//! TOML configuration for layer classification and rule parameters.
//!
//! The policy is an explicit, validated value passed into the graph and
//! rule crates. Nothing reads it from ambient state, so one process can
//! analyze several trees under different policies concurrently.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Top-level analysis policy.
///
/// Loaded once, validated once ([`LayerPolicy::validate`]); a policy that
/// fails validation is rejected before any source file is touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerPolicy {
    /// Ordered layer definitions; the first matching pattern wins.
    #[serde(default)]
    pub layers: Vec<LayerDef>,

    /// Allowed-target relation: layer name -> layers it may depend on.
    /// Same-layer dependencies are always allowed and never listed.
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,

    /// I/O isolation settings.
    #[serde(default)]
    pub io: IoPolicy,

    /// Feature boundary settings.
    #[serde(default)]
    pub boundary: BoundaryPolicy,

    /// Circular-dependency allow-list.
    #[serde(default)]
    pub cycles: CyclePolicy,

    /// Import specifier resolution settings.
    #[serde(default)]
    pub resolution: ResolutionPolicy,

    /// Ingestion and heuristic settings.
    #[serde(default)]
    pub analyzer: AnalyzerPolicy,
}

/// A named architecture layer and the path globs that select it.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g. `"business"`, `"infrastructure"`).
    pub name: String,
    /// Root-relative path globs belonging to this layer.
    pub paths: Vec<String>,
}

/// I/O isolation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IoPolicy {
    /// Layers that must be free of deny-listed I/O.
    #[serde(default)]
    pub pure_layers: Vec<String>,

    /// Deny-listed call-site patterns, keyed by language id
    /// (e.g. `ecmascript = ["fs.", "fetch", "Date.now"]`).
    #[serde(default)]
    pub deny_calls: BTreeMap<String, Vec<String>>,

    /// Deny-listed external import specifiers (e.g. database drivers).
    /// A specifier matches when it equals the pattern or starts with
    /// `pattern + "/"`.
    #[serde(default)]
    pub deny_imports: Vec<String>,
}

/// Feature boundary settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryPolicy {
    /// Filename glob of the public API file of a feature directory.
    #[serde(default = "default_public_api")]
    pub public_api: String,

    /// Per-feature overrides of the public API filename glob.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            public_api: default_public_api(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Circular-dependency allow-list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CyclePolicy {
    /// Unordered module path pairs allowed to participate in a cycle.
    /// A cycle group is suppressed only when every pair of its members
    /// appears here.
    #[serde(default)]
    pub allow: Vec<(PathBuf, PathBuf)>,
}

/// Import specifier resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionPolicy {
    /// Alias prefixes mapped to root-relative directories
    /// (e.g. `"@app" = "src"`).
    #[serde(default)]
    pub roots: BTreeMap<String, String>,

    /// Extensions probed for extensionless specifiers, in order.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            roots: BTreeMap::new(),
            extensions: default_extensions(),
        }
    }
}

/// Ingestion and heuristic settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzerPolicy {
    /// Globs excluded from ingestion (vendored or generated paths).
    #[serde(default)]
    pub ignore: Vec<String>,

    /// An edge into a module exporting symbols but containing at most this
    /// many call sites is downgraded from error to warning (type-only
    /// coupling heuristic).
    #[serde(default)]
    pub type_only_max_call_sites: usize,
}

fn default_public_api() -> String {
    "index.*".to_string()
}

fn default_extensions() -> Vec<String> {
    [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".py"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Errors when loading or validating a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Failed to read the policy file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid policy: {message}")]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// Policy is structurally invalid; the message names the offending key.
    #[error("policy validation: {0}")]
    Validation(String),
}

impl LayerPolicy {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, PolicyError> {
        toml::from_str(content).map_err(|e| PolicyError::Parse {
            message: e.to_string(),
        })
    }

    /// Validate policy consistency.
    ///
    /// Checks glob syntax, unknown layer references, self-dependencies,
    /// and that the allowed-target relation is acyclic.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending key.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let layer_names: HashSet<&str> = self.layers.iter().map(|l| l.name.as_str()).collect();

        for layer in &self.layers {
            if layer.name.is_empty() {
                return Err(PolicyError::Validation("layers: empty layer name".into()));
            }
            for pattern in &layer.paths {
                glob::Pattern::new(pattern).map_err(|e| {
                    PolicyError::Validation(format!("layers.{}: bad glob '{pattern}': {e}", layer.name))
                })?;
            }
        }

        for (layer, deps) in &self.dependencies {
            if !layer_names.contains(layer.as_str()) {
                return Err(PolicyError::Validation(format!(
                    "dependencies.{layer}: unknown layer"
                )));
            }
            for dep in deps {
                if !layer_names.contains(dep.as_str()) {
                    return Err(PolicyError::Validation(format!(
                        "dependencies.{layer}: unknown target '{dep}'"
                    )));
                }
            }
            if deps.contains(layer) {
                return Err(PolicyError::Validation(format!(
                    "dependencies.{layer}: self-dependency"
                )));
            }
        }

        for layer in &self.layers {
            if !self.dependencies.contains_key(&layer.name) {
                return Err(PolicyError::Validation(format!(
                    "layer '{}' has no entry in [dependencies]",
                    layer.name
                )));
            }
        }

        self.check_dependency_acyclic()?;

        for layer in &self.io.pure_layers {
            if !layer_names.contains(layer.as_str()) {
                return Err(PolicyError::Validation(format!(
                    "io.pure_layers: unknown layer '{layer}'"
                )));
            }
        }

        glob::Pattern::new(&self.boundary.public_api).map_err(|e| {
            PolicyError::Validation(format!(
                "boundary.public_api: bad glob '{}': {e}",
                self.boundary.public_api
            ))
        })?;
        for (feature, pattern) in &self.boundary.overrides {
            glob::Pattern::new(pattern).map_err(|e| {
                PolicyError::Validation(format!(
                    "boundary.overrides.{feature}: bad glob '{pattern}': {e}"
                ))
            })?;
        }

        for pattern in &self.analyzer.ignore {
            glob::Pattern::new(pattern).map_err(|e| {
                PolicyError::Validation(format!("analyzer.ignore: bad glob '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Rejects a cyclic allowed-target relation (e.g. a -> b -> a).
    fn check_dependency_acyclic(&self) -> Result<(), PolicyError> {
        // Colors: 0 = unvisited, 1 = on stack, 2 = done.
        let mut color: BTreeMap<&str, u8> = BTreeMap::new();

        fn visit<'a>(
            layer: &'a str,
            deps: &'a BTreeMap<String, Vec<String>>,
            color: &mut BTreeMap<&'a str, u8>,
        ) -> Result<(), PolicyError> {
            match color.get(layer) {
                Some(1) => {
                    return Err(PolicyError::Validation(format!(
                        "dependencies: cyclic allowed-target relation through '{layer}'"
                    )))
                }
                Some(2) => return Ok(()),
                _ => {}
            }
            color.insert(layer, 1);
            if let Some(targets) = deps.get(layer) {
                for target in targets {
                    visit(target, deps, color)?;
                }
            }
            color.insert(layer, 2);
            Ok(())
        }

        for layer in self.dependencies.keys() {
            visit(layer, &self.dependencies, &mut color)?;
        }
        Ok(())
    }

    /// Allowed targets for a layer; empty when the layer depends on nothing.
    #[must_use]
    pub fn allowed_targets(&self, layer: &str) -> &[String] {
        self.dependencies
            .get(layer)
            .map_or(&[], |targets| targets.as_slice())
    }

    /// Public API filename glob for a feature, honoring overrides.
    #[must_use]
    pub fn public_api_pattern(&self, feature: &str) -> &str {
        self.boundary
            .overrides
            .get(feature)
            .unwrap_or(&self.boundary.public_api)
    }
}

/// Classifies root-relative module paths into layer names.
///
/// A pure mapping from path + policy to label; file content is never
/// consulted. Patterns are tested in configured order; first match wins.
#[derive(Debug)]
pub struct LayerMatcher {
    /// (pattern, layer name) in policy order.
    patterns: Vec<(glob::Pattern, String)>,
}

impl LayerMatcher {
    /// Compile the matcher from a policy.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed glob; [`LayerPolicy::validate`]
    /// reports the same problem with more context.
    pub fn new(policy: &LayerPolicy) -> Result<Self, PolicyError> {
        let mut patterns = Vec::new();
        for layer in &policy.layers {
            for raw in &layer.paths {
                let pattern = glob::Pattern::new(raw).map_err(|e| {
                    PolicyError::Validation(format!("layers.{}: bad glob '{raw}': {e}", layer.name))
                })?;
                patterns.push((pattern, layer.name.clone()));
            }
        }
        Ok(Self { patterns })
    }

    /// Which layer does this root-relative path belong to?
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches_path(path))
            .map(|(_, layer)| layer.as_str())
    }
}
