//! Immutable per-file facts produced by ingestion.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source language of an ingested file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// JavaScript / TypeScript family.
    EcmaScript,
    /// Python.
    Python,
}

impl Language {
    /// Stable language id, matching the `io.deny_calls` policy keys.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::EcmaScript => "ecmascript",
            Self::Python => "python",
        }
    }

    /// Language for a file path, by extension. `None` means the file is
    /// outside the analyzer's scope and is skipped.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Some(Self::EcmaScript),
            "py" => Some(Self::Python),
            _ => None,
        }
    }
}

/// One import statement extracted from source.
///
/// Resolution to an in-root module happens later, in the graph builder;
/// the ingestor records only what the file says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    /// Raw specifier, normalized to path form (`./order`, `../lib/db`,
    /// `infra/db`, `react`).
    pub specifier: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within the line).
    pub column: usize,
    /// Symbols named by the import, when the statement lists any.
    pub symbols: Vec<String>,
}

/// A call site of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within the line).
    pub column: usize,
    /// The matched call chain (e.g. `fs.readFile`) or, for empty-handler
    /// sites, the handler keyword.
    pub callee: String,
}

/// Everything the analyzer knows about one source file.
///
/// Created once per file; immutable thereafter. A file that could not be
/// extracted still yields facts, with `parse_ok = false` and whatever was
/// recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFacts {
    /// Path relative to the analysis root.
    pub path: PathBuf,
    /// Detected language.
    pub language: Language,
    /// Imports, in source order.
    pub imports: Vec<ImportRef>,
    /// Exported symbol names.
    pub exports: Vec<String>,
    /// Call sites matching the I/O deny-list.
    pub io_call_sites: Vec<CallSite>,
    /// Error-handling constructs with empty bodies.
    pub empty_handler_sites: Vec<CallSite>,
    /// Total count of call-looking sites, deny-listed or not. Backs the
    /// type-only coupling heuristic.
    pub call_site_count: usize,
    /// False when the file could not be read or decoded; facts are then
    /// best-effort partial.
    pub parse_ok: bool,
}

impl FileFacts {
    /// Empty facts for a freshly ingested file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            imports: Vec::new(),
            exports: Vec::new(),
            io_call_sites: Vec::new(),
            empty_handler_sites: Vec::new(),
            call_site_count: 0,
            parse_ok: true,
        }
    }

    /// Facts for a file that could not be decoded.
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, language: Language) -> Self {
        let mut facts = Self::new(path, language);
        facts.parse_ok = false;
        facts
    }
}
