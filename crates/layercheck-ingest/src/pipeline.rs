//! Parallel ingestion pipeline.
//!
//! Walks the analysis root with a parallel worker pool; each worker turns
//! one file into an owned [`FileFacts`] and sends it through a channel to
//! a single collection point. Workers share nothing mutable, so no lock
//! discipline is needed during the parallel phase.
//!
//! The pipeline is the only place ingestion touches the filesystem. A
//! file that cannot be read or decoded is recorded with `parse_ok =
//! false` and never retried; it does not block other files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use ignore::overrides::OverrideBuilder;
use ignore::{WalkBuilder, WalkState};
use tracing::{debug, info, warn};

use layercheck_core::LayerPolicy;

use crate::ecmascript::EcmaScriptExtractor;
use crate::extract::SourceExtractor;
use crate::facts::{FileFacts, Language};
use crate::python::PythonExtractor;

/// Errors that abort ingestion before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The analysis root does not exist or is not a directory.
    #[error("analysis root {0} is not a directory")]
    BadRoot(PathBuf),

    /// An ignore glob could not be compiled.
    #[error("ignore glob error: {0}")]
    Ignore(#[from] ignore::Error),
}

/// Result of the parallel ingestion phase.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Facts for every ingested file, sorted by path.
    pub facts: Vec<FileFacts>,
    /// True when the deadline elapsed and remaining files were abandoned.
    pub timed_out: bool,
}

/// Walks a directory tree and extracts [`FileFacts`] from every source
/// file, in parallel.
pub struct Ingestor<'a> {
    root: PathBuf,
    policy: &'a LayerPolicy,
    deadline: Option<Instant>,
}

impl<'a> Ingestor<'a> {
    /// Creates an ingestor for `root` under `policy`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, policy: &'a LayerPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            deadline: None,
        }
    }

    /// Sets the wall-clock deadline. When it elapses, in-flight and
    /// unscheduled files are abandoned and the outcome is marked timed
    /// out.
    #[must_use]
    pub fn deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the parallel walk and collects facts.
    ///
    /// # Errors
    ///
    /// Returns an error when the root is not a directory or an ignore
    /// glob is malformed; per-file failures are recorded in the facts,
    /// not returned.
    pub fn run(&self) -> Result<IngestOutcome, IngestError> {
        if !self.root.is_dir() {
            return Err(IngestError::BadRoot(self.root.clone()));
        }

        info!(root = %self.root.display(), "starting ingestion");

        let mut overrides = OverrideBuilder::new(&self.root);
        for pattern in &self.policy.analyzer.ignore {
            // Leading `!` makes the override an exclusion.
            overrides.add(&format!("!{pattern}"))?;
        }
        let overrides = overrides.build()?;

        // Git metadata must not influence analysis results; only the
        // policy's ignore globs filter the tree.
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .overrides(overrides)
            .build_parallel();

        let (tx, rx) = mpsc::channel::<FileFacts>();
        let timed_out = AtomicBool::new(false);
        let root = self.root.clone();
        let policy = self.policy;
        let deadline = self.deadline;

        walker.run(|| {
            let tx = tx.clone();
            let root = root.clone();
            let timed_out = &timed_out;
            Box::new(move |entry| {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        timed_out.store(true, Ordering::Relaxed);
                        return WalkState::Quit;
                    }
                }

                let Ok(entry) = entry else {
                    return WalkState::Continue;
                };
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    return WalkState::Continue;
                }

                let path = entry.path();
                let Some(language) = Language::from_path(path) else {
                    return WalkState::Continue;
                };
                let relative = path.strip_prefix(&root).unwrap_or(path).to_path_buf();

                let facts = ingest_file(path, &relative, language, policy);
                if tx.send(facts).is_err() {
                    return WalkState::Quit;
                }
                WalkState::Continue
            })
        });
        drop(tx);

        let mut facts: Vec<FileFacts> = rx.into_iter().collect();
        // The walk order is nondeterministic; downstream determinism
        // starts here.
        facts.sort_by(|a, b| a.path.cmp(&b.path));

        let timed_out = timed_out.load(Ordering::Relaxed);
        info!(
            files = facts.len(),
            timed_out, "ingestion complete"
        );

        Ok(IngestOutcome { facts, timed_out })
    }
}

/// Ingests a single file: bytes in, facts out.
fn ingest_file(
    absolute: &Path,
    relative: &Path,
    language: Language,
    policy: &LayerPolicy,
) -> FileFacts {
    static ECMASCRIPT: EcmaScriptExtractor = EcmaScriptExtractor;
    static PYTHON: PythonExtractor = PythonExtractor;

    let bytes = match std::fs::read(absolute) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %relative.display(), error = %e, "read failed");
            return FileFacts::failed(relative, language);
        }
    };
    let Ok(source) = String::from_utf8(bytes) else {
        warn!(path = %relative.display(), "not valid UTF-8");
        return FileFacts::failed(relative, language);
    };

    let extractor: &dyn SourceExtractor = match language {
        Language::EcmaScript => &ECMASCRIPT,
        Language::Python => &PYTHON,
    };
    let empty = Vec::new();
    let deny_calls = policy
        .io
        .deny_calls
        .get(language.id())
        .unwrap_or(&empty);

    debug!(path = %relative.display(), lang = language.id(), "ingesting");
    extractor.extract(relative, &source, deny_calls)
}
