//! The analysis runner: policy in, report out.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use layercheck_core::{LayerMatcher, LayerPolicy, Report};
use layercheck_graph::{classify, GraphBuilder};
use layercheck_ingest::Ingestor;
use layercheck_rules::RuleEngine;

/// Runs one complete analysis over a source tree.
///
/// Every failure mode is encoded in the returned [`Report`]'s status;
/// `run` itself never fails. A runner is self-contained, so several can
/// analyze different trees under different policies in one process.
pub struct Runner {
    root: PathBuf,
    policy: LayerPolicy,
    deadline: Option<Duration>,
    engine: RuleEngine,
}

impl Runner {
    /// Creates a runner for `root` under `policy`, with the built-in
    /// rule set.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, policy: LayerPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            deadline: None,
            engine: RuleEngine::with_default_rules(),
        }
    }

    /// Sets a wall-clock budget for the whole run. When it elapses the
    /// run ends with [`layercheck_core::RunStatus::Timeout`] and no
    /// partial violation list.
    #[must_use]
    pub fn deadline(mut self, budget: Option<Duration>) -> Self {
        self.deadline = budget;
        self
    }

    /// Replaces the rule set. Mainly for tests that exercise a single
    /// rule through the full pipeline.
    #[must_use]
    pub fn engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Runs ingestion, graph construction, classification, and rule
    /// evaluation, and aggregates the result.
    #[must_use]
    pub fn run(&self) -> Report {
        let deadline = self.deadline.map(|budget| Instant::now() + budget);

        if let Err(e) = self.policy.validate() {
            warn!(error = %e, "policy rejected");
            return Report::config_error(e.to_string());
        }
        let matcher = match LayerMatcher::new(&self.policy) {
            Ok(matcher) => matcher,
            Err(e) => return Report::config_error(e.to_string()),
        };

        let outcome = match Ingestor::new(&self.root, &self.policy)
            .deadline(deadline)
            .run()
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "ingestion refused");
                return Report::config_error(e.to_string());
            }
        };
        let files_checked = outcome.facts.len();
        if outcome.timed_out {
            return Report::timeout(files_checked);
        }

        let mut output = GraphBuilder::new(&self.policy).build(outcome.facts);
        if let Err(e) = output.graph.validate() {
            return Report::internal_error(e.to_string());
        }
        classify(&mut output.graph, &matcher);

        if past(deadline) {
            return Report::timeout(files_checked);
        }

        let mut violations = self.engine.evaluate(&output.graph, &self.policy);
        violations.extend(output.warnings);

        if past(deadline) {
            return Report::timeout(files_checked);
        }

        let parse_failures = output
            .graph
            .modules()
            .filter(|(_, m)| !m.facts.parse_ok)
            .map(|(_, m)| m.path.clone())
            .collect();

        let report = Report::from_violations(violations, files_checked, parse_failures);
        info!(status = %report.status, files = files_checked, "analysis complete");
        report
    }
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
