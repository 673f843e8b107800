//! End-to-end analysis over real fixture trees.

use std::fs;
use std::path::Path;
use std::time::Duration;

use layercheck::{
    GraphRule, LayerPolicy, ModuleGraph, RuleCategory, RuleEngine, Runner, RunStatus, Severity,
    Violation,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn layered_policy() -> LayerPolicy {
    LayerPolicy::parse(
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
deny_imports = ["pg"]

[io.deny_calls]
ecmascript = ["fs.", "fetch", "Date.now"]
python = ["open", "requests."]
"#,
    )
    .unwrap()
}

/// Business code reaching down into infrastructure: the direction rule
/// flags the import and the isolation rule flags the leaked I/O.
#[test]
fn business_to_infrastructure_import_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import { query } from '../infra/db';\n\
         export function createOrder(req) {\n\
         \x20   return query('insert into orders ...');\n\
         }\n",
    );
    write(
        dir.path(),
        "infra/db.ts",
        "import pg from 'pg';\n\
         export function query(sql) {\n\
         \x20   return pg.connect().then((c) => c.query(sql));\n\
         }\n",
    );
    write(
        dir.path(),
        "contracts/order.ts",
        "export interface Order { id: string }\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(report.status, RunStatus::ViolationsFound);
    assert_eq!(report.files_checked, 3);

    let direction = report.by_category(RuleCategory::Direction);
    assert_eq!(direction.len(), 1);
    assert_eq!(direction[0].severity, Severity::Error);
    assert_eq!(direction[0].path, Path::new("business/order.ts"));
    assert_eq!(direction[0].range.unwrap().start, 1);
    assert!(direction[0].message.contains("infra/db.ts"));
}

#[test]
fn io_in_pure_layer_is_reported_at_the_call_site() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/pricing.ts",
        "export function price(order) {\n\
         \x20   const started = Date.now();\n\
         \x20   return order.total * 1.2 + started * 0;\n\
         }\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    let io = report.by_category(RuleCategory::IoIsolation);
    assert_eq!(io.len(), 1);
    assert_eq!(io[0].range.unwrap().start, 2);
    assert!(io[0].message.contains("Date.now"));
}

#[test]
fn deny_listed_external_import_in_pure_layer() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import pg from 'pg';\nexport const db = pg;\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    let io = report.by_category(RuleCategory::IoIsolation);
    assert_eq!(io.len(), 1);
    assert!(io[0].message.contains("'pg'"));
}

/// Cross-feature import that skips the target's index file.
#[test]
fn feature_boundary_bypass_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "feature_a/index.ts",
        "export { publicThing } from './internal';\n",
    );
    write(
        dir.path(),
        "feature_a/internal.ts",
        "export function publicThing() { return 1; }\n\
         export function secretThing() { return 2; }\n",
    );
    write(
        dir.path(),
        "feature_b/handler.ts",
        "import { secretThing } from '../feature_a/internal';\n\
         export const handle = () => secretThing();\n",
    );

    let policy = LayerPolicy::parse("").unwrap();
    let report = Runner::new(dir.path(), policy).run();
    let boundary = report.by_category(RuleCategory::Boundary);
    assert_eq!(boundary.len(), 1);
    assert_eq!(boundary[0].path, Path::new("feature_b/handler.ts"));
    assert!(boundary[0].message.contains("feature_a/internal.ts"));
}

#[test]
fn importing_through_the_index_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "feature_a/index.ts",
        "export { publicThing } from './internal';\n",
    );
    write(
        dir.path(),
        "feature_a/internal.ts",
        "export function publicThing() { return 1; }\n",
    );
    write(
        dir.path(),
        "feature_b/handler.ts",
        "import { publicThing } from '../feature_a';\n\
         export const handle = () => publicThing();\n",
    );

    let policy = LayerPolicy::parse("").unwrap();
    let report = Runner::new(dir.path(), policy).run();
    assert!(report.by_category(RuleCategory::Boundary).is_empty());
}

/// A three-module cycle is reported as one complete group on each
/// member, never as disconnected pairs.
#[test]
fn cycle_reports_the_whole_group() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "business/a.ts", "import './b';\nexport const a = 1;\n");
    write(dir.path(), "business/b.ts", "import './c';\nexport const b = 1;\n");
    write(dir.path(), "business/c.ts", "import './a';\nexport const c = 1;\n");

    let report = Runner::new(dir.path(), layered_policy()).run();
    let cycles = report.by_category(RuleCategory::Cycle);
    assert_eq!(cycles.len(), 3);
    for violation in &cycles {
        assert!(violation.message.contains("business/a.ts"));
        assert!(violation.message.contains("business/b.ts"));
        assert!(violation.message.contains("business/c.ts"));
    }
}

#[test]
fn python_tree_is_analyzed_like_ecmascript() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.py",
        "from infra.db import query\n\n\ndef create_order(req):\n    return query(req)\n",
    );
    write(
        dir.path(),
        "infra/db.py",
        "def query(sql):\n    with open('db.sock') as s:\n        return s.read()\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    let direction = report.by_category(RuleCategory::Direction);
    assert_eq!(direction.len(), 1);
    assert_eq!(direction[0].path, Path::new("business/order.py"));
}

#[test]
fn empty_catch_and_unclassified_module_warn() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "scripts/cleanup.ts",
        "export function cleanup() {\n\
         \x20   try { run(); } catch (e) {}\n\
         }\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(report.status, RunStatus::ViolationsFound);
    assert_eq!(report.by_category(RuleCategory::ErrorShape).len(), 1);
    assert_eq!(report.by_category(RuleCategory::ConfigGap).len(), 1);
    // Warnings alone still dirty the run.
    assert_eq!(report.counts.errors, 0);
}

/// Two runs over the same tree serialize to byte-identical JSON.
#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import { query } from '../infra/db';\nexport const f = () => query();\n",
    );
    write(
        dir.path(),
        "infra/db.ts",
        "export function query() { return fetch('http://db'); }\n",
    );
    write(dir.path(), "business/a.ts", "import './b';\nexport const a = 1;\n");
    write(dir.path(), "business/b.ts", "import './a';\nexport const b = 1;\n");
    write(dir.path(), "scripts/x.ts", "export const x = 1;\n");

    let first = Runner::new(dir.path(), layered_policy()).run();
    let second = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// The rendered, sorted violation list is stable across releases.
#[test]
fn report_rendering_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import pg from 'pg';\n\
         export const f = () => { try { run(); } catch (e) {} };\n",
    );
    write(dir.path(), "scripts/x.ts", "export const x = 1;\n");

    let report = Runner::new(dir.path(), layered_policy()).run();
    let rendered: Vec<String> = report.violations.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    business/order.ts:1: error [IO001] layer 'business' is pure but imports 'pg'
    business/order.ts:2: warning [ERR001] empty 'catch' handler swallows errors
    scripts/x.ts: warning [GAP001] module matches no configured layer pattern
    ");
}

/// The report does not depend on rule registration order.
#[test]
fn rule_order_does_not_change_the_report() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import { query } from '../infra/db';\n\
         export const f = () => { try { query(); } catch (e) {} };\n",
    );
    write(
        dir.path(),
        "infra/db.ts",
        "export function query() { return fetch('http://db'); }\n",
    );

    let forward = RuleEngine::with_default_rules();
    let mut reversed = RuleEngine::new();
    reversed.add(Box::new(layercheck::ConfigurationGap));
    reversed.add(Box::new(layercheck::CircularDependency));
    reversed.add(Box::new(layercheck::ErrorShape));
    reversed.add(Box::new(layercheck::ModuleBoundary));
    reversed.add(Box::new(layercheck::IoIsolation));
    reversed.add(Box::new(layercheck::DependencyDirection));

    let a = Runner::new(dir.path(), layered_policy()).engine(forward).run();
    let b = Runner::new(dir.path(), layered_policy()).engine(reversed).run();
    assert_eq!(a.violations, b.violations);
}

/// Multibyte literals shift byte offsets within a line; extraction must
/// stay on character boundaries and the run must complete normally.
#[test]
fn multibyte_literals_do_not_disturb_analysis() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "const label = '注文';\n\
         const pg = require('pg');\n\
         export const f = () => pg;\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(report.status, RunStatus::ViolationsFound);
    let io = report.by_category(RuleCategory::IoIsolation);
    assert_eq!(io.len(), 1);
    assert_eq!(io[0].range.unwrap().start, 2);
    assert!(io[0].message.contains("'pg'"));
}

/// One undecodable file degrades that file only; the rest of the tree is
/// still analyzed.
#[test]
fn unreadable_file_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "import { query } from '../infra/db';\nexport const f = () => query();\n",
    );
    write(dir.path(), "infra/db.ts", "export function query() {}\n");
    fs::write(dir.path().join("business/broken.ts"), [0xff, 0xfe, 0x41]).unwrap();

    let report = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.parse_failures, vec![Path::new("business/broken.ts")]);
    assert_eq!(report.by_category(RuleCategory::Direction).len(), 1);
}

#[test]
fn invalid_policy_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.ts", "export const x = 1;\n");

    let mut policy = layered_policy();
    policy
        .dependencies
        .insert("business".into(), vec!["nonexistent".into()]);
    let report = Runner::new(dir.path(), policy).run();
    assert_eq!(report.status, RunStatus::ConfigError);
    assert!(report.diagnostic.unwrap().contains("nonexistent"));
    assert!(report.violations.is_empty());
}

#[test]
fn missing_root_is_a_config_error() {
    let report = Runner::new("/nonexistent/layercheck-root", layered_policy()).run();
    assert_eq!(report.status, RunStatus::ConfigError);
}

#[test]
fn elapsed_deadline_ends_with_timeout() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.ts", "export const x = 1;\n");

    let report = Runner::new(dir.path(), layered_policy())
        .deadline(Some(Duration::ZERO))
        .run();
    assert_eq!(report.status, RunStatus::Timeout);
    assert!(report.violations.is_empty());
}

/// A deadline that survives ingestion but elapses during rule
/// evaluation still ends the run with a timeout, and findings produced
/// before the cutoff are discarded rather than reported partially.
#[test]
fn deadline_elapsing_during_rule_evaluation_times_out() {
    struct StallingRule;

    impl GraphRule for StallingRule {
        fn name(&self) -> &'static str {
            "stalling"
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Direction
        }

        fn check(&self, _graph: &ModuleGraph, _policy: &LayerPolicy) -> Vec<Violation> {
            std::thread::sleep(Duration::from_millis(400));
            vec![Violation::new(
                RuleCategory::Direction,
                Severity::Error,
                "business/order.ts",
                None,
                "finding produced after the cutoff",
            )]
        }
    }

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "business/order.ts", "export const f = () => 1;\n");

    let mut engine = RuleEngine::new();
    engine.add(Box::new(StallingRule));
    let report = Runner::new(dir.path(), layered_policy())
        .engine(engine)
        .deadline(Some(Duration::from_millis(150)))
        .run();
    assert_eq!(report.status, RunStatus::Timeout);
    assert!(report.violations.is_empty());
}

#[test]
fn ignored_paths_are_invisible_to_every_rule() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "business/order.ts",
        "export const f = () => 1;\n",
    );
    write(
        dir.path(),
        "vendor/lib.ts",
        "export const lib = () => fetch('x');\n",
    );

    let mut policy = layered_policy();
    policy.analyzer.ignore.push("vendor/**".into());
    let report = Runner::new(dir.path(), policy).run();
    assert_eq!(report.files_checked, 1);
    assert_eq!(report.status, RunStatus::Clean);
}

#[test]
fn ambiguous_import_surfaces_as_a_resolution_warning() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.ts", "import './feature';\nexport const m = 1;\n");
    write(dir.path(), "feature.ts", "export const a = 1;\n");
    write(dir.path(), "feature/index.ts", "export const b = 1;\n");

    let policy = LayerPolicy::parse("").unwrap();
    let report = Runner::new(dir.path(), policy).run();
    let resolution = report.by_category(RuleCategory::Resolution);
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution[0].severity, Severity::Warning);
    assert_eq!(resolution[0].path, Path::new("main.ts"));
}

/// A tree that follows every rule: downward dependencies only, pure
/// business code, and cross-directory imports routed through index
/// files.
#[test]
fn clean_tree_reports_clean() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "contracts/order.ts",
        "export interface Order { id: string }\n",
    );
    write(
        dir.path(),
        "contracts/index.ts",
        "export { Order } from './order';\n",
    );
    write(
        dir.path(),
        "business/order.ts",
        "import { Order } from '../contracts';\n\
         export function createOrder(): Order { return { id: 'x' }; }\n",
    );
    write(
        dir.path(),
        "business/index.ts",
        "export { createOrder } from './order';\n",
    );
    write(
        dir.path(),
        "infra/store.ts",
        "import { createOrder } from '../business';\n\
         export const save = () => createOrder();\n",
    );

    let report = Runner::new(dir.path(), layered_policy()).run();
    assert_eq!(report.status, RunStatus::Clean);
    assert!(report.violations.is_empty());
    assert_eq!(report.files_checked, 5);
}
