//! Integration tests for the devoid analysis pipeline
//!
//! These tests run the complete analysis against throwaway projects.

use devoid::analysis::{AnalysisOptions, AnalysisReport, Analyzer, LivenessMode};
use devoid::config::Config;
use std::path::Path;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, body) in files {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }
    dir
}

fn analyze(root: &Path, options: AnalysisOptions) -> AnalysisReport {
    let config = Config::default();
    Analyzer::new(&config)
        .with_options(options)
        .analyze(root)
        .expect("analysis failed")
}

fn file_names(files: &[String]) -> Vec<&str> {
    files
        .iter()
        .map(|f| f.rsplit('/').next().unwrap_or(f.as_str()))
        .collect()
}

#[test]
fn test_unreachable_file_with_entry_point() {
    let dir = project(&[
        ("index.ts", "import { a } from './a';\nexport const run = a;"),
        ("a.ts", "export const a = 1;"),
        ("orphan.ts", "export const x = 1;"),
    ]);
    let report = analyze(dir.path(), AnalysisOptions::default());

    assert_eq!(report.liveness_mode, LivenessMode::EntryPoints);
    assert_eq!(report.entry_points.len(), 1);
    assert_eq!(file_names(&report.unused_files), vec!["orphan.ts"]);
}

#[test]
fn test_orphan_fallback_without_entry_points() {
    let dir = project(&[
        ("app.ts", "import { a } from './a';\nexport const run = a;"),
        ("a.ts", "export const a = 1;"),
        ("orphan.ts", "export const x = 1;"),
    ]);
    let report = analyze(dir.path(), AnalysisOptions::default());

    assert_eq!(report.liveness_mode, LivenessMode::Orphans);
    assert!(report.entry_points.is_empty());
    let names = file_names(&report.unused_files);
    assert!(names.contains(&"orphan.ts"));
    assert!(!names.contains(&"a.ts"));
}

#[test]
fn test_package_json_entry_through_build_dir() {
    let dir = project(&[
        ("package.json", r#"{ "name": "lib", "main": "dist/cli.js" }"#),
        ("src/cli.ts", "import './commands';"),
        ("src/commands.ts", "export const list = 1;"),
        ("src/stale.ts", "export const old = 1;"),
    ]);
    let report = analyze(dir.path(), AnalysisOptions::default());

    assert_eq!(report.entry_points.from_package_json.len(), 1);
    assert_eq!(file_names(&report.unused_files), vec!["stale.ts"]);
    // a bare side-effect import counts as using everything
    assert!(report.unused_exports.iter().all(|e| e.name != "list"));
}

#[test]
fn test_reexport_edges_keep_files_alive() {
    let dir = project(&[
        ("index.ts", "export * from './lib';"),
        ("lib/index.ts", "export { parse } from './parse';\nexport * as fmt from './format';"),
        ("lib/parse.ts", "export function parse() {}\nexport function unusedHelper() {}"),
        ("lib/format.ts", "export const pretty = 1;"),
    ]);
    let report = analyze(dir.path(), AnalysisOptions::default());

    assert!(report.unused_files.is_empty());
    // only the namespace re-export of format.ts counts as a wildcard import
    assert_eq!(report.stats.wildcard_imports, 1);

    let unused: Vec<&str> = report.unused_exports.iter().map(|e| e.name.as_str()).collect();
    assert!(unused.contains(&"unusedHelper"));
    // reached through a namespace re-export
    assert!(!unused.contains(&"pretty"));
}

#[test]
fn test_unused_identifiers() {
    let dir = project(&[(
        "index.ts",
        "function helper() {}\nfunction stale() {}\nconst typed: number = 1;\nexport const out = helper();",
    )]);

    let report = analyze(dir.path(), AnalysisOptions::default());
    let names: Vec<&str> = report
        .unused_identifiers
        .iter()
        .map(|entry| entry.rsplit(':').next().unwrap())
        .collect();
    assert_eq!(names, vec!["stale"]);

    let report = analyze(
        dir.path(),
        AnalysisOptions {
            track_all_locals: true,
            ..Default::default()
        },
    );
    assert_eq!(report.unused_identifiers.len(), 2);
    assert!(report.unused_identifiers[0].ends_with("index.ts:stale"));
}

#[test]
fn test_type_analysis() {
    let dir = project(&[
        ("index.ts", "import type { Props } from './types';\nexport const view = (p: Props) => p;"),
        (
            "types.ts",
            "export interface Props {}\nexport type Theme = 'dark';\ntype Internal = string;\n",
        ),
    ]);

    let report = analyze(dir.path(), AnalysisOptions::default());
    assert!(report.types.is_none());

    let report = analyze(
        dir.path(),
        AnalysisOptions {
            include_types: true,
            ..Default::default()
        },
    );
    let types = report.types.expect("type report");
    let exported: Vec<&str> = types.unused_exported_types.iter().map(|e| e.name.as_str()).collect();
    let local: Vec<&str> = types.unused_local_types.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(exported, vec!["Theme"]);
    assert_eq!(local, vec!["Internal"]);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = project(&[
        ("index.ts", "import { a } from './a';\nimport * as b from './b';\nexport default a;"),
        ("a.ts", "export const a = 1;\nexport const dead = 2;"),
        ("b.js", "module.exports = {};\nexport const b = require('./c');"),
        ("c.js", "export function c() {}"),
        ("orphan.tsx", "export const Orphan = () => null;"),
    ]);

    let sequential = analyze(dir.path(), AnalysisOptions::default());
    let parallel = analyze(
        dir.path(),
        AnalysisOptions {
            parallel: true,
            ..Default::default()
        },
    );

    assert_eq!(
        serde_json::to_value(&sequential).unwrap(),
        serde_json::to_value(&parallel).unwrap()
    );
}

#[test]
fn test_report_is_deterministic() {
    let dir = project(&[
        ("src/index.ts", "import { x } from './x';\nexport default x;"),
        ("src/x.ts", "export const x = 1;\nexport const y = 2;"),
        ("src/z.ts", "export const z = 3;"),
    ]);

    let first = serde_json::to_value(analyze(dir.path(), AnalysisOptions::default())).unwrap();
    let second = serde_json::to_value(analyze(dir.path(), AnalysisOptions::default())).unwrap();
    assert_eq!(first, second);
    assert!(first["graphs"]["resolvedExports"].is_object());
    assert!(first["unusedExports"].is_array());
}

#[test]
fn test_project_under_build_directory() {
    let dir = project(&[
        ("build/app/index.ts", "import { a } from './a';\nexport const run = a;"),
        ("build/app/a.ts", "export const a = 1;"),
        ("build/app/orphan.ts", "export const x = 1;"),
    ]);
    let report = analyze(&dir.path().join("build/app"), AnalysisOptions::default());

    assert_eq!(report.stats.files, 3);
    assert_eq!(file_names(&report.unused_files), vec!["orphan.ts"]);
}

#[test]
fn test_multiline_callback_is_not_a_side_effect() {
    let dir = project(&[
        ("index.ts", "export const app = 1;"),
        (
            "sorted.ts",
            "const list = [3, 1, 2];\nexport const sorted = list.sort(\n  (a, b) => a - b,\n);\n",
        ),
        ("boot.ts", "(function () {\n  start();\n})();\n"),
    ]);
    let report = analyze(dir.path(), AnalysisOptions::default());

    // boot.ts runs an immediately-invoked function and stays out of the report
    assert_eq!(file_names(&report.unused_files), vec!["sorted.ts"]);
}
