//! Import extraction, resolution and usage marking
//!
//! Each test writes a throwaway project, parses it and checks the resolved
//! import graph or the usage computed from it.

use devoid::analysis::match_export_usage;
use devoid::cache::{PathNormalizer, SourceCache};
use devoid::config::ResolutionConfig;
use devoid::discovery::SourceFile;
use devoid::graph::{
    resolve_export_graph, ImportGraph, ModuleResolver, ParsedProject, ProjectBuilder,
};
use devoid::parser::ExtractOptions;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    root: String,
    normalizer: PathNormalizer,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (path, body) in files {
            let path = dir.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        let normalizer = PathNormalizer::new();
        let root = normalizer.normalize_path(dir.path());
        Self {
            _dir: dir,
            root,
            normalizer,
        }
    }

    fn path(&self, relative: &str) -> String {
        format!("{}/{}", self.root, relative)
    }

    fn parse(&self, relative: &[&str]) -> ParsedProject {
        let files: Vec<SourceFile> = relative
            .iter()
            .map(|r| SourceFile::from_path(self.path(r)).unwrap())
            .collect();
        let sources = SourceCache::new();
        ProjectBuilder::new(&sources, ExtractOptions::default())
            .build_from_files(&files)
            .unwrap()
    }

    fn resolution(&self) -> ResolutionConfig {
        ResolutionConfig::load(Path::new(&self.root))
    }
}

#[test]
fn test_type_only_imports_produce_no_records() {
    let fixture = Fixture::new(&[
        ("model.ts", "export interface User {}\nexport const build = () => ({});"),
        (
            "app.ts",
            "import type { User } from './model';\nimport { type User as U } from './model';\nlet u: User;",
        ),
    ]);
    let project = fixture.parse(&["model.ts", "app.ts"]);
    let files = project.file_set();
    let modules = ModuleResolver::without_aliases(&files, &fixture.normalizer);

    let imports = ImportGraph::build(&project.imports, &modules);
    assert!(imports.records_of(&fixture.path("app.ts")).is_empty());

    let resolved = resolve_export_graph(&project.exports, &modules);
    let usage = match_export_usage(&resolved, &imports, &project.exports);
    assert!(!usage.is_used(&fixture.path("model.ts"), "User"));
    assert!(!usage.is_used(&fixture.path("model.ts"), "build"));
}

#[test]
fn test_mixed_import_keeps_runtime_specifiers() {
    let fixture = Fixture::new(&[
        ("model.ts", "export interface User {}\nexport const build = () => ({});"),
        ("app.ts", "import { type User, build } from './model';\nbuild();"),
    ]);
    let project = fixture.parse(&["model.ts", "app.ts"]);
    let files = project.file_set();
    let modules = ModuleResolver::without_aliases(&files, &fixture.normalizer);

    let imports = ImportGraph::build(&project.imports, &modules);
    let records = imports.records_of(&fixture.path("app.ts"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].imported_symbols, vec!["build".to_string()]);
    assert_eq!(records[0].target_file(), Some(fixture.path("model.ts").as_str()));
}

#[test]
fn test_namespace_import_marks_every_export() {
    let fixture = Fixture::new(&[
        ("math.ts", "export const add = 1;\nexport const sub = 2;\nexport default 3;"),
        ("main.ts", "import * as M from './math';\nM.add;"),
    ]);
    let project = fixture.parse(&["math.ts", "main.ts"]);
    let files = project.file_set();
    let modules = ModuleResolver::without_aliases(&files, &fixture.normalizer);

    let imports = ImportGraph::build(&project.imports, &modules);
    let resolved = resolve_export_graph(&project.exports, &modules);
    let usage = match_export_usage(&resolved, &imports, &project.exports);

    let math = fixture.path("math.ts");
    assert!(usage.is_used(&math, "add"));
    assert!(usage.is_used(&math, "sub"));
    assert!(usage.is_used(&math, "default"));
    assert!(usage.unused.is_empty());
}

#[test]
fn test_usage_propagates_through_reexports() {
    let fixture = Fixture::new(&[
        ("a.ts", "export function f() {}\nexport const unused = 1;"),
        ("b.ts", "export { f as g } from './a';"),
        ("c.ts", "export { g as h } from './b';"),
        ("consumer.ts", "import { h } from './c';\nh();"),
    ]);
    let project = fixture.parse(&["a.ts", "b.ts", "c.ts", "consumer.ts"]);
    let files = project.file_set();
    let modules = ModuleResolver::without_aliases(&files, &fixture.normalizer);

    let imports = ImportGraph::build(&project.imports, &modules);
    let resolved = resolve_export_graph(&project.exports, &modules);
    let usage = match_export_usage(&resolved, &imports, &project.exports);

    let a = fixture.path("a.ts");
    assert!(usage.is_used(&a, "f"));
    assert!(usage.is_used(&fixture.path("c.ts"), "h"));

    let unused: Vec<(&str, &str)> = usage.unused_pairs().collect();
    assert_eq!(unused, vec![(a.as_str(), "unused")]);
}

#[test]
fn test_default_import() {
    let fixture = Fixture::new(&[
        ("widget.tsx", "export default function Widget() { return null; }\nexport const size = 1;"),
        ("page.tsx", "import Widget from './widget';\nexport const page = Widget;"),
    ]);
    let project = fixture.parse(&["widget.tsx", "page.tsx"]);
    let files = project.file_set();
    let modules = ModuleResolver::without_aliases(&files, &fixture.normalizer);

    let imports = ImportGraph::build(&project.imports, &modules);
    let resolved = resolve_export_graph(&project.exports, &modules);
    let usage = match_export_usage(&resolved, &imports, &project.exports);

    let widget = fixture.path("widget.tsx");
    assert!(usage.is_used(&widget, "default"));
    assert!(!usage.is_used(&widget, "size"));
}

#[test]
fn test_tsconfig_aliases() {
    let fixture = Fixture::new(&[
        (
            "tsconfig.json",
            r#"{
                // aliases for the app
                "compilerOptions": {
                    "baseUrl": ".",
                    "paths": {
                        "@utils/*": ["src/utils/*"],
                        "config": ["src/config/index.ts"],
                    },
                },
            }"#,
        ),
        ("src/utils/date.ts", "export const today = 1;"),
        ("src/config/index.ts", "export const settings = {};"),
        (
            "src/main.ts",
            "import { today } from '@utils/date';\nimport { settings } from 'config';\nimport React from 'react';",
        ),
    ]);
    let project = fixture.parse(&["src/utils/date.ts", "src/config/index.ts", "src/main.ts"]);
    let files = project.file_set();
    let resolution = fixture.resolution();
    assert!(resolution.has_aliases());
    let modules = ModuleResolver::new(&files, &fixture.normalizer, &resolution);

    let imports = ImportGraph::build(&project.imports, &modules);
    let targets: Vec<Option<&str>> = imports
        .records_of(&fixture.path("src/main.ts"))
        .iter()
        .map(|r| r.target_file())
        .collect();

    let date = fixture.path("src/utils/date.ts");
    let config = fixture.path("src/config/index.ts");
    assert_eq!(targets, vec![Some(date.as_str()), Some(config.as_str()), None]);
}

#[test]
fn test_broken_tsconfig_means_no_aliases() {
    let fixture = Fixture::new(&[("tsconfig.json", "{ \"compilerOptions\": ")]);
    assert_eq!(fixture.resolution(), ResolutionConfig::default());
}
