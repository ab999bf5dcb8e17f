//! Export graph resolution tests
//!
//! Build raw export maps directly and check the resolved entries: the
//! priority law, re-export chains and cycle handling.

use devoid::cache::PathNormalizer;
use devoid::graph::{
    resolve_export_graph, ExportGraphResolver, ExportPriority, ModuleResolver, RawExportMap,
};
use devoid::parser::{NamedReexport, RawExports};
use std::collections::HashSet;

fn locals(names: &[&str]) -> RawExports {
    RawExports {
        local_named: names.iter().map(|n| n.to_string()).collect(),
        ..Default::default()
    }
}

fn named(original: &str, exported: &str, specifier: &str) -> NamedReexport {
    NamedReexport {
        original_name: original.into(),
        exported_as: exported.into(),
        specifier: specifier.into(),
    }
}

fn file_set(raw: &RawExportMap) -> HashSet<String> {
    raw.keys().cloned().collect()
}

/// A declares f, B renames it to g, C renames g to h
fn chain_project() -> RawExportMap {
    let mut raw = RawExportMap::new();
    raw.insert("/p/a.ts".into(), locals(&["f"]));
    raw.insert(
        "/p/b.ts".into(),
        RawExports {
            named_reexports: vec![named("f", "g", "./a")],
            ..Default::default()
        },
    );
    raw.insert(
        "/p/c.ts".into(),
        RawExports {
            named_reexports: vec![named("g", "h", "./b")],
            ..Default::default()
        },
    );
    raw
}

#[test]
fn test_priority_order() {
    assert!(ExportPriority::Local > ExportPriority::Named);
    assert!(ExportPriority::Named > ExportPriority::Wildcard);
}

#[test]
fn test_chain_propagation() {
    let raw = chain_project();
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    let h = &resolved["/p/c.ts"]["h"];

    assert_eq!(h.exported_name, "h");
    assert_eq!(h.original_name, "f");
    assert_eq!(h.origin_file, "/p/a.ts");
    assert_eq!(h.chain, vec!["/p/c.ts".to_string(), "/p/b.ts".to_string()]);
    assert!(resolved["/p/a.ts"]["f"].chain.is_empty());
}

#[test]
fn test_named_reexport_beats_wildcard() {
    let mut raw = RawExportMap::new();
    raw.insert("/p/one.ts".into(), locals(&["x"]));
    raw.insert("/p/two.ts".into(), locals(&["x"]));
    raw.insert(
        "/p/barrel.ts".into(),
        RawExports {
            wildcard_reexports: vec!["./one".into()],
            named_reexports: vec![named("x", "x", "./two")],
            ..Default::default()
        },
    );
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    assert_eq!(resolved["/p/barrel.ts"]["x"].origin_file, "/p/two.ts");
}

#[test]
fn test_local_beats_named_and_wildcard() {
    let mut raw = RawExportMap::new();
    raw.insert("/p/one.ts".into(), locals(&["x"]));
    raw.insert(
        "/p/barrel.ts".into(),
        RawExports {
            local_named: vec!["x".into()],
            wildcard_reexports: vec!["./one".into()],
            named_reexports: vec![named("x", "x", "./one")],
            ..Default::default()
        },
    );
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    let x = &resolved["/p/barrel.ts"]["x"];
    assert_eq!(x.origin_file, "/p/barrel.ts");
    assert!(x.chain.is_empty());
}

#[test]
fn test_last_wildcard_wins_within_priority() {
    let mut raw = RawExportMap::new();
    raw.insert("/p/one.ts".into(), locals(&["x"]));
    raw.insert("/p/two.ts".into(), locals(&["x"]));
    raw.insert(
        "/p/barrel.ts".into(),
        RawExports {
            wildcard_reexports: vec!["./one".into(), "./two".into()],
            ..Default::default()
        },
    );
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    assert_eq!(resolved["/p/barrel.ts"]["x"].origin_file, "/p/two.ts");
}

#[test]
fn test_mutual_wildcard_cycle_terminates() {
    let mut raw = RawExportMap::new();
    raw.insert(
        "/p/a.ts".into(),
        RawExports {
            local_named: vec!["fromA".into()],
            wildcard_reexports: vec!["./b".into()],
            ..Default::default()
        },
    );
    raw.insert(
        "/p/b.ts".into(),
        RawExports {
            local_named: vec!["fromB".into()],
            wildcard_reexports: vec!["./a".into()],
            ..Default::default()
        },
    );
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    assert!(resolved["/p/a.ts"].contains_key("fromA"));
    assert!(resolved["/p/b.ts"].contains_key("fromB"));
    // a is resolved first, so it sees b's locals through the wildcard
    assert!(resolved["/p/a.ts"].contains_key("fromB"));
}

#[test]
fn test_transitive_cycle_keeps_locals() {
    let mut raw = RawExportMap::new();
    for (file, local, next) in [
        ("/p/a.ts", "a", "./b"),
        ("/p/b.ts", "b", "./c"),
        ("/p/c.ts", "c", "./a"),
    ] {
        raw.insert(
            file.into(),
            RawExports {
                local_named: vec![local.into()],
                named_reexports: vec![named("missing", "renamed", next)],
                wildcard_reexports: vec![next.into()],
                ..Default::default()
            },
        );
    }
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    for (file, local) in [("/p/a.ts", "a"), ("/p/b.ts", "b"), ("/p/c.ts", "c")] {
        assert!(resolved[file].contains_key(local), "{} lost {}", file, local);
        assert!(!resolved[file].contains_key("renamed"));
    }
}

#[test]
fn test_resolution_is_idempotent() {
    let raw = chain_project();
    let files = file_set(&raw);

    let first = {
        let normalizer = PathNormalizer::with_base("/p");
        let modules = ModuleResolver::without_aliases(&files, &normalizer);
        resolve_export_graph(&raw, &modules)
    };
    let second = {
        let normalizer = PathNormalizer::with_base("/p");
        let modules = ModuleResolver::without_aliases(&files, &normalizer);
        resolve_export_graph(&raw, &modules)
    };
    assert_eq!(first, second);
}

#[test]
fn test_each_file_resolved_once() {
    let raw = chain_project();
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let mut resolver = ExportGraphResolver::new(&raw, &modules);
    let h_count = resolver.resolve_file("/p/c.ts").len();
    assert_eq!(h_count, 1);
    assert_eq!(resolver.memoized(), 3);

    resolver.resolve_all();
    assert_eq!(resolver.memoized(), 3);
}

#[test]
fn test_wildcard_forwards_renamed_default() {
    let mut raw = RawExportMap::new();
    raw.insert(
        "/p/widget.ts".into(),
        RawExports {
            has_default: true,
            local_named: vec!["size".into()],
            ..Default::default()
        },
    );
    raw.insert(
        "/p/components.ts".into(),
        RawExports {
            named_reexports: vec![named("default", "Widget", "./widget")],
            ..Default::default()
        },
    );
    raw.insert(
        "/p/index.ts".into(),
        RawExports {
            wildcard_reexports: vec!["./widget".into(), "./components".into()],
            ..Default::default()
        },
    );
    let files = file_set(&raw);
    let normalizer = PathNormalizer::with_base("/p");
    let modules = ModuleResolver::without_aliases(&files, &normalizer);

    let resolved = resolve_export_graph(&raw, &modules);
    let index = &resolved["/p/index.ts"];

    // the plain default never crosses `export *`
    assert!(!index.contains_key("default"));
    assert!(index.contains_key("size"));

    let widget = &index["Widget"];
    assert!(widget.is_default);
    assert_eq!(widget.origin_file, "/p/widget.ts");
    assert_eq!(widget.original_name, "default");
    assert_eq!(
        widget.chain,
        vec!["/p/index.ts".to_string(), "/p/components.ts".to_string()]
    );
}
