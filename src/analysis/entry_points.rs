use crate::cache::PathNormalizer;
use crate::config::Config;
use crate::graph::{source_extensions_for, split_extension, SOURCE_EXTENSIONS};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// `package.json` fields naming distribution entry files
const MANIFEST_FIELDS: &[&str] = &["main", "module", "browser", "types", "typings", "source"];

/// Conventional root files, without extension, relative to the project root
const CONVENTIONAL_ROOTS: &[&str] = &["index", "src/index", "src/main"];
const CONVENTIONAL_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Build-output directories that mirror `src`
const BUILD_DIRS: &[&str] = &["dist", "build", "out", "lib"];

/// Detected reachability roots, with where each came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoints {
    pub all: IndexSet<String>,
    pub from_package_json: IndexSet<String>,
    pub from_conventions: IndexSet<String>,
    pub from_config: IndexSet<String>,
}

impl EntryPoints {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }
}

/// Detects entry points of a JavaScript/TypeScript project
///
/// Never fails: unreadable or malformed manifests, and candidates that map
/// to no project file, simply contribute nothing.
pub struct EntryPointDetector<'a> {
    config: &'a Config,
    normalizer: &'a PathNormalizer,
    files: &'a HashSet<String>,
}

impl<'a> EntryPointDetector<'a> {
    pub fn new(config: &'a Config, normalizer: &'a PathNormalizer, files: &'a HashSet<String>) -> Self {
        Self {
            config,
            normalizer,
            files,
        }
    }

    /// Detect all entry points in the project
    pub fn detect(&self, root: &Path) -> EntryPoints {
        let root = self.normalizer.normalize_path(root);
        let mut entry_points = EntryPoints::default();

        // 1. Distribution fields of package.json
        for candidate in manifest_candidates(Path::new(&root)) {
            if let Some(file) = self.resolve_candidate(&root, &candidate) {
                debug!("package.json entry point: {} -> {}", candidate, file);
                entry_points.from_package_json.insert(file);
            }
        }

        // 2. Conventional root files
        for stem in CONVENTIONAL_ROOTS {
            for ext in CONVENTIONAL_EXTENSIONS {
                let path = self.normalizer.join(&root, &format!("{}.{}", stem, ext));
                if self.files.contains(&path) {
                    debug!("Conventional entry point: {}", path);
                    entry_points.from_conventions.insert(path);
                }
            }
        }

        // 3. Explicitly configured entry points
        for candidate in &self.config.entry_points {
            match self.resolve_candidate(&root, candidate) {
                Some(file) => {
                    entry_points.from_config.insert(file);
                }
                None => debug!("Configured entry point not found: {}", candidate),
            }
        }

        entry_points.all = entry_points
            .from_package_json
            .iter()
            .chain(&entry_points.from_conventions)
            .chain(&entry_points.from_config)
            .cloned()
            .collect();

        info!("Detected {} entry points", entry_points.len());
        entry_points
    }

    /// Map a manifest path to a project file
    ///
    /// Tries a direct match, then a build-output extension swapped for a
    /// source one, then a build directory swapped for `src` with the same
    /// extension handling.
    fn resolve_candidate(&self, root: &str, candidate: &str) -> Option<String> {
        let path = self.normalizer.join(root, candidate);

        if let Some(file) = self.match_with_swaps(&path) {
            return Some(file);
        }

        let relative = path.strip_prefix(root)?.trim_start_matches('/');
        let (first, rest) = relative.split_once('/')?;
        if !BUILD_DIRS.contains(&first) {
            return None;
        }
        let in_src = self.normalizer.join(root, &format!("src/{}", rest));
        self.match_with_swaps(&in_src)
    }

    fn match_with_swaps(&self, path: &str) -> Option<String> {
        swap_candidates(path)
            .into_iter()
            .find(|candidate| self.files.contains(candidate))
    }
}

/// A path followed by the source files it may have been built from
fn swap_candidates(path: &str) -> Vec<String> {
    let mut candidates = vec![path.to_string()];

    // types.d.ts -> types.ts
    for (declaration, source) in [(".d.ts", "ts"), (".d.mts", "mts"), (".d.cts", "cts")] {
        if let Some(stem) = path.strip_suffix(declaration) {
            candidates.push(format!("{}.{}", stem, source));
        }
    }

    match split_extension(path) {
        Some((stem, ext)) => {
            for swapped in source_extensions_for(ext) {
                candidates.push(format!("{}.{}", stem, swapped));
            }
        }
        None => {
            for ext in SOURCE_EXTENSIONS {
                candidates.push(format!("{}.{}", path, ext));
            }
        }
    }

    candidates
}

/// Entry file candidates named by `root/package.json`
fn manifest_candidates(root: &Path) -> Vec<String> {
    let path = root.join("package.json");
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };

    let manifest: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();

    for field in MANIFEST_FIELDS {
        if let Some(target) = manifest.get(*field).and_then(Value::as_str) {
            candidates.push(target.to_string());
        }
    }

    match manifest.get("bin") {
        Some(Value::String(target)) => candidates.push(target.clone()),
        Some(Value::Object(map)) => {
            candidates.extend(map.values().filter_map(Value::as_str).map(str::to_string));
        }
        _ => {}
    }

    if let Some(exports) = manifest.get("exports") {
        collect_export_targets(exports, &mut candidates);
    }

    candidates
}

/// Every string target of a conditional export map, at any depth
fn collect_export_targets(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(target) => out.push(target.clone()),
        Value::Array(items) => {
            for item in items {
                collect_export_targets(item, out);
            }
        }
        Value::Object(map) => {
            for nested in map.values() {
                collect_export_targets(nested, out);
            }
        }
        _ => {}
    }
}
