use crate::graph::{ImportGraph, RawExportMap, ResolvedExport, ResolvedExportMap};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::trace;

/// Used and unused export names per file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportUsage {
    pub used: IndexMap<String, IndexSet<String>>,
    pub unused: IndexMap<String, IndexSet<String>>,
}

impl ExportUsage {
    pub fn is_used(&self, file: &str, name: &str) -> bool {
        self.used
            .get(file)
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// `(file, name)` pairs of every unused export, in project order
    pub fn unused_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unused
            .iter()
            .flat_map(|(file, names)| names.iter().map(move |n| (file.as_str(), n.as_str())))
    }
}

/// Matches imports against resolved exports
///
/// Marking an entry used also marks its origin declaration, which is how
/// usage travels backward through re-export chains.
pub struct UsageMatcher<'a> {
    resolved: &'a ResolvedExportMap,
    used: IndexMap<String, IndexSet<String>>,
}

impl<'a> UsageMatcher<'a> {
    pub fn new(resolved: &'a ResolvedExportMap) -> Self {
        Self {
            resolved,
            used: IndexMap::new(),
        }
    }

    /// Mark every import of the graph that targets a project file
    pub fn mark_graph(&mut self, imports: &ImportGraph) {
        for (importer, record) in imports.iter() {
            if let Some(target) = record.target_file() {
                trace!("{} uses {:?} of {}", importer, record.imported_symbols, target);
                self.mark_import(target, &record.imported_symbols);
            }
        }
    }

    /// Mark the given symbols of `target` as used
    pub fn mark_import(&mut self, target: &str, symbols: &[String]) {
        let resolved = self.resolved;
        let Some(exports) = resolved.get(target) else {
            return;
        };

        for symbol in symbols {
            match symbol.as_str() {
                "*" => {
                    for entry in exports.values() {
                        self.mark(target, entry);
                    }
                }
                "default" => {
                    let entry = exports
                        .get("default")
                        .or_else(|| exports.values().find(|e| e.is_default));
                    if let Some(entry) = entry {
                        self.mark(target, entry);
                    }
                }
                name => {
                    if let Some(entry) = exports.get(name) {
                        self.mark(target, entry);
                    }
                }
            }
        }
    }

    fn mark(&mut self, target: &str, entry: &ResolvedExport) {
        self.used
            .entry(target.to_string())
            .or_default()
            .insert(entry.exported_name.clone());
        self.used
            .entry(entry.origin_file.clone())
            .or_default()
            .insert(entry.original_name.clone());
    }

    /// Compare usage against what each file declares
    pub fn finish(self, raw: &RawExportMap) -> ExportUsage {
        let mut unused = IndexMap::new();

        for (file, exports) in raw {
            let used = self.used.get(file);
            let is_used = |name: &str| used.map(|u| u.contains(name)).unwrap_or(false);

            let mut names = IndexSet::new();
            if exports.has_default && !is_used("default") {
                names.insert("default".to_string());
            }
            for name in &exports.local_named {
                if !is_used(name) {
                    names.insert(name.clone());
                }
            }

            if !names.is_empty() {
                unused.insert(file.clone(), names);
            }
        }

        ExportUsage {
            used: self.used,
            unused,
        }
    }
}

/// Match a whole import graph against resolved exports
pub fn match_export_usage(
    resolved: &ResolvedExportMap,
    imports: &ImportGraph,
    raw: &RawExportMap,
) -> ExportUsage {
    let mut matcher = UsageMatcher::new(resolved);
    matcher.mark_graph(imports);
    matcher.finish(raw)
}
