use super::resolver::{ModuleResolver, ResolvedModule};
use crate::parser::{ImportKind, RawImport};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// A runtime import with its specifier resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub target: ResolvedModule,
    pub imported_symbols: Vec<String>,
    pub kind: ImportKind,
}

impl ImportRecord {
    pub fn target_file(&self) -> Option<&str> {
        self.target.project_file()
    }

    pub fn is_wildcard(&self) -> bool {
        self.imported_symbols.iter().any(|s| s == "*")
    }
}

/// Every file's runtime imports, keyed by importing file
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImportGraph {
    records: IndexMap<String, Vec<ImportRecord>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every raw import of every file
    pub fn build<'r, I>(raw_imports: I, modules: &ModuleResolver<'_>) -> Self
    where
        I: IntoIterator<Item = (&'r String, &'r Vec<RawImport>)>,
    {
        let mut graph = Self::new();
        for (file, imports) in raw_imports {
            for import in imports {
                graph.add(
                    file,
                    ImportRecord {
                        target: modules.resolve(file, &import.specifier),
                        imported_symbols: import.symbols.clone(),
                        kind: import.kind,
                    },
                );
            }
        }
        debug!(
            "Import graph: {} records across {} files",
            graph.record_count(),
            graph.records.len()
        );
        graph
    }

    pub fn add(&mut self, importer: &str, record: ImportRecord) {
        self.records
            .entry(importer.to_string())
            .or_default()
            .push(record);
    }

    /// Imports of one file
    pub fn records_of(&self, importer: &str) -> &[ImportRecord] {
        self.records
            .get(importer)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportRecord)> {
        self.records
            .iter()
            .flat_map(|(file, records)| records.iter().map(move |r| (file.as_str(), r)))
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(|r| r.len()).sum()
    }
}
