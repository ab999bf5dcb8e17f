//! Export graph resolution
//!
//! Computes, per file, the set of externally visible symbols after
//! following wildcard and named re-export chains. Conflicts between
//! sources of the same exported name are settled by [`ExportPriority`].

use super::resolver::ModuleResolver;
use crate::parser::RawExports;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Raw exports of every project file, keyed by normalized path
pub type RawExportMap = IndexMap<String, RawExports>;

/// Resolved exports of one file, keyed by exported name
pub type FileExports = IndexMap<String, ResolvedExport>;

/// Resolved exports of every project file
pub type ResolvedExportMap = IndexMap<String, FileExports>;

/// One symbol visible from a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedExport {
    pub exported_name: String,
    pub original_name: String,
    pub origin_file: String,
    pub is_default: bool,

    /// Re-exporting files from the queried file toward the origin
    pub chain: Vec<String>,
}

impl ResolvedExport {
    fn local(file: &str, name: &str) -> Self {
        Self {
            exported_name: name.to_string(),
            original_name: name.to_string(),
            origin_file: file.to_string(),
            is_default: false,
            chain: Vec::new(),
        }
    }

    fn local_default(file: &str) -> Self {
        Self {
            is_default: true,
            ..Self::local(file, "default")
        }
    }

    /// Same symbol seen through `via`, optionally under a new name
    fn forwarded(&self, via: &str, exported_name: &str) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.push(via.to_string());
        chain.extend(self.chain.iter().cloned());
        Self {
            exported_name: exported_name.to_string(),
            original_name: self.original_name.clone(),
            origin_file: self.origin_file.clone(),
            is_default: self.is_default,
            chain,
        }
    }
}

/// Source of an export entry; a higher priority overrides a lower one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportPriority {
    Wildcard = 1,
    Named = 2,
    Local = 3,
}

/// Per-file table used while resolving
#[derive(Default)]
struct ExportTable {
    entries: IndexMap<String, (ResolvedExport, ExportPriority)>,
}

impl ExportTable {
    /// Insert unless a strictly higher priority entry already exists
    fn offer(&mut self, entry: ResolvedExport, priority: ExportPriority) {
        match self.entries.get(&entry.exported_name) {
            Some((_, existing)) if *existing > priority => {}
            _ => {
                self.entries
                    .insert(entry.exported_name.clone(), (entry, priority));
            }
        }
    }

    fn into_exports(self) -> FileExports {
        self.entries
            .into_iter()
            .map(|(name, (entry, _))| (name, entry))
            .collect()
    }
}

/// Resolves the export graph of one project snapshot
///
/// Results are memoized per file for the lifetime of the resolver, so each
/// file's export set is computed at most once no matter how many importers
/// or re-exporters reach it. Re-entering a file that is still being
/// resolved (a re-export cycle) yields whatever is already memoized, which
/// is nothing, instead of recursing.
pub struct ExportGraphResolver<'a> {
    raw: &'a RawExportMap,
    modules: &'a ModuleResolver<'a>,
    memo: HashMap<String, FileExports>,
    in_progress: HashSet<String>,
}

impl<'a> ExportGraphResolver<'a> {
    pub fn new(raw: &'a RawExportMap, modules: &'a ModuleResolver<'a>) -> Self {
        Self {
            raw,
            modules,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Resolved exports of one file
    pub fn resolve_file(&mut self, file: &str) -> &FileExports {
        self.ensure_resolved(file);
        &self.memo[file]
    }

    /// Resolved exports of every file, in project order
    pub fn resolve_all(&mut self) -> ResolvedExportMap {
        let raw = self.raw;
        let mut resolved = ResolvedExportMap::with_capacity(raw.len());
        for file in raw.keys() {
            self.ensure_resolved(file);
            resolved.insert(file.clone(), self.memo[file.as_str()].clone());
        }
        debug!(
            "Resolved exports for {} files ({} symbols)",
            resolved.len(),
            resolved.values().map(|e| e.len()).sum::<usize>()
        );
        resolved
    }

    /// Number of files resolved so far
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    fn ensure_resolved(&mut self, file: &str) {
        if self.memo.contains_key(file) || self.in_progress.contains(file) {
            return;
        }

        self.in_progress.insert(file.to_string());
        let exports = self.compute(file);
        self.in_progress.remove(file);
        self.memo.insert(file.to_string(), exports);
    }

    /// Resolve a dependency and return its entries, empty while it is on the stack
    fn dependency(&mut self, importer: &str, specifier: &str) -> Option<&FileExports> {
        let target = self.modules.resolve_to_file(importer, specifier)?;
        if self.in_progress.contains(&target) && !self.memo.contains_key(&target) {
            trace!("Re-export cycle at {} -> {}", importer, target);
        }
        self.ensure_resolved(&target);
        self.memo.get(&target)
    }

    fn compute(&mut self, file: &str) -> FileExports {
        let raw_map = self.raw;
        let Some(raw) = raw_map.get(file) else {
            return FileExports::new();
        };

        let mut table = ExportTable::default();

        // export * from "x": every entry not named `default`, never renamed.
        // A default re-exported under a name (`export { default as W }`) passes.
        for specifier in &raw.wildcard_reexports {
            let Some(target_exports) = self.dependency(file, specifier) else {
                continue;
            };
            let forwarded: Vec<ResolvedExport> = target_exports
                .values()
                .filter(|entry| entry.exported_name != "default")
                .map(|entry| entry.forwarded(file, &entry.exported_name))
                .collect();
            for entry in forwarded {
                table.offer(entry, ExportPriority::Wildcard);
            }
        }

        // export { a as b } from "x"
        for reexport in &raw.named_reexports {
            let forwarded = self
                .dependency(file, &reexport.specifier)
                .and_then(|target_exports| target_exports.get(&reexport.original_name))
                .map(|entry| entry.forwarded(file, &reexport.exported_as));
            if let Some(entry) = forwarded {
                table.offer(entry, ExportPriority::Named);
            }
        }

        // Locals last: they never depend on recursion
        if raw.has_default {
            table.offer(ResolvedExport::local_default(file), ExportPriority::Local);
        }
        for name in &raw.local_named {
            table.offer(ResolvedExport::local(file, name), ExportPriority::Local);
        }

        table.into_exports()
    }
}

/// Resolve the export graph of a whole snapshot
pub fn resolve_export_graph(raw: &RawExportMap, modules: &ModuleResolver<'_>) -> ResolvedExportMap {
    ExportGraphResolver::new(raw, modules).resolve_all()
}
