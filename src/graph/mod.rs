//! Project graphs: module resolution, resolved exports, imports and the
//! file dependency graph used for liveness

mod builder;
mod exports;
mod imports;
mod parallel_builder;
mod resolver;

pub use builder::{ParsedProject, ProjectBuilder};
pub use exports::{
    resolve_export_graph, ExportGraphResolver, ExportPriority, FileExports, RawExportMap,
    ResolvedExport, ResolvedExportMap,
};
pub use imports::{ImportGraph, ImportRecord};
pub use parallel_builder::ParallelProjectBuilder;
pub use resolver::{
    source_extensions_for, split_extension, ModuleResolver, ResolvedModule, SOURCE_EXTENSIONS,
};

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Why one file depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Import,
    Reexport,
}

/// Directed file dependency graph: `A -> B` means A's liveness depends on B
///
/// Edges only connect files of the project set, are deduplicated and never
/// point from a file to itself.
#[derive(Debug, Default)]
pub struct FileGraph {
    inner: DiGraph<String, EdgeKind>,
    node_map: HashMap<String, NodeIndex>,
    edges: HashSet<(NodeIndex, NodeIndex)>,
}

impl FileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from resolved imports plus every re-export specifier
    pub fn build<'r, F, E>(
        files: F,
        imports: &ImportGraph,
        reexports: E,
        modules: &ModuleResolver<'_>,
    ) -> Self
    where
        F: IntoIterator<Item = &'r str>,
        E: IntoIterator<Item = (&'r str, &'r crate::parser::RawExports)>,
    {
        let mut graph = Self::new();
        for file in files {
            graph.add_file(file);
        }

        for (importer, record) in imports.iter() {
            if let Some(target) = record.target_file() {
                graph.add_dependency(importer, target, EdgeKind::Import);
            }
        }

        for (file, raw) in reexports {
            for specifier in raw.reexport_specifiers() {
                if let Some(target) = modules.resolve_to_file(file, specifier) {
                    graph.add_dependency(file, &target, EdgeKind::Reexport);
                }
            }
        }

        debug!(
            "File graph: {} files, {} edges",
            graph.file_count(),
            graph.edge_count()
        );
        graph
    }

    pub fn add_file(&mut self, file: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(file) {
            return idx;
        }
        let idx = self.inner.add_node(file.to_string());
        self.node_map.insert(file.to_string(), idx);
        idx
    }

    /// Add `from -> to`; returns false for unknown files, self-edges and duplicates
    pub fn add_dependency(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return false;
        };
        if from_idx == to_idx || !self.edges.insert((from_idx, to_idx)) {
            return false;
        }
        self.inner.add_edge(from_idx, to_idx, kind);
        true
    }

    pub fn node_index(&self, file: &str) -> Option<NodeIndex> {
        self.node_map.get(file).copied()
    }

    /// Get the underlying petgraph graph
    pub fn inner(&self) -> &DiGraph<String, EdgeKind> {
        &self.inner
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.inner.node_weights().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Number of files depending on `file`
    pub fn in_degree(&self, file: &str) -> usize {
        self.node_index(file)
            .map(|idx| {
                self.inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Files `file` depends on, sorted
    pub fn dependencies(&self, file: &str) -> Vec<&str> {
        let Some(idx) = self.node_index(file) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .inner
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.inner[n].as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Adjacency lists for every file, including leaves
    pub fn to_adjacency(&self) -> IndexMap<String, Vec<String>> {
        self.files()
            .map(|file| {
                let deps = self
                    .dependencies(file)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (file.to_string(), deps)
            })
            .collect()
    }
}
