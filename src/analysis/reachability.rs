use crate::graph::FileGraph;
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Policy used to pick unused-file candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LivenessMode {
    /// Files not reachable from any entry point
    EntryPoints,
    /// No entry points known: files nothing depends on
    Orphans,
}

/// Analyzer for finding dead files via graph traversal
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Unused-file candidates, before the side-effect filter, in graph order
    pub fn find_candidates<'g, I>(&self, graph: &'g FileGraph, roots: I) -> (LivenessMode, Vec<&'g str>)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let roots: Vec<I::Item> = roots.into_iter().collect();

        if roots.is_empty() {
            let orphans = self.find_orphans(graph);
            debug!("No entry points, {} orphan file(s)", orphans.len());
            return (LivenessMode::Orphans, orphans);
        }

        let reachable = self.find_reachable(graph, roots);
        let unreachable: Vec<&str> = graph
            .files()
            .filter(|file| !reachable.contains(*file))
            .collect();
        debug!(
            "{} reachable, {} unreachable file(s)",
            reachable.len(),
            unreachable.len()
        );
        (LivenessMode::EntryPoints, unreachable)
    }

    /// All files reachable from the roots using iterative DFS
    pub fn find_reachable<'g, I>(&self, graph: &'g FileGraph, roots: I) -> HashSet<&'g str>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let inner = graph.inner();
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::empty(inner);

        for root in roots {
            let Some(start) = graph.node_index(root.as_ref()) else {
                continue;
            };
            if dfs.discovered.contains(start.index()) {
                continue;
            }
            dfs.move_to(start);
            while let Some(idx) = dfs.next(inner) {
                reachable.insert(inner[idx].as_str());
            }
        }

        reachable
    }

    /// Files with no incoming dependency edge
    pub fn find_orphans<'g>(&self, graph: &'g FileGraph) -> Vec<&'g str> {
        graph
            .files()
            .filter(|file| graph.in_degree(file) == 0)
            .collect()
    }
}

impl Default for ReachabilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
