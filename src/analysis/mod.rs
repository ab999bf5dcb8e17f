//! Liveness analysis over the project graphs
//!
//! [`Analyzer`] runs one complete analysis: discovery, extraction, export
//! resolution, usage matching, entry points, reachability and the local
//! identifier pass. Every cache it uses lives for exactly one call.

mod entry_points;
mod locals;
mod reachability;
mod side_effects;
mod types;
mod usage;

pub use entry_points::{EntryPointDetector, EntryPoints};
pub use locals::{LocalIdentifierAnalyzer, LocalUsage};
pub use reachability::{LivenessMode, ReachabilityAnalyzer};
pub use side_effects::SideEffectDetector;
pub use types::{TypeUsageAnalyzer, TypeUsageReport};
pub use usage::{match_export_usage, ExportUsage, UsageMatcher};

use crate::cache::RunCache;
use crate::config::{Config, ResolutionConfig};
use crate::discovery::{FileFinder, FileStats, FileType, SourceFile};
use crate::graph::{
    ExportGraphResolver, FileGraph, ImportGraph, ModuleResolver, ParallelProjectBuilder,
    ParsedProject, ProjectBuilder, RawExportMap, ResolvedExportMap,
};
use crate::parser::{language_for, ExtractOptions};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{Diagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Fatal analysis errors, raised before any graph work begins
#[derive(Error, Diagnostic, Debug)]
pub enum AnalysisError {
    #[error("Project root does not exist: {}", path.display())]
    #[diagnostic(code(devoid::invalid_root))]
    InvalidRoot { path: PathBuf },

    #[error("Project root is not a directory: {}", path.display())]
    #[diagnostic(code(devoid::not_a_directory))]
    NotADirectory { path: PathBuf },

    #[error("Failed to load the {0} grammar")]
    #[diagnostic(code(devoid::parser))]
    Parser(String),
}

/// A symbol of a file, e.g. an unused export
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExportName {
    pub file: String,
    pub name: String,
}

impl ExportName {
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub track_all_locals: bool,
    pub include_types: bool,
    pub parallel: bool,
    pub show_progress: bool,
}

/// Intermediate graphs, for verbose and JSON consumers
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisGraphs {
    pub raw_exports: RawExportMap,
    pub resolved_exports: ResolvedExportMap,
    pub import_graph: ImportGraph,

    /// File dependency graph as adjacency lists
    pub dependency_graph: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub files: usize,
    pub import_records: usize,
    /// Namespace, side-effect and dynamic imports that use every export
    pub wildcard_imports: usize,
    pub dependency_edges: usize,
    pub memoized_resolutions: usize,
    pub memoized_probes: usize,
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub root: String,
    pub unused_exports: Vec<ExportName>,
    pub unused_files: Vec<String>,

    /// Formatted `<file>:<identifier>`
    pub unused_identifiers: Vec<String>,

    /// Present when type analysis was requested
    #[serde(flatten)]
    pub types: Option<TypeUsageReport>,

    pub entry_points: EntryPoints,
    pub liveness_mode: LivenessMode,
    pub stats: AnalysisStats,
    pub graphs: AnalysisGraphs,
}

impl AnalysisReport {
    /// Total number of findings across every section
    pub fn issue_count(&self) -> usize {
        let types = self
            .types
            .as_ref()
            .map(|t| t.unused_exported_types.len() + t.unused_local_types.len())
            .unwrap_or(0);
        self.unused_exports.len() + self.unused_files.len() + self.unused_identifiers.len() + types
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

/// Orchestrates one analysis of a project root
pub struct Analyzer<'a> {
    config: &'a Config,
    options: AnalysisOptions,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            options: AnalysisOptions {
                track_all_locals: config.locals.track_all_locals,
                ..Default::default()
            },
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyze(&self, root: &Path) -> Result<AnalysisReport> {
        validate_root(root)?;
        check_grammars()?;

        // Run-scoped caches, dropped with this call
        let cache = RunCache::new();
        let root_path = cache.paths.normalize_path(root);

        // Step 1: Discover files
        info!("Discovering files in {}", root_path);
        let files = FileFinder::new(self.config).find_files(Path::new(&root_path), &cache.paths)?;
        info!("Found {}", FileStats::from_files(&files));

        // Step 2: Parse files and extract module syntax
        let project = self.parse_project(&files, &cache)?;

        // Step 3: Module resolution
        let file_set = project.file_set();
        let resolution = ResolutionConfig::load(Path::new(&root_path));
        if resolution.has_aliases() {
            info!("Using {} path aliases", resolution.paths.len());
        } else {
            debug!("No path aliases configured");
        }
        let modules = ModuleResolver::new(&file_set, &cache.paths, &resolution);

        // Step 4: Resolve exports and imports, then match usage
        let resolved = ExportGraphResolver::new(&project.exports, &modules).resolve_all();
        let imports = ImportGraph::build(&project.imports, &modules);
        let usage = match_export_usage(&resolved, &imports, &project.exports);

        // Step 5: Entry points and file liveness
        let entry_points =
            EntryPointDetector::new(self.config, &cache.paths, &file_set).detect(Path::new(&root_path));
        let graph = FileGraph::build(
            project.paths(),
            &imports,
            project.exports.iter().map(|(f, r)| (f.as_str(), r)),
            &modules,
        );
        let (liveness_mode, candidates) =
            ReachabilityAnalyzer::new().find_candidates(&graph, &entry_points.all);

        let side_effects = SideEffectDetector::new();
        let unused_files: Vec<String> = candidates
            .into_iter()
            .filter(|file| {
                let text = cache.sources.get(file);
                let iife = project.top_level_iife.contains(*file);
                let keep = text
                    .map(|t| side_effects.has_side_effects(&t, iife))
                    .unwrap_or(false);
                if keep {
                    debug!("Keeping {} for its side effects", file);
                }
                !keep
            })
            .filter(|file| !self.config.should_retain_file(file))
            .map(str::to_string)
            .collect();

        // Step 6: Locals and types
        let unused_identifiers: Vec<String> = LocalIdentifierAnalyzer::new()
            .unused_identifiers(&project.locals)
            .into_iter()
            .filter(|entry| !self.retains_identifier(entry))
            .collect();

        let types = self.options.include_types.then(|| {
            let mut report = TypeUsageAnalyzer::new(&modules).analyze(&project.types);
            report.unused_exported_types.retain(|e| !self.retains(e));
            report.unused_local_types.retain(|e| !self.retains(e));
            report
        });

        // Step 7: Apply retain patterns to unused exports
        let unused_exports: Vec<ExportName> = usage
            .unused_pairs()
            .map(|(file, name)| ExportName::new(file, name))
            .filter(|export| !self.retains(export))
            .collect();

        let (memoized_resolutions, memoized_probes) = modules.cache_sizes();
        let stats = AnalysisStats {
            files: project.len(),
            import_records: imports.record_count(),
            wildcard_imports: imports.iter().filter(|(_, r)| r.is_wildcard()).count(),
            dependency_edges: graph.edge_count(),
            memoized_resolutions,
            memoized_probes,
        };

        info!(
            "Analysis complete: {} unused exports, {} unused files, {} unused identifiers",
            unused_exports.len(),
            unused_files.len(),
            unused_identifiers.len()
        );

        Ok(AnalysisReport {
            root: root_path,
            unused_exports,
            unused_files,
            unused_identifiers,
            types,
            entry_points,
            liveness_mode,
            stats,
            graphs: AnalysisGraphs {
                dependency_graph: graph.to_adjacency(),
                raw_exports: project.exports,
                resolved_exports: resolved,
                import_graph: imports,
            },
        })
    }

    fn parse_project(&self, files: &[SourceFile], cache: &RunCache) -> Result<ParsedProject> {
        let options = ExtractOptions {
            track_all_locals: self.options.track_all_locals,
            include_types: self.options.include_types,
        };

        if self.options.parallel {
            return ParallelProjectBuilder::new(options).build_from_files(files, &cache.sources);
        }

        let pb = if self.options.show_progress {
            ProgressBar::new(files.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut builder = ProjectBuilder::new(&cache.sources, options);
        for file in files {
            builder.process_file(file)?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(builder.build())
    }

    fn retains(&self, export: &ExportName) -> bool {
        self.config.should_retain(&export.name) || self.config.should_retain_file(&export.file)
    }

    fn retains_identifier(&self, entry: &str) -> bool {
        match entry.rsplit_once(':') {
            Some((file, name)) => self.retains(&ExportName::new(file, name)),
            None => false,
        }
    }
}

fn validate_root(root: &Path) -> std::result::Result<(), AnalysisError> {
    if !root.exists() {
        return Err(AnalysisError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(AnalysisError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

fn check_grammars() -> std::result::Result<(), AnalysisError> {
    let mut parser = tree_sitter::Parser::new();
    for file_type in [FileType::TypeScript, FileType::Tsx, FileType::JavaScript] {
        parser
            .set_language(&language_for(file_type))
            .map_err(|_| AnalysisError::Parser(format!("{:?}", file_type)))?;
    }
    Ok(())
}
