//! devoid - Dead code detection for JavaScript and TypeScript
//!
//! Finds exports nobody imports, files nothing reaches and local
//! declarations nobody references.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .ts, .tsx, .js and .jsx family files
//! 2. **Parsing** - Extract exports, imports and locals using tree-sitter
//! 3. **Module Resolution** - Map specifiers to project files (relative paths and tsconfig aliases)
//! 4. **Export Graph** - Resolve what each file exports through re-export chains
//! 5. **Usage Matching** - Mark imported exports used, back to their origin
//! 6. **Entry Point Detection** - package.json fields and conventional roots
//! 7. **Reachability Analysis** - Find files no entry point reaches
//! 8. **Reporting** - Output results as terminal text or JSON

pub mod analysis;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod parser;
pub mod report;

pub use analysis::{AnalysisOptions, AnalysisReport, Analyzer, EntryPointDetector, ReachabilityAnalyzer};
pub use config::Config;
pub use discovery::FileFinder;
pub use graph::{ExportGraphResolver, FileGraph, ImportGraph, ModuleResolver};
pub use report::{ReportFormat, Reporter};
