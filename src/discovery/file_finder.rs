use crate::cache::PathNormalizer;
use crate::config::Config;
use ignore::WalkBuilder;
use miette::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Type of source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl FileType {
    /// Determine file type from path
    ///
    /// Declaration files (`*.d.ts`, `*.d.mts`, ...) carry no runtime code
    /// and are not analyzed.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        let file_name = path.file_name()?.to_str()?;

        if file_name.contains(".d.") && matches!(extension, "ts" | "mts" | "cts") {
            return None;
        }

        match extension {
            "ts" | "mts" | "cts" => Some(FileType::TypeScript),
            "tsx" => Some(FileType::Tsx),
            "js" | "mjs" | "cjs" => Some(FileType::JavaScript),
            "jsx" => Some(FileType::Jsx),
            _ => None,
        }
    }

    /// Whether this file may contain type-level syntax
    pub fn is_typescript(&self) -> bool {
        matches!(self, FileType::TypeScript | FileType::Tsx)
    }
}

/// Represents a discovered source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Normalized absolute path to the file
    pub path: String,

    /// Type of source file
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
        }
    }

    /// Build a source file from any path, inferring the type from its extension
    pub fn from_path(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        let file_type = FileType::from_path(Path::new(&path))?;
        Some(Self::new(path, file_type))
    }
}

/// File finder for discovering source files in a project
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all JS/TS source files under `root`, normalized and sorted
    pub fn find_files(&self, root: &Path, normalizer: &PathNormalizer) -> Result<Vec<SourceFile>> {
        debug!("Scanning for files in: {}", root.display());

        let targets = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config.targets.iter().map(|t| root.join(t)).collect()
        };

        let found: Vec<PathBuf> = targets
            .par_iter()
            .flat_map(|target| self.scan_directory(root, target))
            .collect();

        let mut files: Vec<SourceFile> = found
            .into_iter()
            .filter_map(|path| {
                let file_type = FileType::from_path(&path)?;
                Some(SourceFile::new(normalizer.normalize_path(&path), file_type))
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        debug!("Found {} files", files.len());
        Ok(files)
    }

    /// Scan a single directory for source files
    ///
    /// Exclude patterns see paths relative to the project root, so the
    /// directories above the project never match them.
    fn scan_directory(&self, root: &Path, dir: &Path) -> Vec<PathBuf> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .parents(true)
            .follow_links(false)
            .build();

        walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();
                let relative = path.strip_prefix(root).unwrap_or(path);

                if self.config.should_exclude(relative) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                let file_type = FileType::from_path(path)?;
                trace!("Found {:?}: {}", file_type, path.display());
                Some(path.to_path_buf())
            })
            .collect()
    }
}

/// Statistics about discovered files
#[derive(Debug, Default)]
pub struct FileStats {
    pub typescript_files: usize,
    pub tsx_files: usize,
    pub javascript_files: usize,
    pub jsx_files: usize,
}

impl FileStats {
    pub fn from_files(files: &[SourceFile]) -> Self {
        let mut stats = Self::default();
        for file in files {
            match file.file_type {
                FileType::TypeScript => stats.typescript_files += 1,
                FileType::Tsx => stats.tsx_files += 1,
                FileType::JavaScript => stats.javascript_files += 1,
                FileType::Jsx => stats.jsx_files += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.typescript_files + self.tsx_files + self.javascript_files + self.jsx_files
    }
}

impl std::fmt::Display for FileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files ({} ts, {} tsx, {} js, {} jsx)",
            self.total(),
            self.typescript_files,
            self.tsx_files,
            self.javascript_files,
            self.jsx_files
        )
    }
}
