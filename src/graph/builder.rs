use super::exports::RawExportMap;
use crate::cache::SourceCache;
use crate::discovery::SourceFile;
use crate::parser::{ExtractOptions, LocalSymbols, ModuleSyntax, RawImport, SourceParser, TypeSurface};
use indexmap::IndexMap;
use miette::Result;
use std::collections::HashSet;
use tracing::debug;

/// Per-file extraction results for a whole project, in file order
#[derive(Debug, Default)]
pub struct ParsedProject {
    pub files: Vec<SourceFile>,
    pub exports: RawExportMap,
    pub imports: IndexMap<String, Vec<RawImport>>,
    pub locals: IndexMap<String, LocalSymbols>,
    pub types: IndexMap<String, TypeSurface>,
    /// Files with an immediately-invoked function at top level
    pub top_level_iife: HashSet<String>,
}

impl ParsedProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the extraction of one file
    pub fn insert(&mut self, file: SourceFile, module: ModuleSyntax) {
        let path = file.path.clone();
        if module.top_level_iife {
            self.top_level_iife.insert(path.clone());
        }
        self.exports.insert(path.clone(), module.exports);
        self.imports.insert(path.clone(), module.imports);
        self.locals.insert(path.clone(), module.locals);
        self.types.insert(path, module.types);
        self.files.push(file);
    }

    /// Normalized paths of every file
    pub fn file_set(&self) -> HashSet<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Sequential builder: reads each file through the run's source cache
/// and extracts its syntax
pub struct ProjectBuilder<'a> {
    sources: &'a SourceCache,
    parser: SourceParser,
    options: ExtractOptions,
    project: ParsedProject,
}

impl<'a> ProjectBuilder<'a> {
    pub fn new(sources: &'a SourceCache, options: ExtractOptions) -> Self {
        Self {
            sources,
            parser: SourceParser::new(),
            options,
            project: ParsedProject::new(),
        }
    }

    /// Process a source file; unreadable or unparsable files count as empty
    pub fn process_file(&mut self, file: &SourceFile) -> Result<()> {
        let module = match self.sources.get(&file.path) {
            Some(text) => match self.parser.extract(file.file_type, &text, self.options) {
                Ok(module) => module,
                Err(e) => {
                    debug!("Parse error in {} (continuing): {}", file.path, e);
                    ModuleSyntax::default()
                }
            },
            None => ModuleSyntax::default(),
        };

        debug!(
            "Extracted {}: {} exports, {} imports",
            file.path,
            module.exports.local_named.len() + usize::from(module.exports.has_default),
            module.imports.len()
        );

        self.project.insert(file.clone(), module);
        Ok(())
    }

    pub fn build(self) -> ParsedProject {
        self.project
    }

    /// Process every file in order
    pub fn build_from_files(mut self, files: &[SourceFile]) -> Result<ParsedProject> {
        for file in files {
            self.process_file(file)?;
        }
        Ok(self.build())
    }
}
