// Parallel project builder using rayon

use super::builder::ParsedProject;
use crate::cache::SourceCache;
use crate::discovery::SourceFile;
use crate::parser::{ExtractOptions, ModuleSyntax, SourceParser};
use miette::Result;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Parsed file result
struct ParsedFile {
    text: Option<Arc<str>>,
    module: ModuleSyntax,
}

/// Parallel builder: reads and parses files on the rayon pool
///
/// Only the per-file phase runs in parallel. Results are merged back in
/// file order and the source texts are seeded into the run's cache so the
/// later sequential phases never re-read a file.
pub struct ParallelProjectBuilder {
    options: ExtractOptions,
}

impl ParallelProjectBuilder {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Build the project from source files using parallel processing
    pub fn build_from_files(
        &self,
        files: &[SourceFile],
        sources: &SourceCache,
    ) -> Result<ParsedProject> {
        info!("Parsing {} files in parallel...", files.len());

        let results: Vec<ParsedFile> = files
            .par_iter()
            .map_init(SourceParser::new, |parser, file| self.parse_file(parser, file))
            .collect();

        let mut project = ParsedProject::new();
        for (file, parsed) in files.iter().zip(results) {
            sources.insert(&file.path, parsed.text);
            project.insert(file.clone(), parsed.module);
        }

        Ok(project)
    }

    /// Parse a single file
    fn parse_file(&self, parser: &mut SourceParser, file: &SourceFile) -> ParsedFile {
        let text = match std::fs::read_to_string(&file.path) {
            Ok(text) => Some(Arc::<str>::from(text)),
            Err(e) => {
                debug!("Unreadable file {} ({}), treating as empty", file.path, e);
                None
            }
        };

        let module = match &text {
            Some(text) => parser
                .extract(file.file_type, text, self.options)
                .unwrap_or_else(|e| {
                    debug!("Parse error in {} (continuing): {}", file.path, e);
                    ModuleSyntax::default()
                }),
            None => ModuleSyntax::default(),
        };

        ParsedFile { text, module }
    }
}
