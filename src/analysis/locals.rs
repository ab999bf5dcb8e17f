use crate::discovery::FileType;
use crate::parser::{extract_local_symbols, LocalSymbols, SourceParser};
use indexmap::IndexMap;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Declared, referenced and unused identifiers of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUsage {
    pub declared: Vec<String>,
    pub referenced: Vec<String>,
    pub unused: Vec<String>,
}

impl From<&LocalSymbols> for LocalUsage {
    fn from(symbols: &LocalSymbols) -> Self {
        let unused = symbols
            .declared
            .iter()
            .filter(|name| !symbols.referenced.contains(*name))
            .cloned()
            .collect();
        Self {
            declared: symbols.declared.iter().cloned().collect(),
            referenced: symbols.referenced.iter().cloned().collect(),
            unused,
        }
    }
}

/// Single-file analysis of declared versus referenced identifiers
///
/// Independent of the module graph: a local is unused when its name never
/// appears outside its own declaration in the same file.
pub struct LocalIdentifierAnalyzer;

impl LocalIdentifierAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Unused locals of every file, formatted `<file>:<identifier>`
    pub fn unused_identifiers(&self, locals: &IndexMap<String, LocalSymbols>) -> Vec<String> {
        let mut unused = Vec::new();
        for (file, symbols) in locals {
            for name in LocalUsage::from(symbols).unused {
                unused.push(format!("{}:{}", file, name));
            }
        }
        debug!("{} unused local identifier(s)", unused.len());
        unused
    }

    /// Read, parse and analyze one file; unlike project analysis a missing
    /// or unreadable file is an error here
    pub fn analyze_file(&self, path: &Path, track_all_locals: bool) -> Result<LocalUsage> {
        let file_type = FileType::from_path(path)
            .ok_or_else(|| miette!("Not a JavaScript or TypeScript source: {}", path.display()))?;
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        let tree = SourceParser::new().parse(file_type, &source)?;
        let symbols = extract_local_symbols(tree.root_node(), &source, track_all_locals);
        Ok(LocalUsage::from(&symbols))
    }
}

impl Default for LocalIdentifierAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
