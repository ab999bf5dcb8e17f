use super::usage::UsageMatcher;
use super::ExportName;
use crate::graph::{ExportGraphResolver, ModuleResolver, RawExportMap};
use crate::parser::TypeSurface;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Unused type declarations, exported and file-local
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeUsageReport {
    pub unused_exported_types: Vec<ExportName>,
    pub unused_local_types: Vec<ExportName>,
}

/// Runs the export pipeline over type declarations
///
/// Exported interfaces and type aliases are resolved through the same
/// export graph as runtime symbols. Only type-only imports, and `NS.Type`
/// references through a type-only namespace import, mark them used.
pub struct TypeUsageAnalyzer<'a> {
    modules: &'a ModuleResolver<'a>,
}

impl<'a> TypeUsageAnalyzer<'a> {
    pub fn new(modules: &'a ModuleResolver<'a>) -> Self {
        Self { modules }
    }

    pub fn analyze(&self, surfaces: &IndexMap<String, TypeSurface>) -> TypeUsageReport {
        let raw: RawExportMap = surfaces
            .iter()
            .map(|(file, surface)| (file.clone(), surface.exports.clone()))
            .collect();
        let resolved = ExportGraphResolver::new(&raw, self.modules).resolve_all();

        let mut matcher = UsageMatcher::new(&resolved);
        for (file, surface) in surfaces {
            for import in &surface.imports {
                let Some(target) = self.modules.resolve_to_file(file, &import.specifier) else {
                    continue;
                };
                matcher.mark_import(&target, &import.names);

                if let Some(members) = import
                    .namespace
                    .as_ref()
                    .and_then(|ns| surface.qualified.get(ns))
                {
                    let members: Vec<String> = members.iter().cloned().collect();
                    matcher.mark_import(&target, &members);
                }
            }
        }
        let usage = matcher.finish(&raw);

        let unused_exported_types: Vec<ExportName> = usage
            .unused_pairs()
            .map(|(file, name)| ExportName::new(file, name))
            .collect();

        let unused_local_types: Vec<ExportName> = surfaces
            .iter()
            .flat_map(|(file, surface)| {
                surface
                    .local_types()
                    .filter(|name| !surface.referenced.contains(*name))
                    .map(move |name| ExportName::new(file, name))
            })
            .collect();

        debug!(
            "Types: {} unused exported, {} unused local",
            unused_exported_types.len(),
            unused_local_types.len()
        );

        TypeUsageReport {
            unused_exported_types,
            unused_local_types,
        }
    }
}
