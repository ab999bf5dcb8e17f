use crate::cache::{parent_dir, PathNormalizer};
use crate::config::ResolutionConfig;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Extensions probed when a specifier omits one, in priority order
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Outcome of resolving a module specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "path", rename_all = "camelCase")]
pub enum ResolvedModule {
    /// A file in the project set, normalized
    Project(String),
    /// External or unresolved; the raw specifier, unchanged
    External(String),
}

impl ResolvedModule {
    pub fn project_file(&self) -> Option<&str> {
        match self {
            ResolvedModule::Project(file) => Some(file),
            ResolvedModule::External(_) => None,
        }
    }
}

/// A `paths` entry from the module-resolution config
#[derive(Debug, Clone)]
struct AliasPattern {
    prefix: String,
    /// `None` for exact patterns without a wildcard
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasPattern {
    fn new(pattern: &str, targets: &[String]) -> Self {
        let (prefix, suffix) = match pattern.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (pattern.to_string(), None),
        };
        Self {
            prefix,
            suffix,
            targets: targets.to_vec(),
        }
    }

    /// Captured wildcard segment, or `""` for an exact match
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => {
                if specifier.len() < self.prefix.len() + suffix.len() {
                    return None;
                }
                specifier
                    .strip_prefix(self.prefix.as_str())?
                    .strip_suffix(suffix.as_str())
            }
        }
    }
}

/// Maps `(importing file, specifier)` to a project file
///
/// Both the full resolution and the per-base-path file probe are memoized
/// for the lifetime of the resolver, which is one analysis run.
pub struct ModuleResolver<'a> {
    files: &'a HashSet<String>,
    normalizer: &'a PathNormalizer,
    aliases: Vec<AliasPattern>,
    alias_base: Option<String>,
    resolutions: RefCell<HashMap<(String, String), ResolvedModule>>,
    probes: RefCell<HashMap<String, Option<String>>>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(
        files: &'a HashSet<String>,
        normalizer: &'a PathNormalizer,
        config: &ResolutionConfig,
    ) -> Self {
        let aliases = config
            .paths
            .iter()
            .map(|(pattern, targets)| AliasPattern::new(pattern, targets))
            .collect();
        let alias_base = config.alias_base().map(|p| normalizer.normalize_path(p));

        Self {
            files,
            normalizer,
            aliases,
            alias_base,
            resolutions: RefCell::new(HashMap::new()),
            probes: RefCell::new(HashMap::new()),
        }
    }

    /// Resolver without any alias table
    pub fn without_aliases(files: &'a HashSet<String>, normalizer: &'a PathNormalizer) -> Self {
        Self::new(files, normalizer, &ResolutionConfig::default())
    }

    /// Resolve `specifier` as written in `importer`
    pub fn resolve(&self, importer: &str, specifier: &str) -> ResolvedModule {
        let key = (importer.to_string(), specifier.to_string());
        if let Some(hit) = self.resolutions.borrow().get(&key) {
            return hit.clone();
        }

        let resolved = match self.resolve_uncached(importer, specifier) {
            Some(file) => ResolvedModule::Project(file),
            None => ResolvedModule::External(specifier.to_string()),
        };
        trace!("Resolved {} from {} -> {:?}", specifier, importer, resolved);

        self.resolutions.borrow_mut().insert(key, resolved.clone());
        resolved
    }

    /// Resolve to a project file, dropping external specifiers
    pub fn resolve_to_file(&self, importer: &str, specifier: &str) -> Option<String> {
        match self.resolve(importer, specifier) {
            ResolvedModule::Project(file) => Some(file),
            ResolvedModule::External(_) => None,
        }
    }

    /// Number of memoized resolutions and probes
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.resolutions.borrow().len(), self.probes.borrow().len())
    }

    fn resolve_uncached(&self, importer: &str, specifier: &str) -> Option<String> {
        if is_relative(specifier) {
            let base = self.normalizer.join(parent_dir(importer), specifier);
            if let Some(file) = self.probe(&base) {
                return Some(file);
            }
        }

        self.resolve_alias(specifier)
    }

    fn resolve_alias(&self, specifier: &str) -> Option<String> {
        let alias_base = self.alias_base.as_deref()?;

        for alias in &self.aliases {
            let Some(captured) = alias.capture(specifier) else {
                continue;
            };
            for target in &alias.targets {
                let substituted = target.replacen('*', captured, 1);
                let base = self.normalizer.join(alias_base, &substituted);
                if let Some(file) = self.probe(&base) {
                    return Some(file);
                }
            }
        }

        None
    }

    /// Find the project file a normalized base path refers to
    fn probe(&self, base: &str) -> Option<String> {
        if let Some(hit) = self.probes.borrow().get(base) {
            return hit.clone();
        }

        let found = candidate_paths(base)
            .into_iter()
            .find(|candidate| self.files.contains(candidate));

        self.probes
            .borrow_mut()
            .insert(base.to_string(), found.clone());
        found
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Candidate files for a base path: exact, extensions, index files,
/// then build-output extensions swapped for source ones
fn candidate_paths(base: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(1 + SOURCE_EXTENSIONS.len() * 2);
    candidates.push(base.to_string());

    for ext in SOURCE_EXTENSIONS {
        candidates.push(format!("{}.{}", base, ext));
    }
    for ext in SOURCE_EXTENSIONS {
        candidates.push(format!("{}/index.{}", base, ext));
    }

    if let Some((stem, ext)) = split_extension(base) {
        for swapped in source_extensions_for(ext) {
            candidates.push(format!("{}.{}", stem, swapped));
        }
    }

    candidates
}

/// Split the extension off the last path segment
pub fn split_extension(path: &str) -> Option<(&str, &str)> {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dot = path[file_start..].rfind('.')?;
    if dot == 0 {
        return None;
    }
    let dot = file_start + dot;
    Some((&path[..dot], &path[dot + 1..]))
}

/// Source extensions a build-output extension may have been compiled from
pub fn source_extensions_for(ext: &str) -> &'static [&'static str] {
    match ext {
        "js" | "jsx" => &["ts", "tsx"],
        "mjs" => &["mts"],
        "cjs" => &["cts"],
        _ => &[],
    }
}
