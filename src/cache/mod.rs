//! Run-scoped caches for a single analysis invocation
//!
//! Every cache here is created at the start of one `Analyzer::analyze` call
//! and dropped with it. Nothing is process-wide, so two analyses running in
//! the same process never observe each other's state.

use path_clean::PathClean;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Memoized path normalization
///
/// A normalized path is absolute, lexically cleaned of `.` and `..`,
/// slash-separated, and lowercased on case-insensitive platforms.
/// `normalize(normalize(p)) == normalize(p)` for every input.
#[derive(Debug)]
pub struct PathNormalizer {
    base: PathBuf,
    cache: RefCell<HashMap<String, String>>,
}

impl PathNormalizer {
    /// Normalizer resolving relative paths against the process working directory
    pub fn new() -> Self {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_base(base)
    }

    /// Normalizer resolving relative paths against `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn normalize(&self, path: &str) -> String {
        if let Some(hit) = self.cache.borrow().get(path) {
            return hit.clone();
        }

        let normalized = normalize_uncached(&self.base, path);
        self.cache
            .borrow_mut()
            .insert(path.to_string(), normalized.clone());
        normalized
    }

    pub fn normalize_path(&self, path: &Path) -> String {
        self.normalize(&path.to_string_lossy())
    }

    /// Join `relative` onto a directory and normalize the result
    pub fn join(&self, dir: &str, relative: &str) -> String {
        if Path::new(relative).is_absolute() {
            return self.normalize(relative);
        }
        self.normalize(&format!("{}/{}", dir.trim_end_matches('/'), relative))
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_uncached(base: &Path, raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let path = Path::new(&unified);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let cleaned = absolute.clean().to_string_lossy().replace('\\', "/");
    let cleaned = if cleaned.len() > 1 {
        cleaned.trim_end_matches('/').to_string()
    } else {
        cleaned
    };

    if cfg!(windows) {
        cleaned.to_lowercase()
    } else {
        cleaned
    }
}

/// Parent directory of a normalized path, itself normalized
pub fn parent_dir(normalized: &str) -> &str {
    match normalized.rfind('/') {
        Some(0) => "/",
        Some(idx) => &normalized[..idx],
        None => normalized,
    }
}

/// Source text cache keyed by normalized path
///
/// A cold read happens at most once per file. An unreadable file is cached
/// as `None` and treated by every consumer as an empty module.
#[derive(Debug, Default)]
pub struct SourceCache {
    texts: RefCell<HashMap<String, Option<Arc<str>>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the text of `path`, reading it from disk on first access
    pub fn get(&self, path: &str) -> Option<Arc<str>> {
        if let Some(hit) = self.texts.borrow().get(path) {
            trace!("Source cache hit: {}", path);
            return hit.clone();
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => Some(Arc::<str>::from(text)),
            Err(e) => {
                debug!("Unreadable file {} ({}), treating as empty", path, e);
                None
            }
        };
        self.texts
            .borrow_mut()
            .insert(path.to_string(), text.clone());
        text
    }

    /// Seed the cache with text read elsewhere (e.g. on a worker thread)
    pub fn insert(&self, path: &str, text: Option<Arc<str>>) {
        self.texts.borrow_mut().insert(path.to_string(), text);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.texts.borrow().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.texts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.borrow().is_empty()
    }
}

/// All caches shared by the components of one analysis run
#[derive(Debug, Default)]
pub struct RunCache {
    pub paths: PathNormalizer,
    pub sources: SourceCache,
}

impl RunCache {
    pub fn new() -> Self {
        Self {
            paths: PathNormalizer::new(),
            sources: SourceCache::new(),
        }
    }
}
