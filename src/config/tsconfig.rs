//! Module-resolution configuration (`tsconfig.json` / `jsconfig.json`)
//!
//! Only `compilerOptions.baseUrl` and `compilerOptions.paths` matter here.
//! Loading never fails the run: a missing or malformed file yields an
//! empty alias table.

use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAX_EXTENDS_DEPTH: usize = 8;

/// Alias patterns plus the directory their targets are relative to
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfig {
    /// Absolute `baseUrl`, when one is configured
    pub base_url: Option<PathBuf>,

    /// Directory of the config file that supplied `paths`
    pub config_dir: Option<PathBuf>,

    /// Alias pattern to target templates, in authored order
    pub paths: IndexMap<String, Vec<String>>,
}

impl ResolutionConfig {
    /// Directory alias targets resolve against
    pub fn alias_base(&self) -> Option<&Path> {
        self.base_url.as_deref().or(self.config_dir.as_deref())
    }

    pub fn has_aliases(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Load from `tsconfig.json`, falling back to `jsconfig.json`, in `root`
    pub fn load(root: &Path) -> Self {
        for name in ["tsconfig.json", "jsconfig.json"] {
            let path = root.join(name);
            if !path.exists() {
                continue;
            }
            return match Self::from_file(&path) {
                Ok(config) => {
                    debug!(
                        "Loaded {} with {} alias pattern(s)",
                        path.display(),
                        config.paths.len()
                    );
                    config
                }
                Err(e) => {
                    warn!("Ignoring module-resolution config {}: {:?}", path.display(), e);
                    Self::default()
                }
            };
        }
        Self::default()
    }

    /// Load one config file, following relative `extends`
    pub fn from_file(path: &Path) -> Result<Self> {
        let options = read_compiler_options(path, 0)?;
        Ok(options.into_config())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<String>,
    compiler_options: Option<RawCompilerOptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

/// Effective options after merging an `extends` chain
#[derive(Debug, Default)]
struct MergedOptions {
    base_url: Option<PathBuf>,
    paths: Option<(PathBuf, IndexMap<String, Vec<String>>)>,
}

impl MergedOptions {
    fn into_config(self) -> ResolutionConfig {
        let (config_dir, paths) = match self.paths {
            Some((dir, paths)) => (Some(dir), paths),
            None => (None, IndexMap::new()),
        };
        ResolutionConfig {
            base_url: self.base_url,
            config_dir,
            paths,
        }
    }
}

fn read_compiler_options(path: &Path, depth: usize) -> Result<MergedOptions> {
    if depth > MAX_EXTENDS_DEPTH {
        warn!("tsconfig extends chain too deep at {}", path.display());
        return Ok(MergedOptions::default());
    }

    let raw = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let parsed: RawTsConfig = serde_json::from_str(&sanitize_jsonc(&raw))
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

    let config_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    // Parent first, then the child overrides
    let mut merged = match parsed.extends.as_deref() {
        Some(ext) if ext.starts_with('.') => match resolve_extends(&config_dir, ext) {
            Some(parent) => read_compiler_options(&parent, depth + 1).unwrap_or_else(|e| {
                warn!("Ignoring extended config {}: {:?}", parent.display(), e);
                MergedOptions::default()
            }),
            None => MergedOptions::default(),
        },
        Some(ext) => {
            debug!("Not following package extends: {}", ext);
            MergedOptions::default()
        }
        None => MergedOptions::default(),
    };

    if let Some(options) = parsed.compiler_options {
        if let Some(base_url) = options.base_url {
            merged.base_url = Some(config_dir.join(base_url));
        }
        if let Some(paths) = options.paths {
            merged.paths = Some((config_dir, paths));
        }
    }

    Ok(merged)
}

fn resolve_extends(config_dir: &Path, raw: &str) -> Option<PathBuf> {
    let candidate = config_dir.join(raw);
    if candidate.is_file() {
        return Some(candidate);
    }
    let with_json = PathBuf::from(format!("{}.json", candidate.display()));
    if with_json.is_file() {
        return Some(with_json);
    }
    let nested = candidate.join("tsconfig.json");
    nested.is_file().then_some(nested)
}

/// Turn JSON-with-comments into plain JSON
pub fn sanitize_jsonc(input: &str) -> String {
    strip_trailing_commas(&strip_comments(input))
}

/// Drop commas that directly precede `}` or `]`, outside of string literals
fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();
    let mut in_string = false;

    while let Some((i, c)) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if input[i + 1..].trim_start().starts_with(&['}', ']'][..]) => {}
            _ => out.push(c),
        }
    }

    out
}

/// Remove `//` and `/* */` comments outside of string literals
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}
