use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a devoid analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sub-directories of the project root to scan (empty = whole root)
    pub targets: Vec<PathBuf>,

    /// Patterns to exclude from analysis
    pub exclude: Vec<String>,

    /// Export names or file paths that are never reported
    pub retain_patterns: Vec<String>,

    /// Extra entry point files, relative to the project root
    pub entry_points: Vec<String>,

    /// Local identifier analysis configuration
    pub locals: LocalsConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalsConfig {
    /// Also track variables that carry a type annotation
    pub track_all_locals: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Sections shown by default: exports, files, locals, types
    pub sections: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
                "**/coverage/**".to_string(),
                "**/.git/**".to_string(),
            ],
            retain_patterns: vec![],
            entry_points: vec![],
            locals: LocalsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            sections: vec![],
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".devoid.yml",
            ".devoid.yaml",
            ".devoid.toml",
            "devoid.yml",
            "devoid.yaml",
            "devoid.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check if a path is excluded by a glob or a plain substring pattern
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, &path_str)
            } else {
                path_str.contains(pattern.as_str())
            }
        })
    }

    /// Check if an export name should never be reported
    pub fn should_retain(&self, name: &str) -> bool {
        self.retain_patterns.iter().any(|p| glob_match(p, name))
    }

    /// Check if a file should never be reported
    pub fn should_retain_file(&self, path: &str) -> bool {
        self.retain_patterns
            .iter()
            .any(|p| glob_match(p, path) || (!p.contains('*') && path.ends_with(p.as_str())))
    }

    /// Whether a report section is enabled by default
    pub fn section_enabled(&self, section: &str) -> bool {
        self.report.sections.is_empty() || self.report.sections.iter().any(|s| s == section)
    }
}

/// Simple glob matching for patterns like "use*", "*Props" or "**/generated/**"
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.starts_with('*') && !pattern.contains('/') && pattern.matches('*').count() == 1 {
        return text.ends_with(&pattern[1..]);
    }

    if pattern.ends_with('*') && !pattern.contains('/') && pattern.matches('*').count() == 1 {
        return text.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains("**") {
        // "**/dir/**" matches the directory as a whole path segment only
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern
                .trim_start_matches("**/")
                .trim_end_matches("/**")
                .trim_matches('/');
            return text.contains(&format!("/{}/", dir_name))
                || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return suffix_match(suffix, text);
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && suffix_match(suffix, text);
        }
    }

    text == pattern
}

/// "*.test.ts" style suffix inside a path pattern
fn suffix_match(suffix: &str, text: &str) -> bool {
    match suffix.strip_prefix('*') {
        Some(ext) if !ext.contains('*') => text.ends_with(ext),
        _ => text.ends_with(suffix) || text.contains(&format!("/{}", suffix)),
    }
}
