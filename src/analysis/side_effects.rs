use once_cell::sync::Lazy;
use regex::Regex;

static SIDE_EFFECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // global timers
        r"\bsetTimeout\s*\(",
        r"\bsetInterval\s*\(",
        // console and process interaction
        r"\bconsole\.[a-zA-Z]+\s*\(",
        r"\bprocess\.",
        // top-level instantiation
        r"\bnew\s+[A-Za-z_$][A-Za-z0-9_$]*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid side-effect pattern"))
    .collect()
});

/// Pattern-based guess whether evaluating a module matters beyond its exports
///
/// Conservative, not a proof: a file reported as side-effect free may still
/// have effects the patterns do not cover. Immediately-invoked functions are
/// found on the syntax tree at parse time and passed in as `top_level_iife`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SideEffectDetector;

impl SideEffectDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn has_side_effects(&self, text: &str, top_level_iife: bool) -> bool {
        if text.trim().is_empty() || is_exports_only(text) {
            return false;
        }
        top_level_iife || SIDE_EFFECT_PATTERNS.iter().any(|re| re.is_match(text))
    }
}

/// Every meaningful line is a top-level `export` statement
fn is_exports_only(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .all(|line| line.starts_with("export "))
}
