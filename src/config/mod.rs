mod loader;
mod tsconfig;

pub use loader::{glob_match, Config, LocalsConfig, ReportConfig};
pub use tsconfig::{sanitize_jsonc, ResolutionConfig};
