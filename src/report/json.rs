use crate::analysis::{AnalysisReport, LocalUsage};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    /// Serialize the whole report, intermediate graphs included
    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report).into_diagnostic()?;
        self.emit(&json)
    }

    pub fn report_locals(&self, file: &str, usage: &LocalUsage) -> Result<()> {
        #[derive(Serialize)]
        struct FileLocals<'a> {
            file: &'a str,
            #[serde(flatten)]
            usage: &'a LocalUsage,
        }

        let json = serde_json::to_string_pretty(&FileLocals { file, usage }).into_diagnostic()?;
        self.emit(&json)
    }

    fn emit(&self, json: &str) -> Result<()> {
        if let Some(path) = &self.output_path {
            std::fs::write(path, json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }
        Ok(())
    }
}
