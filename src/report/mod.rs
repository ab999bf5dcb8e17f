mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::{AnalysisReport, LocalUsage};
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    /// Parse a configured format name; unknown names fall back to terminal
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Terminal,
        }
    }
}

/// Detail sections printed after the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSections {
    pub exports: bool,
    pub files: bool,
    pub locals: bool,
    pub types: bool,
}

impl Default for ReportSections {
    fn default() -> Self {
        Self {
            exports: true,
            files: true,
            locals: true,
            types: true,
        }
    }
}

/// Reporter for outputting analysis results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    sections: ReportSections,
    summary_only: bool,
    verbose: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            sections: ReportSections::default(),
            summary_only: false,
            verbose: false,
        }
    }

    pub fn with_sections(mut self, sections: ReportSections) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Report the findings of a project analysis
    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new(self.sections)
                .with_summary_only(self.summary_only)
                .with_verbose(self.verbose)
                .report(report),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(report),
        }
    }

    /// Report the result of a single-file local identifier analysis
    pub fn report_locals(&self, file: &str, usage: &LocalUsage) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => {
                TerminalReporter::new(self.sections).report_locals(file, usage);
                Ok(())
            }
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report_locals(file, usage),
        }
    }
}
