use super::ReportSections;
use crate::analysis::{AnalysisReport, ExportName, LivenessMode, LocalUsage};
use colored::Colorize;
use indexmap::IndexMap;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    sections: ReportSections,
    summary_only: bool,
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(sections: ReportSections) -> Self {
        Self {
            sections,
            summary_only: false,
            verbose: false,
        }
    }

    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        if self.verbose {
            self.print_diagnostics(report);
        }

        self.print_summary(report);

        if report.is_clean() {
            println!("{}", "No dead code found!".green().bold());
            return Ok(());
        }
        if self.summary_only {
            return Ok(());
        }

        let root = report.root.as_str();

        if self.sections.files && !report.unused_files.is_empty() {
            print_header("Unused files", report.unused_files.len());
            for file in &report.unused_files {
                println!("  {}", relative(root, file).cyan());
            }
            println!();
        }

        if self.sections.exports && !report.unused_exports.is_empty() {
            print_header("Unused exports", report.unused_exports.len());
            print_grouped(root, &report.unused_exports);
        }

        if self.sections.types {
            if let Some(types) = &report.types {
                if !types.unused_exported_types.is_empty() {
                    print_header("Unused exported types", types.unused_exported_types.len());
                    print_grouped(root, &types.unused_exported_types);
                }
                if !types.unused_local_types.is_empty() {
                    print_header("Unused local types", types.unused_local_types.len());
                    print_grouped(root, &types.unused_local_types);
                }
            }
        }

        if self.sections.locals && !report.unused_identifiers.is_empty() {
            print_header("Unused identifiers", report.unused_identifiers.len());
            let identifiers: Vec<ExportName> = report
                .unused_identifiers
                .iter()
                .filter_map(|entry| entry.rsplit_once(':'))
                .map(|(file, name)| ExportName::new(file, name))
                .collect();
            print_grouped(root, &identifiers);
        }

        Ok(())
    }

    /// Print a single-file local identifier analysis
    pub fn report_locals(&self, file: &str, usage: &LocalUsage) {
        println!("{}", file.cyan().bold());
        println!("  {} {}", "declared:  ".dimmed(), usage.declared.join(", "));
        println!("  {} {}", "referenced:".dimmed(), usage.referenced.join(", "));
        if usage.unused.is_empty() {
            println!("  {}", "No unused identifiers".green());
        } else {
            println!("  {} {}", "unused:    ".dimmed(), usage.unused.join(", ").yellow());
        }
    }

    fn print_summary(&self, report: &AnalysisReport) {
        println!();
        println!("{}", "Summary".bold());
        println!("{}", "─".repeat(60).dimmed());
        println!("  Files analyzed:       {}", report.stats.files);
        if self.sections.files {
            println!("  Unused files:         {}", count(report.unused_files.len()));
        }
        if self.sections.exports {
            println!("  Unused exports:       {}", count(report.unused_exports.len()));
        }
        if self.sections.types {
            if let Some(types) = &report.types {
                println!(
                    "  Unused exported types: {}",
                    count(types.unused_exported_types.len())
                );
                println!(
                    "  Unused local types:   {}",
                    count(types.unused_local_types.len())
                );
            }
        }
        if self.sections.locals {
            println!(
                "  Unused identifiers:   {}",
                count(report.unused_identifiers.len())
            );
        }
        println!("{}", "─".repeat(60).dimmed());
        println!();
    }

    fn print_diagnostics(&self, report: &AnalysisReport) {
        let root = report.root.as_str();
        println!();
        match report.liveness_mode {
            LivenessMode::EntryPoints => {
                println!(
                    "{}",
                    format!("Entry points ({}):", report.entry_points.len()).bold()
                );
                for file in &report.entry_points.all {
                    println!("  {}", relative(root, file).green());
                }
            }
            LivenessMode::Orphans => {
                println!(
                    "{}",
                    "No entry points found, reporting orphan files instead".yellow()
                );
            }
        }

        let stats = &report.stats;
        println!(
            "{}",
            format!(
                "Dependency graph: {} files, {} edges, {} import records ({} wildcard)",
                stats.files, stats.dependency_edges, stats.import_records, stats.wildcard_imports
            )
            .dimmed()
        );
        println!(
            "{}",
            format!(
                "Resolution cache: {} lookups, {} probes",
                stats.memoized_resolutions, stats.memoized_probes
            )
            .dimmed()
        );
    }
}

fn print_header(title: &str, n: usize) {
    println!("{}", format!("{} ({}):", title, n).yellow().bold());
}

/// Print names grouped under their file, in report order
fn print_grouped(root: &str, names: &[ExportName]) {
    let mut by_file: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for entry in names {
        by_file.entry(entry.file.as_str()).or_default().push(&entry.name);
    }

    for (file, names) in by_file {
        println!("  {}", relative(root, file).cyan());
        for name in names {
            println!("    {} {}", "→".dimmed(), name.white());
        }
    }
    println!();
}

fn count(n: usize) -> colored::ColoredString {
    if n == 0 {
        n.to_string().green()
    } else {
        n.to_string().yellow().bold()
    }
}

/// Path relative to the project root, for display
fn relative<'a>(root: &str, file: &'a str) -> &'a str {
    file.strip_prefix(root)
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(file)
}
