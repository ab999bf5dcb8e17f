use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use devoid::analysis::{AnalysisOptions, Analyzer, LocalIdentifierAnalyzer};
use devoid::config::Config;
use devoid::report::{ReportFormat, ReportSections, Reporter};

/// devoid - Find unused exports, unreachable files and dead locals in
/// JavaScript and TypeScript projects
#[derive(Parser, Debug)]
#[command(name = "devoid")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze local identifiers of a single file
    Internal {
        /// Source file to analyze
        file: PathBuf,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,

        /// Also track variables with a type annotation
        #[arg(long)]
        track_all_locals: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Working directory to run in (PATH is resolved against it)
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Patterns to ignore (can be specified multiple times)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Export names or files never reported (can be specified multiple times)
    #[arg(short, long)]
    retain: Vec<String>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show unused exports
    #[arg(long)]
    exports: bool,

    /// Show unused files
    #[arg(long)]
    files: bool,

    /// Show unused local identifiers
    #[arg(long, visible_alias = "identifiers")]
    locals: bool,

    /// Analyze type declarations and show unused types
    #[arg(long)]
    types: bool,

    /// Only print the summary counts
    #[arg(long)]
    summary_only: bool,

    /// Also track variables with a type annotation
    #[arg(long)]
    track_all_locals: bool,

    /// Enable parallel parsing
    #[arg(long)]
    parallel: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Internal {
            file,
            json,
            track_all_locals,
            no_color,
        }) => {
            init_logging(false, true);
            if no_color {
                colored::control::set_override(false);
            }
            run_internal(&file, json, track_all_locals)
        }
        None => {
            let args = cli.run;
            init_logging(args.verbose, args.quiet);
            if args.no_color {
                colored::control::set_override(false);
            }

            info!("devoid v{}", env!("CARGO_PKG_VERSION"));

            if let Some(cwd) = &args.cwd {
                enter_directory(cwd)?;
            }

            let config = load_config(&args)?;
            run_analysis(&config, &args)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn enter_directory(cwd: &Path) -> Result<()> {
    if !cwd.is_dir() {
        return Err(miette::miette!(
            "--cwd is not an existing directory: {}",
            cwd.display()
        ));
    }
    std::env::set_current_dir(cwd)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to enter {}", cwd.display()))
}

fn load_config(args: &RunArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&args.path)?
    };

    // Override with CLI arguments
    if !args.target.is_empty() {
        config.targets = args.target.clone();
    }
    if !args.ignore.is_empty() {
        config.exclude.extend(args.ignore.clone());
    }
    if !args.retain.is_empty() {
        config.retain_patterns.extend(args.retain.clone());
    }
    if args.track_all_locals {
        config.locals.track_all_locals = true;
    }

    Ok(config)
}

/// Explicit section flags win; otherwise the configured defaults apply
fn report_sections(config: &Config, args: &RunArgs) -> ReportSections {
    if args.exports || args.files || args.locals || args.types {
        return ReportSections {
            exports: args.exports,
            files: args.files,
            locals: args.locals,
            types: args.types,
        };
    }
    ReportSections {
        exports: config.section_enabled("exports"),
        files: config.section_enabled("files"),
        locals: config.section_enabled("locals"),
        types: config.section_enabled("types"),
    }
}

fn run_analysis(config: &Config, args: &RunArgs) -> Result<()> {
    let start_time = Instant::now();

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::from_name(&config.report.format)
    };

    // Type analysis only runs when asked for, by flag or configured section
    let include_types =
        args.types || config.report.sections.iter().any(|s| s == "types");

    let options = AnalysisOptions {
        track_all_locals: config.locals.track_all_locals,
        include_types,
        parallel: args.parallel,
        show_progress: !args.quiet && format == ReportFormat::Terminal,
    };

    if args.parallel && !args.quiet && format == ReportFormat::Terminal {
        println!("{}", "⚡ Parallel mode".cyan());
    }

    let report = Analyzer::new(config).with_options(options).analyze(&args.path)?;

    let reporter = Reporter::new(format, args.output.clone())
        .with_sections(report_sections(config, args))
        .with_summary_only(args.summary_only)
        .with_verbose(args.verbose);
    reporter.report(&report)?;

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn run_internal(file: &Path, json: bool, track_all_locals: bool) -> Result<()> {
    let usage = LocalIdentifierAnalyzer::new().analyze_file(file, track_all_locals)?;

    let format = if json {
        ReportFormat::Json
    } else {
        ReportFormat::Terminal
    };
    Reporter::new(format, None).report_locals(&file.display().to_string(), &usage)
}
