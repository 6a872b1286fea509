//! JUnit Report CLI Application
//!
//! This is the command-line interface for the JUnit report library.
//! It adds:
//! - Report generation from a directory of JUnit XML files
//! - Decoration of existing HTML reports
//! - config.toml support with command-line overrides
//! - JSON export of the per-suite summary

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use junit_report::{html_import, junit, ReportBuilder, ReportConfig, ReportDecorator, SuiteSummary};
use std::path::{Path, PathBuf};

mod config;

use config::AppConfig;

/// JUnit Report - Build and decorate HTML test reports
#[derive(Parser, Debug)]
#[command(name = "junit-report")]
#[command(about = "Build and decorate HTML reports from JUnit XML results", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an HTML report from a directory of JUnit XML files
    Generate(GenerateArgs),
    /// Decorate an existing HTML report
    Decorate(DecorateArgs),
}

#[derive(ClapArgs, Debug, Default)]
struct GenerateArgs {
    /// Directory containing JUnit *.xml files
    #[arg(short, long, value_name = "DIR")]
    junit_dir: Option<PathBuf>,

    /// HTML file to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Stylesheet to embed instead of the built-in one
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Script to embed in the page head
    #[arg(long, value_name = "FILE")]
    js: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Leave out the Steps column
    #[arg(long)]
    no_steps: bool,

    /// Write the report without colors, fonts or links
    #[arg(long)]
    no_decorate: bool,

    /// Do not link summary rows to their sections
    #[arg(long)]
    no_links: bool,

    /// Also write the per-suite summary as JSON
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct DecorateArgs {
    /// HTML report to decorate
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the result (default: overwrite the input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Do not link summary rows to their sections
    #[arg(long)]
    no_links: bool,
}

/// Fully resolved settings for one `generate` run
#[derive(Debug, Clone, PartialEq)]
struct GeneratePlan {
    junit_dir: PathBuf,
    output: PathBuf,
    summary_json: Option<PathBuf>,
    report: ReportConfig,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("JUnit Report CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using report library v{}", junit_report::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    match &args.command {
        Command::Generate(generate) => {
            let plan = resolve_generate(generate, app_config)?;
            generate_mode(&plan, args.quiet)
        }
        Command::Decorate(decorate) => decorate_mode(decorate, &app_config, args.quiet),
    }
}

/// Merge config file values with command-line flags (flags win)
fn resolve_generate(args: &GenerateArgs, config: AppConfig) -> Result<GeneratePlan> {
    let junit_dir = args
        .junit_dir
        .clone()
        .or(config.input.junit_dir)
        .context("No JUnit directory given (use --junit-dir or [input] junit_dir)")?;
    let output = args
        .output
        .clone()
        .or(config.output.file)
        .unwrap_or_else(|| PathBuf::from("index.html"));

    let mut report = config.report;
    if let Some(css) = &args.css {
        report = report.with_stylesheet(css);
    }
    if let Some(js) = &args.js {
        report = report.with_script(js);
    }
    if let Some(title) = &args.title {
        report = report.with_title(title.as_str());
    }
    if args.no_steps {
        report = report.with_steps_column(false);
    }
    if args.no_decorate {
        report = report.with_decoration(false);
    }
    if args.no_links {
        report = report.with_summary_links(false);
    }

    Ok(GeneratePlan {
        junit_dir,
        output,
        summary_json: args.summary_json.clone().or(config.output.summary_json),
        report,
    })
}

/// Generate mode - load JUnit files, build the report, write it out
fn generate_mode(plan: &GeneratePlan, quiet: bool) -> Result<()> {
    let files = junit::find_junit_files(&plan.junit_dir)
        .with_context(|| format!("Failed to list JUnit directory: {:?}", plan.junit_dir))?;
    if files.is_empty() {
        log::warn!("No JUnit XML files found in {:?}", plan.junit_dir);
    }

    let mut suites = Vec::with_capacity(files.len());
    for path in &files {
        let suite = junit::parse_junit_file(path)
            .with_context(|| format!("Failed to load JUnit file: {:?}", path))?;
        suites.push(suite);
    }

    let html = ReportBuilder::new(plan.report.clone())
        .build_html(&suites)
        .context("Failed to build report")?;
    write_file(&plan.output, &html)?;

    let summaries: Vec<SuiteSummary> = suites.iter().map(|s| s.summary()).collect();
    if let Some(json_path) = &plan.summary_json {
        let json = serde_json::to_string_pretty(&summaries)?;
        write_file(json_path, &json)?;
    }

    if !quiet {
        println!("✓ Report written: {:?}", plan.output);
        for summary in &summaries {
            println!(
                "  {}: {} executed, {} failures, {} errors, {} passing",
                summary.name,
                summary.executed,
                summary.failures,
                summary.errors,
                summary.percent_label()
            );
        }
    }
    Ok(())
}

/// Decorate mode - import an HTML report, decorate it, write it back
fn decorate_mode(args: &DecorateArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let mut doc = html_import::read_html_file(&args.input)
        .with_context(|| format!("Failed to read HTML report: {:?}", args.input))?;

    let links = config.report.summary_links && !args.no_links;
    let stats = ReportDecorator::new()
        .with_summary_links(links)
        .decorate(&mut doc);

    let output = args.output.as_ref().unwrap_or(&args.input);
    write_file(output, &doc.to_html())?;

    if !quiet {
        println!("✓ Report decorated: {:?}", output);
        println!(
            "  {} passed, {} failed/error, {} step cells, {} summary links",
            stats.passed_cells, stats.failed_cells, stats.step_cells, stats.summary_links
        );
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))?;
    log::info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
