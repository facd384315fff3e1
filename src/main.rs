use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

use depscope::analysis::SegmentPolicy;
use depscope::export::{self, text::verdict_lines, ExportData, ExportFormat};
use depscope::logging::init_logging;
use depscope::parser::PopulateOutcome;
use depscope::usage::{AnalyzerOptions, DependencyAnalyzer, MatchingMode};

#[derive(Parser)]
#[command(name = "depscope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Find and remove unused dependencies in Python projects", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Project root to scan (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    path: PathBuf,

    /// Manifest to read and edit (defaults to <path>/pyproject.toml)
    #[arg(short, long, global = true)]
    toml: Option<PathBuf>,

    /// Minimum similarity ratio for fuzzy matches, between 0 and 1
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Require an exact import-name match (no fuzzy matching)
    #[arg(long, global = true)]
    strict: bool,

    /// Which segments of dotted imports count as referenced: all, top-level
    #[arg(long, global = true)]
    segments: Option<SegmentPolicy>,

    /// File of standard-library module names, one per line
    #[arg(long, global = true)]
    stdlib_list: Option<PathBuf>,

    /// Output format: text, json, plain, markdown
    #[arg(short, long, default_value = "text", global = true)]
    format: ExportFormat,

    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report declared dependencies that nothing uses (default)
    Check {
        /// Remove unused dependencies from the manifest
        #[arg(long)]
        fix: bool,

        /// Do not ask for confirmation before removing
        #[arg(short, long)]
        yes: bool,
    },
    /// List the packages the source tree uses
    Discover,
    /// Write discovered packages into an empty or missing manifest
    Generate {
        /// Replace existing dependencies
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let analyzer = build_analyzer(&cli.global)?;

    match cli.command {
        None => check(&analyzer, &cli.global, false, false),
        Some(Commands::Check { fix, yes }) => check(&analyzer, &cli.global, fix, yes),
        Some(Commands::Discover) => discover(&analyzer, &cli.global),
        Some(Commands::Generate { force }) => generate(&analyzer, force),
    }
}

fn build_analyzer(args: &GlobalArgs) -> Result<DependencyAnalyzer> {
    let options = AnalyzerOptions {
        root: args.path.clone(),
        manifest: args.toml.clone(),
        threshold: args.threshold,
        matching: args.strict.then_some(MatchingMode::Strict),
        segments: args.segments,
        stdlib_list: args.stdlib_list.clone(),
    };

    DependencyAnalyzer::new(options)
        .with_context(|| format!("Failed to set up analysis of {}", args.path.display()))
}

fn check(analyzer: &DependencyAnalyzer, args: &GlobalArgs, fix: bool, yes: bool) -> Result<()> {
    let report = analyzer
        .analyze()
        .with_context(|| format!("Failed to analyze {}", analyzer.root().display()))?;
    let data = ExportData::unused(&report);

    let mut stdout = std::io::stdout().lock();
    export::export(args.format, &data, &mut stdout).context("Failed to write report")?;
    drop(stdout);

    if args.verbose {
        for line in verdict_lines(&data) {
            eprintln!("  {}", line);
        }
    }

    let unused = report.unused();
    if !fix || unused.is_empty() {
        return Ok(());
    }

    if !yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Remove {} unused package(s) from {}?",
                unused.len(),
                analyzer.manifest().display()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !proceed {
            eprintln!("Aborted, manifest left unchanged.");
            return Ok(());
        }
    }

    let removal = analyzer
        .remove(&unused)
        .with_context(|| format!("Failed to update {}", analyzer.manifest().display()))?;

    for entry in &removal.removals {
        eprintln!("   -> Removed {} dependency: {}", entry.dialect, entry.entry);
    }
    if !removal.is_empty() {
        eprintln!(
            "✅ Updated {}. Remember to update your lock file!",
            removal.path.display()
        );
    }

    Ok(())
}

fn discover(analyzer: &DependencyAnalyzer, args: &GlobalArgs) -> Result<()> {
    let packages = analyzer
        .discover()
        .with_context(|| format!("Failed to scan {}", analyzer.root().display()))?;
    let data = ExportData::discovered(analyzer.root(), packages);

    let mut stdout = std::io::stdout().lock();
    export::export(args.format, &data, &mut stdout).context("Failed to write report")?;
    Ok(())
}

fn generate(analyzer: &DependencyAnalyzer, force: bool) -> Result<()> {
    let manifest = analyzer.manifest().display().to_string();
    let (packages, outcome) = analyzer
        .generate(force)
        .with_context(|| format!("Failed to generate {}", manifest))?;

    match outcome {
        PopulateOutcome::Written { added } => {
            println!("✅ Wrote {} dependencies to {}:", added, manifest);
            for package in &packages {
                println!("   - {}", package);
            }
        }
        PopulateOutcome::AlreadyPopulated => {
            println!(
                "⚠️  {} already declares dependencies. Use --force to replace them.",
                manifest
            );
        }
        PopulateOutcome::NothingDiscovered => {
            println!("No third-party packages found, {} left unchanged.", manifest);
        }
    }

    Ok(())
}
