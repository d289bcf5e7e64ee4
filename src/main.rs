use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use patternscope::analysis::analyze_project;
use patternscope::config::AnalyzerConfig;
use patternscope::export::{export, ExportData, ExportFormat};

#[derive(Parser)]
#[command(name = "patternscope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version = "0.1.0")]
#[command(about = "Catalog the design patterns exported by a TypeScript project", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze pattern exports in a project
    Analyze {
        /// Path to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Output format: json or markdown
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to <path>/patternscope.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep exports tagged @ignore in the report
        #[arg(long)]
        include_ignored: bool,
    },
    /// Show version information
    Version,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run_analyze(
    path: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    config_path: Option<&Path>,
    include_ignored: bool,
) -> Result<()> {
    let mut config = AnalyzerConfig::load(path, config_path)
        .with_context(|| format!("Failed to load configuration for {}", path.display()))?;
    if include_ignored {
        config.include_ignored = true;
    }

    let project = analyze_project(path, &config)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;

    log::info!(
        "{} pattern(s) in {} module(s)",
        project.pattern_count(),
        project.modules.len()
    );

    let project_name = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string());
    let data = ExportData::new(project_name, project);

    match output {
        Some(file) => {
            let handle = File::create(file)
                .with_context(|| format!("Failed to create {}", file.display()))?;
            let mut writer = BufWriter::new(handle);
            export(format, &data, &mut writer)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            writer.flush()?;
            eprintln!("Wrote {} report to {}", format, file.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export(format, &data, &mut writer).context("Failed to write report")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Analyze {
            path,
            format,
            output,
            config,
            include_ignored,
        }) => run_analyze(
            path,
            *format,
            output.as_deref(),
            config.as_deref(),
            *include_ignored,
        ),
        Some(Commands::Version) => {
            println!("patternscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            println!("PatternScope - Pattern catalog for TypeScript projects");
            println!("Run 'patternscope analyze' to analyze a project");
            println!("Run 'patternscope --help' for more information");
            Ok(())
        }
    }
}
