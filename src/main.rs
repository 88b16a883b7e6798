// SPDX-License-Identifier: PMPL-1.0-or-later
//! Auditbot CLI - WCAG accessibility audits for static HTML

use anyhow::Context;
use auditbot::config::{self, AuditConfig};
use auditbot::publish::LoggingListener;
use auditbot::report::{self, OutputFormat};
use auditbot::store::{self, FileStore};
use auditbot::{repair, scanner, AuditResult, Auditor};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// WCAG accessibility auditor for HTML pages
#[derive(Parser)]
#[command(name = "auditbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a single HTML file
    Audit {
        /// File to audit
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write JSON and HTML exports into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Audit every HTML file below a directory
    Scan {
        /// Directory to scan
        dir: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Write one export per page into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Insert a skip link and a live region where missing
    Repair {
        /// File to repair
        file: PathBuf,

        /// Write the repaired page here (stdout if not specified)
        #[arg(long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input file
        #[arg(long)]
        in_place: bool,

        /// Configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the last stored report
    Show {
        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML page
    Html,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("auditbot=debug")
    } else {
        EnvFilter::new("auditbot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    config::load_config(&path).with_context(|| format!("loading {}", path.display()))
}

fn build_auditor(config: AuditConfig) -> Auditor {
    let store = FileStore::open(config.store_dir());
    let mut auditor = Auditor::new(config).with_store(Box::new(store));
    auditor.subscribe(Box::new(LoggingListener));
    auditor
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit { file, format, output, export_dir, config, verbose } => {
            init_logging(verbose);
            let mut auditor = build_auditor(load(config.as_deref())?);
            let result = auditor
                .audit_file(&file)
                .with_context(|| format!("auditing {}", file.display()))?;

            let rendered = report::generate_report(&result, format.into())?;
            write_output(&rendered, output.as_deref())?;
            if let Some(dir) = export_dir {
                export_all(&result, &dir)?;
            }

            if result.has_critical() {
                std::process::exit(1);
            }
        }

        Commands::Scan { dir, format, export_dir, config, verbose } => {
            init_logging(verbose);
            let mut auditor = build_auditor(load(config.as_deref())?);
            let results = scanner::scan_directory(&dir, &mut auditor);

            for result in &results {
                println!("{}", report::generate_report(result, format.into())?);
                if let Some(ref export_root) = export_dir {
                    // one subdirectory per page keeps same-millisecond exports apart
                    let page_dir = match result.source.as_deref() {
                        Some(source) => scanner::page_export_dir(export_root, &dir, Path::new(source)),
                        None => export_root.clone(),
                    };
                    export_all(result, &page_dir)?;
                }
            }

            if results.iter().any(AuditResult::has_critical) {
                std::process::exit(1);
            }
        }

        Commands::Repair { file, output, in_place, config, verbose } => {
            init_logging(verbose);
            let config = load(config.as_deref())?;
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let outcome = repair::repair(&source, &config.repairs)?;

            for applied in &outcome.applied {
                eprintln!("{}: {}", file.display(), applied);
            }
            let target = if in_place { Some(file.as_path()) } else { output.as_deref() };
            write_output(&outcome.html, target)?;
        }

        Commands::Show { format, config, verbose } => {
            init_logging(verbose);
            let config = load(config.as_deref())?;
            let store = FileStore::open(config.store_dir());
            match store::load_report(&store)? {
                Some(result) => println!("{}", report::generate_report(&result, format.into())?),
                None => {
                    eprintln!("No stored report in {}", store.dir().display());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Write the JSON and HTML exports for one result
fn export_all(result: &AuditResult, dir: &Path) -> anyhow::Result<()> {
    for format in [OutputFormat::Json, OutputFormat::Html] {
        let path = report::export(result, dir, format)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
