//! CLI parser and command dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "contpal")]
#[command(about = "Business report ingestion and word frequency analysis")]
#[command(version)]
pub struct Cli {
    /// Data directory holding the database and stored documents
    /// (overrides config file).
    #[arg(long, short = 't', global = true)]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a ZIP bundle of reports
    Ingest {
        /// Path to the bundle
        bundle: PathBuf,
    },
    /// Process a single report file outside a bundle
    Process {
        /// Path to a .pdf, .docx or .txt file
        file: PathBuf,
    },
    /// Manage the company catalog
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    /// Show the most frequent words for a year
    Top {
        /// Fiscal year (0 lists undetected-year documents)
        #[arg(long)]
        year: u32,
        /// Number of words to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Check availability of external extraction tools
    Check,
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Add one company
    Add {
        /// Canonical legal name
        name: String,
        /// Tax identifier (RUC)
        ruc: String,
    },
    /// List the catalog in resolution order
    List,
    /// Seed the catalog from a CSV file with name,ruc columns
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), cli.target.as_deref())?;

    match cli.command {
        Commands::Ingest { bundle } => commands::cmd_ingest(&settings, &bundle),
        Commands::Process { file } => commands::cmd_process(&settings, &file),
        Commands::Company { command } => match command {
            CompanyCommands::Add { name, ruc } => commands::cmd_company_add(&settings, &name, &ruc),
            CompanyCommands::List => commands::cmd_company_list(&settings),
            CompanyCommands::Import { file } => commands::cmd_company_import(&settings, &file),
        },
        Commands::Top { year, limit } => commands::cmd_top(&settings, year, limit),
        Commands::Check => commands::cmd_check(),
    }
}
