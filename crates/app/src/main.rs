//! Command-line front end: scan receipts, keep a history, export sheets.

mod commands;
mod render;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{config, export, history, scan};

/// Struk - read items and totals from scanned receipts
#[derive(Parser)]
#[command(name = "struk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR a receipt image and extract its items
    Scan(scan::ScanArgs),

    /// Extract items from OCR text (file or stdin)
    Parse(scan::ParseArgs),

    /// List past scans, most recent first
    History(history::HistoryArgs),

    /// Show a stored scan
    Show(history::ShowArgs),

    /// Remove a stored scan
    Delete(history::DeleteArgs),

    /// Export a stored scan as a spreadsheet
    Export(export::ExportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config;

    match cli.command {
        Commands::Scan(args) => scan::run_scan(args, config_path.as_deref()).await,
        Commands::Parse(args) => scan::run_parse(args, config_path.as_deref()).await,
        Commands::History(args) => history::run_history(args, config_path.as_deref()).await,
        Commands::Show(args) => history::run_show(args, config_path.as_deref()).await,
        Commands::Delete(args) => history::run_delete(args, config_path.as_deref()).await,
        Commands::Export(args) => export::run(args, config_path.as_deref()).await,
        Commands::Config(args) => config::run(args, config_path.as_deref()),
    }
}
