//! `apographon` CLI - Reconstruct page flow from OCR book HTML

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmd::convert::{cmd_convert, ConvertArgs};

#[derive(Parser)]
#[command(name = "apographon")]
#[command(about = "Rebuild logical paragraphs from page-segmented book HTML")]
#[command(version)]
struct Cli {
    /// Cleaned book HTML with one `div.page` per source page
    input: PathBuf,

    /// Output JSON path (default: <output-dir>/<input-stem>.json)
    output: Option<PathBuf>,

    /// Directory for the default output path
    #[arg(long, default_value = "data/documents")]
    output_dir: PathBuf,

    /// Configuration file (default: ~/.config/apographon/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the raw scanner fragments instead of merged paragraphs
    #[arg(long)]
    fragments: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    cmd_convert(ConvertArgs {
        input: cli.input,
        output: cli.output,
        output_dir: cli.output_dir,
        config: cli.config,
        fragments: cli.fragments,
    })
}
