use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use apographon::{convert_html, scan_html, Config};

use super::output::{resolve_output_path, write_json};

pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub fragments: bool,
}

pub fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let output = resolve_output_path(&args.input, args.output, &args.output_dir);

    if args.fragments {
        let fragments = scan_html(&html, &config)
            .with_context(|| format!("failed to scan {}", args.input.display()))?;
        write_json(&output, &fragments)?;
        info!(fragments = fragments.len(), path = %output.display(), "wrote fragments");
        println!("Wrote {} fragments to {}", fragments.len(), output.display());
        return Ok(());
    }

    let envelope = convert_html(&html, &config, chrono::Utc::now())
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    let count = envelope.document.paragraphs.len();
    write_json(&output, &envelope)?;
    info!(paragraphs = count, path = %output.display(), "wrote document");
    println!("Wrote {count} logical paragraphs to {}", output.display());
    Ok(())
}
