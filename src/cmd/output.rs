use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use apographon::document::to_json;

/// `<output_dir>/<input-stem>.json` unless an explicit path was given.
pub fn resolve_output_path(input: &Path, output: Option<PathBuf>, output_dir: &Path) -> PathBuf {
    output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map_or_else(|| "document".into(), |stem| stem.to_string_lossy());
        output_dir.join(format!("{stem}.json"))
    })
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = to_json(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
