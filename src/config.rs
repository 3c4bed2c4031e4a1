//! Conversion configuration loaded from `~/.config/apographon/config.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Translator id stamped on every paragraph when none is configured.
pub const DEFAULT_TRANSLATOR: &str = "translator-agent-v1";

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Written to `metadata.translator` and each paragraph's translation block.
    pub translator: String,
    /// Language code of the (pending) translation.
    pub target_lang: String,
    /// Footnote ids whose continuation spilled onto the next page.
    pub split_footnotes: Vec<String>,
    pub metadata: MetadataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translator: DEFAULT_TRANSLATOR.to_string(),
            target_lang: "en".to_string(),
            split_footnotes: Vec::new(),
            metadata: MetadataConfig::default(),
        }
    }
}

/// Overrides and heuristics for document metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    /// Case-insensitive regex selecting the heading that carries the title.
    pub title_pattern: Option<String>,
    /// Case-insensitive regex selecting the paragraph that names the author.
    pub author_pattern: Option<String>,
}

impl Config {
    /// Parse a configuration from TOML text. `origin` only labels errors.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from an explicit path, or from the default location.
    ///
    /// An explicit path must exist. The default file is optional: when it is
    /// absent, [`Config::default`] is returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content, &path)
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apographon")
        .join("config.toml")
}
