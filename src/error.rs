//! Error types for the conversion pipeline.
//!
//! The page-flow engine itself never fails; imperfect OCR markup is handled
//! locally. Errors only come from the surrounding I/O, configuration, and the
//! structural check that the input contains pages at all.

use std::path::PathBuf;

use thiserror::Error;

/// Conversion pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("input contains no page containers (expected `div.page` elements)")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, Error>;
