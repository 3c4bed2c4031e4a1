//! `apographon` - Page-flow reconstruction for OCR'd book HTML
//!
//! # Features
//!
//! - **Page flow**: joins paragraphs that OCR split across page boundaries
//! - **Footnotes**: extracts per-page notes and inlines them at their anchors
//! - **Two-column tables**: reassembles facing-text tables spanning pages
//! - **Language tagging**: German / Latin / Greek classification per paragraph
//! - **Translation-ready JSON**: every paragraph gets an empty translation slot
//!
//! # Example
//!
//! ```rust,no_run
//! use apographon::{convert_html, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let html = std::fs::read_to_string("book.html")?;
//!     let envelope = convert_html(&html, &Config::default(), chrono::Utc::now())?;
//!     println!("{} paragraphs", envelope.document.paragraphs.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod flow;
pub mod repair;

use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::debug;

pub use config::{Config, MetadataConfig};
pub use document::{assemble, gather_metadata, DocumentEnvelope, Metadata};
pub use error::{Error, Result};
pub use flow::{reconstruct, Fragment, Lang, MergedParagraph, Note, Origin, SeenNotes};
pub use repair::{repair_split_footnote, repair_split_footnotes};

/// Version of apographon
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert cleaned book HTML into the translation-ready document.
///
/// `now` stamps every paragraph's translation slot.
///
/// # Errors
///
/// [`Error::NoPages`] when the markup has no page containers, and
/// [`Error::InvalidPattern`] for a bad metadata pattern in `config`.
pub fn convert_html(html: &str, config: &Config, now: DateTime<Utc>) -> Result<DocumentEnvelope> {
    let document = parse_pages(html, config)?;
    let metadata = gather_metadata(&document, &config.metadata)?;
    let paragraphs = reconstruct(&document, &mut SeenNotes::new());
    debug!(paragraphs = paragraphs.len(), title = %metadata.title, "reconstructed page flow");
    Ok(assemble(paragraphs, &metadata, config, now))
}

/// Run only the page scanner and return the unmerged fragments.
///
/// # Errors
///
/// [`Error::NoPages`] when the markup has no page containers.
pub fn scan_html(html: &str, config: &Config) -> Result<Vec<Fragment>> {
    let document = parse_pages(html, config)?;
    Ok(flow::scan_pages(&document, &mut SeenNotes::new()))
}

fn parse_pages(html: &str, config: &Config) -> Result<Html> {
    let html = repair_split_footnotes(html, &config.split_footnotes);
    let document = Html::parse_document(&html);
    if flow::page::Page::collect(&document).is_empty() {
        return Err(Error::NoPages);
    }
    Ok(document)
}
