//! Page-flow reconstruction.
//!
//! Turns page-segmented OCR markup into a linear sequence of logical
//! paragraphs:
//!
//! 1. [`scanner`] visits pages in page-number order and emits [`Fragment`]s,
//!    delegating two-column table runs to [`column`].
//! 2. [`footnote`] extracts notes per page (or per column run) and inlines
//!    them at their reference anchors.
//! 3. [`merge`] joins fragments across page boundaries where a sentence
//!    clearly continues.
//!
//! The whole pass is single-threaded and infallible: malformed markup
//! degrades to best-effort output.

pub mod column;
pub mod footnote;
pub mod language;
pub mod merge;
pub mod page;
pub mod scanner;
pub mod text;
pub mod types;

use scraper::Html;

pub use footnote::SeenNotes;
pub use language::classify;
pub use merge::{merge_fragments, should_merge, MergedParagraph, OriginalText};
pub use scanner::scan_pages;
pub use types::{Fragment, Lang, Note, Origin, PageBreak};

/// Scan and merge `document` in one step.
pub fn reconstruct(document: &Html, seen: &mut SeenNotes) -> Vec<MergedParagraph> {
    merge_fragments(scan_pages(document, seen))
}
