//! Markup pre-pass for footnotes that OCR split across a page boundary.
//!
//! The continuation of such a note shows up as a table at the top of the
//! following page, ahead of that page's own footnotes block. Moving it back
//! into the note keeps the text together and stops the next page from
//! looking like a two-column table page.

use scraper::Html;
use tracing::{debug, info};

const BACKLINK_CLASS: &str = r#"class="footnote-backlink""#;
const PAGE_OPEN: &str = r#"<div class="page""#;
const FOOTNOTES_OPEN: &str = r#"<div class="footnotes""#;

/// Splice the continuation of `note_id` back in front of its backlink.
///
/// Returns `None` when any anchor point is missing or the continuation is
/// blank; the caller keeps the input unchanged.
pub fn repair_split_footnote(html: &str, note_id: &str) -> Option<String> {
    let item = html.find(&format!(r#"<li id="{note_id}""#))?;
    let backlink_class = item + html[item..].find(BACKLINK_CLASS)?;
    if html[item..backlink_class].contains("</li>") {
        debug!(note = note_id, "footnote has no backlink of its own");
        return None;
    }
    let backlink = html[..backlink_class].rfind("<a")?;
    if backlink < item {
        return None;
    }

    let page = backlink_class + html[backlink_class..].find(PAGE_OPEN)?;
    let footnotes = page + html[page..].find(FOOTNOTES_OPEN)?;
    let table = page + html[page..footnotes].find("<table")?;

    let continuation = &html[table..footnotes];
    let fragment = Html::parse_fragment(continuation);
    if fragment.root_element().text().all(|text| text.trim().is_empty()) {
        return None;
    }

    let mut repaired = String::with_capacity(html.len());
    repaired.push_str(&html[..backlink]);
    repaired.push_str(continuation);
    repaired.push_str(&html[backlink..table]);
    repaired.push_str(&html[footnotes..]);
    Some(repaired)
}

/// Apply [`repair_split_footnote`] for each id in order.
pub fn repair_split_footnotes(html: &str, note_ids: &[String]) -> String {
    let mut html = html.to_string();
    for note_id in note_ids {
        match repair_split_footnote(&html, note_id) {
            Some(repaired) => {
                info!(note = %note_id, "repaired split footnote");
                html = repaired;
            }
            None => debug!(note = %note_id, "split footnote not found, markup unchanged"),
        }
    }
    html
}
