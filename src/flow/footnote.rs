//! Footnote extraction and inline reference resolution.
//!
//! Footnotes arrive as list items in a page's `.footnotes` region. Each item
//! is turned into a [`Note`] with plain, normalized text; embedded tables are
//! flattened into parallel text columns. Inline `a.footnote-ref` anchors in
//! prose are then replaced by the note's marker and text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::text::{clean_text, to_superscript};
use super::types::Note;

static FOOTNOTE_REF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.footnote-ref").expect("valid selector"));
static BACKLINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.footnote-backlink").expect("valid selector"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("valid selector"));

/// Leading enumerator such as `1)` or `²)` left over from OCR numbering.
static LEADING_ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([¹²³⁴⁵⁶⁷⁸⁹*]|\d+)\)\s*").expect("valid regex")
});

/// Notes keyed by source anchor id (without the `note-` prefix).
pub type NoteLookup = HashMap<String, Note>;

/// Source note ids already extracted anywhere in the document.
///
/// The first extraction of an id wins; later list items with the same id are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct SeenNotes {
    ids: HashSet<String>,
}

impl SeenNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`, returning `false` if it was already seen.
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Number of distinct ids recorded so far.
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

/// Column that owns a footnote inside a two-column table run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Ordered ownership rules: the first matching pattern decides the side.
///
/// These encode one corpus's id conventions (`fn31-Aet2`, `fn31-3b` on the
/// right, `fn31-3`/`fn31-3a` on the left).
pub static OWNERSHIP_RULES: LazyLock<Vec<(Regex, Side)>> = LazyLock::new(|| {
    [
        (r"^fn\d+-Aet\d+$", Side::Right),
        (r"^fn\d+-\w*b$", Side::Right),
        (r"^fn\d+-\d+a?$", Side::Left),
    ]
    .into_iter()
    .map(|(pattern, side)| (Regex::new(pattern).expect("valid regex"), side))
    .collect()
});

/// Side matched by the ownership rules, if any.
pub fn match_owner(note_id: &str) -> Option<Side> {
    OWNERSHIP_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(note_id))
        .map(|(_, side)| *side)
}

/// Owning column for `note_id`; unmatched ids fall back to the left column.
pub fn column_owner(note_id: &str) -> Side {
    match_owner(note_id).unwrap_or_else(|| {
        warn!(note = note_id, "footnote id matches no ownership rule, assigning to left column");
        Side::Left
    })
}

/// Build a [`Note`] from a footnote list item.
///
/// Strips back-link anchors and a leading enumerator, then runs
/// [`extract`] over the remaining markup.
pub fn note_from_item(item: ElementRef<'_>, note_id: &str, ordinal: usize) -> Note {
    let mut markup = item.inner_html();
    for backlink in item.select(&BACKLINK) {
        markup = markup.replacen(&backlink.html(), "", 1);
    }
    let markup = LEADING_ENUMERATOR.replace(markup.trim(), "");

    Note {
        id: format!("note-{note_id}"),
        marker: to_superscript(ordinal),
        text: extract(&markup, note_id),
        translation: String::new(),
    }
}

/// Convert footnote markup into a normalized plain-text block.
///
/// Line breaks become newlines. Each embedded table is flattened column by
/// column: a column's cell texts are joined with spaces, and columns are
/// separated by a blank line. Runs of blank lines collapse to one, and
/// leading/trailing blank lines are dropped.
pub fn extract(note_markup: &str, note_id: &str) -> String {
    let fragment = Html::parse_fragment(note_markup);
    let mut raw = String::new();
    push_note_text(fragment.root_element(), note_id, &mut raw);

    let mut lines: Vec<&str> = Vec::new();
    for line in raw.split('\n').map(str::trim) {
        if line.is_empty() && lines.last().is_some_and(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn push_note_text(element: ElementRef<'_>, note_id: &str, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_squashed(text, out);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            match child_element.value().name() {
                "br" => out.push('\n'),
                "table" => {
                    out.push('\n');
                    out.push_str(&flatten_table(child_element, note_id));
                    out.push('\n');
                }
                _ => push_note_text(child_element, note_id, out),
            }
        }
    }
}

/// Append `text` with every whitespace run reduced to one space.
fn push_squashed(text: &str, out: &mut String) {
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

fn flatten_table(table: ElementRef<'_>, note_id: &str) -> String {
    let mut columns: Vec<Vec<String>> = Vec::new();
    for row in table.select(&ROW) {
        for (idx, cell) in row.select(&CELL).enumerate() {
            if columns.len() <= idx {
                columns.resize_with(idx + 1, Vec::new);
            }
            let text = clean_text(&cell.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                columns[idx].push(text);
            }
        }
    }

    let column_texts: Vec<String> = columns
        .iter()
        .filter(|parts| !parts.is_empty())
        .map(|parts| parts.join(" "))
        .collect();
    debug!(note = note_id, columns = column_texts.len(), "flattened table inside footnote");
    column_texts.join("\n\n")
}

/// Render an element's text, replacing resolvable footnote anchors.
///
/// Each anchor whose target is in `lookup` is replaced by
/// [`Note::inline_text`] and the note is copied into `attached`. A `)` that
/// directly follows a replaced anchor (whitespace aside) is dropped. Anchors
/// with no matching note keep their own text. The result is not
/// whitespace-normalized.
pub fn render_resolving(element: ElementRef<'_>, lookup: &NoteLookup, attached: &mut Vec<Note>) -> String {
    let mut out = String::new();
    push_resolved(element, lookup, attached, &mut out);
    out
}

fn push_resolved(
    element: ElementRef<'_>,
    lookup: &NoteLookup,
    attached: &mut Vec<Note>,
    out: &mut String,
) {
    let mut absorb_paren = false;
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = text;
            let stripped = text.trim_start();
            match stripped.strip_prefix(')') {
                Some(rest) if absorb_paren => {
                    out.push_str(&text[..text.len() - stripped.len()]);
                    out.push_str(rest);
                }
                _ => out.push_str(text),
            }
            absorb_paren = false;
        } else if let Some(child_element) = ElementRef::wrap(child) {
            absorb_paren = false;
            if FOOTNOTE_REF.matches(&child_element) {
                let target = child_element
                    .value()
                    .attr("href")
                    .unwrap_or("")
                    .trim_start_matches('#');
                if let Some(note) = lookup.get(target) {
                    attached.push(note.clone());
                    out.push_str(&note.inline_text());
                    absorb_paren = true;
                    continue;
                }
                debug!(target, "unresolved footnote reference, keeping raw marker");
            }
            push_resolved(child_element, lookup, attached, out);
        }
    }
}
