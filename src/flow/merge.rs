//! Paragraph reconstruction from the scanned fragment sequence.
//!
//! One accumulator is kept open at a time. A fragment joins it only when
//! language, visibility and origin all agree and [`should_merge`] allows it;
//! table-cell fragments always stand alone. Layout is not consulted: the
//! punctuation/capitalization rule is the whole boundary policy.

use serde::{Deserialize, Serialize};

use super::text::{clean_text, first_alpha};
use super::types::{Fragment, Lang, Note, Origin, PageBreak};

/// The `original` block of an output paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalText {
    pub lang: Lang,
    pub text: String,
    pub notes: Vec<Note>,
    pub page: Option<u32>,
    pub pages: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_breaks: Vec<PageBreak>,
}

/// A finished logical paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedParagraph {
    pub original: OriginalText,
    pub show_by_default: bool,
    pub origin: Origin,
}

impl MergedParagraph {
    fn close(fragment: Fragment) -> Self {
        let fragment = with_pages(fragment);
        Self {
            original: OriginalText {
                lang: fragment.lang,
                text: fragment.text,
                notes: fragment.notes,
                page: fragment.pages.first().copied(),
                pages: fragment.pages,
                page_breaks: fragment.page_breaks,
            },
            show_by_default: fragment.show_by_default,
            origin: fragment.origin,
        }
    }
}

impl From<MergedParagraph> for Fragment {
    fn from(paragraph: MergedParagraph) -> Self {
        let original = paragraph.original;
        Self {
            text: original.text,
            notes: original.notes,
            lang: original.lang,
            show_by_default: paragraph.show_by_default,
            page: original.page,
            pages: original.pages,
            page_breaks: original.page_breaks,
            origin: paragraph.origin,
        }
    }
}

/// Whether `next` continues the sentence that `prev` ends with.
///
/// Not when `prev` is blank, or when it ends in `.`, `!` or `?` and the first
/// letter of `next` is uppercase or missing.
pub fn should_merge(prev: &str, next: &str) -> bool {
    let Some(last) = prev.trim_end().chars().last() else {
        return false;
    };
    let ends_sentence = matches!(last, '.' | '!' | '?');
    let next_opens_sentence = first_alpha(next.trim_start()).map_or(true, char::is_uppercase);
    !(ends_sentence && next_opens_sentence)
}

/// Collapse scanned fragments into paragraphs, preserving order.
pub fn merge_fragments(fragments: Vec<Fragment>) -> Vec<MergedParagraph> {
    let mut merged = Vec::new();
    let mut current: Option<Fragment> = None;

    for fragment in fragments {
        if fragment.text.is_empty() {
            continue;
        }

        if fragment.origin == Origin::TableCell {
            if let Some(open) = current.take() {
                merged.push(MergedParagraph::close(open));
            }
            merged.push(MergedParagraph::close(fragment));
            continue;
        }

        let Some(mut open) = current.take() else {
            current = Some(with_pages(fragment));
            continue;
        };

        let compatible = open.lang == fragment.lang
            && open.show_by_default == fragment.show_by_default
            && open.origin == fragment.origin;
        if !compatible || !should_merge(&open.text, &fragment.text) {
            merged.push(MergedParagraph::close(open));
            current = Some(with_pages(fragment));
            continue;
        }

        absorb(&mut open, fragment);
        current = Some(open);
    }

    if let Some(open) = current {
        merged.push(MergedParagraph::close(open));
    }
    merged
}

/// Guarantee `pages` is non-empty whenever `page` is set.
fn with_pages(mut fragment: Fragment) -> Fragment {
    if fragment.pages.is_empty() {
        fragment.pages.extend(fragment.page);
    }
    fragment
}

fn absorb(open: &mut Fragment, fragment: Fragment) {
    let fragment = with_pages(fragment);
    let offset = open.text.chars().count() + 1;

    if let Some(&first) = fragment.pages.first() {
        if open.pages.last() != Some(&first) {
            open.page_breaks.push(PageBreak {
                page: first,
                offset,
            });
        }
    }
    open.page_breaks
        .extend(fragment.page_breaks.into_iter().map(|brk| PageBreak {
            page: brk.page,
            offset: brk.offset + offset,
        }));

    for page in fragment.pages {
        if open.pages.last() != Some(&page) {
            open.pages.push(page);
        }
    }

    open.text = clean_text(&format!("{} {}", open.text, fragment.text));
    open.notes.extend(fragment.notes);
}
