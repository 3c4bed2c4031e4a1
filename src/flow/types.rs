//! Shared types for the page-flow engine.
//!
//! Notes are plain values: a [`Fragment`] owns copies of the notes it
//! references, so filling in translations downstream never aliases.

use serde::{Deserialize, Serialize};

/// Coarse language class of a text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lang {
    /// Latin-script text in the document's base language.
    #[serde(rename = "de")]
    German,
    #[serde(rename = "la")]
    Latin,
    #[serde(rename = "grc")]
    Greek,
}

impl Lang {
    /// Greek-script text is hidden until the reader asks for it.
    pub fn shown_by_default(self) -> bool {
        self != Self::Greek
    }
}

/// Provenance of a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    ProseBlock,
    TableCell,
}

/// A footnote extracted from a page's footnotes region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// `note-` followed by the source list item id.
    pub id: String,
    /// 1-based ordinal in superscript digits.
    pub marker: String,
    pub text: String,
    /// Always empty here; filled in by the translation pipeline.
    pub translation: String,
}

impl Note {
    /// Text that replaces an inline reference to this note.
    pub fn inline_text(&self) -> String {
        if self.text.is_empty() {
            return self.marker.clone();
        }
        format!("{m}Footnote {m}. {t}", m = self.marker, t = self.text)
    }
}

/// Where a later page's contribution begins inside merged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreak {
    pub page: u32,
    /// Offset in characters (Unicode scalar values), not bytes.
    pub offset: usize,
}

/// An atomic text unit emitted by the scanner, before paragraph merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub notes: Vec<Note>,
    pub lang: Lang,
    pub show_by_default: bool,
    pub page: Option<u32>,
    /// Contributing pages; `pages[0] == page` whenever `page` is set.
    pub pages: Vec<u32>,
    /// Empty for scanned fragments; set once fragments from several pages merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_breaks: Vec<PageBreak>,
    pub origin: Origin,
}

impl Fragment {
    /// A prose fragment from a single page.
    pub fn prose(text: String, notes: Vec<Note>, lang: Lang, page: u32) -> Self {
        Self {
            text,
            notes,
            lang,
            show_by_default: lang.shown_by_default(),
            page: Some(page),
            pages: vec![page],
            page_breaks: Vec::new(),
            origin: Origin::ProseBlock,
        }
    }

    /// A reconstructed table column. Never shown by default, whatever its language.
    pub fn table_cell(text: String, notes: Vec<Note>, lang: Lang, pages: Vec<u32>) -> Self {
        Self {
            text,
            notes,
            lang,
            show_by_default: false,
            page: pages.first().copied(),
            pages,
            page_breaks: Vec::new(),
            origin: Origin::TableCell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Note {
        Note {
            id: "note-fn1-1".into(),
            marker: "¹".into(),
            text: text.into(),
            translation: String::new(),
        }
    }

    #[test]
    fn inline_text_carries_marker_and_body() {
        assert_eq!(note("Vgl. Galen.").inline_text(), "¹Footnote ¹. Vgl. Galen.");
    }

    #[test]
    fn inline_text_without_body_is_bare_marker() {
        assert_eq!(note("").inline_text(), "¹");
    }

    #[test]
    fn greek_prose_is_hidden() {
        let fragment = Fragment::prose("λόγος".into(), vec![], Lang::Greek, 4);
        assert!(!fragment.show_by_default);
        assert_eq!(fragment.page, Some(4));
        assert_eq!(fragment.pages, vec![4]);
    }

    #[test]
    fn table_cells_are_hidden_and_anchor_on_first_page() {
        let fragment = Fragment::table_cell("text".into(), vec![], Lang::German, vec![32, 33]);
        assert!(!fragment.show_by_default);
        assert_eq!(fragment.page, Some(32));
        assert_eq!(fragment.origin, Origin::TableCell);
    }

    #[test]
    fn serializes_schema_codes() {
        assert_eq!(serde_json::to_string(&Lang::Greek).unwrap(), "\"grc\"");
        assert_eq!(serde_json::to_string(&Origin::TableCell).unwrap(), "\"table-cell\"");
    }
}
