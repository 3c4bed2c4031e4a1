//! Read-only view over one page container of the input document.
//!
//! The upstream cleanup stage emits one `div.page` per source page, with an
//! id ending in the page number. A page may hold at most one two-column
//! table outside its `.footnotes` region, and a `.footnotes` list whose items
//! carry stable ids.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::footnote::{render_resolving, NoteLookup};
use super::language::classify;
use super::text::{clean_text, is_numeric_artifact};
use super::types::Fragment;

static PAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.page").expect("valid selector"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static FOOTNOTE_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".footnotes li").expect("valid selector"));
static PROSE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h1, h2, h3, h4").expect("valid selector"));

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid regex"));

const FOOTNOTES_CLASS: &str = "footnotes";

/// Parse the page number from a container id; 0 when there is none.
pub fn page_number(id: &str) -> u32 {
    TRAILING_NUMBER
        .captures(id)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// A prose block on a table-bearing page, positioned relative to the table.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub element: ElementRef<'a>,
    pub after_table: bool,
}

/// One page container.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub number: u32,
    element: ElementRef<'a>,
}

impl<'a> Page<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        let number = page_number(element.value().attr("id").unwrap_or(""));
        Self { number, element }
    }

    /// All pages of `document` in ascending page-number order.
    ///
    /// Container order in the source is not trusted; the sort is stable so
    /// pages sharing a number keep their source order.
    pub fn collect(document: &'a Html) -> Vec<Self> {
        let mut pages: Vec<Self> = document.select(&PAGE).map(Self::new).collect();
        pages.sort_by_key(|page| page.number);
        pages
    }

    /// The first table not nested in a footnotes region.
    pub fn column_table(&self) -> Option<ElementRef<'a>> {
        self.element.select(&TABLE).find(|table| !in_footnotes(*table))
    }

    /// Footnote list items that carry an id, in source order.
    pub fn footnote_items(&self) -> Vec<(String, ElementRef<'a>)> {
        self.element
            .select(&FOOTNOTE_ITEM)
            .filter_map(|item| {
                let id = item.value().attr("id").unwrap_or("");
                (!id.is_empty()).then(|| (id.to_string(), item))
            })
            .collect()
    }

    /// Paragraphs and headings outside the footnotes region.
    pub fn prose_elements(&self) -> Vec<ElementRef<'a>> {
        self.element
            .select(&PROSE)
            .filter(|element| !in_footnotes(*element))
            .collect()
    }

    /// Prose blocks around `table`, excluding anything inside a table or the
    /// footnotes region, flagged by whether they follow the table.
    pub fn blocks_around(&self, table: ElementRef<'a>) -> Vec<Block<'a>> {
        let mut after_table = false;
        let mut blocks = Vec::new();
        for element in self.element.descendants().skip(1).filter_map(ElementRef::wrap) {
            if element.id() == table.id() {
                after_table = true;
                continue;
            }
            if PROSE.matches(&element) && !in_table(element) && !in_footnotes(element) {
                blocks.push(Block {
                    element,
                    after_table,
                });
            }
        }
        blocks
    }

    /// Turn one prose element into a [`Fragment`], resolving footnote anchors
    /// against `lookup`.
    ///
    /// Returns `None` for blocks that are empty or only a page number. The
    /// language is taken from the block's own text, before note bodies are
    /// inlined.
    pub fn prose_fragment(&self, element: ElementRef<'_>, lookup: &NoteLookup) -> Option<Fragment> {
        let visible = clean_text(&element.text().collect::<String>());
        if visible.is_empty() || is_numeric_artifact(&visible) {
            return None;
        }

        let mut notes = Vec::new();
        let text = clean_text(&render_resolving(element, lookup, &mut notes));
        if text.is_empty() || is_numeric_artifact(&text) {
            return None;
        }

        Some(Fragment::prose(text, notes, classify(&visible), self.number))
    }
}

fn in_footnotes(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|class| class == FOOTNOTES_CLASS))
}

fn in_table(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "table")
}
