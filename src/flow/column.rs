//! Two-column table runs spanning consecutive pages.
//!
//! Some books print a text and its counterpart side by side as a two-column
//! table that continues over several pages. The run is accumulated per
//! column until a page without such a table arrives, then flushed into one
//! [`Fragment`] per column followed by any prose that came after the table.
//!
//! The state is an explicit value: every step consumes a [`ColumnState`] and
//! returns the next one.
//!
//! ```text
//! Inactive ──table page──▶ Active ──table page──▶ Active
//!    ▲                        │
//!    └─────────flush──────────┘
//! ```

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::footnote::{column_owner, note_from_item, render_resolving, NoteLookup, SeenNotes, Side};
use super::language::classify;
use super::page::Page;
use super::text::clean_text;
use super::types::{Fragment, Note};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static DATA_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid selector"));

/// Accumulated content of one column.
#[derive(Debug, Clone, Default)]
pub struct ColumnSide {
    /// Cell markup, one entry per page, with a `[p.N] ` prefix after the first page.
    pub markup: Vec<String>,
    pub notes: Vec<Note>,
    /// Last ordinal handed out to a note owned by this column.
    pub counter: usize,
}

/// An in-progress two-column run.
#[derive(Debug, Clone, Default)]
pub struct ColumnRun {
    pub left: ColumnSide,
    pub right: ColumnSide,
    /// Pages visited by the run, shared by both columns.
    pub pages: Vec<u32>,
    /// Notes of the whole run by source id, used to resolve inline references.
    pub lookup: NoteLookup,
    /// Prose found after the table, emitted behind the columns on flush.
    pub post_table: Vec<Fragment>,
}

impl ColumnRun {
    fn side_mut(&mut self, side: Side) -> &mut ColumnSide {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn append_cells(&mut self, page: u32, table: ElementRef<'_>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for row in table.select(&ROW) {
            let cells: Vec<ElementRef<'_>> = row.select(&DATA_CELL).collect();
            if let [first, second, ..] = cells.as_slice() {
                left.push(first.inner_html());
                right.push(second.inner_html());
            }
        }
        if left.is_empty() {
            debug!(page, "column table has no two-cell rows");
            return;
        }

        let prefix = if self.pages.len() > 1 {
            format!("[p.{page}] ")
        } else {
            String::new()
        };
        self.left.markup.push(format!("{prefix}{}", left.join(" ")));
        self.right.markup.push(format!("{prefix}{}", right.join(" ")));
    }

    fn collect_notes(&mut self, page: &Page<'_>, seen: &mut SeenNotes) {
        for (note_id, item) in page.footnote_items() {
            if !seen.insert(&note_id) {
                debug!(note = %note_id, page = page.number, "footnote already extracted, skipping");
                continue;
            }
            let column = self.side_mut(column_owner(&note_id));
            column.counter += 1;
            let note = note_from_item(item, &note_id, column.counter);
            column.notes.push(note.clone());
            self.lookup.insert(note_id, note);
        }
    }

    fn column_fragment(&self, side: &ColumnSide) -> Fragment {
        let markup = side.markup.join(" ");
        let fragment = Html::parse_fragment(&markup);
        let root = fragment.root_element();
        let mut resolved = Vec::new();
        let text = clean_text(&render_resolving(root, &self.lookup, &mut resolved));
        let lang = classify(&clean_text(&root.text().collect::<String>()));
        Fragment::table_cell(text, side.notes.clone(), lang, self.pages.clone())
    }
}

/// Column processor state.
#[derive(Debug, Clone, Default)]
pub enum ColumnState {
    #[default]
    Inactive,
    Active(ColumnRun),
}

impl ColumnState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Add a table-bearing page to the run, starting one if needed.
    ///
    /// Returns the next state and the prose fragments found before `table`;
    /// fragments after it are held back until [`ColumnState::flush`].
    pub fn start_or_continue(
        self,
        page: &Page<'_>,
        table: ElementRef<'_>,
        seen: &mut SeenNotes,
    ) -> (Self, Vec<Fragment>) {
        let mut run = match self {
            Self::Inactive => {
                info!(page = page.number, "starting two-column table run");
                ColumnRun::default()
            }
            Self::Active(run) => run,
        };

        if !run.pages.contains(&page.number) {
            run.pages.push(page.number);
        }
        run.append_cells(page.number, table);
        run.collect_notes(page, seen);

        let mut fragments = Vec::new();
        for block in page.blocks_around(table) {
            let Some(fragment) = page.prose_fragment(block.element, &run.lookup) else {
                continue;
            };
            if block.after_table {
                run.post_table.push(fragment);
            } else {
                fragments.push(fragment);
            }
        }

        (Self::Active(run), fragments)
    }

    /// Finish the run: left column, right column, then post-table prose.
    ///
    /// Always returns [`ColumnState::Inactive`]; flushing an inactive state
    /// yields nothing.
    pub fn flush(self) -> (Self, Vec<Fragment>) {
        let Self::Active(run) = self else {
            return (Self::Inactive, Vec::new());
        };
        info!(pages = ?run.pages, "flushing two-column table run");

        let mut fragments = vec![
            run.column_fragment(&run.left),
            run.column_fragment(&run.right),
        ];
        fragments.extend(run.post_table);
        (Self::Inactive, fragments)
    }
}
