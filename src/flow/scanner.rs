//! Page-by-page traversal producing the raw [`Fragment`] sequence.
//!
//! Pages are visited in ascending page-number order. Table-bearing pages feed
//! the [`ColumnState`]; any other page first flushes an active run, so column
//! output always precedes the text of the next plain page.

use scraper::Html;
use tracing::{debug, info};

use super::column::ColumnState;
use super::footnote::{note_from_item, NoteLookup, SeenNotes};
use super::page::Page;
use super::types::Fragment;

/// Scan every page of `document` into fragments.
///
/// `seen` carries the note ids extracted so far; pass a fresh set for an
/// independent run.
pub fn scan_pages(document: &Html, seen: &mut SeenNotes) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut columns = ColumnState::Inactive;

    for page in Page::collect(document) {
        if let Some(table) = page.column_table() {
            let (next, emitted) = columns.start_or_continue(&page, table, seen);
            columns = next;
            fragments.extend(emitted);
            continue;
        }

        if columns.is_active() {
            let (next, flushed) = columns.flush();
            columns = next;
            fragments.extend(flushed);
        }
        fragments.extend(scan_prose_page(&page, seen));
    }

    // A table region may run to the end of the document.
    let (_, flushed) = columns.flush();
    fragments.extend(flushed);
    info!(fragments = fragments.len(), notes = seen.count(), "page scan complete");
    fragments
}

/// Fragments of a page without a column table.
///
/// Footnotes are numbered per page starting at 1.
pub fn scan_prose_page(page: &Page<'_>, seen: &mut SeenNotes) -> Vec<Fragment> {
    let elements = page.prose_elements();
    if elements.is_empty() {
        info!(page = page.number, "skipping blank/non-prose page");
        return Vec::new();
    }
    debug!(page = page.number, blocks = elements.len(), "processing prose page");

    let mut lookup = NoteLookup::new();
    for (note_id, item) in page.footnote_items() {
        if !seen.insert(&note_id) {
            debug!(note = %note_id, page = page.number, "footnote already extracted, skipping");
            continue;
        }
        let note = note_from_item(item, &note_id, lookup.len() + 1);
        lookup.insert(note_id, note);
    }

    elements
        .into_iter()
        .filter_map(|element| page.prose_fragment(element, &lookup))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::{Lang, Origin};

    fn scan(html: &str) -> Vec<Fragment> {
        let doc = Html::parse_document(html);
        scan_pages(&doc, &mut SeenNotes::new())
    }

    fn two_cell_page(number: u32) -> String {
        format!(
            r#"<div class="page" id="page-{number}"><table>
                 <tr><td>links {number}a</td><td>rechts {number}a</td></tr>
                 <tr><td>links {number}b</td><td>rechts {number}b</td></tr>
               </table><p>Nachsatz {number}.</p></div>"#
        )
    }

    #[test]
    fn column_run_is_flushed_before_next_plain_page() {
        let html = format!(
            r#"{}{}<div class="page" id="page-34"><p>Neue Seite.</p></div>"#,
            two_cell_page(32),
            two_cell_page(33),
        );
        let fragments = scan(&html);
        let summary: Vec<(Origin, &str)> =
            fragments.iter().map(|f| (f.origin, f.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Origin::TableCell, "links 32a links 32b [p.33] links 33a links 33b"),
                (Origin::TableCell, "rechts 32a rechts 32b [p.33] rechts 33a rechts 33b"),
                (Origin::ProseBlock, "Nachsatz 32."),
                (Origin::ProseBlock, "Nachsatz 33."),
                (Origin::ProseBlock, "Neue Seite."),
            ]
        );
        assert_eq!(fragments[0].pages, vec![32, 33]);
        assert_eq!(fragments[1].pages, vec![32, 33]);
        assert_eq!(fragments[4].pages, vec![34]);
    }

    #[test]
    fn trailing_column_run_is_flushed_at_end() {
        let fragments = scan(&two_cell_page(9));
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].origin, Origin::TableCell);
        assert_eq!(fragments[2].text, "Nachsatz 9.");
    }

    #[test]
    fn pages_are_visited_in_numeric_order() {
        let fragments = scan(
            r#"<div class="page" id="page-10"><p>zehn</p></div>
               <div class="page" id="page-2"><p>zwei</p></div>"#,
        );
        let pages: Vec<Option<u32>> = fragments.iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![Some(2), Some(10)]);
    }

    #[test]
    fn footnote_markers_are_dense_per_page() {
        let fragments = scan(
            r##"<div class="page" id="page-3">
                 <p>A<a class="footnote-ref" href="#fn3-1">1</a> B<a class="footnote-ref" href="#fn3-2">2</a>
                    C<a class="footnote-ref" href="#fn3-3">3</a></p>
                 <div class="footnotes"><ol>
                   <li id="fn3-1">Eins.</li><li id="fn3-2">Zwei.</li><li id="fn3-3">Drei.</li>
                 </ol></div>
               </div>
               <div class="page" id="page-4">
                 <p>D<a class="footnote-ref" href="#fn4-1">1</a></p>
                 <div class="footnotes"><ol><li id="fn3-1">Wieder.</li><li id="fn4-1">Vier.</li></ol></div>
               </div>"##,
        );
        let markers: Vec<&str> = fragments[0].notes.iter().map(|n| n.marker.as_str()).collect();
        assert_eq!(markers, vec!["¹", "²", "³"]);
        // fn3-1 reappears on page 4 and is skipped, so fn4-1 restarts at ¹
        assert_eq!(fragments[1].notes.len(), 1);
        assert_eq!(fragments[1].notes[0].id, "note-fn4-1");
        assert_eq!(fragments[1].notes[0].marker, "¹");
        assert_eq!(fragments[1].text, "D¹Footnote ¹. Vier.");
    }

    #[test]
    fn seen_notes_span_prose_and_column_pages() {
        let html = format!(
            r##"<div class="page" id="page-1">
                 <p>A<a class="footnote-ref" href="#fn1-1">1</a></p>
                 <div class="footnotes"><ol><li id="fn1-1">Eins.</li></ol></div>
               </div>
               {}
               <div class="page" id="page-3">
                 <p>B<a class="footnote-ref" href="#fn1-1">1</a></p>
                 <div class="footnotes"><ol><li id="fn1-1">Doppelt.</li></ol></div>
               </div>"##,
            two_cell_page(2).replace(
                "</table>",
                r#"</table><div class="footnotes"><ol><li id="fn2-1">Zwei.</li></ol></div>"#
            ),
        );
        let doc = Html::parse_document(&html);
        let mut seen = SeenNotes::new();
        let fragments = scan_pages(&doc, &mut seen);
        assert_eq!(seen.count(), 2);
        assert!(!seen.insert("fn2-1"));
        let last = fragments.last().unwrap();
        assert_eq!(last.text, "B1");
        assert!(last.notes.is_empty());
    }

    #[test]
    fn blank_pages_and_page_numbers_produce_nothing() {
        let fragments = scan(
            r#"<div class="page" id="page-1"><img src="plate.png"></div>
               <div class="page" id="page-2"><p>2</p><p>  </p></div>"#,
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn roman_numeral_headings_survive() {
        let fragments = scan(r#"<div class="page" id="page-9"><h2>Ⅻ</h2><p>Text</p><p>9</p></div>"#);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Ⅻ", "Text"]);
    }

    #[test]
    fn greek_prose_is_hidden_by_default() {
        let fragments = scan(r#"<div class="page" id="page-1"><p>ὁ βίος βραχύς</p></div>"#);
        assert_eq!(fragments[0].lang, Lang::Greek);
        assert!(!fragments[0].show_by_default);
    }

    #[test]
    fn greek_in_a_footnote_does_not_retag_the_paragraph() {
        let fragments = scan(
            r##"<div class="page" id="page-3">
                 <p>Die Lehre vom Pneuma geht auf Athenaios zurück<a class="footnote-ref" href="#fn3-1">1</a> und wurde weitergegeben.</p>
                 <div class="footnotes"><ol><li id="fn3-1">Vgl. Galen: τὸ πνεῦμα.</li></ol></div>
               </div>"##,
        );
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].lang, Lang::German);
        assert!(fragments[0].show_by_default);
        assert!(fragments[0].text.contains("¹Footnote ¹. Vgl. Galen: τὸ πνεῦμα."));
        assert_eq!(fragments[0].notes[0].text, "Vgl. Galen: τὸ πνεῦμα.");
    }

    #[test]
    fn malformed_page_ids_default_to_zero() {
        let fragments = scan(r#"<div class="page" id="frontmatter"><p>Titel</p></div>"#);
        assert_eq!(fragments[0].page, Some(0));
        assert_eq!(fragments[0].pages, vec![0]);
    }
}
