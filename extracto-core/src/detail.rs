//! Page walk over the detail section: line grouping, column resolution,
//! section tracking and block assembly, carried across pages in order.

use crate::blocks::{BlockAccumulator, BlockRules};
use crate::columns::{ColumnBoundaries, HeaderVocabulary, resolve_page_columns};
use crate::layout::{Document, Page};
use crate::lines::group_into_lines;
use crate::section::{LineAdmission, SectionMarkers, SectionTracker};
use crate::statement::{Bank, Transaction};

/// Everything the engine needs to know about one dialect's detail table.
#[derive(Debug, Clone)]
pub struct DetailLayout {
    pub bank: Bank,
    /// Vertical tolerance for grouping words into lines
    pub line_tolerance: f64,
    pub vocabulary: HeaderVocabulary,
    pub markers: SectionMarkers,
    pub blocks: BlockRules,
}

fn process_page<'r>(
    page: &Page,
    layout: &DetailLayout,
    tracker: &mut SectionTracker,
    acc: BlockAccumulator<'r>,
    cache: Option<ColumnBoundaries>,
) -> (BlockAccumulator<'r>, Option<ColumnBoundaries>) {
    let lines = group_into_lines(&page.words, layout.line_tolerance);
    let (page_columns, cache) = resolve_page_columns(&lines, &layout.vocabulary, cache);

    if page_columns.columns.is_none() {
        log::warn!(
            "page {}: no column header resolved, no transactions taken from it",
            page.number
        );
    }

    let acc = lines.iter().enumerate().fold(acc, |acc, (idx, line)| {
        match tracker.feed(&line.text()) {
            LineAdmission::Admit => match page_columns.columns {
                Some(columns)
                    if idx >= page_columns.body_start
                        && !layout.vocabulary.is_header_line(line) =>
                {
                    acc.push_line(line, columns)
                }
                _ => acc,
            },
            LineAdmission::Opened => {
                log::debug!("page {}: detail section opened", page.number);
                acc
            }
            LineAdmission::Closed => {
                log::debug!("page {}: detail section closed", page.number);
                acc.close()
            }
            LineAdmission::Ignore => acc,
        }
    });

    log::info!(
        "page {}: {} lines, {} transactions so far",
        page.number,
        lines.len(),
        acc.transactions().len()
    );

    (acc, cache)
}

/// Extract every transaction of the document's detail section.
///
/// Pages are visited strictly in order: the section state and the column
/// cache both carry forward, and a block left open at a page break keeps
/// collecting continuation lines on the next page.
pub fn extract_transactions(document: &Document, layout: &DetailLayout, year: i32) -> Vec<Transaction> {
    let mut tracker = SectionTracker::new(layout.markers.clone());
    let mut acc = BlockAccumulator::new(&layout.blocks, year, layout.bank);
    let mut cache = None;

    for page in &document.pages {
        (acc, cache) = process_page(page, layout, &mut tracker, acc, cache);
    }

    let transactions = acc.finish();
    log::info!(
        "{}: {} charges, {} credits",
        layout.bank,
        transactions.iter().filter(|t| t.is_charge()).count(),
        transactions.iter().filter(|t| t.is_credit()).count()
    );
    transactions
}
