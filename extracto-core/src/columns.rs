//! Column boundary detection from header labels.
//!
//! Statement tables have no ruling lines, so the horizontal extent of each
//! monetary column is taken from the header label printed above it.

use serde::{Deserialize, Serialize};

use crate::layout::PositionedWord;
use crate::lines::Line;
use crate::text::match_key;

/// Monetary role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Charge,
    Credit,
    Balance,
}

/// Horizontal interval of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub x0: f64,
    pub x1: f64,
}

impl ColumnSpan {
    pub fn of(word: &PositionedWord) -> Self {
        Self {
            x0: word.x0,
            x1: word.x1,
        }
    }

    /// True when `x` falls inside the span widened by `tolerance` on both sides.
    pub fn contains(&self, x: f64, tolerance: f64) -> bool {
        self.x0 - tolerance <= x && x <= self.x1 + tolerance
    }
}

/// Resolved monetary columns for a page. Charge and credit always resolve
/// together; a page without them has no boundaries at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBoundaries {
    pub charge: ColumnSpan,
    pub credit: ColumnSpan,
    pub balance: Option<ColumnSpan>,
}

impl ColumnBoundaries {
    pub fn span(&self, role: ColumnRole) -> Option<ColumnSpan> {
        match role {
            ColumnRole::Charge => Some(self.charge),
            ColumnRole::Credit => Some(self.credit),
            ColumnRole::Balance => self.balance,
        }
    }
}

/// Which of several matching labels to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// Leftmost match
    First,
    /// Rightmost match
    Last,
}

/// Dialect header vocabulary. Labels are compared accent-folded and
/// upper-cased; a word matches a label exactly or by prefix.
#[derive(Debug, Clone)]
pub struct HeaderVocabulary {
    pub charge: &'static [&'static str],
    pub credit: &'static [&'static str],
    pub balance: &'static [&'static str],
    pub balance_occurrence: Occurrence,
    /// Vertical distance from the header line within which the balance label
    /// may sit (two-row headers put it above the other labels).
    pub balance_band: f64,
}

fn matches_any(key: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| key.starts_with(&match_key(label)))
}

impl HeaderVocabulary {
    /// Role a single word labels, if any. Charge wins over credit, credit
    /// over balance, so one word never labels two columns.
    pub fn role_of(&self, word: &PositionedWord) -> Option<ColumnRole> {
        let key = match_key(&word.text);
        if key.is_empty() {
            return None;
        }
        if matches_any(&key, self.charge) {
            Some(ColumnRole::Charge)
        } else if matches_any(&key, self.credit) {
            Some(ColumnRole::Credit)
        } else if matches_any(&key, self.balance) {
            Some(ColumnRole::Balance)
        } else {
            None
        }
    }

    /// A line carrying both a charge and a credit label.
    pub fn is_header_line(&self, line: &Line<'_>) -> bool {
        let roles: Vec<_> = line.words.iter().filter_map(|w| self.role_of(w)).collect();
        roles.contains(&ColumnRole::Charge) && roles.contains(&ColumnRole::Credit)
    }
}

/// Locate the header line and the monetary columns it labels.
///
/// The header is the first line that labels both
/// charge and credit; the balance label is searched on lines within
/// `balance_band` of it. Returns the header's line index with the spans.
pub fn locate_header(
    lines: &[Line<'_>],
    vocab: &HeaderVocabulary,
) -> Option<(usize, ColumnBoundaries)> {
    let (idx, header) = lines
        .iter()
        .enumerate()
        .find(|(_, line)| vocab.is_header_line(line))?;

    let find_role = |role: ColumnRole| {
        header
            .words
            .iter()
            .find(|w| vocab.role_of(w) == Some(role))
            .map(|w| ColumnSpan::of(w))
    };
    let charge = find_role(ColumnRole::Charge)?;
    let credit = find_role(ColumnRole::Credit)?;

    let header_top = header.top();
    let mut balance_words: Vec<&PositionedWord> = lines
        .iter()
        .skip(idx.saturating_sub(2))
        .take(5)
        .filter(|line| (line.top() - header_top).abs() <= vocab.balance_band)
        .flat_map(|line| line.words.iter().copied())
        .filter(|w| vocab.role_of(w) == Some(ColumnRole::Balance))
        .collect();
    balance_words.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let balance = match vocab.balance_occurrence {
        Occurrence::First => balance_words.first(),
        Occurrence::Last => balance_words.last(),
    }
    .map(|w| ColumnSpan::of(w));

    Some((
        idx,
        ColumnBoundaries {
            charge,
            credit,
            balance,
        },
    ))
}

/// Locate the monetary columns on a page, `None` when the page has no
/// header labelling both charge and credit.
pub fn detect_columns(lines: &[Line<'_>], vocab: &HeaderVocabulary) -> Option<ColumnBoundaries> {
    locate_header(lines, vocab).map(|(_, columns)| columns)
}

/// Columns in effect on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageColumns {
    pub columns: Option<ColumnBoundaries>,
    /// Index of the first line below the page's own header (0 without one)
    pub body_start: usize,
}

/// Resolve the columns to use for one page, threading the document-level
/// cache through. A page with its own header uses it; otherwise the first
/// boundaries resolved earlier in the document apply. Returns the page's
/// columns and the updated cache.
pub fn resolve_page_columns(
    lines: &[Line<'_>],
    vocab: &HeaderVocabulary,
    cache: Option<ColumnBoundaries>,
) -> (PageColumns, Option<ColumnBoundaries>) {
    match locate_header(lines, vocab) {
        Some((idx, own)) => (
            PageColumns {
                columns: Some(own),
                body_start: idx + 1,
            },
            cache.or(Some(own)),
        ),
        None => (
            PageColumns {
                columns: cache,
                body_start: 0,
            },
            cache,
        ),
    }
}
