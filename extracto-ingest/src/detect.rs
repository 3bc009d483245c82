//! Bank and statement-year identification from the first pages.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use extracto_core::Document;

use crate::dialect::Dialect;
use crate::error::IngestError;

/// Pages inspected when identifying a statement.
pub const IDENTIFY_PAGES: usize = 2;

static YEAR_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DEL\s+\d{1,2}/\d{1,2}/(\d{4})\b").expect("numeric period year regex")
});

static YEAR_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}[/\-][A-Z]{3}[/\-](\d{4})\b").expect("month period year regex")
});

static YEAR_LONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bDEL?\s+(\d{4})\b").expect("long form year regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub dialect: Dialect,
    /// Statement year when printed on the first pages
    pub year: Option<i32>,
}

fn bank_of(text: &str) -> Option<Dialect> {
    let banamex = ["CITIBANAMEX", "BANAMEX"]
        .iter()
        .filter_map(|k| text.find(k))
        .min();
    let bbva = text.find("BBVA");

    match (bbva, banamex) {
        (Some(b), Some(n)) if n < b => Some(Dialect::Banamex),
        (Some(_), _) => Some(Dialect::Bbva),
        (None, Some(_)) => Some(Dialect::Banamex),
        (None, None) => None,
    }
}

fn year_of(text: &str) -> Option<i32> {
    [&*YEAR_NUMERIC_RE, &*YEAR_MONTH_RE, &*YEAR_LONG_RE]
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}

/// Identify the bank (and, when printed, the year) of a statement. When both
/// banks are named, the one printed first wins.
pub fn identify(document: &Document) -> Result<Identification, IngestError> {
    if document.is_empty() {
        return Err(IngestError::UnreadableDocument("document has no pages".to_string()));
    }

    let text = document.leading_text(IDENTIFY_PAGES);
    let dialect = bank_of(&text).ok_or(IngestError::UnsupportedDocument {
        pages: IDENTIFY_PAGES.min(document.pages.len()),
    })?;
    let year = year_of(&text);

    log::info!("identified {dialect} statement, year {year:?}");
    Ok(Identification { dialect, year })
}
