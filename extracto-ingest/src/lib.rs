//! extracto-ingest: bank dialects (BBVA, Banamex) on top of the extracto-core
//! engine, plus bank/year identification.

pub mod detect;
pub mod dialect;
pub mod error;
pub mod parsers;

pub use detect::{Identification, identify};
pub use dialect::Dialect;
pub use error::IngestError;
pub use parsers::banamex::parse_banamex_document;
pub use parsers::bbva::{BbvaProduct, parse_bbva_document};

use anyhow::Result;
use extracto_core::{Document, StatementResult};

/// Identify the bank and parse with its dialect. The printed statement year
/// is preferred over `fallback_year`.
pub fn parse_auto(document: &Document, fallback_year: i32) -> Result<StatementResult> {
    let id = identify(document)?;
    id.dialect.parse(document, id.year.unwrap_or(fallback_year))
}
