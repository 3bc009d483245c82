//! Bank-specific dialects. Each module exposes one
//! `parse_*(document, year_hint) -> Result<StatementResult>` entry point.

pub mod banamex;
pub mod bbva;

use anyhow::Result;
use chrono::Datelike;

use extracto_core::{Document, StatementMetadata};

use crate::error::IngestError;

/// Reject payloads with nothing to parse.
pub(crate) fn ensure_readable(document: &Document) -> Result<()> {
    if document.is_empty() {
        return Err(IngestError::UnreadableDocument("document has no pages".to_string()).into());
    }
    if document.pages.iter().all(|p| p.words.is_empty() && p.text.trim().is_empty()) {
        return Err(IngestError::UnreadableDocument("no extractable text on any page".to_string()).into());
    }
    Ok(())
}

/// The statement's own period end year beats the caller's hint.
pub(crate) fn effective_year(metadata: &StatementMetadata, year_hint: i32) -> i32 {
    metadata.period_end.map(|d| d.year()).unwrap_or(year_hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use extracto_core::Page;

    #[test]
    fn test_effective_year_prefers_period_end() {
        let md = StatementMetadata {
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        assert_eq!(effective_year(&md, 2025), 2024);
        assert_eq!(effective_year(&StatementMetadata::default(), 2025), 2025);
    }

    #[test]
    fn test_ensure_readable() {
        assert!(ensure_readable(&Document::default()).is_err());
        let blank = Document::new(vec![Page::new(1, "  ", vec![])]);
        assert!(ensure_readable(&blank).is_err());
        let ok = Document::new(vec![Page::new(1, "BBVA", vec![])]);
        assert!(ensure_readable(&ok).is_ok());
    }
}
