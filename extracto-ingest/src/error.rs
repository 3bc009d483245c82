//! Document-boundary failures. Everything inside a document degrades to
//! `None`/0.0 instead; only these reach the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// No supported bank could be identified from the first pages.
    #[error("unsupported document: no supported bank found in the first {pages} pages")]
    UnsupportedDocument { pages: usize },

    /// The layout payload carries nothing the engine can read.
    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("unknown dialect {0:?} (available: bbva, banamex)")]
    UnknownDialect(String),
}
