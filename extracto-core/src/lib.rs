//! extracto-core: layout-driven statement parsing engine.
//!
//! Positioned words go in; lines, column boundaries, detail-section state,
//! transaction blocks and metadata come out. Bank-specific vocabularies live
//! in `extracto-ingest`.

pub mod amount;
pub mod blocks;
pub mod columns;
pub mod dates;
pub mod detail;
pub mod layout;
pub mod lines;
pub mod metadata;
pub mod section;
pub mod statement;
pub mod text;

pub use amount::{parse_amount, parse_amount_opt};
pub use blocks::{BlockAccumulator, BlockRules, ColumnTolerance, TransactionBlock};
pub use columns::{
    ColumnBoundaries, ColumnRole, ColumnSpan, HeaderVocabulary, Occurrence, detect_columns,
    resolve_page_columns,
};
pub use dates::{normalize_date, normalize_period};
pub use detail::{DetailLayout, extract_transactions};
pub use layout::{Document, Page, PositionedWord};
pub use lines::{Line, group_into_lines};
pub use metadata::{MetadataRules, Strategy, Total, first_match};
pub use section::{SectionMarkers, SectionState, SectionTracker};
pub use statement::{Bank, StatementKind, StatementMetadata, StatementResult, Transaction};
