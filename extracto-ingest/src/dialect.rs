//! Closed set of supported statement dialects.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use extracto_core::{Bank, Document, StatementResult};

use crate::error::IngestError;
use crate::parsers::{banamex, bbva};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Bbva,
    Banamex,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Bbva, Dialect::Banamex];

    pub fn bank(&self) -> Bank {
        match self {
            Dialect::Bbva => Bank::Bbva,
            Dialect::Banamex => Bank::Banamex,
        }
    }

    /// Parse `document` with this dialect.
    pub fn parse(&self, document: &Document, year_hint: i32) -> Result<StatementResult> {
        match self {
            Dialect::Bbva => bbva::parse_bbva_document(document, year_hint),
            Dialect::Banamex => banamex::parse_banamex_document(document, year_hint),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Bbva => f.write_str("bbva"),
            Dialect::Banamex => f.write_str("banamex"),
        }
    }
}

impl FromStr for Dialect {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bbva" | "bancomer" => Ok(Dialect::Bbva),
            "banamex" | "citibanamex" => Ok(Dialect::Banamex),
            _ => Err(IngestError::UnknownDialect(s.to_string())),
        }
    }
}
