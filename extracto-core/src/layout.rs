//! Positioned text model supplied by the document layout provider.
//!
//! Coordinates follow the usual PDF-text convention: `x` grows to the right,
//! `top` grows downwards from the top edge of the page.

use serde::{Deserialize, Serialize};

/// A single text fragment with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedWord {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PositionedWord {
    pub fn new(text: impl Into<String>, x0: f64, x1: f64, top: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }

    /// Horizontal midpoint, used for column classification.
    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

/// One page of a document: its words in natural reading order plus the
/// page's whole extractable text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    #[serde(default)]
    pub number: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<PositionedWord>,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>, words: Vec<PositionedWord>) -> Self {
        Self {
            number,
            text: text.into(),
            words,
        }
    }
}

/// An ordered set of pages, as produced by the layout provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Concatenated text of every page, newline separated.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Upper-cased text of the first `n` pages (used for bank identification).
    pub fn leading_text(&self, n: usize) -> String {
        self.pages
            .iter()
            .take(n)
            .map(|p| p.text.to_uppercase())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
