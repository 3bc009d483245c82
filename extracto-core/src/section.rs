//! Tracks whether the current line belongs to the transaction detail section.

use serde::{Deserialize, Serialize};

use crate::text::match_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionState {
    #[default]
    BeforeDetail,
    InDetail,
    /// Absorbing: nothing reopens the detail section once it has closed.
    AfterDetail,
}

/// Textual markers opening and closing the detail section. Matched as
/// case- and accent-insensitive substrings of the line text.
#[derive(Debug, Clone)]
pub struct SectionMarkers {
    pub start: &'static [&'static str],
    pub stop: &'static [&'static str],
}

impl SectionMarkers {
    fn hits(line_key: &str, markers: &[&str]) -> bool {
        markers.iter().any(|m| line_key.contains(&match_key(m)))
    }
}

/// Result of feeding one line to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAdmission {
    /// Detail content; hand it to the block parser
    Admit,
    /// The line opened the section
    Opened,
    /// The line closed the section
    Closed,
    /// Outside the section
    Ignore,
}

#[derive(Debug, Clone)]
pub struct SectionTracker {
    state: SectionState,
    markers: SectionMarkers,
}

impl SectionTracker {
    pub fn new(markers: SectionMarkers) -> Self {
        Self {
            state: SectionState::BeforeDetail,
            markers,
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    /// Advance on one line of text. Marker lines themselves are never admitted.
    pub fn feed(&mut self, line_text: &str) -> LineAdmission {
        let key = match_key(line_text);
        match self.state {
            SectionState::BeforeDetail => {
                if SectionMarkers::hits(&key, self.markers.start) {
                    self.state = SectionState::InDetail;
                    LineAdmission::Opened
                } else {
                    LineAdmission::Ignore
                }
            }
            SectionState::InDetail => {
                if SectionMarkers::hits(&key, self.markers.stop) {
                    self.state = SectionState::AfterDetail;
                    LineAdmission::Closed
                } else {
                    LineAdmission::Admit
                }
            }
            SectionState::AfterDetail => LineAdmission::Ignore,
        }
    }
}
