//! Grouping of positioned words into visual text lines.

use crate::layout::PositionedWord;

/// A visual line: words sorted left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    pub words: Vec<&'a PositionedWord>,
}

impl<'a> Line<'a> {
    /// Words joined with single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Top coordinate of the leftmost word.
    pub fn top(&self) -> f64 {
        self.words.first().map(|w| w.top).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn finish_line(mut words: Vec<&PositionedWord>) -> Line<'_> {
    words.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    Line { words }
}

/// Group words into lines.
///
/// Words are visited in their natural reading order; a word joins the open
/// line when its `top` is within `tolerance` of the line's first word,
/// otherwise it starts a new line. Every word ends up in exactly one line.
pub fn group_into_lines(words: &[PositionedWord], tolerance: f64) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut current: Vec<&PositionedWord> = Vec::new();

    for word in words {
        match current.first().map(|anchor| anchor.top) {
            Some(top) if (word.top - top).abs() <= tolerance => current.push(word),
            Some(_) => {
                lines.push(finish_line(std::mem::take(&mut current)));
                current.push(word);
            }
            None => current.push(word),
        }
    }

    if !current.is_empty() {
        lines.push(finish_line(current));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(text: &str, x0: f64, top: f64) -> PositionedWord {
        PositionedWord::new(text, x0, x0 + 20.0, top, top + 8.0)
    }

    #[test]
    fn test_groups_by_vertical_proximity() {
        let words = vec![
            w("SERVICIO", 80.0, 100.0),
            w("02", 10.0, 101.0),
            w("PAGO", 40.0, 99.5),
            w("150.00", 300.0, 120.0),
        ];
        let lines = group_into_lines(&words, 3.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "02 PAGO SERVICIO");
        assert_eq!(lines[1].text(), "150.00");
    }

    #[test]
    fn test_anchor_does_not_drift() {
        // each word is within tolerance of the previous one, but the third is
        // too far from the line's first word
        let words = vec![w("A", 0.0, 100.0), w("B", 30.0, 102.5), w("C", 60.0, 105.0)];
        let lines = group_into_lines(&words, 3.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text(), "C");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_into_lines(&[], 3.0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_word_count_conserved_and_sorted(
            raw in proptest::collection::vec((0.0f64..600.0, 0.0f64..800.0), 0..60),
            tolerance in 1.0f64..8.0,
        ) {
            let words: Vec<PositionedWord> = raw
                .iter()
                .enumerate()
                .map(|(i, (x, top))| w(&i.to_string(), *x, *top))
                .collect();
            let lines = group_into_lines(&words, tolerance);

            let total: usize = lines.iter().map(|l| l.words.len()).sum();
            prop_assert_eq!(total, words.len());
            for line in &lines {
                prop_assert!(!line.is_empty());
                prop_assert!(line.words.windows(2).all(|p| p[0].x0 <= p[1].x0));
            }
        }
    }
}
