//! Transaction block assembly.
//!
//! A block is one date-anchored line plus the undated lines that follow it.
//! Lines are folded into a [`BlockAccumulator`]; each time a new anchor
//! appears (or the section ends) the open block is finalized into a
//! [`Transaction`].

use chrono::NaiveDate;
use regex::Regex;

use crate::amount::{is_currency_marker, looks_like_amount, parse_amount};
use crate::columns::{ColumnBoundaries, ColumnRole};
use crate::dates::normalize_date;
use crate::layout::PositionedWord;
use crate::lines::Line;
use crate::statement::{Bank, Transaction};
use crate::text::squash_whitespace;

/// Extra horizontal slack per role, absorbing font-width drift between the
/// header label and the printed amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnTolerance {
    pub charge: f64,
    pub credit: f64,
    pub balance: f64,
}

impl ColumnTolerance {
    pub fn for_role(&self, role: ColumnRole) -> f64 {
        match role {
            ColumnRole::Charge => self.charge,
            ColumnRole::Credit => self.credit,
            ColumnRole::Balance => self.balance,
        }
    }
}

/// Dialect rules for turning detail lines into transactions.
#[derive(Debug, Clone)]
pub struct BlockRules {
    /// Leading date tokens that open a block; must be anchored with `^`.
    pub date_anchor: Regex,
    /// Date token sequence removed from the front of the description.
    pub leading_dates: Regex,
    pub tolerance: ColumnTolerance,
    /// Lines dropped outright (page footers, opening balance rows).
    pub skip_lines: Vec<Regex>,
}

impl BlockRules {
    fn skips(&self, text: &str) -> bool {
        self.skip_lines.iter().any(|re| re.is_match(text))
    }

    /// Monetary role of a word, or `None` when it belongs to the description.
    pub fn classify(&self, word: &PositionedWord, columns: &ColumnBoundaries) -> Option<ColumnRole> {
        if !looks_like_amount(&word.text) && !is_currency_marker(&word.text) {
            return None;
        }
        let x = word.center_x();
        [ColumnRole::Charge, ColumnRole::Credit, ColumnRole::Balance]
            .into_iter()
            .filter_map(|role| {
                let span = columns.span(role)?;
                span.contains(x, self.tolerance.for_role(role))
                    .then(|| (role, (x - (span.x0 + span.x1) / 2.0).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(role, _)| role)
    }
}

/// One line of a block, with the columns of the page it was printed on.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    pub words: Vec<PositionedWord>,
    pub columns: ColumnBoundaries,
}

/// Lines belonging to one logical transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBlock {
    pub date: Option<NaiveDate>,
    pub lines: Vec<BlockLine>,
}

#[derive(Debug, Default, Clone, Copy)]
struct BlockAmounts {
    charge: f64,
    credit: f64,
    balance: f64,
}

impl TransactionBlock {
    /// Classify every word and build the transaction. Charge and credit
    /// accumulate across every line of the block; the balance is the last
    /// non-zero value printed. Returns `None` for a block carrying no date,
    /// no description and no amount.
    pub fn finalize(&self, rules: &BlockRules, bank: Bank) -> Option<Transaction> {
        let mut total = BlockAmounts::default();
        let mut description: Vec<&str> = Vec::new();

        for line in &self.lines {
            for word in &line.words {
                match rules.classify(word, &line.columns) {
                    Some(ColumnRole::Charge) => total.charge += parse_amount(&word.text).abs(),
                    Some(ColumnRole::Credit) => total.credit += parse_amount(&word.text).abs(),
                    Some(ColumnRole::Balance) => {
                        let value = parse_amount(&word.text);
                        if value != 0.0 {
                            total.balance = value;
                        }
                    }
                    None => description.push(&word.text),
                }
            }
        }

        let joined = squash_whitespace(&description.join(" "));
        let description = rules.leading_dates.replace(&joined, "").trim().to_string();

        let empty_amounts = total.charge == 0.0 && total.credit == 0.0 && total.balance == 0.0;
        if self.date.is_none() && description.is_empty() && empty_amounts {
            return None;
        }

        Some(Transaction {
            date: self.date,
            description,
            charge: total.charge,
            credit: total.credit,
            balance: total.balance,
            bank,
        })
    }
}

fn is_well_formed(line: &Line<'_>) -> bool {
    line.words
        .iter()
        .all(|w| w.x0.is_finite() && w.x1.is_finite() && w.top.is_finite() && w.x0 <= w.x1)
}

/// Fold state: the block being built and the transactions emitted so far.
#[derive(Debug)]
pub struct BlockAccumulator<'r> {
    rules: &'r BlockRules,
    year: i32,
    bank: Bank,
    open: Option<TransactionBlock>,
    done: Vec<Transaction>,
}

impl<'r> BlockAccumulator<'r> {
    pub fn new(rules: &'r BlockRules, year: i32, bank: Bank) -> Self {
        Self {
            rules,
            year,
            bank,
            open: None,
            done: Vec::new(),
        }
    }

    /// Feed one detail line printed under `columns`.
    pub fn push_line(mut self, line: &Line<'_>, columns: ColumnBoundaries) -> Self {
        let text = line.text();
        if text.trim().is_empty() || self.rules.skips(&text) {
            return self;
        }
        if !is_well_formed(line) {
            log::warn!("skipping malformed line {text:?}");
            return self;
        }

        let block_line = BlockLine {
            words: line.words.iter().map(|w| (*w).clone()).collect(),
            columns,
        };

        // The anchor date must sit left of the monetary columns; a date-like
        // token further right is description text.
        let anchored = self.rules.date_anchor.find(&text).filter(|_| {
            line.words
                .first()
                .is_some_and(|w| w.x1 < columns.charge.x0.min(columns.credit.x0))
        });

        match anchored {
            Some(m) => {
                let date = normalize_date(m.as_str(), self.year);
                if date.is_none() {
                    log::warn!("unparseable date {:?} in line {text:?}", m.as_str());
                }
                self = self.close();
                self.open = Some(TransactionBlock {
                    date,
                    lines: vec![block_line],
                });
            }
            None => match self.open.as_mut() {
                Some(block) => block.lines.push(block_line),
                None => log::debug!("continuation line with no open block: {text:?}"),
            },
        }

        self
    }

    /// Finalize the open block, if any.
    pub fn close(mut self) -> Self {
        if let Some(block) = self.open.take() {
            match block.finalize(self.rules, self.bank) {
                Some(txn) => self.done.push(txn),
                None => log::debug!("dropping empty block"),
            }
        }
        self
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.done
    }

    /// Close the open block and hand back every transaction.
    pub fn finish(self) -> Vec<Transaction> {
        self.close().done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnSpan;
    use crate::lines::group_into_lines;

    fn rules() -> BlockRules {
        BlockRules {
            date_anchor: Regex::new(r"^\d{2} (?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEP|OCT|NOV|DIC)\b").unwrap(),
            leading_dates: Regex::new(r"^\d{2} (?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEP|OCT|NOV|DIC)\s*").unwrap(),
            tolerance: ColumnTolerance {
                charge: 20.0,
                credit: 20.0,
                balance: 40.0,
            },
            skip_lines: vec![Regex::new(r"SALDO ANTERIOR").unwrap()],
        }
    }

    fn columns() -> ColumnBoundaries {
        ColumnBoundaries {
            charge: ColumnSpan { x0: 300.0, x1: 340.0 },
            credit: ColumnSpan { x0: 380.0, x1: 420.0 },
            balance: Some(ColumnSpan { x0: 460.0, x1: 500.0 }),
        }
    }

    fn w(text: &str, x0: f64, top: f64) -> PositionedWord {
        PositionedWord::new(text, x0, x0 + 30.0, top, top + 8.0)
    }

    fn run(words: &[PositionedWord]) -> Vec<Transaction> {
        let rules = rules();
        let lines = group_into_lines(words, 3.0);
        lines
            .iter()
            .fold(BlockAccumulator::new(&rules, 2025, Bank::Banamex), |acc, line| {
                acc.push_line(line, columns())
            })
            .finish()
    }

    #[test]
    fn test_credit_only_block() {
        let txns = run(&[
            w("03", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("DEPOSITO", 60.0, 100.0),
            w("2,500.00", 385.0, 100.0),
            w("3,700.00", 465.0, 100.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].credit, 2500.0);
        assert_eq!(txns[0].charge, 0.0);
        assert_eq!(txns[0].balance, 3700.0);
        assert_eq!(txns[0].description, "DEPOSITO");
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 1, 3));
    }

    #[test]
    fn test_continuation_appends_description() {
        let txns = run(&[
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("PAGO", 60.0, 100.0),
            w("150.00", 305.0, 100.0),
            w("REF", 60.0, 112.0),
            w("12345", 95.0, 112.0),
            w("04", 10.0, 124.0),
            w("ENE", 25.0, 124.0),
            w("RETIRO", 60.0, 124.0),
            w("50.00", 305.0, 124.0),
        ]);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "PAGO REF 12345");
        assert_eq!(txns[0].charge, 150.0);
        assert_eq!(txns[1].description, "RETIRO");
    }

    #[test]
    fn test_split_fragments_are_summed_and_balance_overwritten() {
        let txns = run(&[
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("COMPRA", 60.0, 100.0),
            w("$", 295.0, 100.0),
            w("100.00", 310.0, 100.0),
            w("900.00", 455.0, 100.0),
            w("TIENDA", 60.0, 112.0),
            w("850.00", 470.0, 112.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].charge, 100.0);
        assert_eq!(txns[0].balance, 850.0);
        assert_eq!(txns[0].description, "COMPRA TIENDA");
    }

    #[test]
    fn test_continuation_amounts_accumulate() {
        let txns = run(&[
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("PAGO", 60.0, 100.0),
            w("150.00", 305.0, 100.0),
            w("IVA", 60.0, 112.0),
            w("24.00", 305.0, 112.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].charge, 174.0);
        assert_eq!(txns[0].description, "PAGO IVA");
    }

    #[test]
    fn test_undated_row_with_amounts_joins_open_block() {
        let txns = run(&[
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("PAGO", 60.0, 100.0),
            w("LUZ", 95.0, 100.0),
            w("150.00", 305.0, 100.0),
            w("1,200.00", 465.0, 100.0),
            w("PAGO", 60.0, 112.0),
            w("AGUA", 95.0, 112.0),
            w("99.00", 305.0, 112.0),
            w("1,101.00", 465.0, 112.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].charge, 249.0);
        assert_eq!(txns[0].balance, 1101.0);
        assert_eq!(txns[0].description, "PAGO LUZ PAGO AGUA");
    }

    #[test]
    fn test_line_with_non_finite_coordinates_is_skipped() {
        let txns = run(&[
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("PAGO", 60.0, 100.0),
            w("150.00", 305.0, 100.0),
            PositionedWord::new("BASURA", f64::NAN, 90.0, 112.0, 120.0),
            w("FIN", 60.0, 124.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "PAGO FIN");
        assert_eq!(txns[0].charge, 150.0);
    }

    #[test]
    fn test_leading_continuation_and_skip_lines_dropped() {
        let txns = run(&[
            w("CONTINUA", 60.0, 80.0),
            w("01", 10.0, 90.0),
            w("ENE", 25.0, 90.0),
            w("SALDO", 60.0, 90.0),
            w("ANTERIOR", 95.0, 90.0),
            w("1,000.00", 465.0, 90.0),
            w("02", 10.0, 100.0),
            w("ENE", 25.0, 100.0),
            w("PAGO", 60.0, 100.0),
            w("150.00", 305.0, 100.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "PAGO");
    }

    #[test]
    fn test_unparseable_date_keeps_record() {
        let txns = run(&[
            w("31", 10.0, 100.0),
            w("FEB", 25.0, 100.0),
            w("AJUSTE", 60.0, 100.0),
            w("10.00", 385.0, 100.0),
        ]);
        assert_eq!(txns.len(), 1);
        assert!(txns[0].date.is_none());
        assert_eq!(txns[0].credit, 10.0);
    }

    #[test]
    fn test_date_inside_amount_column_is_not_an_anchor() {
        let rules = rules();
        let words = [w("02", 310.0, 100.0), w("ENE", 330.0, 100.0)];
        let lines = group_into_lines(&words, 3.0);
        let acc = BlockAccumulator::new(&rules, 2025, Bank::Banamex).push_line(&lines[0], columns());
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn test_text_in_amount_column_stays_in_description() {
        let rules = rules();
        let word = w("SPEI", 305.0, 100.0);
        assert_eq!(rules.classify(&word, &columns()), None);
        let amount = w("1.00", 465.0, 100.0);
        assert_eq!(rules.classify(&amount, &columns()), Some(ColumnRole::Balance));
    }
}
