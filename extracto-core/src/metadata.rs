//! Account-level metadata from the statement's full text.
//!
//! Every field has an ordered list of strategies, one per known phrasing;
//! the first one that matches wins and a field nobody matches stays `None`.

use anyhow::Result;
use regex::Regex;

use crate::amount::parse_amount_opt;
use crate::dates::normalize_period;
use crate::statement::StatementMetadata;
use crate::text::{match_key, squash_whitespace};

/// One way of finding a field in the document text.
pub type Strategy<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;

/// Run strategies in order, returning the first hit.
pub fn first_match<T>(text: &str, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(text))
}

/// Capture group 1 of `pattern`, whitespace squashed; empty captures miss.
pub fn capture(pattern: &str) -> Result<Strategy<String>> {
    let re = Regex::new(pattern)?;
    Ok(Box::new(move |text: &str| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| squash_whitespace(m.as_str()))
            .filter(|s| !s.is_empty())
    }))
}

/// Like [`capture`], keeping only captures accepted by `accept`.
pub fn capture_if(pattern: &str, accept: fn(&str) -> bool) -> Result<Strategy<String>> {
    let re = Regex::new(pattern)?;
    Ok(Box::new(move |text: &str| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| squash_whitespace(m.as_str())))
            .find(|s| accept(s))
    }))
}

/// Capture group 1 of `pattern` as an amount.
pub fn capture_amount(pattern: &str) -> Result<Strategy<f64>> {
    let re = Regex::new(pattern)?;
    Ok(Box::new(move |text: &str| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_amount_opt(m.as_str()))
    }))
}

/// A summary total: amount plus the number of movements, when printed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Total {
    pub count: Option<u32>,
    pub amount: f64,
}

/// Capture a total from named groups `amount` and optional `count`.
pub fn capture_total(pattern: &str) -> Result<Strategy<Total>> {
    let re = Regex::new(pattern)?;
    Ok(Box::new(move |text: &str| {
        let caps = re.captures(text)?;
        let amount = parse_amount_opt(caps.name("amount")?.as_str())?;
        let count = caps.name("count").and_then(|m| m.as_str().parse().ok());
        Some(Total { count, amount })
    }))
}

/// Capture named groups `start` and `end` as raw period fragments.
pub fn capture_period(pattern: &str) -> Result<Strategy<(String, String)>> {
    let re = Regex::new(pattern)?;
    Ok(Box::new(move |text: &str| {
        let caps = re.captures(text)?;
        Some((
            caps.name("start")?.as_str().trim().to_string(),
            caps.name("end")?.as_str().trim().to_string(),
        ))
    }))
}

/// True when both phrases appear somewhere in the text (case and accent
/// insensitive).
pub fn co_occurs(text: &str, first: &str, second: &str) -> bool {
    let key = match_key(text);
    key.contains(&match_key(first)) && key.contains(&match_key(second))
}

fn looks_like_name(s: &str) -> bool {
    let words: Vec<_> = s.split_whitespace().collect();
    words.len() >= 2
        && s.chars().filter(|c| c.is_alphabetic()).count() >= 5
        && !s.chars().any(|c| c.is_ascii_digit())
}

fn upper_case_line(line: &str, min_len: usize, noise: &[&str]) -> bool {
    let line = line.trim();
    if line.chars().count() < min_len || line.split_whitespace().count() < 2 {
        return false;
    }
    let shape_ok = line
        .chars()
        .all(|c| c.is_uppercase() || c == ' ' || c == '.' || c == ',' || c == '&');
    if !shape_ok {
        return false;
    }
    let key = match_key(line);
    !noise.iter().any(|n| key.split_whitespace().any(|w| w == match_key(n)))
}

/// Client name strategies, most explicit first: a "Receptor" label, a
/// "CLIENTE:" label, a line naming a company by its legal suffix, and
/// finally the first upper-case line of at least `min_len` characters that
/// contains none of the `noise` words.
pub fn client_name_strategies(
    min_len: usize,
    noise: &'static [&'static str],
) -> Result<Vec<Strategy<String>>> {
    let heuristic: Strategy<String> = Box::new(move |text: &str| {
        text.lines()
            .find(|line| upper_case_line(line, min_len, noise))
            .map(squash_whitespace)
    });

    Ok(vec![
        capture_if(r"(?im)\bReceptor\b\s*:?\s*([^\n]+?)\s*(?:R\.?F\.?C\..*|RFC.*)?$", looks_like_name)?,
        capture_if(r"(?m)\bCLIENTE\s*:\s*([^\n]+?)\s*$", looks_like_name)?,
        capture(
            r"(?m)^\s*([A-ZÁÉÍÓÚÑ&][A-ZÁÉÍÓÚÑ0-9&.,' ]+?,?\s+S\.?\s?(?:A\.?(?:\s?P\.?\s?I\.?)?|DE\s+R\.?\s?L\.?)\s+DE\s+C\.?\s?V\.?)\s*$",
        )?,
        heuristic,
    ])
}

/// RFC (tax identifier): labelled first, then any well-formed RFC.
pub fn rfc_strategies() -> Result<Vec<Strategy<String>>> {
    Ok(vec![
        capture(r"(?i)\bR\.?\s?F\.?\s?C\.?\s*(?:del cliente)?\s*:?\s*([A-ZÑ&]{3,4}\d{6}[A-Z0-9]{3})\b")?,
        capture(r"\b([A-ZÑ&]{3,4}\d{6}[A-Z0-9]{3})\b")?,
    ])
}

/// CLABE (18-digit clearing code): labelled first (plain, then printed in
/// digit groups), then a bare 18-digit run.
pub fn clabe_strategies() -> Result<Vec<Strategy<String>>> {
    let grouped = capture(r"(?i)CLABE[^\d\n]{0,30}((?:\d[ -]?){17}\d)\b")?;
    let grouped: Strategy<String> = Box::new(move |text: &str| {
        grouped(text).map(|v| v.chars().filter(char::is_ascii_digit).collect())
    });

    Ok(vec![
        capture(r"(?i)CLABE[^\d\n]{0,30}(\d{18})\b")?,
        grouped,
        capture(r"\b(\d{18})\b")?,
    ])
}

/// Per-field strategy lists for one dialect/product.
#[derive(Default)]
pub struct MetadataRules {
    pub clabe: Vec<Strategy<String>>,
    pub account_number: Vec<Strategy<String>>,
    pub card_number: Vec<Strategy<String>>,
    pub rfc: Vec<Strategy<String>>,
    pub client_name: Vec<Strategy<String>>,
    pub period: Vec<Strategy<(String, String)>>,
    pub opening_balance: Vec<Strategy<f64>>,
    pub closing_balance: Vec<Strategy<f64>>,
    pub charges: Vec<Strategy<Total>>,
    pub credits: Vec<Strategy<Total>>,
}

impl MetadataRules {
    /// Run every field's strategies over `text`. `year` completes period
    /// fragments that omit it.
    pub fn extract(&self, text: &str, year: i32) -> StatementMetadata {
        let (period_start, period_end) = match first_match(text, &self.period) {
            Some((start, end)) => normalize_period(&start, &end, year),
            None => (None, None),
        };
        let charges = first_match(text, &self.charges);
        let credits = first_match(text, &self.credits);

        let metadata = StatementMetadata {
            clabe: first_match(text, &self.clabe),
            account_number: first_match(text, &self.account_number),
            card_number: first_match(text, &self.card_number),
            rfc: first_match(text, &self.rfc),
            client_name: first_match(text, &self.client_name),
            period_start,
            period_end,
            opening_balance: first_match(text, &self.opening_balance),
            closing_balance: first_match(text, &self.closing_balance),
            total_charges: charges.map(|t| t.amount),
            charge_count: charges.and_then(|t| t.count),
            total_credits: credits.map(|t| t.amount),
            credit_count: credits.and_then(|t| t.count),
            kind: None,
        };

        log::debug!("extracted metadata: {metadata:?}");
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const NOISE: &[&str] = &["ESTADO", "CUENTA", "BBVA", "DETALLE"];

    fn name(text: &str) -> Option<String> {
        first_match(text, &client_name_strategies(12, NOISE).unwrap())
    }

    fn never(_: &str) -> Option<u32> {
        panic!("must not run")
    }

    #[test]
    fn test_first_match_short_circuits() {
        let mut strategies: Vec<Strategy<u32>> = Vec::new();
        strategies.push(Box::new(|_: &str| -> Option<u32> { None }));
        strategies.push(Box::new(|_: &str| -> Option<u32> { Some(1) }));
        strategies.push(Box::new(never));
        assert_eq!(first_match("x", &strategies), Some(1));
    }

    #[test]
    fn test_client_name_receptor_label_wins() {
        let text = "ESTADO DE CUENTA\nCLIENTE: OTRA PERSONA\nReceptor: JUAN PEREZ LOPEZ RFC PELJ800101AB1\n";
        assert_eq!(name(text).as_deref(), Some("JUAN PEREZ LOPEZ"));
    }

    #[test]
    fn test_client_name_cliente_label_skips_numbers() {
        let text = "No. de Cliente: 12345678\nCLIENTE: MARIA GARCIA RUIZ\n";
        assert_eq!(name(text).as_deref(), Some("MARIA GARCIA RUIZ"));
    }

    #[test]
    fn test_client_name_legal_entity() {
        let text = "Estado de cuenta\nCOMERCIALIZADORA DEL NORTE, S.A. DE C.V.\nAV. REFORMA 123\n";
        assert_eq!(
            name(text).as_deref(),
            Some("COMERCIALIZADORA DEL NORTE, S.A. DE C.V.")
        );
    }

    #[test]
    fn test_client_name_upper_case_heuristic() {
        let text = "ESTADO DE CUENTA BBVA\nAV 5\nROBERTO SANCHEZ MORA\nCalle 10\n";
        assert_eq!(name(text).as_deref(), Some("ROBERTO SANCHEZ MORA"));
    }

    #[test]
    fn test_client_name_none() {
        assert_eq!(name("sin datos\n123"), None);
    }

    #[test]
    fn test_rfc_and_clabe() {
        let text = "R.F.C. PELJ800101AB1\nCuenta CLABE 012 180 0012 3456 7890\nCLABE: 012180001234567890";
        assert_eq!(first_match(text, &rfc_strategies().unwrap()).as_deref(), Some("PELJ800101AB1"));
        assert_eq!(
            first_match(text, &clabe_strategies().unwrap()).as_deref(),
            Some("012180001234567890")
        );
    }

    #[test]
    fn test_extract_period_and_totals() {
        let rules = MetadataRules {
            period: vec![capture_period(r"DEL (?P<start>\d{2}/\d{2}/\d{4}) AL (?P<end>\d{2}/\d{2}/\d{4})").unwrap()],
            opening_balance: vec![capture_amount(r"Saldo Anterior\s+([\d,]+\.\d{2})").unwrap()],
            charges: vec![capture_total(r"Cargos\s+(?P<count>\d+)\s+(?P<amount>[\d,]+\.\d{2})").unwrap()],
            ..Default::default()
        };
        let text = "Periodo DEL 01/08/2025 AL 31/08/2025\nSaldo Anterior 1,000.00\nCargos 3 450.50";
        let md = rules.extract(text, 1999);
        assert_eq!(md.period_start, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert_eq!(md.period_end, NaiveDate::from_ymd_opt(2025, 8, 31));
        assert_eq!(md.opening_balance, Some(1000.0));
        assert_eq!(md.total_charges, Some(450.5));
        assert_eq!(md.charge_count, Some(3));
        assert!(md.total_credits.is_none());
        assert!(md.client_name.is_none());
    }

    #[test]
    fn test_co_occurs() {
        let text = "Pago para no generar intereses ... Pago mínimo";
        assert!(co_occurs(text, "PAGO PARA NO GENERAR INTERESES", "PAGO MINIMO"));
        assert!(!co_occurs(text, "PAGO PARA NO GENERAR INTERESES", "LIMITE DE CREDITO"));
    }
}
