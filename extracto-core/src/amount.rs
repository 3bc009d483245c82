//! Currency token normalization.
//!
//! Statements print amounts as `1,600.00`, `$ 1,600.00`, `62.18-` or
//! `(50.00)`. Extraction is best-effort: a bad token becomes 0.0 and the
//! document keeps going.

use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+(]?\$?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}\)?-?$").expect("amount regex")
});

const CURRENCY_CODES: [&str; 3] = ["MXN", "USD", "MN"];

/// Parse a monetary token, returning `None` when nothing numeric is left
/// after stripping symbols and separators.
pub fn parse_amount_opt(token: &str) -> Option<f64> {
    let mut s: String = token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '$')
        .collect::<String>()
        .to_uppercase();

    for code in CURRENCY_CODES {
        if let Some(rest) = s.strip_suffix(code) {
            s = rest.to_string();
        }
        if let Some(rest) = s.strip_prefix(code) {
            s = rest.to_string();
        }
    }

    let mut negative = false;
    let mut body = s.as_str();
    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        negative = true;
        body = inner;
    }
    if let Some(rest) = body.strip_suffix('-') {
        negative = true;
        body = rest;
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    if !body.chars().any(|c| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }

    let value: f64 = body.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a monetary token; unparsable input yields 0.0.
pub fn parse_amount(token: &str) -> f64 {
    match parse_amount_opt(token) {
        Some(v) => v,
        None => {
            if !token.trim().is_empty() {
                log::debug!("unparsable amount token {token:?}, using 0.0");
            }
            0.0
        }
    }
}

/// True for tokens shaped like a printed amount (two decimals required).
pub fn looks_like_amount(token: &str) -> bool {
    AMOUNT_RE.is_match(token.trim())
}

/// A bare currency marker printed as its own fragment (`$`, `MXN`).
pub fn is_currency_marker(token: &str) -> bool {
    let t = token.trim();
    t == "$" || CURRENCY_CODES.iter().any(|c| t.eq_ignore_ascii_case(c))
}
