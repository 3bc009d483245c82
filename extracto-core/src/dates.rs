//! Date normalization for the Spanish spellings found on Mexican statements.
//!
//! Recognized, most specific first:
//!   13 de abril del 2025      (long form, year optional)
//!   01/FEB/2025, 01-feb-2025  (abbreviated month with year)
//!   15 AGO, 02/ENE            (abbreviated month, year from context)
//!   31/08/2025                (numeric)

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::text::fold_accents;

static LONG_FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s+de\s+([a-z]+)(?:\s+(?:de|del)\s+(\d{4}))?")
        .expect("long form date regex")
});

static MONTH_WITH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?:[/\-]|\s+)([a-z]{3,10})\.?(?:[/\-]|\s+)(\d{4})\b")
        .expect("month with year regex")
});

static MONTH_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?:[/\-]|\s+)([a-z]{3,10})\b").expect("month only regex")
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("numeric date regex")
});

/// Map a Spanish month name or abbreviation to its number.
pub fn month_number(name: &str) -> Option<u32> {
    let key = fold_accents(name.trim().trim_end_matches('.')).to_uppercase();
    let month = match key.as_str() {
        "ENE" | "ENERO" => 1,
        "FEB" | "FEBRERO" => 2,
        "MAR" | "MARZO" => 3,
        "ABR" | "ABRIL" => 4,
        "MAY" | "MAYO" => 5,
        "JUN" | "JUNIO" => 6,
        "JUL" | "JULIO" => 7,
        "AGO" | "AGOSTO" => 8,
        "SEP" | "SEPT" | "SET" | "SEPTIEMBRE" | "SETIEMBRE" => 9,
        "OCT" | "OCTUBRE" => 10,
        "NOV" | "NOVIEMBRE" => 11,
        "DIC" | "DICIEMBRE" => 12,
        _ => return None,
    };
    Some(month)
}

fn long_form(s: &str, year: i32) -> Option<NaiveDate> {
    let caps = LONG_FORM_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = match caps.get(3) {
        Some(y) => y.as_str().parse().ok()?,
        None => year,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_with_year(s: &str) -> Option<NaiveDate> {
    let caps = MONTH_WITH_YEAR_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_only(s: &str, year: i32) -> Option<NaiveDate> {
    let caps = MONTH_ONLY_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn numeric(s: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a raw date fragment. `year` fills in fragments that omit it.
/// Returns `None` for anything unrecognized or not a real calendar day.
pub fn normalize_date(raw: &str, year: i32) -> Option<NaiveDate> {
    let s = fold_accents(raw);
    long_form(&s, year)
        .or_else(|| month_with_year(&s))
        .or_else(|| month_only(&s, year))
        .or_else(|| numeric(&s))
}

/// Normalize a statement period whose start may omit the year
/// ("del 14 de marzo al 13 de abril del 2025"). The start inherits the end's
/// year, or the previous one when the period wraps over New Year.
pub fn normalize_period(
    start_raw: &str,
    end_raw: &str,
    year: i32,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let end = normalize_date(end_raw, year);
    let anchor_year = end.map(|d| d.year()).unwrap_or(year);
    let start = normalize_date(start_raw, anchor_year).map(|d| match end {
        Some(e) if d > e => d.with_year(d.year() - 1).unwrap_or(d),
        _ => d,
    });
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_long_form() {
        assert_eq!(normalize_date("13 de abril del 2025", 1999), Some(ymd(2025, 4, 13)));
        assert_eq!(normalize_date("1 de Enero de 2024", 1999), Some(ymd(2024, 1, 1)));
        assert_eq!(normalize_date("14 de marzo", 2025), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn test_abbreviated_with_year() {
        assert_eq!(normalize_date("01/FEB/2025", 1999), Some(ymd(2025, 2, 1)));
        assert_eq!(normalize_date("28-dic-2024", 1999), Some(ymd(2024, 12, 28)));
    }

    #[test]
    fn test_abbreviated_uses_context_year() {
        assert_eq!(normalize_date("15 AGO", 2024), Some(ymd(2024, 8, 15)));
        assert_eq!(normalize_date("02/ENE 03/ENE SPEI", 2025), Some(ymd(2025, 1, 2)));
        assert_eq!(normalize_date("07 SEPT", 2023), Some(ymd(2023, 9, 7)));
    }

    #[test]
    fn test_numeric() {
        assert_eq!(normalize_date("31/08/2025", 1999), Some(ymd(2025, 8, 31)));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(normalize_date("PAGO SERVICIO", 2025), None);
        assert_eq!(normalize_date("", 2025), None);
        assert_eq!(normalize_date("31 FEB", 2025), None);
        assert_eq!(normalize_date("12 XYZ", 2025), None);
        assert_eq!(normalize_date("45/13/2025", 2025), None);
    }

    #[test]
    fn test_iso_output() {
        let d = normalize_date("5 ENE", 2025).unwrap();
        assert_eq!(d.to_string(), "2025-01-05");
    }

    #[test]
    fn test_period_inherits_end_year() {
        let (start, end) = normalize_period("14 de marzo", "13 de abril del 2025", 1999);
        assert_eq!(start, Some(ymd(2025, 3, 14)));
        assert_eq!(end, Some(ymd(2025, 4, 13)));
    }

    #[test]
    fn test_period_wraps_new_year() {
        let (start, end) = normalize_period("15 de diciembre", "14 de enero del 2025", 1999);
        assert_eq!(start, Some(ymd(2024, 12, 15)));
        assert_eq!(end, Some(ymd(2025, 1, 14)));
    }

    #[test]
    fn test_month_table() {
        assert_eq!(month_number("ago"), Some(8));
        assert_eq!(month_number("Diciembre"), Some(12));
        assert_eq!(month_number("SEPT."), Some(9));
        assert_eq!(month_number("XYZ"), None);
    }
}
