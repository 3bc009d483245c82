//! Banamex (Citibanamex) debit account statements.
//!
//! Detail table:
//!   DETALLE DE OPERACIONES
//!   FECHA  CONCEPTO                     RETIROS   DEPOSITOS      SALDO
//!   01 ENE SALDO ANTERIOR                                     1,350.00
//!   02 ENE PAGO SERVICIO                 150.00               1,200.00
//!          REF 123456
//!   SALDO MINIMO REQUERIDO ...
//!
//! The opening-balance row carries a date but is not a transaction.

use anyhow::Result;
use regex::Regex;

use extracto_core::blocks::{BlockRules, ColumnTolerance};
use extracto_core::columns::{HeaderVocabulary, Occurrence};
use extracto_core::metadata::{
    MetadataRules, capture, capture_amount, capture_period, capture_total, clabe_strategies,
    client_name_strategies, rfc_strategies,
};
use extracto_core::{
    Bank, DetailLayout, Document, SectionMarkers, StatementKind, StatementResult,
    extract_transactions,
};

use super::{effective_year, ensure_readable};

const NAME_NOISE: &[&str] = &[
    "BANAMEX", "CITIBANAMEX", "BANCO", "NACIONAL", "ESTADO", "CUENTA", "RESUMEN", "DETALLE",
    "OPERACIONES", "SALDO", "TOTAL", "FECHA", "PAGINA", "SUCURSAL", "CONTRATO", "CLIENTE",
    "PERIODO", "PRIORITY", "INVERSION",
];

fn layout() -> Result<DetailLayout> {
    Ok(DetailLayout {
        bank: Bank::Banamex,
        line_tolerance: 5.0,
        vocabulary: HeaderVocabulary {
            charge: &["RETIROS"],
            credit: &["DEPOSITOS"],
            balance: &["SALDO"],
            balance_occurrence: Occurrence::First,
            balance_band: 12.0,
        },
        markers: SectionMarkers {
            start: &["Detalle de Operaciones"],
            stop: &[
                "SALDO MINIMO REQUERIDO",
                "TOTAL DE OPERACIONES",
                "COMISIONES EFECTIVAMENTE COBRADAS",
            ],
        },
        blocks: BlockRules {
            date_anchor: Regex::new(r"(?i)^\d{2}\s+(?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)\b")?,
            leading_dates: Regex::new(r"(?i)^\d{2}\s+(?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)\s*")?,
            tolerance: ColumnTolerance {
                charge: 25.0,
                credit: 25.0,
                balance: 35.0,
            },
            skip_lines: vec![
                Regex::new(r"(?i)\bSALDO\s+ANTERIOR\b")?,
                Regex::new(r"(?i)\bP[AÁ]GINA\s*:?\s*\d+\s*(?:DE|/)\s*\d+")?,
                Regex::new(r"(?i)^ESTADO DE CUENTA\b")?,
            ],
        },
    })
}

fn metadata_rules() -> Result<MetadataRules> {
    Ok(MetadataRules {
        clabe: clabe_strategies()?,
        account_number: vec![
            capture(r"(?i)\bCONTRATO\s*:?\s*(\d{7,12})\b")?,
            capture(r"(?i)N[uú]mero\s+de\s+cuenta\s*:?\s*(\d{7,12})\b")?,
            capture(r"(?i)CUENTA\s+DE\s+CHEQUES\s*:?\s*(\d{7,12})\b")?,
        ],
        card_number: vec![capture(
            r"(?i)N[uú]mero\s+de\s+tarjeta\s*:?\s*([\dX*]{4}(?:[\s-]?[\dX*]{4}){3})",
        )?],
        rfc: rfc_strategies()?,
        client_name: client_name_strategies(12, NAME_NOISE)?,
        period: vec![
            capture_period(
                r"(?i)RESUMEN\s+(?:POR\s+PERIODO\s+)?DEL\s*:?\s*(?P<start>\d{1,2}/[A-Z]{3}/\d{4})\s+AL\s+(?P<end>\d{1,2}/[A-Z]{3}/\d{4})",
            )?,
            capture_period(
                r"(?i)Per[ií]odo\s*:?\s*del\s+(?P<start>\d{1,2}\s+de\s+[a-záéíóú]+(?:\s+(?:de|del)\s+\d{4})?)\s+al\s+(?P<end>\d{1,2}\s+de\s+[a-záéíóú]+\s+(?:de|del)\s+\d{4})",
            )?,
        ],
        opening_balance: vec![
            capture_amount(r"(?i)Saldo\s+Anterior\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
        ],
        closing_balance: vec![
            capture_amount(r"(?i)Saldo\s+al\s+Corte\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
            capture_amount(r"(?i)Saldo\s+Final\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
        ],
        charges: vec![
            capture_total(
                r"(?i)\(-\)\s*Retiros\s*:?\s*(?:(?P<count>\d+)\s+)?\$?\s*(?P<amount>[\d,]+\.\d{2})",
            )?,
            capture_total(r"(?i)Total\s+de\s+Retiros\s*:?\s*\$?\s*(?P<amount>[\d,]+\.\d{2})")?,
        ],
        credits: vec![
            capture_total(
                r"(?i)\(\+\)\s*Dep[oó]sitos\s*:?\s*(?:(?P<count>\d+)\s+)?\$?\s*(?P<amount>[\d,]+\.\d{2})",
            )?,
            capture_total(r"(?i)Total\s+de\s+Dep[oó]sitos\s*:?\s*\$?\s*(?P<amount>[\d,]+\.\d{2})")?,
        ],
    })
}

/// Parse a Banamex debit statement. `year_hint` is used only when the
/// statement's own period cannot be read.
pub fn parse_banamex_document(document: &Document, year_hint: i32) -> Result<StatementResult> {
    ensure_readable(document)?;
    log::info!(
        "Banamex statement, {} pages, year hint {}",
        document.pages.len(),
        year_hint
    );

    let text = document.full_text();
    let mut metadata = metadata_rules()?.extract(&text, year_hint);
    metadata.kind = Some(StatementKind::BankAccount);

    let year = effective_year(&metadata, year_hint);
    let transactions = extract_transactions(document, &layout()?, year);
    log::info!("Banamex: {} transactions extracted", transactions.len());

    Ok(StatementResult {
        metadata,
        transactions,
    })
}
