//! BBVA México statement dialect (debit accounts and credit cards).
//!
//! Debit detail section, as laid out on the page:
//!   Detalle de Movimientos Realizados
//!   FECHA                                                         SALDO
//!   OPER   LIQ    DESCRIPCIÓN            CARGOS   ABONOS   OPERACIÓN  LIQUIDACIÓN
//!   02/AGO 02/AGO SPEI ENVIADO BANAMEX  1,500.00            8,500.00    8,500.00
//!                 REF 0012345 CONCEPTO RENTA
//!   Total de Movimientos
//!
//! Credit card statements print `DESGLOSE DE MOVIMIENTOS` with full dates
//! (`13-mar-2025` or `13/MAR/2025`) and CARGOS / ABONOS columns; their summary
//! box uses a different vocabulary ("Pagos y abonos", "Saldo deudor total").

use anyhow::Result;
use regex::Regex;

use extracto_core::blocks::{BlockRules, ColumnTolerance};
use extracto_core::columns::{HeaderVocabulary, Occurrence};
use extracto_core::metadata::{
    MetadataRules, capture, capture_amount, capture_period, capture_total, clabe_strategies,
    client_name_strategies, co_occurs, rfc_strategies,
};
use extracto_core::{
    Bank, DetailLayout, Document, SectionMarkers, StatementKind, StatementResult,
    extract_transactions,
};

use super::{effective_year, ensure_readable};

const NAME_NOISE: &[&str] = &[
    "BBVA", "BANCOMER", "ESTADO", "CUENTA", "PERIODO", "DETALLE", "MOVIMIENTOS", "SALDO",
    "TOTAL", "RESUMEN", "FECHA", "PAGINA", "INFORMACION", "SUCURSAL", "TARJETA", "CREDITO",
    "PAGO", "INTERESES", "COMISIONES", "LIBRETON", "MEXICO",
];

/// Which BBVA product a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BbvaProduct {
    Debit,
    CreditCard,
}

impl BbvaProduct {
    /// Credit card statements always print both of these phrases in the
    /// payment box; debit statements print neither.
    pub fn detect(text: &str) -> Self {
        if co_occurs(text, "Pago para no generar intereses", "Pago mínimo") {
            BbvaProduct::CreditCard
        } else {
            BbvaProduct::Debit
        }
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            BbvaProduct::Debit => StatementKind::BankAccount,
            BbvaProduct::CreditCard => StatementKind::CreditCard,
        }
    }

    pub fn layout(&self) -> Result<DetailLayout> {
        let layout = match self {
            BbvaProduct::Debit => DetailLayout {
                bank: Bank::Bbva,
                line_tolerance: 3.0,
                vocabulary: HeaderVocabulary {
                    charge: &["CARGOS"],
                    credit: &["ABONOS"],
                    balance: &["SALDO", "LIQUIDACION"],
                    balance_occurrence: Occurrence::Last,
                    balance_band: 14.0,
                },
                markers: SectionMarkers {
                    start: &["Detalle de Movimientos Realizados"],
                    stop: &["Total de Movimientos", "Total Importe Cargos"],
                },
                blocks: BlockRules {
                    date_anchor: Regex::new(r"(?i)^\d{2}/(?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)\b")?,
                    leading_dates: Regex::new(r"(?i)^(?:\d{2}/(?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)\s*){1,2}")?,
                    tolerance: ColumnTolerance {
                        charge: 20.0,
                        credit: 20.0,
                        balance: 40.0,
                    },
                    skip_lines: vec![
                        Regex::new(r"(?i)^La GAT Real")?,
                        Regex::new(r"(?i)\bP[AÁ]GINA\s+\d+\s*(?:/|DE)\s*\d+")?,
                        Regex::new(r"(?i)^No\.\s*de\s*(?:Cuenta|Cliente)\b")?,
                        Regex::new(r"(?i)^Estado de Cuenta\b")?,
                    ],
                },
            },
            BbvaProduct::CreditCard => DetailLayout {
                bank: Bank::Bbva,
                line_tolerance: 4.0,
                vocabulary: HeaderVocabulary {
                    charge: &["CARGOS"],
                    credit: &["ABONOS"],
                    balance: &[],
                    balance_occurrence: Occurrence::First,
                    balance_band: 0.0,
                },
                markers: SectionMarkers {
                    start: &["DESGLOSE DE MOVIMIENTOS"],
                    stop: &["Total cargos", "Notas aclaratorias", "ATENCION DE QUEJAS"],
                },
                blocks: BlockRules {
                    date_anchor: Regex::new(r"(?i)^\d{1,2}[/-](?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)[/-]\d{4}\b")?,
                    leading_dates: Regex::new(r"(?i)^(?:\d{1,2}[/-](?:ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEPT?|SET|OCT|NOV|DIC)[/-]\d{4}\s*){1,2}")?,
                    tolerance: ColumnTolerance {
                        charge: 25.0,
                        credit: 25.0,
                        balance: 0.0,
                    },
                    skip_lines: vec![
                        Regex::new(r"(?i)\bP[AÁ]GINA\s+\d+\s*(?:/|DE)\s*\d+")?,
                        Regex::new(r"(?i)^Tarjeta titular\b")?,
                    ],
                },
            },
        };
        Ok(layout)
    }

    pub fn metadata_rules(&self) -> Result<MetadataRules> {
        let common = MetadataRules {
            clabe: clabe_strategies()?,
            rfc: rfc_strategies()?,
            client_name: client_name_strategies(12, NAME_NOISE)?,
            ..Default::default()
        };

        let rules = match self {
            BbvaProduct::Debit => MetadataRules {
                account_number: vec![
                    capture(r"(?i)No\.?\s*de\s*Cuenta\s*:?\s*(\d{10})\b")?,
                    capture(r"(?i)\bCuenta\s*:?\s*(\d{10,11})\b")?,
                ],
                card_number: vec![capture(
                    r"(?i)No\.?\s*de\s*Tarjeta\s*:?\s*([\dX*]{4}(?:[\s-]?[\dX*]{4}){3})",
                )?],
                period: vec![
                    capture_period(
                        r"(?i)Periodo\s*:?\s*DEL\s+(?P<start>\d{2}/\d{2}/\d{4})\s+AL\s+(?P<end>\d{2}/\d{2}/\d{4})",
                    )?,
                    capture_period(
                        r"(?i)\bDEL\s+(?P<start>\d{2}/\d{2}/\d{4})\s+AL\s+(?P<end>\d{2}/\d{2}/\d{4})",
                    )?,
                ],
                opening_balance: vec![
                    capture_amount(r"(?i)Saldo\s+Anterior\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                    capture_amount(r"(?i)Saldo\s+Inicial\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                ],
                closing_balance: vec![
                    capture_amount(r"(?i)Saldo\s+Final\s*(?:\(\+\))?\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                    capture_amount(r"(?i)Saldo\s+al\s+Corte\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                ],
                charges: vec![
                    capture_total(
                        r"(?i)Retiros\s*/\s*Cargos\s*\(-\)\s*(?P<count>\d+)\s+\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                    capture_total(r"(?i)Total\s+Importe\s+Cargos\s*\$?\s*(?P<amount>[\d,]+\.\d{2})")?,
                ],
                credits: vec![
                    capture_total(
                        r"(?i)Dep[oó]sitos\s*/\s*Abonos\s*\(\+\)\s*(?P<count>\d+)\s+\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                    capture_total(r"(?i)Total\s+Importe\s+Abonos\s*\$?\s*(?P<amount>[\d,]+\.\d{2})")?,
                ],
                ..common
            },
            BbvaProduct::CreditCard => MetadataRules {
                account_number: vec![capture(r"(?i)N[uú]mero\s+de\s+cuenta\s*:?\s*(\d{10,16})\b")?],
                card_number: vec![
                    capture(
                        r"(?i)N[uú]mero\s+de\s+tarjeta\s*:?\s*([\dX*]{4}(?:[\s-]?[\dX*]{4}){3})",
                    )?,
                    capture(r"(?i)Tarjeta\s+titular\s*:?\s*([\dX*]{4}(?:[\s-]?[\dX*]{4}){3})")?,
                ],
                period: vec![
                    capture_period(
                        r"(?i)Periodo\s*:?\s*(?:del\s+)?(?P<start>\d{1,2}\s+de\s+[a-záéíóú]+(?:\s+(?:de|del)\s+\d{4})?)\s+al\s+(?P<end>\d{1,2}\s+de\s+[a-záéíóú]+\s+(?:de|del)\s+\d{4})",
                    )?,
                    capture_period(
                        r"(?i)Periodo\s*:?\s*(?:del\s+)?(?P<start>\d{1,2}-[a-z]{3}-\d{4})\s+al\s+(?P<end>\d{1,2}-[a-z]{3}-\d{4})",
                    )?,
                ],
                opening_balance: vec![
                    capture_amount(r"(?i)Adeudo\s+del\s+periodo\s+anterior\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                    capture_amount(r"(?i)Saldo\s+anterior\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                ],
                closing_balance: vec![
                    capture_amount(r"(?i)Saldo\s+deudor\s+total\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                    capture_amount(r"(?i)Saldo\s+al\s+corte\s*:?\s*\$?\s*([\d,]+\.\d{2}-?)")?,
                ],
                charges: vec![
                    capture_total(
                        r"(?i)Total\s+cargos\s*\(\s*(?P<count>\d+)\s*\)\s*\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                    capture_total(
                        r"(?i)Compras\s+y\s+cargos(?:\s+del\s+periodo)?\s*(?:\(\+\))?\s*:?\s*\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                ],
                credits: vec![
                    capture_total(
                        r"(?i)Total\s+abonos\s*\(\s*(?P<count>\d+)\s*\)\s*\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                    capture_total(
                        r"(?i)Pagos\s+y\s+abonos\s*(?:\(-\))?\s*:?\s*\$?\s*(?P<amount>[\d,]+\.\d{2})",
                    )?,
                ],
                ..common
            },
        };
        Ok(rules)
    }
}

/// Parse a BBVA statement. `year_hint` is used only when the statement's
/// own period cannot be read.
pub fn parse_bbva_document(document: &Document, year_hint: i32) -> Result<StatementResult> {
    ensure_readable(document)?;

    let text = document.full_text();
    let product = BbvaProduct::detect(&text);
    log::info!(
        "BBVA {:?} statement, {} pages, year hint {}",
        product,
        document.pages.len(),
        year_hint
    );

    let mut metadata = product.metadata_rules()?.extract(&text, year_hint);
    metadata.kind = Some(product.kind());

    let year = effective_year(&metadata, year_hint);
    let transactions = extract_transactions(document, &product.layout()?, year);
    log::info!("BBVA: {} transactions extracted", transactions.len());

    Ok(StatementResult {
        metadata,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use extracto_core::Page;

    const DEBIT_TEXT: &str = r#"
BBVA MÉXICO, S.A., INSTITUCIÓN DE BANCA MÚLTIPLE
Estado de Cuenta
LIBRETON BASICO CUENTA DIGITAL
JUAN PEREZ LOPEZ
Periodo DEL 01/08/2025 AL 31/08/2025
No. de Cuenta 0123456789
No. de Cliente D1234567
R.F.C PELJ800101AB1
Cuenta CLABE 012180001234567890
Saldo Anterior 10,000.00
Depósitos / Abonos (+) 1 5,000.00
Retiros / Cargos (-) 2 1,650.00
Saldo Final 13,350.00
"#;

    const CREDIT_TEXT: &str = r#"
BBVA MÉXICO
TARJETA DE CREDITO AZUL
ANA MARIA TORRES DIAZ
Número de tarjeta: 4152 3138 0000 1234
Periodo: del 14 de marzo al 13 de abril del 2025
Pago para no generar intereses: $8,200.00
Pago mínimo: $950.00
Adeudo del periodo anterior $5,100.00
Compras y cargos del periodo (+) $4,300.50
Pagos y abonos (-) $1,200.00
Saldo deudor total: $8,200.50
"#;

    #[test]
    fn test_detect_product() {
        assert_eq!(BbvaProduct::detect(DEBIT_TEXT), BbvaProduct::Debit);
        assert_eq!(BbvaProduct::detect(CREDIT_TEXT), BbvaProduct::CreditCard);
    }

    #[test]
    fn test_debit_metadata() {
        let md = BbvaProduct::Debit.metadata_rules().unwrap().extract(DEBIT_TEXT, 1999);
        assert_eq!(md.account_number.as_deref(), Some("0123456789"));
        assert_eq!(md.clabe.as_deref(), Some("012180001234567890"));
        assert_eq!(md.rfc.as_deref(), Some("PELJ800101AB1"));
        assert_eq!(md.client_name.as_deref(), Some("JUAN PEREZ LOPEZ"));
        assert_eq!(md.period_start, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert_eq!(md.period_end, NaiveDate::from_ymd_opt(2025, 8, 31));
        assert_eq!(md.opening_balance, Some(10_000.0));
        assert_eq!(md.closing_balance, Some(13_350.0));
        assert_eq!(md.total_credits, Some(5_000.0));
        assert_eq!(md.credit_count, Some(1));
        assert_eq!(md.total_charges, Some(1_650.0));
        assert_eq!(md.charge_count, Some(2));
        assert!(md.card_number.is_none());
    }

    #[test]
    fn test_credit_card_metadata() {
        let md = BbvaProduct::CreditCard
            .metadata_rules()
            .unwrap()
            .extract(CREDIT_TEXT, 1999);
        assert_eq!(md.card_number.as_deref(), Some("4152 3138 0000 1234"));
        assert_eq!(md.client_name.as_deref(), Some("ANA MARIA TORRES DIAZ"));
        assert_eq!(md.period_start, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(md.period_end, NaiveDate::from_ymd_opt(2025, 4, 13));
        assert_eq!(md.opening_balance, Some(5_100.0));
        assert_eq!(md.closing_balance, Some(8_200.5));
        assert_eq!(md.total_charges, Some(4_300.5));
        assert_eq!(md.total_credits, Some(1_200.0));
        assert!(md.charge_count.is_none());
    }

    #[test]
    fn test_text_only_document_yields_metadata_and_no_transactions() {
        let doc = Document::new(vec![Page::new(1, DEBIT_TEXT, vec![])]);
        let result = parse_bbva_document(&doc, 2020).unwrap();
        assert_eq!(result.metadata.kind, Some(StatementKind::BankAccount));
        assert_eq!(result.metadata.closing_balance, Some(13_350.0));
        assert!(result.transactions.is_empty());
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(parse_bbva_document(&Document::default(), 2025).is_err());
    }
}
