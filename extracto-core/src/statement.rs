//! Output types shared by every dialect.
//!
//! Serialized field names are the natural-language labels downstream
//! consumers already key on; treat them as part of the wire contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bank that produced a statement; doubles as the transaction source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "BBVA")]
    Bbva,
    #[serde(rename = "Banamex")]
    Banamex,
}

impl Bank {
    pub fn tag(&self) -> &'static str {
        match self {
            Bank::Bbva => "BBVA",
            Bank::Banamex => "Banamex",
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Debit account vs. credit card statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    #[serde(rename = "Cuenta")]
    BankAccount,
    #[serde(rename = "Tarjeta de Credito")]
    CreditCard,
}

/// One transaction recovered from the detail section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// `None` when the date fragment could not be parsed
    #[serde(rename = "Fecha")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Descripción")]
    pub description: String,
    /// Always >= 0
    #[serde(rename = "Retiro")]
    pub charge: f64,
    /// Always >= 0
    #[serde(rename = "Deposito")]
    pub credit: f64,
    /// Running balance after the transaction (0.0 when not printed)
    #[serde(rename = "Saldo")]
    pub balance: f64,
    #[serde(rename = "Banco")]
    pub bank: Bank,
}

impl Transaction {
    pub fn is_charge(&self) -> bool {
        self.charge > 0.0
    }

    pub fn is_credit(&self) -> bool {
        self.credit > 0.0
    }
}

/// Account-level fields. Every field is optional and never guessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    #[serde(rename = "CLABE")]
    pub clabe: Option<String>,
    #[serde(rename = "Numero de Cuenta")]
    pub account_number: Option<String>,
    #[serde(rename = "Numero de Tarjeta")]
    pub card_number: Option<String>,
    #[serde(rename = "RFC")]
    pub rfc: Option<String>,
    #[serde(rename = "Cliente")]
    pub client_name: Option<String>,
    #[serde(rename = "Periodo Inicio")]
    pub period_start: Option<NaiveDate>,
    #[serde(rename = "Periodo Fin")]
    pub period_end: Option<NaiveDate>,
    #[serde(rename = "Saldo Inicial")]
    pub opening_balance: Option<f64>,
    #[serde(rename = "Saldo Final")]
    pub closing_balance: Option<f64>,
    #[serde(rename = "Total Cargos")]
    pub total_charges: Option<f64>,
    #[serde(rename = "Numero de Cargos")]
    pub charge_count: Option<u32>,
    #[serde(rename = "Total Abonos")]
    pub total_credits: Option<f64>,
    #[serde(rename = "Numero de Abonos")]
    pub credit_count: Option<u32>,
    #[serde(rename = "Producto")]
    pub kind: Option<StatementKind>,
}

/// Everything a single parse call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(rename = "Metadatos")]
    pub metadata: StatementMetadata,
    #[serde(rename = "Transacciones")]
    pub transactions: Vec<Transaction>,
}

impl StatementResult {
    pub fn total_charged(&self) -> f64 {
        self.transactions.iter().map(|t| t.charge).sum()
    }

    pub fn total_credited(&self) -> f64 {
        self.transactions.iter().map(|t| t.credit).sum()
    }
}
