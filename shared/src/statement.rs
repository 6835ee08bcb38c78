//! Chronological running-balance statements.
//!
//! A statement replays a party's history sorted by the user-entered date
//! (stable sort, so same-day entries keep their append order) and emits one
//! row per transaction plus a leading identity row at balance zero. The
//! closing balance of a complete history equals the party's stored
//! aggregate; that equality is the reconciliation check.

use chrono::NaiveDate;

use crate::ledger;
use crate::{Party, Transaction, TransactionMode};

/// Column order of the exported table.
pub const STATEMENT_COLUMNS: [&str; 8] = [
    "Name",
    "ShopName",
    "PrevCredit",
    "DebitAmount",
    "DebitDate",
    "CreditAmount",
    "CreditDate",
    "TotalCredit",
];

/// One statement line. Absent cells render as a dash.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub name: String,
    pub shop_name: String,
    pub prev_credit: Option<f64>,
    pub debit_amount: Option<f64>,
    pub debit_date: Option<NaiveDate>,
    pub payment_amount: Option<f64>,
    pub payment_date: Option<NaiveDate>,
    pub total_credit: f64,
}

impl StatementRow {
    fn header(party: &Party) -> Self {
        Self {
            name: party.name.clone(),
            shop_name: party.shop_name.clone(),
            prev_credit: None,
            debit_amount: None,
            debit_date: None,
            payment_amount: None,
            payment_date: None,
            total_credit: 0.0,
        }
    }

    fn entry(party: &Party, tx: &Transaction, prev: f64, current: f64) -> Self {
        let (debit, payment) = match tx.mode {
            TransactionMode::Debit => (Some((tx.amount, tx.date)), None),
            TransactionMode::Payment => (None, Some((tx.amount, tx.date))),
        };
        Self {
            name: party.name.clone(),
            shop_name: party.shop_name.clone(),
            prev_credit: Some(prev),
            debit_amount: debit.map(|(amount, _)| amount),
            debit_date: debit.map(|(_, date)| date),
            payment_amount: payment.map(|(amount, _)| amount),
            payment_date: payment.map(|(_, date)| date),
            total_credit: current,
        }
    }

    /// Render the fixed 8-cell record for tabular output.
    pub fn cells(&self) -> [String; 8] {
        [
            self.name.clone(),
            self.shop_name.clone(),
            money_or_dash(self.prev_credit),
            money_or_dash(self.debit_amount),
            date_or_dash(self.debit_date),
            money_or_dash(self.payment_amount),
            date_or_dash(self.payment_date),
            format!("{:.2}", self.total_credit),
        ]
    }
}

fn money_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn date_or_dash(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Build the full statement for a party. An absent history yields the
/// header row only.
pub fn build_statement(party: &Party) -> Vec<StatementRow> {
    let mut rows = Vec::with_capacity(party.transactions.len() + 1);
    rows.push(StatementRow::header(party));

    let mut ordered: Vec<&Transaction> = party.transactions.iter().collect();
    // Stable sort: same-day entries keep their append order.
    ordered.sort_by_key(|tx| tx.date);

    let mut running = 0.0;
    for tx in ordered {
        let current = ledger::apply(running, tx);
        rows.push(StatementRow::entry(party, tx, running, current));
        running = current;
    }
    rows
}

/// The last running credit of a statement; zero for a header-only one.
pub fn closing_balance(rows: &[StatementRow]) -> f64 {
    rows.last().map(|row| row.total_credit).unwrap_or(0.0)
}
