//! Pure balance arithmetic for party ledgers.
//!
//! Balance computation order is append order, never the user-entered date.
//! Everything here is side-effect free so both sides of the API boundary
//! can agree on the same numbers.

use std::fmt;

use crate::{Transaction, TransactionMode};

/// Tolerance for comparing derived balances to stored aggregates.
pub const BALANCE_EPSILON: f64 = 0.001;

/// The signed contribution of one transaction to the running credit.
pub fn signed_amount(tx: &Transaction) -> f64 {
    match tx.mode {
        TransactionMode::Debit => tx.amount,
        TransactionMode::Payment => -tx.amount,
    }
}

/// Apply one transaction to a balance.
pub fn apply(balance: f64, tx: &Transaction) -> f64 {
    balance + signed_amount(tx)
}

/// Fold a full history over an opening balance.
pub fn total_credit(opening: f64, history: &[Transaction]) -> f64 {
    history.iter().fold(opening, |balance, tx| apply(balance, tx))
}

/// True when a stored aggregate matches the fold of the given history.
pub fn reconciles(stored: f64, opening: f64, history: &[Transaction]) -> bool {
    (total_credit(opening, history) - stored).abs() < BALANCE_EPSILON
}

#[derive(Debug, Clone, PartialEq)]
pub enum AmountError {
    Empty,
    NotANumber(String),
    NotFinite,
    NotPositive(f64),
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "amount is empty"),
            AmountError::NotANumber(raw) => write!(f, "amount is not a number: {}", raw),
            AmountError::NotFinite => write!(f, "amount is not a finite number"),
            AmountError::NotPositive(value) => write!(f, "amount must be positive: {}", value),
        }
    }
}

impl std::error::Error for AmountError {}

/// Parse raw form input into a transaction amount. Rejected input never
/// reaches the persistence boundary.
pub fn parse_amount(raw: &str) -> Result<f64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;
    validate_amount(value)?;
    Ok(value)
}

/// Boundary check for amounts that arrive already numeric.
pub fn validate_amount(value: f64) -> Result<(), AmountError> {
    if !value.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if value <= 0.0 {
        return Err(AmountError::NotPositive(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(mode: TransactionMode, amount: f64, date: &str) -> Transaction {
        Transaction {
            mode,
            amount,
            date: date.parse::<NaiveDate>().unwrap(),
        }
    }

    #[test]
    fn test_signed_amount_by_mode() {
        assert_eq!(signed_amount(&tx(TransactionMode::Debit, 100.0, "2024-01-01")), 100.0);
        assert_eq!(signed_amount(&tx(TransactionMode::Payment, 40.0, "2024-01-01")), -40.0);
    }

    #[test]
    fn test_total_credit_is_fold_of_history() {
        let history = vec![
            tx(TransactionMode::Debit, 100.0, "2024-01-01"),
            tx(TransactionMode::Payment, 50.0, "2024-02-01"),
            tx(TransactionMode::Debit, 100.0, "2024-03-01"),
        ];
        assert_eq!(total_credit(0.0, &history), 150.0);
        // Opening balances carry straight through the fold.
        assert_eq!(total_credit(25.0, &history), 175.0);
    }

    #[test]
    fn test_total_credit_matches_sum_of_signed_amounts() {
        let history = vec![
            tx(TransactionMode::Debit, 10.0, "2024-01-05"),
            tx(TransactionMode::Debit, 2.5, "2024-01-06"),
            tx(TransactionMode::Payment, 7.25, "2024-01-07"),
            tx(TransactionMode::Payment, 1.0, "2024-01-08"),
        ];
        let debits: f64 = 10.0 + 2.5;
        let payments: f64 = 7.25 + 1.0;
        assert!((total_credit(0.0, &history) - (debits - payments)).abs() < BALANCE_EPSILON);
    }

    #[test]
    fn test_final_balance_ignores_date_order() {
        // Back-dated entries shift intermediate balances, never the total.
        let appended = vec![
            tx(TransactionMode::Debit, 100.0, "2024-03-01"),
            tx(TransactionMode::Payment, 50.0, "2024-01-01"),
        ];
        let mut by_date = appended.clone();
        by_date.sort_by_key(|t| t.date);
        assert_eq!(total_credit(0.0, &appended), total_credit(0.0, &by_date));
    }

    #[test]
    fn test_payment_from_zero_goes_negative() {
        let history = vec![tx(TransactionMode::Payment, 50.0, "2024-05-01")];
        assert_eq!(total_credit(0.0, &history), -50.0);
    }

    #[test]
    fn test_reconciles() {
        let history = vec![
            tx(TransactionMode::Debit, 100.0, "2024-01-01"),
            tx(TransactionMode::Payment, 50.0, "2024-02-01"),
        ];
        assert!(reconciles(50.0, 0.0, &history));
        assert!(!reconciles(49.0, 0.0, &history));
    }

    #[test]
    fn test_parse_amount_accepts_plain_decimals() {
        assert_eq!(parse_amount("50"), Ok(50.0));
        assert_eq!(parse_amount(" 12.75 "), Ok(12.75));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert_eq!(
            parse_amount("abc"),
            Err(AmountError::NotANumber("abc".to_string()))
        );
        assert_eq!(parse_amount("NaN"), Err(AmountError::NotFinite));
        assert_eq!(parse_amount("inf"), Err(AmountError::NotFinite));
        assert_eq!(parse_amount("0"), Err(AmountError::NotPositive(0.0)));
        assert_eq!(parse_amount("-3"), Err(AmountError::NotPositive(-3.0)));
    }
}
