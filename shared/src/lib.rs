use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod ledger;
pub mod reports;
pub mod statement;

/// Direction of a ledger transaction. Debits increase what the party owes,
/// payments reduce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Debit,
    Payment,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMode::Debit => "debit",
            TransactionMode::Payment => "payment",
        }
    }
}

impl FromStr for TransactionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionMode::Debit),
            "payment" => Ok(TransactionMode::Payment),
            other => Err(format!("Unknown transaction mode: {}", other)),
        }
    }
}

/// One entry in a party's credit history. Immutable once stored; the date is
/// user-entered and only orders statements, never balance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub mode: TransactionMode,
    /// Always positive; the sign comes from `mode`.
    pub amount: f64,
    pub date: NaiveDate,
}

/// A counterpart (customer/shop) carrying a running credit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Assigned by the persistence layer on creation.
    pub id: String,
    pub name: String,
    pub shop_name: String,
    /// Contact number, kept opaque.
    pub number: String,
    pub total_credit: f64,
    /// Append order; chronological order of application.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyRequest {
    pub name: String,
    pub shop_name: String,
    pub number: String,
    /// Opening balance, usually zero.
    pub total_credit: f64,
}

/// Body of a credit update: the new aggregate and the transaction that
/// produced it, persisted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUpdateRequest {
    pub total_credit: f64,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub department: String,
    /// Monthly salary.
    pub salary: f64,
    pub contact_number: String,
    pub date_of_joining: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub department: String,
    pub salary: f64,
    pub contact_number: String,
    pub date_of_joining: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    /// Employee display name, as entered in the attendance form.
    pub employee: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Display time such as "09:15", recorded at check-in.
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttendanceRequest {
    pub employee: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// A salary advance paid out to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub employee: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub employee: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItem {
    pub expense_type: String,
    pub price: f64,
}

/// One day's expense report: the day's gross sales plus its itemized costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    pub id: String,
    pub total_sell: f64,
    pub date: NaiveDate,
    pub items: Vec<ExpenseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub total_sell: f64,
    pub date: NaiveDate,
    pub items: Vec<ExpenseItem>,
}

/// Standard response envelope for every API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T> fmt::Display for ApiResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.success, &self.message) {
            (true, _) => write!(f, "success"),
            (false, Some(msg)) => write!(f, "rejected: {}", msg),
            (false, None) => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_transaction_mode_wire_format() {
        // The wire format is lowercase; the parser is its inverse.
        assert_eq!(TransactionMode::Debit.as_str(), "debit");
        assert_eq!(TransactionMode::Payment.as_str(), "payment");
        assert_eq!("debit".parse(), Ok(TransactionMode::Debit));
        assert_eq!("payment".parse(), Ok(TransactionMode::Payment));
        assert!("credit".parse::<TransactionMode>().is_err());
    }

    #[test]
    fn test_attendance_status_round_trip() {
        assert_eq!("Present".parse(), Ok(AttendanceStatus::Present));
        assert_eq!("Absent".parse(), Ok(AttendanceStatus::Absent));
        assert!("Late".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_party_without_history_defaults_to_empty() {
        // Listings may omit the transactions field entirely.
        let json = r#"{"id":"p1","name":"A","shopName":"Shop","number":"123","totalCredit":10.0}"#;
        let party: Party = serde_json::from_str(json).unwrap();
        assert!(party.transactions.is_empty());
        assert_eq!(party.total_credit, 10.0);
    }

    #[test]
    fn test_api_response_envelope() {
        let ok = ApiResponse::ok(5);
        assert!(ok.success);
        assert_eq!(ok.data, Some(5));
        assert!(ok.message.is_none());

        let err = ApiResponse::<i32>::err("boom");
        assert!(!err.success);
        assert!(err.data.is_none());
        assert_eq!(err.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_transaction_mode_serializes_lowercase() {
        let tx = Transaction {
            mode: TransactionMode::Payment,
            amount: 50.0,
            date: date("2024-05-01"),
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(r#""mode":"payment""#));
        assert!(json.contains(r#""date":"2024-05-01""#));
    }
}
