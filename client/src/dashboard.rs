//! The dashboard facade: party directory actions, the credit submission
//! path, and the derived reports.

use chrono::NaiveDate;
use tracing::{info, warn};

use shared::reports::{self, Payslip, ProfitSummary};
use shared::statement::{build_statement, StatementRow};
use shared::{
    ledger, CreatePartyRequest, CreditUpdateRequest, Party, Transaction, TransactionMode,
};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::ledger::PartyLedger;

/// Pending credit form input for the selected party. Cleared only after a
/// submission is acknowledged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditFormState {
    pub mode: Option<TransactionMode>,
    pub amount: String,
    pub date: String,
}

impl CreditFormState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct Dashboard {
    api: ApiClient,
    pub ledger: PartyLedger,
    pub form: CreditFormState,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            ledger: PartyLedger::new(),
            form: CreditFormState::default(),
        }
    }

    /// Reload the party mirror from the server. A failed fetch is logged
    /// and leaves the current mirror alone; it is never fatal.
    pub async fn refresh_parties(&mut self) {
        match self.api.get_parties().await {
            Ok(parties) => {
                info!("Loaded {} parties", parties.len());
                self.ledger.replace_all(parties);
            }
            Err(e) => {
                warn!("Failed to load parties: {}", e);
            }
        }
    }

    pub async fn add_party(&mut self, request: CreatePartyRequest) -> Result<Party, ClientError> {
        let party = self.api.add_party(&request).await?;
        self.ledger.insert(party.clone());
        Ok(party)
    }

    /// Delete a party on the server, then drop it from the mirror (and the
    /// selection, if it was selected).
    pub async fn delete_party(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_party(id).await?;
        self.ledger.remove(id);
        Ok(())
    }

    /// Submit one credit transaction for a party.
    ///
    /// Validation happens before any network traffic; the mirror is only
    /// advanced once the server acknowledges. One attempt, no retry, and at
    /// most one outstanding submission per party.
    pub async fn submit_credit(
        &mut self,
        party_id: &str,
        mode: TransactionMode,
        raw_amount: &str,
        date: NaiveDate,
    ) -> Result<f64, ClientError> {
        let amount =
            ledger::parse_amount(raw_amount).map_err(|e| ClientError::InvalidAmount(e.to_string()))?;
        let current = self
            .ledger
            .balance(party_id)
            .ok_or_else(|| ClientError::PartyNotFound(party_id.to_string()))?;

        if !self.ledger.begin_submission(party_id) {
            return Err(ClientError::SubmissionInFlight(party_id.to_string()));
        }

        let transaction = Transaction { mode, amount, date };
        let new_balance = ledger::apply(current, &transaction);
        let request = CreditUpdateRequest {
            total_credit: new_balance,
            transaction: transaction.clone(),
        };

        let result = self.api.update_credit(party_id, &request).await;
        self.ledger.end_submission(party_id);

        match result {
            Ok(()) => {
                self.ledger.apply_credit(party_id, new_balance, transaction);
                self.form.clear();
                info!(
                    "Applied {} of {:.2} to party {}, new balance {:.2}",
                    mode.as_str(),
                    amount,
                    party_id,
                    new_balance
                );
                Ok(new_balance)
            }
            Err(e) => Err(e),
        }
    }

    /// Submit whatever is currently typed into the credit form.
    pub async fn submit_credit_form(&mut self, party_id: &str) -> Result<f64, ClientError> {
        let mode = self.form.mode.ok_or(ClientError::MissingMode)?;
        let raw_amount = self.form.amount.clone();
        let date = self
            .form
            .date
            .parse::<NaiveDate>()
            .map_err(|_| ClientError::InvalidDate(self.form.date.clone()))?;

        self.submit_credit(party_id, mode, &raw_amount, date).await
    }

    /// The running-balance statement for one mirrored party.
    pub fn statement(&self, party_id: &str) -> Result<Vec<StatementRow>, ClientError> {
        let party = self
            .ledger
            .get(party_id)
            .ok_or_else(|| ClientError::PartyNotFound(party_id.to_string()))?;
        Ok(build_statement(party))
    }

    /// Month-level profit over the fetched expense and employee lists.
    pub async fn monthly_profit(&self, year: i32, month: u32) -> Result<ProfitSummary, ClientError> {
        let expenses = self.api.get_expenses().await?;
        let employees = self.api.get_employees().await?;
        Ok(reports::monthly_net_profit(&expenses, &employees, year, month))
    }

    /// One employee's payslip for a month, from their own payment and
    /// attendance records.
    pub async fn payslip(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Payslip, ClientError> {
        let employees = self.api.get_employees().await?;
        let employee = employees
            .into_iter()
            .find(|employee| employee.id == employee_id)
            .ok_or_else(|| ClientError::EmployeeNotFound(employee_id.to_string()))?;

        let payments = self.api.get_payments(Some(&employee.name)).await?;
        let attendance = self.api.get_attendance(Some(&employee.name)).await?;
        Ok(reports::build_payslip(
            &employee,
            &payments,
            &attendance,
            year,
            month,
        ))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_form_clear() {
        let mut form = CreditFormState {
            mode: Some(TransactionMode::Debit),
            amount: "50".to_string(),
            date: "2024-05-01".to_string(),
        };
        form.clear();
        assert_eq!(form, CreditFormState::default());
    }
}
