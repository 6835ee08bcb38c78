use crate::db::DbConnection;
use anyhow::{anyhow, Result};
use shared::{
    ledger, AttendanceRecord, CreateAttendanceRequest, CreateEmployeeRequest,
    CreateExpenseRequest, CreatePartyRequest, CreatePaymentRequest, CreditUpdateRequest, Employee,
    ExpenseReport, Party, Payment,
};
use tracing::info;

/// Party directory and credit ledger operations.
#[derive(Clone)]
pub struct PartyService {
    db: DbConnection,
}

impl PartyService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_party(&self, request: CreatePartyRequest) -> Result<Party> {
        if request.name.trim().is_empty() {
            return Err(anyhow!("Party name must not be empty"));
        }
        if request.shop_name.trim().is_empty() {
            return Err(anyhow!("Shop name must not be empty"));
        }
        if !request.total_credit.is_finite() {
            return Err(anyhow!("Opening credit must be a finite number"));
        }

        let party = self.db.insert_party(&request).await?;
        info!("Created party {} ({})", party.name, party.id);
        Ok(party)
    }

    pub async fn list_parties(&self) -> Result<Vec<Party>> {
        self.db.list_parties().await
    }

    /// Apply one credit update. Returns false for an unknown party.
    ///
    /// The aggregate and the appended transaction are persisted in a single
    /// database transaction, so a rejected update leaves no trace.
    pub async fn update_credit(&self, party_id: &str, request: CreditUpdateRequest) -> Result<bool> {
        ledger::validate_amount(request.transaction.amount)
            .map_err(|e| anyhow!("Invalid transaction amount: {}", e))?;
        if !request.total_credit.is_finite() {
            return Err(anyhow!("Total credit must be a finite number"));
        }

        let applied = self
            .db
            .apply_credit_update(party_id, request.total_credit, &request.transaction)
            .await?;

        if applied {
            info!(
                "Applied {} of {:.2} to party {}, new total credit {:.2}",
                request.transaction.mode.as_str(),
                request.transaction.amount,
                party_id,
                request.total_credit
            );
        }
        Ok(applied)
    }

    /// Returns false when the party was already gone.
    pub async fn delete_party(&self, party_id: &str) -> Result<bool> {
        let deleted = self.db.delete_party(party_id).await?;
        if deleted {
            info!("Deleted party {}", party_id);
        }
        Ok(deleted)
    }
}

/// Employee registry operations.
#[derive(Clone)]
pub struct EmployeeService {
    db: DbConnection,
}

impl EmployeeService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_employee(&self, request: CreateEmployeeRequest) -> Result<Employee> {
        if request.name.trim().is_empty() {
            return Err(anyhow!("Employee name must not be empty"));
        }
        if !request.salary.is_finite() || request.salary < 0.0 {
            return Err(anyhow!("Salary must be a non-negative number"));
        }

        let employee = self.db.insert_employee(&request).await?;
        info!("Created employee {} ({})", employee.name, employee.id);
        Ok(employee)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        self.db.list_employees().await
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool> {
        self.db.delete_employee(id).await
    }
}

/// Attendance log operations.
#[derive(Clone)]
pub struct AttendanceService {
    db: DbConnection,
}

impl AttendanceService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_attendance(
        &self,
        request: CreateAttendanceRequest,
    ) -> Result<AttendanceRecord> {
        if request.employee.trim().is_empty() {
            return Err(anyhow!("Employee name must not be empty"));
        }
        self.db.insert_attendance(&request).await
    }

    pub async fn list_attendance(&self, employee: Option<&str>) -> Result<Vec<AttendanceRecord>> {
        self.db.list_attendance(employee).await
    }

    pub async fn delete_attendance(&self, id: &str) -> Result<bool> {
        self.db.delete_attendance(id).await
    }
}

/// Salary advance operations.
#[derive(Clone)]
pub struct PaymentService {
    db: DbConnection,
}

impl PaymentService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_payment(&self, request: CreatePaymentRequest) -> Result<Payment> {
        if request.employee.trim().is_empty() {
            return Err(anyhow!("Employee name must not be empty"));
        }
        ledger::validate_amount(request.amount)
            .map_err(|e| anyhow!("Invalid payment amount: {}", e))?;
        self.db.insert_payment(&request).await
    }

    pub async fn list_payments(&self, employee: Option<&str>) -> Result<Vec<Payment>> {
        self.db.list_payments(employee).await
    }

    pub async fn delete_payment(&self, id: &str) -> Result<bool> {
        self.db.delete_payment(id).await
    }
}

/// Daily expense report operations.
#[derive(Clone)]
pub struct ExpenseService {
    db: DbConnection,
}

impl ExpenseService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_expense(&self, request: CreateExpenseRequest) -> Result<ExpenseReport> {
        if !request.total_sell.is_finite() || request.total_sell < 0.0 {
            return Err(anyhow!("Total sell must be a non-negative number"));
        }
        for item in &request.items {
            if item.expense_type.trim().is_empty() {
                return Err(anyhow!("Expense type must not be empty"));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(anyhow!("Expense price must be a non-negative number"));
            }
        }
        self.db.insert_expense(&request).await
    }

    pub async fn list_expenses(&self) -> Result<Vec<ExpenseReport>> {
        self.db.list_expenses().await
    }

    pub async fn delete_expense(&self, id: &str) -> Result<bool> {
        self.db.delete_expense(id).await
    }
}
