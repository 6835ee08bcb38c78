use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use shared::{
    AttendanceRecord, CreateAttendanceRequest, CreateEmployeeRequest, CreateExpenseRequest,
    CreatePartyRequest, CreatePaymentRequest, Employee, ExpenseItem, ExpenseReport, Party,
    Payment, Transaction,
};

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:shopbook.db";

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize an isolated in-memory database with a unique name.
    /// Used by the test suites on both sides of the API boundary.
    pub async fn init_in_memory() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parties (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                shop_name TEXT NOT NULL,
                number TEXT NOT NULL,
                total_credit REAL NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // seq is the append order; balance computation replays it as-is.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS party_transactions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                party_id TEXT NOT NULL,
                mode TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                department TEXT NOT NULL,
                salary REAL NOT NULL,
                contact_number TEXT NOT NULL,
                date_of_joining TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance (
                id TEXT PRIMARY KEY,
                employee TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                check_in TEXT,
                check_out TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                employee TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Itemized costs are stored as a JSON column next to the day's sales.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                total_sell REAL NOT NULL,
                date TEXT NOT NULL,
                items TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    /// Insert a new party and return it with its server-assigned id.
    pub async fn insert_party(&self, request: &CreatePartyRequest) -> Result<Party> {
        let id = Self::new_id();
        sqlx::query(
            "INSERT INTO parties (id, name, shop_name, number, total_credit) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.shop_name)
        .bind(&request.number)
        .bind(request.total_credit)
        .execute(&*self.pool)
        .await?;

        Ok(Party {
            id,
            name: request.name.clone(),
            shop_name: request.shop_name.clone(),
            number: request.number.clone(),
            total_credit: request.total_credit,
            transactions: Vec::new(),
        })
    }

    /// List all parties with their full transaction histories in append order.
    pub async fn list_parties(&self) -> Result<Vec<Party>> {
        let party_rows =
            sqlx::query("SELECT id, name, shop_name, number, total_credit FROM parties ORDER BY rowid")
                .fetch_all(&*self.pool)
                .await?;

        let tx_rows =
            sqlx::query("SELECT party_id, mode, amount, date FROM party_transactions ORDER BY seq")
                .fetch_all(&*self.pool)
                .await?;

        let mut histories: HashMap<String, Vec<Transaction>> = HashMap::new();
        for row in &tx_rows {
            let party_id: String = row.get("party_id");
            histories
                .entry(party_id)
                .or_default()
                .push(Self::transaction_from_row(row)?);
        }

        party_rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let transactions = histories.remove(&id).unwrap_or_default();
                Ok(Party {
                    id,
                    name: row.get("name"),
                    shop_name: row.get("shop_name"),
                    number: row.get("number"),
                    total_credit: row.get("total_credit"),
                    transactions,
                })
            })
            .collect()
    }

    /// Retrieve one party with its history, if it exists.
    pub async fn get_party(&self, id: &str) -> Result<Option<Party>> {
        let row = sqlx::query(
            "SELECT id, name, shop_name, number, total_credit FROM parties WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tx_rows = sqlx::query(
            "SELECT party_id, mode, amount, date FROM party_transactions WHERE party_id = ? ORDER BY seq",
        )
        .bind(id)
        .fetch_all(&*self.pool)
        .await?;

        let transactions = tx_rows
            .iter()
            .map(Self::transaction_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Party {
            id: row.get("id"),
            name: row.get("name"),
            shop_name: row.get("shop_name"),
            number: row.get("number"),
            total_credit: row.get("total_credit"),
            transactions,
        }))
    }

    /// Persist a credit update: the new aggregate and the appended
    /// transaction commit together or not at all.
    /// Returns false if the party does not exist.
    pub async fn apply_credit_update(
        &self,
        party_id: &str,
        total_credit: f64,
        transaction: &Transaction,
    ) -> Result<bool> {
        let mut db_tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE parties SET total_credit = ? WHERE id = ?")
            .bind(total_credit)
            .bind(party_id)
            .execute(&mut *db_tx)
            .await?;

        if updated.rows_affected() == 0 {
            db_tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO party_transactions (party_id, mode, amount, date) VALUES (?, ?, ?, ?)")
            .bind(party_id)
            .bind(transaction.mode.as_str())
            .bind(transaction.amount)
            .bind(transaction.date)
            .execute(&mut *db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(true)
    }

    /// Delete a party and its transaction history.
    /// Returns true if the party existed.
    pub async fn delete_party(&self, id: &str) -> Result<bool> {
        let mut db_tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM party_transactions WHERE party_id = ?")
            .bind(id)
            .execute(&mut *db_tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM parties WHERE id = ?")
            .bind(id)
            .execute(&mut *db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }

    fn transaction_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let mode: String = row.get("mode");
        Ok(Transaction {
            mode: mode.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            amount: row.get("amount"),
            date: row.get::<NaiveDate, _>("date"),
        })
    }

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    pub async fn insert_employee(&self, request: &CreateEmployeeRequest) -> Result<Employee> {
        let id = Self::new_id();
        sqlx::query(
            "INSERT INTO employees (id, name, department, salary, contact_number, date_of_joining) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.department)
        .bind(request.salary)
        .bind(&request.contact_number)
        .bind(request.date_of_joining)
        .execute(&*self.pool)
        .await?;

        Ok(Employee {
            id,
            name: request.name.clone(),
            department: request.department.clone(),
            salary: request.salary,
            contact_number: request.contact_number.clone(),
            date_of_joining: request.date_of_joining,
        })
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        let rows = sqlx::query(
            "SELECT id, name, department, salary, contact_number, date_of_joining FROM employees ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Employee {
                id: row.get("id"),
                name: row.get("name"),
                department: row.get("department"),
                salary: row.get("salary"),
                contact_number: row.get("contact_number"),
                date_of_joining: row.get::<NaiveDate, _>("date_of_joining"),
            })
            .collect())
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    pub async fn insert_attendance(
        &self,
        request: &CreateAttendanceRequest,
    ) -> Result<AttendanceRecord> {
        let id = Self::new_id();
        sqlx::query(
            "INSERT INTO attendance (id, employee, date, status, check_in, check_out) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.employee)
        .bind(request.date)
        .bind(request.status.as_str())
        .bind(&request.check_in)
        .bind(&request.check_out)
        .execute(&*self.pool)
        .await?;

        Ok(AttendanceRecord {
            id,
            employee: request.employee.clone(),
            date: request.date,
            status: request.status,
            check_in: request.check_in.clone(),
            check_out: request.check_out.clone(),
        })
    }

    pub async fn list_attendance(&self, employee: Option<&str>) -> Result<Vec<AttendanceRecord>> {
        let rows = match employee {
            Some(name) => {
                sqlx::query(
                    "SELECT id, employee, date, status, check_in, check_out FROM attendance WHERE employee = ? ORDER BY date",
                )
                .bind(name)
                .fetch_all(&*self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, employee, date, status, check_in, check_out FROM attendance ORDER BY date",
                )
                .fetch_all(&*self.pool)
                .await?
            }
        };

        rows.iter()
            .map(|row| {
                let status: String = row.get("status");
                Ok(AttendanceRecord {
                    id: row.get("id"),
                    employee: row.get("employee"),
                    date: row.get::<NaiveDate, _>("date"),
                    status: status.parse().map_err(|e: String| anyhow::anyhow!(e))?,
                    check_in: row.get("check_in"),
                    check_out: row.get("check_out"),
                })
            })
            .collect()
    }

    pub async fn delete_attendance(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn insert_payment(&self, request: &CreatePaymentRequest) -> Result<Payment> {
        let id = Self::new_id();
        sqlx::query("INSERT INTO payments (id, employee, amount, date) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&request.employee)
            .bind(request.amount)
            .bind(request.date)
            .execute(&*self.pool)
            .await?;

        Ok(Payment {
            id,
            employee: request.employee.clone(),
            amount: request.amount,
            date: request.date,
        })
    }

    pub async fn list_payments(&self, employee: Option<&str>) -> Result<Vec<Payment>> {
        let rows = match employee {
            Some(name) => {
                sqlx::query("SELECT id, employee, amount, date FROM payments WHERE employee = ? ORDER BY date")
                    .bind(name)
                    .fetch_all(&*self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id, employee, amount, date FROM payments ORDER BY date")
                    .fetch_all(&*self.pool)
                    .await?
            }
        };

        Ok(rows
            .iter()
            .map(|row| Payment {
                id: row.get("id"),
                employee: row.get("employee"),
                amount: row.get("amount"),
                date: row.get::<NaiveDate, _>("date"),
            })
            .collect())
    }

    pub async fn delete_payment(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Expenses
    // ------------------------------------------------------------------

    pub async fn insert_expense(&self, request: &CreateExpenseRequest) -> Result<ExpenseReport> {
        let id = Self::new_id();
        let items = serde_json::to_string(&request.items)?;
        sqlx::query("INSERT INTO expenses (id, total_sell, date, items) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(request.total_sell)
            .bind(request.date)
            .bind(items)
            .execute(&*self.pool)
            .await?;

        Ok(ExpenseReport {
            id,
            total_sell: request.total_sell,
            date: request.date,
            items: request.items.clone(),
        })
    }

    pub async fn list_expenses(&self) -> Result<Vec<ExpenseReport>> {
        let rows = sqlx::query("SELECT id, total_sell, date, items FROM expenses ORDER BY date")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let items: String = row.get("items");
                let items: Vec<ExpenseItem> = serde_json::from_str(&items)?;
                Ok(ExpenseReport {
                    id: row.get("id"),
                    total_sell: row.get("total_sell"),
                    date: row.get::<NaiveDate, _>("date"),
                    items,
                })
            })
            .collect()
    }

    pub async fn delete_expense(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
