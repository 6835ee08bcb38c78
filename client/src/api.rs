use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use shared::{
    ApiResponse, AttendanceRecord, CreateAttendanceRequest, CreateEmployeeRequest,
    CreateExpenseRequest, CreatePartyRequest, CreatePaymentRequest, CreditUpdateRequest, Employee,
    ExpenseReport, Party, Payment,
};

use crate::error::ClientError;

/// API client for communicating with the backend server
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:8000".to_string())
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub async fn get_parties(&self) -> Result<Vec<Party>, ClientError> {
        self.read("/api/parties", &[]).await
    }

    pub async fn add_party(&self, request: &CreatePartyRequest) -> Result<Party, ClientError> {
        self.write(Method::POST, "/api/parties", Some(request))
            .await?
            .ok_or_else(|| ClientError::PersistenceFailure("Response missing party".to_string()))
    }

    pub async fn delete_party(&self, id: &str) -> Result<(), ClientError> {
        self.write::<(), ()>(Method::DELETE, &format!("/api/parties/{}", id), None)
            .await
            .map(|_| ())
    }

    /// Submit one credit update: the new aggregate plus the transaction
    /// that produced it. A single attempt, no retry.
    pub async fn update_credit(
        &self,
        party_id: &str,
        request: &CreditUpdateRequest,
    ) -> Result<(), ClientError> {
        self.write::<_, ()>(
            Method::POST,
            &format!("/api/parties/{}/credit-update", party_id),
            Some(request),
        )
        .await
        .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    pub async fn get_employees(&self) -> Result<Vec<Employee>, ClientError> {
        self.read("/api/employees", &[]).await
    }

    pub async fn add_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, ClientError> {
        self.write(Method::POST, "/api/employees", Some(request))
            .await?
            .ok_or_else(|| ClientError::PersistenceFailure("Response missing employee".to_string()))
    }

    pub async fn delete_employee(&self, id: &str) -> Result<(), ClientError> {
        self.write::<(), ()>(Method::DELETE, &format!("/api/employees/{}", id), None)
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    pub async fn get_attendance(
        &self,
        employee: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, ClientError> {
        match employee {
            Some(name) => self.read("/api/attendance", &[("employee", name)]).await,
            None => self.read("/api/attendance", &[]).await,
        }
    }

    pub async fn add_attendance(
        &self,
        request: &CreateAttendanceRequest,
    ) -> Result<AttendanceRecord, ClientError> {
        self.write(Method::POST, "/api/attendance", Some(request))
            .await?
            .ok_or_else(|| {
                ClientError::PersistenceFailure("Response missing attendance record".to_string())
            })
    }

    pub async fn delete_attendance(&self, id: &str) -> Result<(), ClientError> {
        self.write::<(), ()>(Method::DELETE, &format!("/api/attendance/{}", id), None)
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn get_payments(&self, employee: Option<&str>) -> Result<Vec<Payment>, ClientError> {
        match employee {
            Some(name) => self.read("/api/payments", &[("employee", name)]).await,
            None => self.read("/api/payments", &[]).await,
        }
    }

    pub async fn add_payment(&self, request: &CreatePaymentRequest) -> Result<Payment, ClientError> {
        self.write(Method::POST, "/api/payments", Some(request))
            .await?
            .ok_or_else(|| ClientError::PersistenceFailure("Response missing payment".to_string()))
    }

    pub async fn delete_payment(&self, id: &str) -> Result<(), ClientError> {
        self.write::<(), ()>(Method::DELETE, &format!("/api/payments/{}", id), None)
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Expenses
    // ------------------------------------------------------------------

    pub async fn get_expenses(&self) -> Result<Vec<ExpenseReport>, ClientError> {
        self.read("/api/expenses", &[]).await
    }

    pub async fn add_expense(
        &self,
        request: &CreateExpenseRequest,
    ) -> Result<ExpenseReport, ClientError> {
        self.write(Method::POST, "/api/expenses", Some(request))
            .await?
            .ok_or_else(|| {
                ClientError::PersistenceFailure("Response missing expense report".to_string())
            })
    }

    pub async fn delete_expense(&self, id: &str) -> Result<(), ClientError> {
        self.write::<(), ()>(Method::DELETE, &format!("/api/expenses/{}", id), None)
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Read path: failures are fetch failures, never fatal to the caller.
    async fn read<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::FetchFailure(format!("Network error: {}", e)))?;

        Self::decode(response, ClientError::FetchFailure)
            .await?
            .ok_or_else(|| ClientError::FetchFailure("Response missing data".to_string()))
    }

    /// Write path: a single attempt; any failure means the update was
    /// rejected and nothing may be applied locally.
    async fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::PersistenceFailure(format!("Network error: {}", e)))?;

        Self::decode(response, ClientError::PersistenceFailure).await
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        wrap: fn(String) -> ClientError,
    ) -> Result<Option<T>, ClientError> {
        let status = response.status();
        if !status.is_success() {
            // Prefer the server's own message when the envelope survives.
            let message = match response.json::<ApiResponse<T>>().await {
                Ok(body) => body
                    .message
                    .unwrap_or_else(|| format!("Server returned {}", status)),
                Err(_) => format!("Server returned {}", status),
            };
            return Err(wrap(message));
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| wrap(format!("Failed to parse response: {}", e)))?;

        if body.success {
            Ok(body.data)
        } else {
            Err(wrap(
                body.message.unwrap_or_else(|| "Request rejected".to_string()),
            ))
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
