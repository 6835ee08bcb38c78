use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    ApiResponse, AttendanceRecord, CreateAttendanceRequest, CreateEmployeeRequest,
    CreateExpenseRequest, CreatePartyRequest, CreatePaymentRequest, CreditUpdateRequest, Employee,
    ExpenseReport, Party, Payment,
};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::{
    AttendanceService, EmployeeService, ExpenseService, PartyService, PaymentService,
};

/// Application state containing one service per entity
#[derive(Clone)]
pub struct AppState {
    pub parties: PartyService,
    pub employees: EmployeeService,
    pub attendance: AttendanceService,
    pub payments: PaymentService,
    pub expenses: ExpenseService,
}

impl AppState {
    /// Create application state with all services over one connection
    pub fn new(db: DbConnection) -> Self {
        Self {
            parties: PartyService::new(db.clone()),
            employees: EmployeeService::new(db.clone()),
            attendance: AttendanceService::new(db.clone()),
            payments: PaymentService::new(db.clone()),
            expenses: ExpenseService::new(db),
        }
    }
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/parties", post(create_party).get(list_parties))
        .route("/parties/:id", delete(delete_party))
        .route("/parties/:id/credit-update", post(update_credit))
        .route("/employees", post(create_employee).get(list_employees))
        .route("/employees/:id", delete(delete_employee))
        .route("/attendance", post(create_attendance).get(list_attendance))
        .route("/attendance/:id", delete(delete_attendance))
        .route("/payments", post(create_payment).get(list_payments))
        .route("/payments/:id", delete(delete_payment))
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/expenses/:id", delete(delete_expense));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Optional per-employee filter for attendance and payment listings
#[derive(Deserialize, Debug)]
pub struct EmployeeFilter {
    pub employee: Option<String>,
}

// ------------------------------------------------------------------
// Parties
// ------------------------------------------------------------------

/// Axum handler for POST /api/parties
pub async fn create_party(
    State(state): State<AppState>,
    Json(request): Json<CreatePartyRequest>,
) -> impl IntoResponse {
    info!("POST /api/parties - request: {:?}", request);

    match state.parties.create_party(request).await {
        Ok(party) => (StatusCode::CREATED, Json(ApiResponse::ok(party))).into_response(),
        Err(e) => {
            tracing::error!("Error creating party: {:?}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Party>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Axum handler for GET /api/parties
pub async fn list_parties(State(state): State<AppState>) -> impl IntoResponse {
    match state.parties.list_parties().await {
        Ok(parties) => (StatusCode::OK, Json(ApiResponse::ok(parties))).into_response(),
        Err(e) => {
            tracing::error!("Error listing parties: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<Party>>::err("Error listing parties")),
            )
                .into_response()
        }
    }
}

/// Axum handler for DELETE /api/parties/:id
pub async fn delete_party(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/parties/{}", id);

    match state.parties.delete_party(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Party not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting party: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Error deleting party")),
            )
                .into_response()
        }
    }
}

/// Axum handler for POST /api/parties/:id/credit-update
pub async fn update_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreditUpdateRequest>,
) -> impl IntoResponse {
    info!("POST /api/parties/{}/credit-update - request: {:?}", id, request);

    match state.parties.update_credit(&id, request).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Party not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error updating credit: {:?}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

// ------------------------------------------------------------------
// Employees
// ------------------------------------------------------------------

pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> impl IntoResponse {
    info!("POST /api/employees - request: {:?}", request);

    match state.employees.create_employee(request).await {
        Ok(employee) => (StatusCode::CREATED, Json(ApiResponse::ok(employee))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Employee>::err(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn list_employees(State(state): State<AppState>) -> impl IntoResponse {
    match state.employees.list_employees().await {
        Ok(employees) => (StatusCode::OK, Json(ApiResponse::ok(employees))).into_response(),
        Err(e) => {
            tracing::error!("Error listing employees: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<Employee>>::err("Error listing employees")),
            )
                .into_response()
        }
    }
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.employees.delete_employee(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Employee not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting employee: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Error deleting employee")),
            )
                .into_response()
        }
    }
}

// ------------------------------------------------------------------
// Attendance
// ------------------------------------------------------------------

pub async fn create_attendance(
    State(state): State<AppState>,
    Json(request): Json<CreateAttendanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/attendance - request: {:?}", request);

    match state.attendance.create_attendance(request).await {
        Ok(record) => (StatusCode::CREATED, Json(ApiResponse::ok(record))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<AttendanceRecord>::err(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> impl IntoResponse {
    match state.attendance.list_attendance(filter.employee.as_deref()).await {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::ok(records))).into_response(),
        Err(e) => {
            tracing::error!("Error listing attendance: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<AttendanceRecord>>::err(
                    "Error listing attendance",
                )),
            )
                .into_response()
        }
    }
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.attendance.delete_attendance(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Attendance record not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting attendance: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Error deleting attendance")),
            )
                .into_response()
        }
    }
}

// ------------------------------------------------------------------
// Payments
// ------------------------------------------------------------------

pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/payments - request: {:?}", request);

    match state.payments.create_payment(request).await {
        Ok(payment) => (StatusCode::CREATED, Json(ApiResponse::ok(payment))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Payment>::err(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> impl IntoResponse {
    match state.payments.list_payments(filter.employee.as_deref()).await {
        Ok(payments) => (StatusCode::OK, Json(ApiResponse::ok(payments))).into_response(),
        Err(e) => {
            tracing::error!("Error listing payments: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<Payment>>::err("Error listing payments")),
            )
                .into_response()
        }
    }
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.payments.delete_payment(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Payment not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting payment: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Error deleting payment")),
            )
                .into_response()
        }
    }
}

// ------------------------------------------------------------------
// Expenses
// ------------------------------------------------------------------

pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - request: {:?}", request);

    match state.expenses.create_expense(request).await {
        Ok(report) => (StatusCode::CREATED, Json(ApiResponse::ok(report))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ExpenseReport>::err(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    match state.expenses.list_expenses().await {
        Ok(reports) => (StatusCode::OK, Json(ApiResponse::ok(reports))).into_response(),
        Err(e) => {
            tracing::error!("Error listing expenses: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<ExpenseReport>>::err("Error listing expenses")),
            )
                .into_response()
        }
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.expenses.delete_expense(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(()))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err("Expense not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting expense: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err("Error deleting expense")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::Response;
    use chrono::NaiveDate;
    use shared::{Transaction, TransactionMode};

    /// Helper to create test state
    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        AppState::new(db)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_parties_handlers() {
        let state = setup_test_state().await;

        let request = CreatePartyRequest {
            name: "A".to_string(),
            shop_name: "Corner Shop".to_string(),
            number: "0300-1234567".to_string(),
            total_credit: 0.0,
        };

        let response = create_party(State(state.clone()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: ApiResponse<Party> = body_json(response).await;
        assert!(created.success);
        let party = created.data.unwrap();

        let response = list_parties(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let listed: ApiResponse<Vec<Party>> = body_json(response).await;
        assert_eq!(listed.data.unwrap(), vec![party]);
    }

    #[tokio::test]
    async fn test_create_party_validation_error() {
        let state = setup_test_state().await;

        let request = CreatePartyRequest {
            name: "".to_string(),
            shop_name: "Corner Shop".to_string(),
            number: "".to_string(),
            total_credit: 0.0,
        };

        let response = create_party(State(state), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ApiResponse<Party> = body_json(response).await;
        assert!(!body.success);
        assert!(body.message.is_some());
    }

    #[tokio::test]
    async fn test_update_credit_handler() {
        let state = setup_test_state().await;
        let party = state
            .parties
            .create_party(CreatePartyRequest {
                name: "A".to_string(),
                shop_name: "Corner Shop".to_string(),
                number: "0300-1234567".to_string(),
                total_credit: 0.0,
            })
            .await
            .unwrap();

        let request = CreditUpdateRequest {
            total_credit: -50.0,
            transaction: Transaction {
                mode: TransactionMode::Payment,
                amount: 50.0,
                date: date("2024-05-01"),
            },
        };

        let response = update_credit(State(state.clone()), Path(party.id.clone()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<()> = body_json(response).await;
        assert!(body.success);

        let parties = state.parties.list_parties().await.unwrap();
        let stored = &parties[0];
        assert_eq!(stored.total_credit, -50.0);
        assert_eq!(stored.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_update_credit_unknown_party_handler() {
        let state = setup_test_state().await;

        let request = CreditUpdateRequest {
            total_credit: 10.0,
            transaction: Transaction {
                mode: TransactionMode::Debit,
                amount: 10.0,
                date: date("2024-05-01"),
            },
        };

        let response = update_credit(State(state), Path("missing".to_string()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ApiResponse<()> = body_json(response).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_delete_party_handler_is_idempotent_about_crashing() {
        let state = setup_test_state().await;
        let party = state
            .parties
            .create_party(CreatePartyRequest {
                name: "A".to_string(),
                shop_name: "Corner Shop".to_string(),
                number: "0300-1234567".to_string(),
                total_credit: 0.0,
            })
            .await
            .unwrap();

        let response = delete_party(State(state.clone()), Path(party.id.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        // The second delete reports failure rather than crashing.
        let response = delete_party(State(state), Path(party.id)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ApiResponse<()> = body_json(response).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_attendance_handlers_with_filter() {
        let state = setup_test_state().await;

        for (name, status) in [
            ("Ayesha", shared::AttendanceStatus::Absent),
            ("Bilal", shared::AttendanceStatus::Present),
        ] {
            let response = create_attendance(
                State(state.clone()),
                Json(CreateAttendanceRequest {
                    employee: name.to_string(),
                    date: date("2024-06-03"),
                    status,
                    check_in: None,
                    check_out: None,
                }),
            )
            .await
            .into_response();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = list_attendance(
            State(state),
            Query(EmployeeFilter {
                employee: Some("Ayesha".to_string()),
            }),
        )
        .await
        .into_response();
        let body: ApiResponse<Vec<AttendanceRecord>> = body_json(response).await;
        let records = body.data.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].employee, "Ayesha");
    }
}
