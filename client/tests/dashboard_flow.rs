//! End-to-end tests driving the dashboard client against the real backend
//! router, served on an ephemeral port over an isolated in-memory database.

use chrono::NaiveDate;

use shared::{
    ledger, statement, CreateAttendanceRequest, CreateEmployeeRequest, CreateExpenseRequest,
    CreatePartyRequest, CreatePaymentRequest, CreditUpdateRequest, ExpenseItem, Transaction,
    TransactionMode,
};
use shopbook_backend::{AppState, DbConnection};
use shopbook_client::{export, ApiClient, ClientError, Dashboard};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    shutdown: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        let app = shopbook_backend::router(AppState::new(db));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let (shutdown, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
            shutdown,
        }
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::new(ApiClient::with_base_url(self.base_url.clone()))
    }

    async fn shut_down(self) {
        // Signal graceful shutdown so the accept loop stops *and* live
        // keep-alive connections are closed; the serve future then returns.
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn party_request(name: &str) -> CreatePartyRequest {
    CreatePartyRequest {
        name: name.to_string(),
        shop_name: format!("{} Traders", name),
        number: "0300-1112223".to_string(),
        total_credit: 0.0,
    }
}

#[tokio::test]
async fn test_payment_from_zero_persists_negative_balance() {
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();

    let party = dashboard.add_party(party_request("A")).await.unwrap();
    assert_eq!(dashboard.ledger.balance(&party.id), Some(0.0));

    let new_balance = dashboard
        .submit_credit(&party.id, TransactionMode::Payment, "50", date("2024-05-01"))
        .await
        .unwrap();
    assert_eq!(new_balance, -50.0);

    // A fresh client sees the persisted state, not just the local mirror.
    let mut fresh = server.dashboard();
    fresh.refresh_parties().await;
    let stored = fresh.ledger.get(&party.id).unwrap();
    assert_eq!(stored.total_credit, -50.0);
    assert_eq!(
        stored.transactions,
        vec![Transaction {
            mode: TransactionMode::Payment,
            amount: 50.0,
            date: date("2024-05-01"),
        }]
    );
}

#[tokio::test]
async fn test_credit_history_reconciles_and_exports() {
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();
    let party = dashboard.add_party(party_request("A")).await.unwrap();

    for (mode, amount, day) in [
        (TransactionMode::Debit, "100", "2024-01-01"),
        (TransactionMode::Payment, "50", "2024-02-01"),
        (TransactionMode::Debit, "100", "2024-03-01"),
    ] {
        dashboard
            .submit_credit(&party.id, mode, amount, date(day))
            .await
            .unwrap();
    }

    assert_eq!(dashboard.ledger.balance(&party.id), Some(150.0));
    let history = dashboard.ledger.history(&party.id).unwrap();
    assert!(ledger::reconciles(150.0, 0.0, history));

    let rows = dashboard.statement(&party.id).unwrap();
    let totals: Vec<f64> = rows.iter().map(|row| row.total_credit).collect();
    assert_eq!(totals, vec![0.0, 100.0, 50.0, 150.0]);
    assert_eq!(statement::closing_balance(&rows), 150.0);

    let mut buffer = Vec::new();
    let written = export::write_statement_csv(dashboard.ledger.get(&party.id).unwrap(), &mut buffer)
        .unwrap();
    assert_eq!(written, 4);
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.lines().last().unwrap().ends_with("150.00"));
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_the_server() {
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();
    let party = dashboard.add_party(party_request("A")).await.unwrap();

    for raw in ["abc", "", "  ", "-5"] {
        let result = dashboard
            .submit_credit(&party.id, TransactionMode::Debit, raw, date("2024-05-01"))
            .await;
        assert!(matches!(result, Err(ClientError::InvalidAmount(_))), "raw input {:?}", raw);
    }

    // No mutation happened, locally or remotely.
    assert_eq!(dashboard.ledger.balance(&party.id), Some(0.0));
    let mut fresh = server.dashboard();
    fresh.refresh_parties().await;
    assert!(fresh.ledger.history(&party.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_credit_form_submission_clears_on_success() {
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();
    let party = dashboard.add_party(party_request("A")).await.unwrap();

    // Nothing selected yet.
    let result = dashboard.submit_credit_form(&party.id).await;
    assert!(matches!(result, Err(ClientError::MissingMode)));

    dashboard.form.mode = Some(TransactionMode::Debit);
    dashboard.form.amount = "75".to_string();
    dashboard.form.date = "not-a-date".to_string();
    let result = dashboard.submit_credit_form(&party.id).await;
    assert!(matches!(result, Err(ClientError::InvalidDate(_))));
    // Failed validation keeps the typed input around.
    assert_eq!(dashboard.form.amount, "75");

    dashboard.form.date = "2024-05-01".to_string();
    let new_balance = dashboard.submit_credit_form(&party.id).await.unwrap();
    assert_eq!(new_balance, 75.0);

    // An acknowledged submission clears the pending form state.
    assert_eq!(dashboard.form, shopbook_client::CreditFormState::default());
}

#[tokio::test]
async fn test_delete_party_clears_selection_and_reports_second_failure() {
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();
    let party = dashboard.add_party(party_request("A")).await.unwrap();

    assert!(dashboard.ledger.select(&party.id));
    dashboard.delete_party(&party.id).await.unwrap();
    assert!(dashboard.ledger.selected().is_none());
    assert!(dashboard.ledger.get(&party.id).is_none());

    // Deleting the same id again fails loudly but harmlessly.
    let result = dashboard.delete_party(&party.id).await;
    assert!(matches!(result, Err(ClientError::PersistenceFailure(_))));
}

#[tokio::test]
async fn test_server_side_rejection_leaves_mirror_unchanged() {
    let server = TestServer::spawn().await;
    let dashboard = server.dashboard();

    // Unknown party id: rejected by the server, not by local validation.
    let request = CreditUpdateRequest {
        total_credit: 10.0,
        transaction: Transaction {
            mode: TransactionMode::Debit,
            amount: 10.0,
            date: date("2024-05-01"),
        },
    };
    let result = dashboard.api().update_credit("missing", &request).await;
    assert!(matches!(result, Err(ClientError::PersistenceFailure(_))));
}

#[tokio::test]
async fn test_unreachable_server_failure_paths() {
    // Seed a dashboard from a live server, then take the server away.
    let server = TestServer::spawn().await;
    let mut dashboard = server.dashboard();
    let party = dashboard.add_party(party_request("A")).await.unwrap();
    dashboard
        .submit_credit(&party.id, TransactionMode::Debit, "100", date("2024-01-01"))
        .await
        .unwrap();

    server.shut_down().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // A write against the dead server surfaces a persistence failure and
    // leaves the mirror exactly as it was.
    let before = dashboard.ledger.get(&party.id).unwrap().clone();
    let result = dashboard
        .submit_credit(&party.id, TransactionMode::Payment, "40", date("2024-02-01"))
        .await;
    assert!(matches!(result, Err(ClientError::PersistenceFailure(_))));
    assert_eq!(dashboard.ledger.get(&party.id).unwrap(), &before);

    // The submission slot was released despite the failure.
    assert!(!dashboard.ledger.is_submitting(&party.id));

    // A failed refresh logs and leaves the existing mirror alone.
    dashboard.refresh_parties().await;
    assert_eq!(dashboard.ledger.get(&party.id).unwrap(), &before);

    // A dashboard that never reached the server simply stays empty.
    let mut fresh = Dashboard::new(ApiClient::with_base_url("http://127.0.0.1:9".to_string()));
    fresh.refresh_parties().await;
    assert!(fresh.ledger.parties().is_empty());
}

#[tokio::test]
async fn test_payslip_and_profit_flow() {
    let server = TestServer::spawn().await;
    let dashboard = server.dashboard();
    let api = dashboard.api();

    let employee = api
        .add_employee(&CreateEmployeeRequest {
            name: "Ayesha".to_string(),
            department: "Tailoring".to_string(),
            salary: 3_000.0,
            contact_number: "0300-0000000".to_string(),
            date_of_joining: date("2023-01-15"),
        })
        .await
        .unwrap();

    api.add_payment(&CreatePaymentRequest {
        employee: "Ayesha".to_string(),
        amount: 500.0,
        date: date("2024-06-05"),
    })
    .await
    .unwrap();

    for (day, status) in [
        ("2024-06-03", shared::AttendanceStatus::Absent),
        ("2024-06-04", shared::AttendanceStatus::Absent),
        ("2024-06-05", shared::AttendanceStatus::Present),
    ] {
        api.add_attendance(&CreateAttendanceRequest {
            employee: "Ayesha".to_string(),
            date: date(day),
            status,
            check_in: Some("09:00".to_string()),
            check_out: Some("18:00".to_string()),
        })
        .await
        .unwrap();
    }

    let slip = dashboard.payslip(&employee.id, 2024, 6).await.unwrap();
    assert_eq!(slip.daily_salary, 100.0);
    assert_eq!(slip.absent_days, 2);
    assert_eq!(slip.advances, 500.0);
    assert_eq!(slip.net_salary, 3_000.0 - 500.0 - 200.0);

    api.add_expense(&CreateExpenseRequest {
        total_sell: 20_000.0,
        date: date("2024-06-01"),
        items: vec![ExpenseItem {
            expense_type: "Rent Expense".to_string(),
            price: 800.0,
        }],
    })
    .await
    .unwrap();

    let summary = dashboard.monthly_profit(2024, 6).await.unwrap();
    assert_eq!(summary.gross_profit, 4_000.0);
    assert_eq!(summary.total_expenses, 800.0);
    assert_eq!(summary.total_salaries, 3_000.0);
    assert_eq!(summary.net_profit, 200.0);
}
