use thiserror::Error;

/// Failures surfaced by the dashboard client.
///
/// Input problems (`InvalidAmount`, `InvalidDate`, `MissingMode`) are caught
/// before any network traffic. `PersistenceFailure` covers rejected or
/// failed writes; the in-memory model is never advanced before the server
/// acknowledges, so there is nothing to roll back. `FetchFailure` covers
/// failed reads, which are never fatal to the dashboard.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No transaction mode selected")]
    MissingMode,

    #[error("An update for party {0} is already in flight")]
    SubmissionInFlight(String),

    #[error("Party not found: {0}")]
    PartyNotFound(String),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Update rejected: {0}")]
    PersistenceFailure(String),

    #[error("Fetch failed: {0}")]
    FetchFailure(String),
}
