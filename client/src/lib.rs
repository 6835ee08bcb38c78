pub mod api;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod ledger;

pub use api::ApiClient;
pub use dashboard::{CreditFormState, Dashboard};
pub use error::ClientError;
pub use ledger::PartyLedger;
