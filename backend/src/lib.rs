pub mod db;
pub mod domain;
pub mod rest;

pub use db::DbConnection;
pub use rest::{router, AppState};
