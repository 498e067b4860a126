//! Back office for a group of cafés: cash reconciliation, stock reports,
//! stencils, worked hours and staff, each scoped to one café.

use sqlx::SqlitePool;

pub mod balance;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod hours;
pub mod links;
pub mod money;
pub mod routes;
pub mod structs;
pub mod tenant;
pub mod utils;

pub use errors::AppError;
pub use tenant::TenantContext;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
}
