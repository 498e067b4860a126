//! Shared setup for integration tests: a private in-memory database with the
//! migrations applied, and helpers to register cafés into it.

#![allow(dead_code)]

use std::sync::Once;

use rust_decimal::Decimal;
use tempfile::TempDir;

use caffe_office::{
    db,
    forms::{
        caffe::{CaffeForm, EmployeeForm, RegisterForm},
        cash::{CashReportForm, ExpenseForm, LineItemForm},
    },
    AppState, TenantContext,
};

pub const PASSWORD: &str = "Espresso#2024!";

static INIT_LOGGER: Once = Once::new();

pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub async fn test_state() -> AppState {
    init_logger();
    let db_pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    db::migrate(&db_pool).await.expect("Failed to migrate");
    AppState { db_pool }
}

/// On-disk database with a real connection pool, for tests that need
/// concurrent writers. Keep the returned directory alive for the test.
pub async fn file_state() -> (AppState, TempDir) {
    init_logger();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("caffe.db").display());
    let db_pool = db::connect(&url).await.expect("Failed to open database");
    db::migrate(&db_pool).await.expect("Failed to migrate");
    (AppState { db_pool }, dir)
}

pub fn register_form(caffe: &str, username: &str) -> RegisterForm {
    RegisterForm {
        caffe: CaffeForm {
            name: caffe.to_owned(),
            city: "Gliwice".to_owned(),
            street: "Zwycięstwa".to_owned(),
            postal_code: "44-100".to_owned(),
            house_number: "12".to_owned(),
            building_number: String::new(),
        },
        employee: employee_form(username),
    }
}

pub fn employee_form(username: &str) -> EmployeeForm {
    EmployeeForm {
        username: username.to_owned(),
        first_name: "Ala".to_owned(),
        last_name: "Kowalska".to_owned(),
        email: format!("{}@example.com", username),
        telephone_number: "123456789".to_owned(),
        favorite_coffee: "Flat white".to_owned(),
        password: Some(PASSWORD.to_owned()),
        password2: Some(PASSWORD.to_owned()),
    }
}

/// Registers a café and returns the context of its first employee.
pub async fn register(state: &AppState, caffe: &str) -> TenantContext {
    let username = caffe.to_lowercase().replace(' ', "_");
    let (caffe, employee) = db::caffes::register_caffe(state, &register_form(caffe, &username))
        .await
        .expect("Failed to register caffe");
    TenantContext::new(caffe.id, employee.id)
}

pub fn expense_form(name: &str) -> ExpenseForm {
    ExpenseForm {
        name: name.to_owned(),
        company: None,
    }
}

pub fn dec(value: i64) -> Option<Decimal> {
    Some(Decimal::from(value))
}

pub fn cash_report_form(
    before: i64,
    after: i64,
    card: i64,
    due: i64,
    items: &[(i64, i64)],
) -> CashReportForm {
    CashReportForm {
        cash_before_shift: dec(before),
        cash_after_shift: dec(after),
        card_payments: dec(card),
        amount_due: dec(due),
        expenses: items
            .iter()
            .map(|&(expense, amount)| LineItemForm {
                expense: Some(expense),
                amount: dec(amount),
            })
            .collect(),
    }
}
