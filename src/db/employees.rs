use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    errors::AppError,
    forms::{
        caffe::{CleanEmployee, EmployeeForm, LoginForm},
        Form,
    },
    structs::Employee,
    tenant::TenantContext,
    utils::{hash_password, verify_password},
    AppState,
};

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// Unscoped lookup; only the session layer and login use it.
pub async fn find_employee(state: &AppState, id: i64) -> Result<Option<Employee>, AppError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(employee)
}

/// Checks a username/password pair; any mismatch is `Unauthorized`.
pub async fn authenticate(state: &AppState, form: &LoginForm) -> Result<Employee, AppError> {
    let (username, password) = form.clean()?;

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE username = $1")
        .bind(&username)
        .fetch_optional(&state.db_pool)
        .await?;

    match employee {
        Some(employee) if verify_password(&password, &employee.pwd_hash)? => {
            log::info!("Employee {} logged in", employee.id);
            Ok(employee)
        }
        _ => {
            log::warn!("Failed login for username {}", username);
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn list_employees(state: &AppState, ctx: &TenantContext) -> Result<Vec<Employee>, AppError> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE caffe_id = $1 ORDER BY last_name, first_name",
    )
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(employees)
}

pub async fn get_employee(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Employee, AppError> {
    let employee = find_employee(state, id).await?;
    ctx.claim(employee)
}

/// Inserts an employee row; shared with café registration, which runs it
/// inside its own transaction.
pub(crate) async fn insert_employee(
    conn: &mut SqliteConnection,
    caffe_id: i64,
    employee: &CleanEmployee,
    pwd_hash: &str,
) -> Result<Employee, AppError> {
    let now = Utc::now();
    let employee = sqlx::query_as::<_, Employee>(
        "INSERT INTO employees (caffe_id, username, first_name, last_name, email, telephone_number, favorite_coffee, pwd_hash, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(caffe_id)
    .bind(&employee.username)
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.email)
    .bind(&employee.telephone_number)
    .bind(&employee.favorite_coffee)
    .bind(pwd_hash)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::from_insert(e, "username", DUPLICATE_USERNAME))?;
    Ok(employee)
}

pub async fn create_employee(
    state: &AppState,
    ctx: &TenantContext,
    form: &EmployeeForm,
) -> Result<Employee, AppError> {
    let cleaned = form.clean_new()?;
    let password = cleaned.password.as_deref().unwrap_or_default();
    let pwd_hash = hash_password(password)?;

    let mut conn = state.db_pool.acquire().await?;
    let employee = insert_employee(&mut conn, ctx.caffe_id(), &cleaned, &pwd_hash).await?;

    log::info!("Employee {} created in caffe {}", employee.id, ctx.caffe_id());
    Ok(employee)
}

/// Edits profile fields; the password changes only when a new one is given.
pub async fn update_employee(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &EmployeeForm,
) -> Result<Employee, AppError> {
    let employee = get_employee(state, ctx, id).await?;
    let cleaned = form.clean()?;

    let pwd_hash = match cleaned.password.as_deref() {
        Some(password) => hash_password(password)?,
        None => employee.pwd_hash.clone(),
    };

    let updated = sqlx::query_as::<_, Employee>(
        "UPDATE employees
         SET username = $1, first_name = $2, last_name = $3, email = $4, telephone_number = $5,
             favorite_coffee = $6, pwd_hash = $7, updated_at = $8
         WHERE id = $9 AND caffe_id = $10
         RETURNING *",
    )
    .bind(&cleaned.username)
    .bind(&cleaned.first_name)
    .bind(&cleaned.last_name)
    .bind(&cleaned.email)
    .bind(&cleaned.telephone_number)
    .bind(&cleaned.favorite_coffee)
    .bind(&pwd_hash)
    .bind(Utc::now())
    .bind(employee.id)
    .bind(ctx.caffe_id())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "username", DUPLICATE_USERNAME))?;

    log::info!("Employee {} updated", updated.id);
    Ok(updated)
}
