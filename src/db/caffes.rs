use chrono::Utc;

use crate::{
    db::employees::insert_employee,
    errors::AppError,
    forms::{
        caffe::{CaffeForm, RegisterForm},
        Form,
    },
    structs::{Caffe, Employee},
    tenant::TenantContext,
    utils::hash_password,
    AppState,
};

const DUPLICATE_NAME: &str = "Caffe with this name already exists.";

/// Creates a café and the account of its first employee atomically.
pub async fn register_caffe(state: &AppState, form: &RegisterForm) -> Result<(Caffe, Employee), AppError> {
    let (caffe, employee) = form.clean()?;
    let password = employee.password.as_deref().unwrap_or_default();
    let pwd_hash = hash_password(password)?;

    let mut tx = state.db_pool.begin().await?;

    let caffe = sqlx::query_as::<_, Caffe>(
        "INSERT INTO caffes (name, city, street, postal_code, house_number, building_number, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&caffe.name)
    .bind(&caffe.city)
    .bind(&caffe.street)
    .bind(&caffe.postal_code)
    .bind(&caffe.house_number)
    .bind(&caffe.building_number)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::from_insert(e, "caffe.name", DUPLICATE_NAME))?;

    let employee = insert_employee(&mut tx, caffe.id, &employee, &pwd_hash)
        .await
        .map_err(|e| match e {
            AppError::Uniqueness { message, .. } => AppError::Uniqueness {
                field: "employee.username",
                message,
            },
            other => other,
        })?;

    tx.commit().await?;

    log::info!("Caffe created: {} (first employee {})", caffe.id, employee.id);
    Ok((caffe, employee))
}

pub async fn get_caffe(state: &AppState, ctx: &TenantContext) -> Result<Caffe, AppError> {
    let caffe = sqlx::query_as::<_, Caffe>("SELECT * FROM caffes WHERE id = $1")
        .bind(ctx.caffe_id())
        .fetch_optional(&state.db_pool)
        .await?;
    ctx.claim(caffe)
}

/// Edits the acting employee's own café.
pub async fn update_caffe(state: &AppState, ctx: &TenantContext, form: &CaffeForm) -> Result<Caffe, AppError> {
    let cleaned = form.clean()?;

    let caffe = sqlx::query_as::<_, Caffe>(
        "UPDATE caffes
         SET name = $1, city = $2, street = $3, postal_code = $4, house_number = $5, building_number = $6
         WHERE id = $7
         RETURNING *",
    )
    .bind(&cleaned.name)
    .bind(&cleaned.city)
    .bind(&cleaned.street)
    .bind(&cleaned.postal_code)
    .bind(&cleaned.house_number)
    .bind(&cleaned.building_number)
    .bind(ctx.caffe_id())
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_NAME))?;

    let caffe = ctx.claim(caffe)?;
    log::info!("Caffe {} updated", caffe.id);
    Ok(caffe)
}

/// Administrative removal; cascades to everything the café owns.
pub async fn delete_caffe(state: &AppState, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM caffes WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Caffe with id {} deleted", id);
    Ok(())
}
