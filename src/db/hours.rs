//! Positions and worked hours.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{
    db::employees::find_employee,
    errors::AppError,
    forms::{
        hours::{CleanWorkedHours, PositionForm, WorkedHoursForm},
        FieldErrors, Form,
    },
    hours::{has_overlap, Interval},
    links::Route,
    structs::{Position, WorkedHours},
    tenant::TenantContext,
    AppState,
};

const DUPLICATE_POSITION: &str = "Position should have a unique name.";
const OVERLAP: &str = "Worked hours on this day overlap.";

const SELECT_WORKED_HOURS: &str = "SELECT w.id, w.caffe_id, w.employee_id, e.first_name AS employee_first_name, w.position_id,
            w.date, w.start_time, w.end_time, w.created_at, w.updated_at
     FROM worked_hours w JOIN employees e ON e.id = w.employee_id";

// -------------------------------------------------------------------------
// Positions
// -------------------------------------------------------------------------

pub async fn list_positions(state: &AppState, ctx: &TenantContext) -> Result<Vec<Position>, AppError> {
    let positions =
        sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE caffe_id = $1 ORDER BY name")
            .bind(ctx.caffe_id())
            .fetch_all(&state.db_pool)
            .await?;
    Ok(positions)
}

async fn find_position(state: &AppState, id: i64) -> Result<Option<Position>, AppError> {
    let position = sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(position)
}

pub async fn get_position(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Position, AppError> {
    ctx.claim(find_position(state, id).await?)
}

pub async fn create_position(
    state: &AppState,
    ctx: &TenantContext,
    form: &PositionForm,
) -> Result<Position, AppError> {
    let name = form.clean()?;
    let position = sqlx::query_as::<_, Position>(
        "INSERT INTO positions (caffe_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(&name)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_POSITION))?;

    log::info!("Position {} created in caffe {}", position.id, ctx.caffe_id());
    Ok(position)
}

pub async fn update_position(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &PositionForm,
) -> Result<Position, AppError> {
    let position = get_position(state, ctx, id).await?;
    let name = form.clean()?;
    let position = sqlx::query_as::<_, Position>(
        "UPDATE positions SET name = $1 WHERE id = $2 AND caffe_id = $3 RETURNING *",
    )
    .bind(&name)
    .bind(position.id)
    .bind(ctx.caffe_id())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_POSITION))?;

    log::info!("Position {} updated", position.id);
    Ok(position)
}

// -------------------------------------------------------------------------
// Worked hours
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EventEmployee {
    pub id: i64,
    pub first_name: String,
}

/// Worked hours as the calendar renders them.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub employee: EventEmployee,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
    pub url: String,
    pub edit_url: String,
}

impl From<&WorkedHours> for CalendarEvent {
    fn from(hours: &WorkedHours) -> Self {
        CalendarEvent {
            id: hours.id,
            employee: EventEmployee {
                id: hours.employee_id,
                first_name: hours.employee_first_name.clone(),
            },
            start_time: hours.start_time,
            end_time: hours.end_time,
            date: hours.date,
            url: Route::WorkedHoursShow(hours.id).path(),
            edit_url: Route::WorkedHoursEdit(hours.id).path(),
        }
    }
}

async fn find_worked_hours(state: &AppState, id: i64) -> Result<Option<WorkedHours>, AppError> {
    let hours = sqlx::query_as::<_, WorkedHours>(&format!("{} WHERE w.id = $1", SELECT_WORKED_HOURS))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(hours)
}

pub async fn get_worked_hours(state: &AppState, ctx: &TenantContext, id: i64) -> Result<WorkedHours, AppError> {
    ctx.claim(find_worked_hours(state, id).await?)
}

pub async fn list_worked_hours(state: &AppState, ctx: &TenantContext) -> Result<Vec<WorkedHours>, AppError> {
    let hours = sqlx::query_as::<_, WorkedHours>(&format!(
        "{} WHERE w.caffe_id = $1 ORDER BY w.date DESC, w.end_time DESC",
        SELECT_WORKED_HOURS
    ))
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(hours)
}

pub async fn worked_hours_on(
    state: &AppState,
    ctx: &TenantContext,
    date: NaiveDate,
) -> Result<Vec<WorkedHours>, AppError> {
    let hours = sqlx::query_as::<_, WorkedHours>(&format!(
        "{} WHERE w.caffe_id = $1 AND w.date = $2 ORDER BY w.start_time",
        SELECT_WORKED_HOURS
    ))
    .bind(ctx.caffe_id())
    .bind(date)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(hours)
}

/// Resolves the employee and position a form names; the employee defaults to
/// the acting one.
async fn resolve_refs(
    state: &AppState,
    ctx: &TenantContext,
    cleaned: &CleanWorkedHours,
) -> Result<(i64, Option<i64>), AppError> {
    let employee_id = cleaned.employee_id.unwrap_or(ctx.employee_id());
    let employee = ctx.reference(find_employee(state, employee_id).await?, "employee")?;
    let position_id = match cleaned.position_id {
        Some(id) => Some(ctx.reference(find_position(state, id).await?, "position")?.id),
        None => None,
    };
    Ok((employee.id, position_id))
}

/// True if `[start, end]` intersects another interval of the employee on
/// that date. `exclude` skips the row being edited. Callers hold the write
/// lock (`BEGIN IMMEDIATE`) so the check and the write see the same rows.
async fn overlaps(
    conn: &mut SqliteConnection,
    employee_id: i64,
    cleaned: &CleanWorkedHours,
    exclude: Option<i64>,
) -> Result<bool, AppError> {
    let existing: Vec<(NaiveTime, NaiveTime)> = sqlx::query_as(
        "SELECT start_time, end_time FROM worked_hours
         WHERE employee_id = $1 AND date = $2 AND id != $3",
    )
    .bind(employee_id)
    .bind(cleaned.date)
    .bind(exclude.unwrap_or(0))
    .fetch_all(&mut *conn)
    .await?;

    let intervals: Vec<Interval> = existing
        .into_iter()
        .map(|(start, end)| Interval::new(start, end))
        .collect();
    Ok(has_overlap(&intervals, cleaned.start_time, cleaned.end_time))
}

/// Adds the `date` overlap error to `errors`; fails if any error remains.
async fn check_shift(
    conn: &mut SqliteConnection,
    employee_id: i64,
    cleaned: &CleanWorkedHours,
    exclude: Option<i64>,
    mut errors: FieldErrors,
) -> Result<(), AppError> {
    if overlaps(conn, employee_id, cleaned, exclude).await? {
        log::info!(
            "Rejected overlapping hours for employee {} on {}",
            employee_id,
            cleaned.date
        );
        errors.add("date", OVERLAP);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

pub async fn create_worked_hours(
    state: &AppState,
    ctx: &TenantContext,
    form: &WorkedHoursForm,
) -> Result<WorkedHours, AppError> {
    let (parsed, errors) = form.parse();
    let Some(cleaned) = parsed else {
        return Err(errors.into());
    };
    let (employee_id, position_id) = resolve_refs(state, ctx, &cleaned).await?;

    let now = Utc::now();
    let mut tx = state.db_pool.begin_with("BEGIN IMMEDIATE").await?;
    check_shift(&mut tx, employee_id, &cleaned, None, errors).await?;
    let id = sqlx::query(
        "INSERT INTO worked_hours (caffe_id, employee_id, position_id, date, start_time, end_time, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(ctx.caffe_id())
    .bind(employee_id)
    .bind(position_id)
    .bind(cleaned.date)
    .bind(cleaned.start_time)
    .bind(cleaned.end_time)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();
    tx.commit().await?;

    log::info!("Worked hours {} created for employee {}", id, employee_id);
    get_worked_hours(state, ctx, id).await
}

pub async fn update_worked_hours(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &WorkedHoursForm,
) -> Result<WorkedHours, AppError> {
    let hours = get_worked_hours(state, ctx, id).await?;
    let (parsed, errors) = form.parse();
    let Some(mut cleaned) = parsed else {
        return Err(errors.into());
    };
    cleaned.employee_id = cleaned.employee_id.or(Some(hours.employee_id));
    let (employee_id, position_id) = resolve_refs(state, ctx, &cleaned).await?;

    let mut tx = state.db_pool.begin_with("BEGIN IMMEDIATE").await?;
    check_shift(&mut tx, employee_id, &cleaned, Some(hours.id), errors).await?;
    sqlx::query(
        "UPDATE worked_hours
         SET employee_id = $1, position_id = $2, date = $3, start_time = $4, end_time = $5, updated_at = $6
         WHERE id = $7 AND caffe_id = $8",
    )
    .bind(employee_id)
    .bind(position_id)
    .bind(cleaned.date)
    .bind(cleaned.start_time)
    .bind(cleaned.end_time)
    .bind(Utc::now())
    .bind(hours.id)
    .bind(ctx.caffe_id())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    log::info!("Worked hours {} updated", hours.id);
    get_worked_hours(state, ctx, hours.id).await
}
