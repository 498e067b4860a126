use actix_web::{
    get, post,
    web::{self, Data, Path},
    HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    db::{self, hours::CalendarEvent},
    errors::AppError,
    forms::hours::{PositionForm, WorkedHoursForm},
    links::{ListElement, Route},
    routes::edit_page,
    tenant::TenantContext,
    AppState,
};

#[get("/hours")]
pub async fn hours_handler(state: Data<AppState>, ctx: TenantContext) -> Result<impl Responder, AppError> {
    let positions: Vec<ListElement> = db::hours::list_positions(&state, &ctx)
        .await?
        .iter()
        .map(|p| ListElement::new(p.id, &p.name, Route::PositionEdit(p.id)))
        .collect();
    let events: Vec<CalendarEvent> = db::hours::list_worked_hours(&state, &ctx)
        .await?
        .iter()
        .map(CalendarEvent::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "positions": positions,
        "worked_hours": events,
    })))
}

#[post("/hours/positions")]
pub async fn create_position_handler(
    web::Json(form): web::Json<PositionForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::hours::create_position(&state, &ctx, &form).await?;
    Ok(Route::HoursNavigate.redirect())
}

#[get("/hours/positions/{id}/edit")]
pub async fn edit_position_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let position = db::hours::get_position(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<PositionForm>(&position))
}

#[post("/hours/positions/{id}/edit")]
pub async fn edit_position_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<PositionForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::hours::update_position(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::HoursNavigate.redirect())
}

#[post("/hours")]
pub async fn create_worked_hours_handler(
    web::Json(form): web::Json<WorkedHoursForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let hours = db::hours::create_worked_hours(&state, &ctx, &form).await?;
    Ok(Route::WorkedHoursShow(hours.id).redirect())
}

#[get("/hours/{id}")]
pub async fn worked_hours_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let hours = db::hours::get_worked_hours(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CalendarEvent::from(&hours)))
}

#[get("/hours/{id}/edit")]
pub async fn edit_worked_hours_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let hours = db::hours::get_worked_hours(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<WorkedHoursForm>(&hours))
}

#[post("/hours/{id}/edit")]
pub async fn edit_worked_hours_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<WorkedHoursForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let hours = db::hours::update_worked_hours(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::WorkedHoursShow(hours.id).redirect())
}
