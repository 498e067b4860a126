use actix_web::{
    get, post,
    web::{self, Data, Path},
    HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    db,
    errors::AppError,
    forms::{
        reports::{StencilForm, StencilReportForm},
        Form,
    },
    links::{ListElement, Route},
    routes::edit_page,
    tenant::TenantContext,
    AppState,
};

#[get("/stencils")]
pub async fn stencils_handler(state: Data<AppState>, ctx: TenantContext) -> Result<impl Responder, AppError> {
    let stencils: Vec<ListElement> = db::stencils::list_stencils(&state, &ctx)
        .await?
        .iter()
        .map(|s| ListElement::new(s.id, &s.name, Route::StencilEdit(s.id)))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "stencils": stencils,
        "fields": StencilForm::FIELDS,
    })))
}

#[post("/stencils")]
pub async fn create_stencil_handler(
    web::Json(form): web::Json<StencilForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::stencils::create_stencil(&state, &ctx, &form).await?;
    Ok(Route::StencilShow(detail.stencil.id).redirect())
}

#[get("/stencils/{id}")]
pub async fn stencil_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::stencils::get_stencil(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/stencils/{id}/edit")]
pub async fn edit_stencil_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::stencils::get_stencil(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<StencilForm>(&detail))
}

#[post("/stencils/{id}/edit")]
pub async fn edit_stencil_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<StencilForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::stencils::update_stencil(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::StencilShow(detail.stencil.id).redirect())
}

/// The sheet to count stock with.
#[get("/stencils/{id}/report")]
pub async fn stencil_sheet_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let sheet = db::stencils::stencil_sheet(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sheet))
}

#[post("/stencils/{id}/report")]
pub async fn stencil_report_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<StencilReportForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::stencils::create_report_from_stencil(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::ReportShow(detail.report.id).redirect())
}
