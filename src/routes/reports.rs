use actix_web::{
    get, post,
    web::{self, Data, Path},
    HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    db,
    errors::AppError,
    forms::reports::{CategoryForm, ProductForm, ReportForm, UnitForm},
    links::{ListElement, Route},
    routes::edit_page,
    tenant::TenantContext,
    AppState,
};

#[get("/reports")]
pub async fn reports_handler(state: Data<AppState>, ctx: TenantContext) -> Result<impl Responder, AppError> {
    let categories: Vec<ListElement> = db::reports::list_categories(&state, &ctx)
        .await?
        .iter()
        .map(|c| ListElement::new(c.id, &c.name, Route::CategoryEdit(c.id)))
        .collect();
    let units: Vec<ListElement> = db::reports::list_units(&state, &ctx)
        .await?
        .iter()
        .map(|u| ListElement::new(u.id, &u.name, Route::UnitEdit(u.id)))
        .collect();
    let products: Vec<ListElement> = db::reports::list_products(&state, &ctx)
        .await?
        .iter()
        .map(|p| ListElement::new(p.id, format!("{}, {}", p.name, p.unit_name), Route::ProductEdit(p.id)))
        .collect();
    let reports: Vec<ListElement> = db::reports::list_reports(&state, &ctx)
        .await?
        .iter()
        .map(|r| ListElement::new(r.id, r, Route::ReportEdit(r.id)))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "categories": categories,
        "units": units,
        "products": products,
        "reports": reports,
    })))
}

#[post("/reports/categories")]
pub async fn create_category_handler(
    web::Json(form): web::Json<CategoryForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::create_category(&state, &ctx, &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[get("/reports/categories/{id}/edit")]
pub async fn edit_category_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let category = db::reports::get_category(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<CategoryForm>(&category))
}

#[post("/reports/categories/{id}/edit")]
pub async fn edit_category_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<CategoryForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::update_category(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[post("/reports/units")]
pub async fn create_unit_handler(
    web::Json(form): web::Json<UnitForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::create_unit(&state, &ctx, &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[get("/reports/units/{id}/edit")]
pub async fn edit_unit_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let unit = db::reports::get_unit(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<UnitForm>(&unit))
}

#[post("/reports/units/{id}/edit")]
pub async fn edit_unit_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<UnitForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::update_unit(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[post("/reports/products")]
pub async fn create_product_handler(
    web::Json(form): web::Json<ProductForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::create_product(&state, &ctx, &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[get("/reports/products/{id}/edit")]
pub async fn edit_product_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let product = db::reports::get_product(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<ProductForm>(&product))
}

#[post("/reports/products/{id}/edit")]
pub async fn edit_product_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<ProductForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::reports::update_product(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::ReportsNavigate.redirect())
}

#[post("/reports")]
pub async fn create_report_handler(
    web::Json(form): web::Json<ReportForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::reports::create_report(&state, &ctx, &form).await?;
    Ok(Route::ReportShow(detail.report.id).redirect())
}

#[get("/reports/{id}")]
pub async fn report_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::reports::get_report(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/reports/{id}/edit")]
pub async fn edit_report_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::reports::get_report(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<ReportForm>(&detail))
}

#[post("/reports/{id}/edit")]
pub async fn edit_report_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<ReportForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::reports::update_report(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::ReportShow(detail.report.id).redirect())
}
