use actix_web::{
    get, post,
    web::{self, Data, Path},
    HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    db,
    errors::AppError,
    forms::cash::{CashReportForm, CompanyForm, ExpenseForm},
    links::{ListElement, Route},
    routes::edit_page,
    tenant::TenantContext,
    AppState,
};

/// How many cash reports the cash page shows.
const LATEST_CASH_REPORTS: i64 = 10;

#[get("/cash")]
pub async fn cash_handler(state: Data<AppState>, ctx: TenantContext) -> Result<impl Responder, AppError> {
    let companies: Vec<ListElement> = db::cash::list_companies(&state, &ctx)
        .await?
        .iter()
        .map(|c| ListElement::new(c.id, &c.name, Route::CompanyEdit(c.id)))
        .collect();
    let expenses: Vec<ListElement> = db::cash::list_expenses(&state, &ctx)
        .await?
        .iter()
        .map(|e| ListElement::new(e.id, e, Route::ExpenseEdit(e.id)))
        .collect();
    let cash_reports = db::cash::latest_cash_reports(&state, &ctx, LATEST_CASH_REPORTS).await?;

    Ok(HttpResponse::Ok().json(json!({
        "companies": companies,
        "expenses": expenses,
        "cash_reports": cash_reports,
    })))
}

#[post("/cash/companies")]
pub async fn create_company_handler(
    web::Json(form): web::Json<CompanyForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::cash::create_company(&state, &ctx, &form).await?;
    Ok(Route::CashNavigate.redirect())
}

#[get("/cash/companies/{id}/edit")]
pub async fn edit_company_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let company = db::cash::get_company(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<CompanyForm>(&company))
}

#[post("/cash/companies/{id}/edit")]
pub async fn edit_company_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<CompanyForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::cash::update_company(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::CashNavigate.redirect())
}

#[post("/cash/expenses")]
pub async fn create_expense_handler(
    web::Json(form): web::Json<ExpenseForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::cash::create_expense(&state, &ctx, &form).await?;
    Ok(Route::CashNavigate.redirect())
}

#[get("/cash/expenses/{id}/edit")]
pub async fn edit_expense_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let expense = db::cash::get_expense(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<ExpenseForm>(&expense))
}

#[post("/cash/expenses/{id}/edit")]
pub async fn edit_expense_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<ExpenseForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::cash::update_expense(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::CashNavigate.redirect())
}

#[get("/cash/reports")]
pub async fn cash_reports_handler(
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let cash_reports = db::cash::list_cash_reports(&state, &ctx).await?;
    Ok(HttpResponse::Ok().json(cash_reports))
}

#[post("/cash/reports")]
pub async fn create_cash_report_handler(
    web::Json(form): web::Json<CashReportForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::cash::create_cash_report(&state, &ctx, &form).await?;
    Ok(Route::CashReportShow(detail.report.id).redirect())
}

#[get("/cash/reports/{id}")]
pub async fn cash_report_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::cash::get_cash_report(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/cash/reports/{id}/edit")]
pub async fn edit_cash_report_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::cash::get_cash_report(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<CashReportForm>(&detail))
}

#[post("/cash/reports/{id}/edit")]
pub async fn edit_cash_report_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<CashReportForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let detail = db::cash::update_cash_report(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::CashReportShow(detail.report.id).redirect())
}
