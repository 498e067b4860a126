use actix_identity::Identity;
use actix_web::{
    get, post,
    web::{self, Data},
    HttpMessage, HttpRequest, HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    db,
    errors::AppError,
    forms::caffe::{LoginForm, RegisterForm},
    links::Route,
    tenant::TenantContext,
    AppState,
};

/// How many cash reports the home page shows.
const LATEST_CASH_REPORTS: i64 = 5;

#[get("/")]
pub async fn index_handler(
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let caffe = db::caffes::get_caffe(&state, &ctx).await?;
    let employee = db::employees::get_employee(&state, &ctx, ctx.employee_id()).await?;
    let cash_reports = db::cash::latest_cash_reports(&state, &ctx, LATEST_CASH_REPORTS).await?;

    Ok(HttpResponse::Ok().json(json!({
        "caffe": caffe,
        "employee": employee,
        "cash_reports": cash_reports,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

fn login(request: &HttpRequest, employee_id: i64) -> Result<(), AppError> {
    Identity::login(&request.extensions(), employee_id.to_string())
        .map_err(|e| AppError::IdentityError(e.to_string()))?;
    Ok(())
}

/// Registers a café with its first employee and logs that employee in.
#[post("/register")]
pub async fn register_form_handler(
    web::Json(form): web::Json<RegisterForm>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let (_, employee) = db::caffes::register_caffe(&state, &form).await?;
    login(&request, employee.id)?;
    Ok(Route::Home.redirect())
}

#[post("/login")]
pub async fn login_form_handler(
    web::Json(form): web::Json<LoginForm>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let employee = db::employees::authenticate(&state, &form).await?;
    login(&request, employee.id)?;
    Ok(Route::Home.redirect())
}

#[post("/logout")]
pub async fn logout_handler(user: Identity) -> impl Responder {
    user.logout();
    HttpResponse::Ok().finish()
}
