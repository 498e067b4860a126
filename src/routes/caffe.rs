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
        caffe::{CaffeForm, EmployeeForm},
        Form,
    },
    links::{ListElement, Route},
    routes::edit_page,
    tenant::TenantContext,
    AppState,
};

#[get("/caffe")]
pub async fn caffe_handler(state: Data<AppState>, ctx: TenantContext) -> Result<impl Responder, AppError> {
    let caffe = db::caffes::get_caffe(&state, &ctx).await?;
    Ok(edit_page::<CaffeForm>(&caffe))
}

#[post("/caffe")]
pub async fn caffe_form_handler(
    web::Json(form): web::Json<CaffeForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    db::caffes::update_caffe(&state, &ctx, &form).await?;
    Ok(Route::CaffeNavigate.redirect())
}

#[get("/employees")]
pub async fn employees_handler(
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let employees: Vec<ListElement> = db::employees::list_employees(&state, &ctx)
        .await?
        .iter()
        .map(|e| ListElement::new(e.id, e, Route::EmployeeEdit(e.id)))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "employees": employees,
        "fields": EmployeeForm::FIELDS,
    })))
}

#[post("/employees")]
pub async fn create_employee_handler(
    web::Json(form): web::Json<EmployeeForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let employee = db::employees::create_employee(&state, &ctx, &form).await?;
    Ok(Route::EmployeeShow(employee.id).redirect())
}

#[get("/employees/{id}")]
pub async fn employee_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let employee = db::employees::get_employee(&state, &ctx, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[get("/employees/{id}/edit")]
pub async fn edit_employee_handler(
    id: Path<i64>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let employee = db::employees::get_employee(&state, &ctx, id.into_inner()).await?;
    Ok(edit_page::<EmployeeForm>(&employee))
}

#[post("/employees/{id}/edit")]
pub async fn edit_employee_form_handler(
    id: Path<i64>,
    web::Json(form): web::Json<EmployeeForm>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let employee = db::employees::update_employee(&state, &ctx, id.into_inner(), &form).await?;
    Ok(Route::EmployeeShow(employee.id).redirect())
}
