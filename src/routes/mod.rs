//! HTTP adapter: JSON handlers over the `db` operations.
//!
//! Handlers that touch tenant data take a [`TenantContext`](crate::TenantContext)
//! extracted from the session. Successful mutations answer with a redirect to
//! the affected page.

use actix_web::{
    get,
    http::Method,
    web::{self, Path},
    HttpResponse, Responder,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    errors::AppError,
    forms::{field_table, Form},
};

pub mod auth;
pub mod caffe;
pub mod calendar;
pub mod cash;
pub mod hours;
pub mod reports;
pub mod stencils;

/// Registers every handler. Literal paths come before their `{id}` siblings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::index_handler)
        .service(auth::register_form_handler)
        .service(auth::login_form_handler)
        .service(auth::logout_handler)
        .service(form_fields_handler)
        // caffe and employees
        .service(caffe::caffe_handler)
        .service(caffe::caffe_form_handler)
        .service(caffe::employees_handler)
        .service(caffe::create_employee_handler)
        .service(caffe::employee_handler)
        .service(caffe::edit_employee_handler)
        .service(caffe::edit_employee_form_handler)
        // cash
        .service(cash::cash_handler)
        .service(cash::create_company_handler)
        .service(cash::edit_company_handler)
        .service(cash::edit_company_form_handler)
        .service(cash::create_expense_handler)
        .service(cash::edit_expense_handler)
        .service(cash::edit_expense_form_handler)
        .service(cash::cash_reports_handler)
        .service(cash::create_cash_report_handler)
        .service(cash::cash_report_handler)
        .service(cash::edit_cash_report_handler)
        .service(cash::edit_cash_report_form_handler)
        // inventory
        .service(reports::reports_handler)
        .service(reports::create_category_handler)
        .service(reports::edit_category_handler)
        .service(reports::edit_category_form_handler)
        .service(reports::create_unit_handler)
        .service(reports::edit_unit_handler)
        .service(reports::edit_unit_form_handler)
        .service(reports::create_product_handler)
        .service(reports::edit_product_handler)
        .service(reports::edit_product_form_handler)
        .service(reports::create_report_handler)
        .service(reports::report_handler)
        .service(reports::edit_report_handler)
        .service(reports::edit_report_form_handler)
        // stencils
        .service(stencils::stencils_handler)
        .service(stencils::create_stencil_handler)
        .service(stencils::stencil_handler)
        .service(stencils::edit_stencil_handler)
        .service(stencils::edit_stencil_form_handler)
        .service(stencils::stencil_sheet_handler)
        .service(stencils::stencil_report_form_handler)
        // hours
        .service(hours::hours_handler)
        .service(hours::create_position_handler)
        .service(hours::edit_position_handler)
        .service(hours::edit_position_form_handler)
        .service(hours::create_worked_hours_handler)
        .service(hours::worked_hours_handler)
        .service(hours::edit_worked_hours_handler)
        .service(hours::edit_worked_hours_form_handler)
        .service(calendar::day_handler)
        .default_service(web::to(default_handler));
}

/// Field table of a form, for the front end to render it.
#[get("/forms/{name}")]
pub async fn form_fields_handler(name: Path<String>) -> Result<impl Responder, AppError> {
    let name = name.into_inner();
    let fields = field_table(&name).ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(json!({ "form": name, "fields": fields })))
}

/// Edit page payload: the current state of the entity and the form to edit
/// it with.
pub(crate) fn edit_page<F: Form>(instance: &impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "form": F::NAME,
        "fields": F::FIELDS,
        "instance": instance,
    }))
}

async fn default_handler(req_method: Method) -> impl Responder {
    match req_method {
        Method::GET => HttpResponse::NotFound().body("Not found"),
        _ => HttpResponse::MethodNotAllowed().finish(),
    }
}
