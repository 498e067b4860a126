//! Named routes and listing entries.

use std::fmt;

use actix_web::HttpResponse;
use serde::Serialize;

/// Every page the front end can be sent to after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    CaffeNavigate,
    EmployeeShow(i64),
    EmployeeEdit(i64),
    CashNavigate,
    CompanyEdit(i64),
    ExpenseEdit(i64),
    CashReportShow(i64),
    ReportsNavigate,
    CategoryEdit(i64),
    UnitEdit(i64),
    ProductEdit(i64),
    ReportShow(i64),
    ReportEdit(i64),
    StencilShow(i64),
    StencilEdit(i64),
    HoursNavigate,
    PositionEdit(i64),
    WorkedHoursShow(i64),
    WorkedHoursEdit(i64),
}

impl Route {
    pub fn path(&self) -> String {
        match *self {
            Route::Home => "/".to_owned(),
            Route::CaffeNavigate => "/caffe".to_owned(),
            Route::EmployeeShow(id) => format!("/employees/{}", id),
            Route::EmployeeEdit(id) => format!("/employees/{}/edit", id),
            Route::CashNavigate => "/cash".to_owned(),
            Route::CompanyEdit(id) => format!("/cash/companies/{}/edit", id),
            Route::ExpenseEdit(id) => format!("/cash/expenses/{}/edit", id),
            Route::CashReportShow(id) => format!("/cash/reports/{}", id),
            Route::ReportsNavigate => "/reports".to_owned(),
            Route::CategoryEdit(id) => format!("/reports/categories/{}/edit", id),
            Route::UnitEdit(id) => format!("/reports/units/{}/edit", id),
            Route::ProductEdit(id) => format!("/reports/products/{}/edit", id),
            Route::ReportShow(id) => format!("/reports/{}", id),
            Route::ReportEdit(id) => format!("/reports/{}/edit", id),
            Route::StencilShow(id) => format!("/stencils/{}", id),
            Route::StencilEdit(id) => format!("/stencils/{}/edit", id),
            Route::HoursNavigate => "/hours".to_owned(),
            Route::PositionEdit(id) => format!("/hours/positions/{}/edit", id),
            Route::WorkedHoursShow(id) => format!("/hours/{}", id),
            Route::WorkedHoursEdit(id) => format!("/hours/{}/edit", id),
        }
    }

    /// `303 See Other` to this route.
    pub fn redirect(&self) -> HttpResponse {
        let location = self.path();
        HttpResponse::SeeOther()
            .append_header(("Location", location.as_str()))
            .json(serde_json::json!({ "redirect": location }))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListElement {
    pub id: i64,
    pub desc: String,
    pub edit_href: String,
}

impl ListElement {
    pub fn new(id: i64, desc: impl fmt::Display, edit: Route) -> Self {
        Self {
            id,
            desc: desc.to_string(),
            edit_href: edit.path(),
        }
    }
}
