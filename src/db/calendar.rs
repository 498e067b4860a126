use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    balance::CashReportDetail,
    db::{cash::cash_reports_on, hours::worked_hours_on, hours::CalendarEvent, reports::reports_on},
    errors::AppError,
    structs::Report,
    tenant::TenantContext,
    AppState,
};

/// What happened in the café on one day.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub reports: Vec<Report>,
    pub cash_reports: Vec<CashReportDetail>,
    pub worked_hours: Vec<CalendarEvent>,
}

pub async fn day_summary(
    state: &AppState,
    ctx: &TenantContext,
    date: NaiveDate,
) -> Result<DaySummary, AppError> {
    let reports = reports_on(state, ctx, date).await?;
    let cash_reports = cash_reports_on(state, ctx, date).await?;
    let worked_hours = worked_hours_on(state, ctx, date)
        .await?
        .iter()
        .map(CalendarEvent::from)
        .collect();

    Ok(DaySummary {
        date,
        reports,
        cash_reports,
        worked_hours,
    })
}
