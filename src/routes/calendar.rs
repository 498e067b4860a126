use actix_web::{
    get,
    web::{Data, Path},
    HttpResponse, Responder,
};

use crate::{db, errors::AppError, hours::parse_date, tenant::TenantContext, AppState};

/// Reports, cash reports and worked hours of one day.
#[get("/calendar/{date}")]
pub async fn day_handler(
    date: Path<String>,
    state: Data<AppState>,
    ctx: TenantContext,
) -> Result<impl Responder, AppError> {
    let date = parse_date(&date).ok_or_else(|| AppError::invalid("date", "Enter a valid date."))?;
    let summary = db::calendar::day_summary(&state, &ctx, date).await?;
    Ok(HttpResponse::Ok().json(summary))
}
