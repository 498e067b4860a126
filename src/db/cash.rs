//! Companies, expenses and cash reports.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    balance::CashReportDetail,
    errors::AppError,
    forms::{
        cash::{CashReportForm, CleanCashReport, CompanyForm, ExpenseForm},
        Form,
    },
    structs::{CashReport, Company, Expense, LineItem},
    tenant::TenantContext,
    AppState,
};

const DUPLICATE_COMPANY: &str = "Company with this name already exists.";
const DUPLICATE_EXPENSE: &str = "Expense should have a unique name.";
const DUPLICATE_LINE_ITEM: &str = "Cash report should not contain two same expenses.";

const SELECT_EXPENSE: &str = "SELECT e.id, e.caffe_id, e.name, e.company_id, c.name AS company_name
     FROM expenses e LEFT JOIN companies c ON c.id = e.company_id";

const SELECT_LINE_ITEM: &str = "SELECT li.id, li.caffe_id, li.cash_report_id, li.expense_id, e.name AS expense_name, li.amount
     FROM line_items li JOIN expenses e ON e.id = li.expense_id";

// -------------------------------------------------------------------------
// Companies
// -------------------------------------------------------------------------

pub async fn list_companies(state: &AppState, ctx: &TenantContext) -> Result<Vec<Company>, AppError> {
    let companies =
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE caffe_id = $1 ORDER BY name")
            .bind(ctx.caffe_id())
            .fetch_all(&state.db_pool)
            .await?;
    Ok(companies)
}

async fn find_company(state: &AppState, id: i64) -> Result<Option<Company>, AppError> {
    let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(company)
}

pub async fn get_company(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Company, AppError> {
    ctx.claim(find_company(state, id).await?)
}

pub async fn create_company(
    state: &AppState,
    ctx: &TenantContext,
    form: &CompanyForm,
) -> Result<Company, AppError> {
    let name = form.clean()?;
    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (caffe_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(&name)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_COMPANY))?;

    log::info!("Company {} created in caffe {}", company.id, ctx.caffe_id());
    Ok(company)
}

pub async fn update_company(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &CompanyForm,
) -> Result<Company, AppError> {
    let company = get_company(state, ctx, id).await?;
    let name = form.clean()?;

    let company = sqlx::query_as::<_, Company>(
        "UPDATE companies SET name = $1 WHERE id = $2 AND caffe_id = $3 RETURNING *",
    )
    .bind(&name)
    .bind(company.id)
    .bind(ctx.caffe_id())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_COMPANY))?;

    log::info!("Company {} updated", company.id);
    Ok(company)
}

// -------------------------------------------------------------------------
// Expenses
// -------------------------------------------------------------------------

pub async fn list_expenses(state: &AppState, ctx: &TenantContext) -> Result<Vec<Expense>, AppError> {
    let expenses = sqlx::query_as::<_, Expense>(&format!(
        "{} WHERE e.caffe_id = $1 ORDER BY e.name, c.name",
        SELECT_EXPENSE
    ))
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(expenses)
}

async fn find_expense(state: &AppState, id: i64) -> Result<Option<Expense>, AppError> {
    let expense = sqlx::query_as::<_, Expense>(&format!("{} WHERE e.id = $1", SELECT_EXPENSE))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(expense)
}

pub async fn get_expense(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Expense, AppError> {
    ctx.claim(find_expense(state, id).await?)
}

/// The company an expense form points at must be one of the café's own.
async fn expense_company(
    state: &AppState,
    ctx: &TenantContext,
    company_id: Option<i64>,
) -> Result<Option<i64>, AppError> {
    match company_id {
        Some(id) => {
            let company = ctx.reference(find_company(state, id).await?, "company")?;
            Ok(Some(company.id))
        }
        None => Ok(None),
    }
}

pub async fn create_expense(
    state: &AppState,
    ctx: &TenantContext,
    form: &ExpenseForm,
) -> Result<Expense, AppError> {
    let cleaned = form.clean()?;
    let company_id = expense_company(state, ctx, cleaned.company_id).await?;

    let id = sqlx::query("INSERT INTO expenses (caffe_id, name, company_id) VALUES ($1, $2, $3)")
        .bind(ctx.caffe_id())
        .bind(&cleaned.name)
        .bind(company_id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_EXPENSE))?
        .last_insert_rowid();

    log::info!("Expense {} created in caffe {}", id, ctx.caffe_id());
    get_expense(state, ctx, id).await
}

pub async fn update_expense(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &ExpenseForm,
) -> Result<Expense, AppError> {
    let expense = get_expense(state, ctx, id).await?;
    let cleaned = form.clean()?;
    let company_id = expense_company(state, ctx, cleaned.company_id).await?;

    sqlx::query("UPDATE expenses SET name = $1, company_id = $2 WHERE id = $3 AND caffe_id = $4")
        .bind(&cleaned.name)
        .bind(company_id)
        .bind(expense.id)
        .bind(ctx.caffe_id())
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_EXPENSE))?;

    log::info!("Expense {} updated", expense.id);
    get_expense(state, ctx, expense.id).await
}

// -------------------------------------------------------------------------
// Cash reports
// -------------------------------------------------------------------------

async fn find_cash_report(state: &AppState, id: i64) -> Result<Option<CashReport>, AppError> {
    let report = sqlx::query_as::<_, CashReport>("SELECT * FROM cash_reports WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(report)
}

async fn line_items_of(state: &AppState, report_id: i64) -> Result<Vec<LineItem>, AppError> {
    let items = sqlx::query_as::<_, LineItem>(&format!(
        "{} WHERE li.cash_report_id = $1 ORDER BY e.name",
        SELECT_LINE_ITEM
    ))
    .bind(report_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(items)
}

/// A report with its line items and balance.
pub async fn get_cash_report(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
) -> Result<CashReportDetail, AppError> {
    let report = ctx.claim(find_cash_report(state, id).await?)?;
    let line_items = line_items_of(state, report.id).await?;
    Ok(CashReportDetail::new(report, line_items))
}

const LINE_ITEM_BATCH: usize = 500;

/// Attaches line items to `reports`, querying only those reports' rows.
async fn with_line_items(
    state: &AppState,
    ctx: &TenantContext,
    reports: Vec<CashReport>,
) -> Result<Vec<CashReportDetail>, AppError> {
    let mut by_report: HashMap<i64, Vec<LineItem>> = HashMap::new();
    for batch in reports.chunks(LINE_ITEM_BATCH) {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_LINE_ITEM);
        query
            .push(" WHERE li.caffe_id = ")
            .push_bind(ctx.caffe_id())
            .push(" AND li.cash_report_id IN (");
        let mut ids = query.separated(", ");
        for report in batch {
            ids.push_bind(report.id);
        }
        ids.push_unseparated(") ORDER BY e.name");

        let items = query
            .build_query_as::<LineItem>()
            .fetch_all(&state.db_pool)
            .await?;
        for item in items {
            by_report.entry(item.cash_report_id).or_default().push(item);
        }
    }

    Ok(reports
        .into_iter()
        .map(|report| {
            let items = by_report.remove(&report.id).unwrap_or_default();
            CashReportDetail::new(report, items)
        })
        .collect())
}

/// All of the café's cash reports, newest first.
pub async fn list_cash_reports(
    state: &AppState,
    ctx: &TenantContext,
) -> Result<Vec<CashReportDetail>, AppError> {
    let reports = sqlx::query_as::<_, CashReport>(
        "SELECT * FROM cash_reports WHERE caffe_id = $1
         ORDER BY created_at DESC, updated_at DESC, id DESC",
    )
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    with_line_items(state, ctx, reports).await
}

pub async fn latest_cash_reports(
    state: &AppState,
    ctx: &TenantContext,
    limit: i64,
) -> Result<Vec<CashReportDetail>, AppError> {
    let reports = sqlx::query_as::<_, CashReport>(
        "SELECT * FROM cash_reports WHERE caffe_id = $1
         ORDER BY created_at DESC, updated_at DESC, id DESC
         LIMIT $2",
    )
    .bind(ctx.caffe_id())
    .bind(limit)
    .fetch_all(&state.db_pool)
    .await?;
    with_line_items(state, ctx, reports).await
}

/// Cash reports created on `date` (UTC).
pub async fn cash_reports_on(
    state: &AppState,
    ctx: &TenantContext,
    date: NaiveDate,
) -> Result<Vec<CashReportDetail>, AppError> {
    let reports = sqlx::query_as::<_, CashReport>(
        "SELECT * FROM cash_reports WHERE caffe_id = $1 AND date(created_at) = $2
         ORDER BY created_at DESC, id DESC",
    )
    .bind(ctx.caffe_id())
    .bind(date)
    .fetch_all(&state.db_pool)
    .await?;
    with_line_items(state, ctx, reports).await
}

/// Validates a cash report form including every referenced expense.
async fn clean_cash_report(
    state: &AppState,
    ctx: &TenantContext,
    form: &CashReportForm,
) -> Result<CleanCashReport, AppError> {
    let cleaned = form.clean()?;
    for (index, item) in cleaned.line_items.iter().enumerate() {
        let field = format!("expenses.{}.expense", index);
        ctx.reference(find_expense(state, item.expense_id).await?, &field)?;
    }
    Ok(cleaned)
}

async fn insert_line_items(
    conn: &mut SqliteConnection,
    ctx: &TenantContext,
    report_id: i64,
    cleaned: &CleanCashReport,
) -> Result<(), AppError> {
    for item in &cleaned.line_items {
        sqlx::query(
            "INSERT INTO line_items (caffe_id, cash_report_id, expense_id, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(ctx.caffe_id())
        .bind(report_id)
        .bind(item.expense_id)
        .bind(item.amount.minor_units().map_err(|e| AppError::invalid("expenses", e.to_string()))?)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_insert(e, "expenses", DUPLICATE_LINE_ITEM))?;
    }
    Ok(())
}

fn till_minor_units(cleaned: &CleanCashReport) -> Result<[i64; 4], AppError> {
    let field = |name: &str, value: crate::money::Money| {
        value
            .minor_units()
            .map_err(|e| AppError::invalid(name, e.to_string()))
    };
    Ok([
        field("cash_before_shift", cleaned.cash_before_shift)?,
        field("cash_after_shift", cleaned.cash_after_shift)?,
        field("card_payments", cleaned.card_payments)?,
        field("amount_due", cleaned.amount_due)?,
    ])
}

/// Records a shift by the acting employee, with its line items.
pub async fn create_cash_report(
    state: &AppState,
    ctx: &TenantContext,
    form: &CashReportForm,
) -> Result<CashReportDetail, AppError> {
    let cleaned = clean_cash_report(state, ctx, form).await?;
    let [before, after, card, due] = till_minor_units(&cleaned)?;
    let now = Utc::now();

    let mut tx = state.db_pool.begin().await?;
    let report = sqlx::query_as::<_, CashReport>(
        "INSERT INTO cash_reports (caffe_id, creator_id, cash_before_shift, cash_after_shift, card_payments, amount_due, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(ctx.employee_id())
    .bind(before)
    .bind(after)
    .bind(card)
    .bind(due)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    insert_line_items(&mut tx, ctx, report.id, &cleaned).await?;
    tx.commit().await?;

    log::info!(
        "Cash report {} created by employee {} in caffe {}",
        report.id,
        ctx.employee_id(),
        ctx.caffe_id()
    );
    get_cash_report(state, ctx, report.id).await
}

/// Updates the till figures and replaces the whole set of line items.
pub async fn update_cash_report(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &CashReportForm,
) -> Result<CashReportDetail, AppError> {
    let report = ctx.claim(find_cash_report(state, id).await?)?;
    let cleaned = clean_cash_report(state, ctx, form).await?;
    let [before, after, card, due] = till_minor_units(&cleaned)?;

    let mut tx = state.db_pool.begin().await?;
    sqlx::query(
        "UPDATE cash_reports
         SET cash_before_shift = $1, cash_after_shift = $2, card_payments = $3, amount_due = $4, updated_at = $5
         WHERE id = $6 AND caffe_id = $7",
    )
    .bind(before)
    .bind(after)
    .bind(card)
    .bind(due)
    .bind(Utc::now())
    .bind(report.id)
    .bind(ctx.caffe_id())
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM line_items WHERE cash_report_id = $1")
        .bind(report.id)
        .execute(&mut *tx)
        .await?;
    insert_line_items(&mut tx, ctx, report.id, &cleaned).await?;
    tx.commit().await?;

    log::info!("Cash report {} updated", report.id);
    get_cash_report(state, ctx, report.id).await
}
