//! Categories, units, products and stock reports.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{
    errors::AppError,
    forms::{
        reports::{CategoryForm, CleanFullProduct, ProductForm, ReportForm, UnitForm},
        Form,
    },
    structs::{Category, FullProduct, Product, Report, Unit},
    tenant::TenantContext,
    AppState,
};

const DUPLICATE_CATEGORY: &str = "Category should have a unique name.";
const DUPLICATE_UNIT: &str = "Unit should have a unique name.";
const DUPLICATE_PRODUCT: &str = "Product should have a unique name.";
const DUPLICATE_FULL_PRODUCT: &str = "Report should not contain two same products.";

const SELECT_PRODUCT: &str = "SELECT p.id, p.caffe_id, p.name, p.category_id, p.unit_id, u.name AS unit_name
     FROM products p JOIN units u ON u.id = p.unit_id";

const SELECT_FULL_PRODUCT: &str = "SELECT fp.id, fp.caffe_id, fp.report_id, fp.product_id, p.name AS product_name, u.name AS unit_name, fp.amount
     FROM full_products fp
     JOIN products p ON p.id = fp.product_id
     JOIN units u ON u.id = p.unit_id";

#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    pub report: Report,
    pub full_products: Vec<FullProduct>,
}

// -------------------------------------------------------------------------
// Categories and units
// -------------------------------------------------------------------------

pub async fn list_categories(state: &AppState, ctx: &TenantContext) -> Result<Vec<Category>, AppError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE caffe_id = $1 ORDER BY name")
            .bind(ctx.caffe_id())
            .fetch_all(&state.db_pool)
            .await?;
    Ok(categories)
}

pub(crate) async fn find_category(state: &AppState, id: i64) -> Result<Option<Category>, AppError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(category)
}

pub async fn get_category(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Category, AppError> {
    ctx.claim(find_category(state, id).await?)
}

pub async fn create_category(
    state: &AppState,
    ctx: &TenantContext,
    form: &CategoryForm,
) -> Result<Category, AppError> {
    let name = form.clean()?;
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (caffe_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(&name)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_CATEGORY))?;

    log::info!("Category {} created in caffe {}", category.id, ctx.caffe_id());
    Ok(category)
}

pub async fn update_category(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &CategoryForm,
) -> Result<Category, AppError> {
    let category = get_category(state, ctx, id).await?;
    let name = form.clean()?;
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $1 WHERE id = $2 AND caffe_id = $3 RETURNING *",
    )
    .bind(&name)
    .bind(category.id)
    .bind(ctx.caffe_id())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_CATEGORY))?;

    log::info!("Category {} updated", category.id);
    Ok(category)
}

pub async fn list_units(state: &AppState, ctx: &TenantContext) -> Result<Vec<Unit>, AppError> {
    let units = sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE caffe_id = $1 ORDER BY name")
        .bind(ctx.caffe_id())
        .fetch_all(&state.db_pool)
        .await?;
    Ok(units)
}

async fn find_unit(state: &AppState, id: i64) -> Result<Option<Unit>, AppError> {
    let unit = sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(unit)
}

pub async fn get_unit(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Unit, AppError> {
    ctx.claim(find_unit(state, id).await?)
}

pub async fn create_unit(state: &AppState, ctx: &TenantContext, form: &UnitForm) -> Result<Unit, AppError> {
    let name = form.clean()?;
    let unit = sqlx::query_as::<_, Unit>("INSERT INTO units (caffe_id, name) VALUES ($1, $2) RETURNING *")
        .bind(ctx.caffe_id())
        .bind(&name)
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_UNIT))?;

    log::info!("Unit {} created in caffe {}", unit.id, ctx.caffe_id());
    Ok(unit)
}

pub async fn update_unit(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &UnitForm,
) -> Result<Unit, AppError> {
    let unit = get_unit(state, ctx, id).await?;
    let name = form.clean()?;
    let unit = sqlx::query_as::<_, Unit>(
        "UPDATE units SET name = $1 WHERE id = $2 AND caffe_id = $3 RETURNING *",
    )
    .bind(&name)
    .bind(unit.id)
    .bind(ctx.caffe_id())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_UNIT))?;

    log::info!("Unit {} updated", unit.id);
    Ok(unit)
}

// -------------------------------------------------------------------------
// Products
// -------------------------------------------------------------------------

pub async fn list_products(state: &AppState, ctx: &TenantContext) -> Result<Vec<Product>, AppError> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "{} WHERE p.caffe_id = $1 ORDER BY p.name",
        SELECT_PRODUCT
    ))
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(products)
}

/// Products of the given category, for stencil sheets.
pub(crate) async fn products_in_category(
    state: &AppState,
    ctx: &TenantContext,
    category_id: i64,
) -> Result<Vec<Product>, AppError> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "{} WHERE p.caffe_id = $1 AND p.category_id = $2 ORDER BY p.name",
        SELECT_PRODUCT
    ))
    .bind(ctx.caffe_id())
    .bind(category_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(products)
}

async fn find_product(state: &AppState, id: i64) -> Result<Option<Product>, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!("{} WHERE p.id = $1", SELECT_PRODUCT))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(product)
}

pub async fn get_product(state: &AppState, ctx: &TenantContext, id: i64) -> Result<Product, AppError> {
    ctx.claim(find_product(state, id).await?)
}

pub async fn create_product(
    state: &AppState,
    ctx: &TenantContext,
    form: &ProductForm,
) -> Result<Product, AppError> {
    let cleaned = form.clean()?;
    let category = ctx.reference(find_category(state, cleaned.category_id).await?, "category")?;
    let unit = ctx.reference(find_unit(state, cleaned.unit_id).await?, "unit")?;

    let id = sqlx::query("INSERT INTO products (caffe_id, name, category_id, unit_id) VALUES ($1, $2, $3, $4)")
        .bind(ctx.caffe_id())
        .bind(&cleaned.name)
        .bind(category.id)
        .bind(unit.id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_PRODUCT))?
        .last_insert_rowid();

    log::info!("Product {} created in caffe {}", id, ctx.caffe_id());
    get_product(state, ctx, id).await
}

pub async fn update_product(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &ProductForm,
) -> Result<Product, AppError> {
    let product = get_product(state, ctx, id).await?;
    let cleaned = form.clean()?;
    let category = ctx.reference(find_category(state, cleaned.category_id).await?, "category")?;
    let unit = ctx.reference(find_unit(state, cleaned.unit_id).await?, "unit")?;

    sqlx::query(
        "UPDATE products SET name = $1, category_id = $2, unit_id = $3 WHERE id = $4 AND caffe_id = $5",
    )
    .bind(&cleaned.name)
    .bind(category.id)
    .bind(unit.id)
    .bind(product.id)
    .bind(ctx.caffe_id())
    .execute(&state.db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_PRODUCT))?;

    log::info!("Product {} updated", product.id);
    get_product(state, ctx, product.id).await
}

// -------------------------------------------------------------------------
// Reports
// -------------------------------------------------------------------------

async fn find_report(state: &AppState, id: i64) -> Result<Option<Report>, AppError> {
    let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(report)
}

pub async fn get_report(state: &AppState, ctx: &TenantContext, id: i64) -> Result<ReportDetail, AppError> {
    let report = ctx.claim(find_report(state, id).await?)?;
    let full_products = sqlx::query_as::<_, FullProduct>(&format!(
        "{} WHERE fp.report_id = $1 ORDER BY p.name",
        SELECT_FULL_PRODUCT
    ))
    .bind(report.id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(ReportDetail {
        report,
        full_products,
    })
}

pub async fn list_reports(state: &AppState, ctx: &TenantContext) -> Result<Vec<Report>, AppError> {
    let reports = sqlx::query_as::<_, Report>(
        "SELECT * FROM reports WHERE caffe_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(reports)
}

pub async fn reports_on(
    state: &AppState,
    ctx: &TenantContext,
    date: NaiveDate,
) -> Result<Vec<Report>, AppError> {
    let reports = sqlx::query_as::<_, Report>(
        "SELECT * FROM reports WHERE caffe_id = $1 AND date(created_at) = $2
         ORDER BY created_at DESC, id DESC",
    )
    .bind(ctx.caffe_id())
    .bind(date)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(reports)
}

/// Checks that every product a report lists belongs to the café.
pub(crate) async fn check_full_products(
    state: &AppState,
    ctx: &TenantContext,
    entries: &[CleanFullProduct],
) -> Result<(), AppError> {
    for (index, entry) in entries.iter().enumerate() {
        let field = format!("full_products.{}.product", index);
        ctx.reference(find_product(state, entry.product_id).await?, &field)?;
    }
    Ok(())
}

async fn insert_full_products(
    conn: &mut SqliteConnection,
    ctx: &TenantContext,
    report_id: i64,
    entries: &[CleanFullProduct],
) -> Result<(), AppError> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO full_products (caffe_id, report_id, product_id, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(ctx.caffe_id())
        .bind(report_id)
        .bind(entry.product_id)
        .bind(entry.amount.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_insert(e, "full_products", DUPLICATE_FULL_PRODUCT))?;
    }
    Ok(())
}

/// Stores a new report by the acting employee. `entries` must already be
/// checked with [`check_full_products`].
pub(crate) async fn insert_report(
    state: &AppState,
    ctx: &TenantContext,
    entries: &[CleanFullProduct],
) -> Result<ReportDetail, AppError> {
    let now = Utc::now();
    let mut tx = state.db_pool.begin().await?;
    let report = sqlx::query_as::<_, Report>(
        "INSERT INTO reports (caffe_id, creator_id, created_at, updated_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(ctx.employee_id())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    insert_full_products(&mut tx, ctx, report.id, entries).await?;
    tx.commit().await?;

    log::info!(
        "Report {} with {} products created in caffe {}",
        report.id,
        entries.len(),
        ctx.caffe_id()
    );
    get_report(state, ctx, report.id).await
}

pub async fn create_report(
    state: &AppState,
    ctx: &TenantContext,
    form: &ReportForm,
) -> Result<ReportDetail, AppError> {
    let entries = form.clean()?;
    check_full_products(state, ctx, &entries).await?;
    insert_report(state, ctx, &entries).await
}

/// Replaces the report's counted products.
pub async fn update_report(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &ReportForm,
) -> Result<ReportDetail, AppError> {
    let report = ctx.claim(find_report(state, id).await?)?;
    let entries = form.clean()?;
    check_full_products(state, ctx, &entries).await?;

    let mut tx = state.db_pool.begin().await?;
    sqlx::query("UPDATE reports SET updated_at = $1 WHERE id = $2 AND caffe_id = $3")
        .bind(Utc::now())
        .bind(report.id)
        .bind(ctx.caffe_id())
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM full_products WHERE report_id = $1")
        .bind(report.id)
        .execute(&mut *tx)
        .await?;
    insert_full_products(&mut tx, ctx, report.id, &entries).await?;
    tx.commit().await?;

    log::info!("Report {} updated", report.id);
    get_report(state, ctx, report.id).await
}
