//! Stencils: named report templates listing product categories.

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{
    db::reports::{check_full_products, find_category, insert_report, products_in_category, ReportDetail},
    errors::AppError,
    forms::{
        reports::{StencilForm, StencilReportForm},
        Form,
    },
    structs::{Category, Product, Stencil},
    tenant::TenantContext,
    AppState,
};

const DUPLICATE_STENCIL: &str = "Stencil with same name already exists.";
const FOREIGN_PRODUCT: &str = "Product is not part of this stencil.";

#[derive(Debug, Clone, Serialize)]
pub struct StencilDetail {
    pub stencil: Stencil,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetSection {
    pub category: Category,
    pub products: Vec<Product>,
}

/// Everything needed to fill in a stock count from a stencil.
#[derive(Debug, Clone, Serialize)]
pub struct StencilSheet {
    pub stencil: Stencil,
    pub sections: Vec<SheetSection>,
}

pub async fn list_stencils(state: &AppState, ctx: &TenantContext) -> Result<Vec<Stencil>, AppError> {
    let stencils = sqlx::query_as::<_, Stencil>(
        "SELECT * FROM stencils WHERE caffe_id = $1 ORDER BY name COLLATE NOCASE",
    )
    .bind(ctx.caffe_id())
    .fetch_all(&state.db_pool)
    .await?;
    Ok(stencils)
}

async fn find_stencil(state: &AppState, id: i64) -> Result<Option<Stencil>, AppError> {
    let stencil = sqlx::query_as::<_, Stencil>("SELECT * FROM stencils WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(stencil)
}

async fn categories_of(state: &AppState, stencil_id: i64) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT c.* FROM categories c
         JOIN stencil_categories sc ON sc.category_id = c.id
         WHERE sc.stencil_id = $1
         ORDER BY c.name",
    )
    .bind(stencil_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(categories)
}

pub async fn get_stencil(state: &AppState, ctx: &TenantContext, id: i64) -> Result<StencilDetail, AppError> {
    let stencil = ctx.claim(find_stencil(state, id).await?)?;
    let categories = categories_of(state, stencil.id).await?;
    Ok(StencilDetail { stencil, categories })
}

async fn check_categories(
    state: &AppState,
    ctx: &TenantContext,
    category_ids: &[i64],
) -> Result<(), AppError> {
    for id in category_ids {
        ctx.reference(find_category(state, *id).await?, "categories")?;
    }
    Ok(())
}

async fn link_categories(
    conn: &mut SqliteConnection,
    stencil_id: i64,
    category_ids: &[i64],
) -> Result<(), AppError> {
    for id in category_ids {
        sqlx::query("INSERT INTO stencil_categories (stencil_id, category_id) VALUES ($1, $2)")
            .bind(stencil_id)
            .bind(*id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create_stencil(
    state: &AppState,
    ctx: &TenantContext,
    form: &StencilForm,
) -> Result<StencilDetail, AppError> {
    let cleaned = form.clean()?;
    check_categories(state, ctx, &cleaned.category_ids).await?;

    let mut tx = state.db_pool.begin().await?;
    let stencil = sqlx::query_as::<_, Stencil>(
        "INSERT INTO stencils (caffe_id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(ctx.caffe_id())
    .bind(&cleaned.name)
    .bind(&cleaned.description)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_STENCIL))?;
    link_categories(&mut tx, stencil.id, &cleaned.category_ids).await?;
    tx.commit().await?;

    log::info!("Stencil {} created in caffe {}", stencil.id, ctx.caffe_id());
    get_stencil(state, ctx, stencil.id).await
}

pub async fn update_stencil(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &StencilForm,
) -> Result<StencilDetail, AppError> {
    let stencil = ctx.claim(find_stencil(state, id).await?)?;
    let cleaned = form.clean()?;
    check_categories(state, ctx, &cleaned.category_ids).await?;

    let mut tx = state.db_pool.begin().await?;
    sqlx::query("UPDATE stencils SET name = $1, description = $2 WHERE id = $3 AND caffe_id = $4")
        .bind(&cleaned.name)
        .bind(&cleaned.description)
        .bind(stencil.id)
        .bind(ctx.caffe_id())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_insert(e, "name", DUPLICATE_STENCIL))?;
    sqlx::query("DELETE FROM stencil_categories WHERE stencil_id = $1")
        .bind(stencil.id)
        .execute(&mut *tx)
        .await?;
    link_categories(&mut tx, stencil.id, &cleaned.category_ids).await?;
    tx.commit().await?;

    log::info!("Stencil {} updated", stencil.id);
    get_stencil(state, ctx, stencil.id).await
}

/// The stencil's categories, each with its products and their units.
pub async fn stencil_sheet(state: &AppState, ctx: &TenantContext, id: i64) -> Result<StencilSheet, AppError> {
    let StencilDetail { stencil, categories } = get_stencil(state, ctx, id).await?;

    let mut sections = Vec::with_capacity(categories.len());
    for category in categories {
        let products = products_in_category(state, ctx, category.id).await?;
        sections.push(SheetSection { category, products });
    }
    Ok(StencilSheet { stencil, sections })
}

/// Creates one inventory report from a filled-in stencil sheet. Every product
/// must belong to one of the stencil's categories.
pub async fn create_report_from_stencil(
    state: &AppState,
    ctx: &TenantContext,
    id: i64,
    form: &StencilReportForm,
) -> Result<ReportDetail, AppError> {
    let sheet = stencil_sheet(state, ctx, id).await?;
    let entries = form.clean()?;
    check_full_products(state, ctx, &entries).await?;

    let on_sheet = |product_id: i64| {
        sheet
            .sections
            .iter()
            .flat_map(|section| section.products.iter())
            .any(|product| product.id == product_id)
    };
    for (index, entry) in entries.iter().enumerate() {
        if !on_sheet(entry.product_id) {
            return Err(AppError::invalid(
                &format!("full_products.{}.product", index),
                FOREIGN_PRODUCT,
            ));
        }
    }

    let report = insert_report(state, ctx, &entries).await?;
    log::info!("Report {} created from stencil {}", report.report.id, sheet.stencil.id);
    Ok(report)
}
