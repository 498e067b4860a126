//! Inventory reports and stencils.

mod common;

use caffe_office::{
    db,
    forms::reports::{
        CategoryForm, FullProductForm, ProductForm, ReportForm, StencilForm, StencilReportForm, UnitForm,
    },
    structs::Product,
    AppError, AppState, TenantContext,
};
use common::{dec, register, test_state};

struct Catalogue {
    cakes: i64,
    tea: i64,
    brownie: Product,
    earl_grey: Product,
}

async fn catalogue(state: &AppState, ctx: &TenantContext) -> Catalogue {
    let cakes = db::reports::create_category(state, ctx, &CategoryForm { name: "Cakes".into() })
        .await
        .unwrap();
    let tea = db::reports::create_category(state, ctx, &CategoryForm { name: "Tea".into() })
        .await
        .unwrap();
    let pcs = db::reports::create_unit(state, ctx, &UnitForm { name: "pcs".into() })
        .await
        .unwrap();
    let brownie = db::reports::create_product(
        state,
        ctx,
        &ProductForm {
            name: "Brownie".into(),
            category: Some(cakes.id),
            unit: Some(pcs.id),
        },
    )
    .await
    .unwrap();
    let earl_grey = db::reports::create_product(
        state,
        ctx,
        &ProductForm {
            name: "Earl Grey".into(),
            category: Some(tea.id),
            unit: Some(pcs.id),
        },
    )
    .await
    .unwrap();

    Catalogue {
        cakes: cakes.id,
        tea: tea.id,
        brownie,
        earl_grey,
    }
}

fn stencil_form(name: &str, categories: Vec<i64>) -> StencilForm {
    StencilForm {
        name: name.into(),
        description: None,
        categories,
    }
}

fn entry(product: i64, amount: i64) -> FullProductForm {
    FullProductForm {
        product: Some(product),
        amount: dec(amount),
    }
}

#[tokio::test]
async fn stencil_names_clash_case_insensitively() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let other = register(&state, "Caffe Two").await;
    let items = catalogue(&state, &ctx).await;
    let other_items = catalogue(&state, &other).await;

    db::stencils::create_stencil(&state, &ctx, &stencil_form("Morning", vec![items.cakes]))
        .await
        .unwrap();
    let err = db::stencils::create_stencil(&state, &ctx, &stencil_form("MORNING", vec![items.tea]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Uniqueness { field: "name", .. }));

    db::stencils::create_stencil(&state, &other, &stencil_form("morning", vec![other_items.tea]))
        .await
        .unwrap();
}

#[tokio::test]
async fn stencil_sheet_lists_products_by_category() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let items = catalogue(&state, &ctx).await;

    let stencil = db::stencils::create_stencil(
        &state,
        &ctx,
        &stencil_form("  Daily  ", vec![items.tea, items.cakes, items.tea]),
    )
    .await
    .unwrap();
    assert_eq!(stencil.stencil.name, "Daily");
    assert_eq!(stencil.categories.len(), 2);

    let sheet = db::stencils::stencil_sheet(&state, &ctx, stencil.stencil.id).await.unwrap();
    let names: Vec<(&str, Vec<&str>)> = sheet
        .sections
        .iter()
        .map(|s| {
            (
                s.category.name.as_str(),
                s.products.iter().map(|p| p.name.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        names,
        vec![("Cakes", vec!["Brownie"]), ("Tea", vec!["Earl Grey"])]
    );
    assert_eq!(sheet.sections[0].products[0].unit_name, "pcs");
}

#[tokio::test]
async fn stencil_report_rejects_products_outside_its_categories() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let items = catalogue(&state, &ctx).await;

    let stencil = db::stencils::create_stencil(&state, &ctx, &stencil_form("Cakes only", vec![items.cakes]))
        .await
        .unwrap();
    let id = stencil.stencil.id;

    let form = StencilReportForm {
        full_products: vec![entry(items.brownie.id, 3), entry(items.earl_grey.id, 1)],
    };
    let err = db::stencils::create_report_from_stencil(&state, &ctx, id, &form)
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("full_products.1.product"));
    assert!(db::reports::list_reports(&state, &ctx).await.unwrap().is_empty());

    let empty = StencilReportForm::default();
    let err = db::stencils::create_report_from_stencil(&state, &ctx, id, &empty)
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("full_products"));

    let form = StencilReportForm {
        full_products: vec![entry(items.brownie.id, 3)],
    };
    let report = db::stencils::create_report_from_stencil(&state, &ctx, id, &form)
        .await
        .unwrap();
    assert_eq!(report.report.creator_id, Some(ctx.employee_id()));
    assert_eq!(report.full_products.len(), 1);
    assert_eq!(report.full_products[0].amount.to_string(), "3");
}

#[tokio::test]
async fn editing_a_report_replaces_its_products() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let items = catalogue(&state, &ctx).await;

    let created = db::reports::create_report(
        &state,
        &ctx,
        &ReportForm {
            full_products: vec![entry(items.brownie.id, 3), entry(items.earl_grey.id, 10)],
        },
    )
    .await
    .unwrap();
    assert_eq!(created.full_products.len(), 2);

    let edited = db::reports::update_report(
        &state,
        &ctx,
        created.report.id,
        &ReportForm {
            full_products: vec![entry(items.earl_grey.id, 7)],
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.full_products.len(), 1);
    assert_eq!(edited.full_products[0].product_name, "Earl Grey");
    assert_eq!(edited.full_products[0].amount.to_string(), "7");
}

#[tokio::test]
async fn other_tenants_stencil_is_hidden() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let other = register(&state, "Caffe Two").await;
    let items = catalogue(&state, &ctx).await;

    let stencil = db::stencils::create_stencil(&state, &ctx, &stencil_form("Morning", vec![items.cakes]))
        .await
        .unwrap();

    let err = db::stencils::stencil_sheet(&state, &other, stencil.stencil.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = db::stencils::create_stencil(&state, &other, &stencil_form("Mine", vec![items.cakes]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
