//! Entities of one café stay invisible to employees of another.

mod common;

use caffe_office::{
    db,
    forms::{
        cash::CompanyForm,
        hours::{PositionForm, WorkedHoursForm},
        reports::{CategoryForm, FullProductForm, ProductForm, ReportForm, UnitForm},
    },
    money::Money,
    AppError,
};
use common::{cash_report_form, dec, employee_form, expense_form, register, test_state};
use rust_decimal::Decimal;

#[tokio::test]
async fn other_tenants_expense_is_not_found() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let expense = db::cash::create_expense(&state, &t1, &expense_form("Milk"))
        .await
        .unwrap();

    let err = db::cash::get_expense(&state, &t2, expense.id).await.unwrap_err();
    assert!(matches!(err, AppError::CrossTenant { .. }));
    assert!(err.is_not_found());

    let err = db::cash::update_expense(&state, &t2, expense.id, &expense_form("Stolen"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let unchanged = db::cash::get_expense(&state, &t1, expense.id).await.unwrap();
    assert_eq!(unchanged.name, "Milk");
}

#[tokio::test]
async fn listings_only_show_own_rows() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    db::cash::create_expense(&state, &t1, &expense_form("Milk")).await.unwrap();
    db::cash::create_expense(&state, &t2, &expense_form("Beans")).await.unwrap();
    db::cash::create_cash_report(&state, &t1, &cash_report_form(10, 10, 0, 0, &[]))
        .await
        .unwrap();

    let names: Vec<String> = db::cash::list_expenses(&state, &t2)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Beans"]);
    assert!(db::cash::list_cash_reports(&state, &t2).await.unwrap().is_empty());
    assert_eq!(db::employees::list_employees(&state, &t2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn foreign_company_cannot_be_attached_to_an_expense() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let company = db::cash::create_company(&state, &t1, &CompanyForm { name: "GoodCake".into() })
        .await
        .unwrap();

    let mut form = expense_form("Cakes");
    form.company = Some(company.id);
    let err = db::cash::create_expense(&state, &t2, &form).await.unwrap_err();
    assert!(err.is_not_found());

    form.company = Some(company.id + 1000);
    let err = db::cash::create_expense(&state, &t2, &form).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("company"));
}

#[tokio::test]
async fn foreign_expense_in_cash_report_is_rejected() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let expense = db::cash::create_expense(&state, &t1, &expense_form("Milk"))
        .await
        .unwrap();
    let form = cash_report_form(100, 100, 0, 0, &[(expense.id, 5)]);

    let err = db::cash::create_cash_report(&state, &t2, &form).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(db::cash::list_cash_reports(&state, &t2).await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_category_and_employee_references_are_rejected() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let category = db::reports::create_category(
        &state,
        &t1,
        &CategoryForm { name: "Cakes".into() },
    )
    .await
    .unwrap();
    let unit = db::reports::create_unit(
        &state,
        &t2,
        &UnitForm { name: "pcs".into() },
    )
    .await
    .unwrap();
    let form = ProductForm {
        name: "Brownie".into(),
        category: Some(category.id),
        unit: Some(unit.id),
    };
    let err = db::reports::create_product(&state, &t2, &form).await.unwrap_err();
    assert!(err.is_not_found());

    let hours = WorkedHoursForm {
        start_time: "08:00".into(),
        end_time: "12:00".into(),
        date: "2024-06-01".into(),
        position: None,
        employee: Some(t1.employee_id()),
    };
    let err = db::hours::create_worked_hours(&state, &t2, &hours).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn employees_of_other_cafes_are_hidden() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let err = db::employees::get_employee(&state, &t2, t1.employee_id())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = db::employees::update_employee(&state, &t2, t1.employee_id(), &employee_form("hijack"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn other_tenants_cash_report_is_not_found() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let milk = db::cash::create_expense(&state, &t1, &expense_form("Milk")).await.unwrap();
    let report = db::cash::create_cash_report(&state, &t1, &cash_report_form(100, 100, 0, 0, &[(milk.id, 6)]))
        .await
        .unwrap();

    let err = db::cash::get_cash_report(&state, &t2, report.report.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = db::cash::update_cash_report(&state, &t2, report.report.id, &cash_report_form(0, 0, 0, 0, &[]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let unchanged = db::cash::get_cash_report(&state, &t1, report.report.id).await.unwrap();
    assert_eq!(unchanged.line_items.len(), 1);
    assert_eq!(unchanged.balance, Money::new(Decimal::from(6)).unwrap());
}

#[tokio::test]
async fn other_tenants_worked_hours_are_not_found() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let form = WorkedHoursForm {
        start_time: "08:00".into(),
        end_time: "12:00".into(),
        date: "2024-06-01".into(),
        position: None,
        employee: None,
    };
    let hours = db::hours::create_worked_hours(&state, &t1, &form).await.unwrap();

    let err = db::hours::get_worked_hours(&state, &t2, hours.id).await.unwrap_err();
    assert!(err.is_not_found());

    let later = WorkedHoursForm {
        start_time: "18:00".into(),
        end_time: "20:00".into(),
        ..form
    };
    let err = db::hours::update_worked_hours(&state, &t2, hours.id, &later)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let unchanged = db::hours::get_worked_hours(&state, &t1, hours.id).await.unwrap();
    assert_eq!(unchanged.start_time.to_string(), "08:00:00");
    assert_eq!(unchanged.employee_id, t1.employee_id());
}

#[tokio::test]
async fn other_tenants_report_and_catalogue_are_not_found() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let category = db::reports::create_category(&state, &t1, &CategoryForm { name: "Cakes".into() })
        .await
        .unwrap();
    let unit = db::reports::create_unit(&state, &t1, &UnitForm { name: "pcs".into() })
        .await
        .unwrap();
    let product_form = ProductForm {
        name: "Brownie".into(),
        category: Some(category.id),
        unit: Some(unit.id),
    };
    let product = db::reports::create_product(&state, &t1, &product_form).await.unwrap();
    let report_form = ReportForm {
        full_products: vec![FullProductForm {
            product: Some(product.id),
            amount: dec(4),
        }],
    };
    let report = db::reports::create_report(&state, &t1, &report_form).await.unwrap();

    let err = db::reports::get_report(&state, &t2, report.report.id).await.unwrap_err();
    assert!(err.is_not_found());
    let err = db::reports::update_report(&state, &t2, report.report.id, &report_form)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = db::reports::get_product(&state, &t2, product.id).await.unwrap_err();
    assert!(err.is_not_found());
    let err = db::reports::update_product(&state, &t2, product.id, &product_form)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let unchanged = db::reports::get_report(&state, &t1, report.report.id).await.unwrap();
    assert_eq!(unchanged.full_products.len(), 1);
    assert_eq!(unchanged.full_products[0].amount.to_string(), "4");
}

#[tokio::test]
async fn other_tenants_company_and_position_are_not_found() {
    let state = test_state().await;
    let t1 = register(&state, "Caffe One").await;
    let t2 = register(&state, "Caffe Two").await;

    let company = db::cash::create_company(&state, &t1, &CompanyForm { name: "GoodCake".into() })
        .await
        .unwrap();
    let position = db::hours::create_position(&state, &t1, &PositionForm { name: "Barista".into() })
        .await
        .unwrap();

    let err = db::cash::get_company(&state, &t2, company.id).await.unwrap_err();
    assert!(err.is_not_found());
    let err = db::cash::update_company(&state, &t2, company.id, &CompanyForm { name: "Mine".into() })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = db::hours::get_position(&state, &t2, position.id).await.unwrap_err();
    assert!(err.is_not_found());
    let err = db::hours::update_position(&state, &t2, position.id, &PositionForm { name: "Mine".into() })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(db::cash::get_company(&state, &t1, company.id).await.unwrap().name, "GoodCake");
    assert_eq!(db::hours::get_position(&state, &t1, position.id).await.unwrap().name, "Barista");
}
