//! Cash reports: balances, line-item replacement and café deletion.

mod common;

use caffe_office::{balance::Reconciliation, db, money::Money};
use common::{cash_report_form, expense_form, register, test_state};
use rust_decimal::Decimal;

#[tokio::test]
async fn balance_of_stored_report() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();
    let cakes = db::cash::create_expense(&state, &ctx, &expense_form("Cakes")).await.unwrap();

    let form = cash_report_form(2000, 3000, 500, 1900, &[(milk.id, 50), (cakes.id, 500)]);
    let detail = db::cash::create_cash_report(&state, &ctx, &form).await.unwrap();

    assert_eq!(detail.line_items.len(), 2);
    assert_eq!(detail.report.creator_id, ctx.employee_id());
    assert_eq!(detail.expenses_total, Money::new(Decimal::from(550)).unwrap());
    assert_eq!(detail.balance, Money::new(Decimal::from(150)).unwrap());
    assert_eq!(
        detail.reconciliation,
        Reconciliation::Surplus(Money::new(Decimal::from(150)).unwrap())
    );
}

#[tokio::test]
async fn report_without_line_items() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    let form = cash_report_form(1000, 1200, 123, 100, &[]);
    let detail = db::cash::create_cash_report(&state, &ctx, &form).await.unwrap();

    assert!(detail.line_items.is_empty());
    assert_eq!(detail.balance, Money::new(Decimal::from(223)).unwrap());
}

#[tokio::test]
async fn fractional_amounts_are_exact() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();

    let mut form = cash_report_form(0, 0, 0, 0, &[(milk.id, 0)]);
    form.cash_after_shift = Some(Decimal::new(30, 2));
    form.expenses[0].amount = Some(Decimal::new(10, 2));
    form.amount_due = Some(Decimal::new(40, 2));

    let detail = db::cash::create_cash_report(&state, &ctx, &form).await.unwrap();
    assert!(detail.balance.is_zero());
    assert_eq!(detail.reconciliation, Reconciliation::Balanced);
}

#[tokio::test]
async fn editing_replaces_line_items() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();
    let cakes = db::cash::create_expense(&state, &ctx, &expense_form("Cakes")).await.unwrap();

    let created = db::cash::create_cash_report(
        &state,
        &ctx,
        &cash_report_form(100, 100, 0, 0, &[(milk.id, 10), (cakes.id, 20)]),
    )
    .await
    .unwrap();

    let edited = db::cash::update_cash_report(
        &state,
        &ctx,
        created.report.id,
        &cash_report_form(100, 90, 0, 0, &[(cakes.id, 5)]),
    )
    .await
    .unwrap();

    assert_eq!(edited.report.id, created.report.id);
    assert_eq!(edited.report.created_at, created.report.created_at);
    assert_eq!(edited.line_items.len(), 1);
    assert_eq!(edited.line_items[0].expense_id, cakes.id);
    assert_eq!(edited.balance, Money::new(Decimal::from(-5)).unwrap());
    assert_eq!(
        edited.reconciliation,
        Reconciliation::Deficit(Money::new(Decimal::from(5)).unwrap())
    );
}

#[tokio::test]
async fn invalid_report_stores_nothing() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();

    let duplicate = cash_report_form(100, 100, 0, 0, &[(milk.id, 10), (milk.id, 20)]);
    let err = db::cash::create_cash_report(&state, &ctx, &duplicate).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("expenses"));

    let negative = cash_report_form(-1, 100, 0, 0, &[]);
    let err = db::cash::create_cash_report(&state, &ctx, &negative).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("cash_before_shift"));

    assert!(db::cash::list_cash_reports(&state, &ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_caffe_removes_its_reports() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();
    db::cash::create_cash_report(&state, &ctx, &cash_report_form(1, 1, 0, 0, &[(milk.id, 1)]))
        .await
        .unwrap();

    db::caffes::delete_caffe(&state, ctx.caffe_id()).await.unwrap();

    let (line_items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM line_items")
        .fetch_one(&state.db_pool)
        .await
        .unwrap();
    let (reports,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cash_reports")
        .fetch_one(&state.db_pool)
        .await
        .unwrap();
    assert_eq!(line_items, 0);
    assert_eq!(reports, 0);

    let err = db::caffes::delete_caffe(&state, ctx.caffe_id()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn latest_reports_come_first() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    for amount in [1, 2, 3] {
        db::cash::create_cash_report(&state, &ctx, &cash_report_form(amount, amount, 0, 0, &[]))
            .await
            .unwrap();
    }

    let latest = db::cash::latest_cash_reports(&state, &ctx, 2).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(
        latest[0].report.cash_before_shift,
        Money::new(Decimal::from(3)).unwrap()
    );
}

#[tokio::test]
async fn latest_reports_carry_only_their_own_items() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let milk = db::cash::create_expense(&state, &ctx, &expense_form("Milk")).await.unwrap();
    let cakes = db::cash::create_expense(&state, &ctx, &expense_form("Cakes")).await.unwrap();

    let older = db::cash::create_cash_report(
        &state,
        &ctx,
        &cash_report_form(100, 100, 0, 0, &[(milk.id, 10), (cakes.id, 20)]),
    )
    .await
    .unwrap();
    let newer = db::cash::create_cash_report(&state, &ctx, &cash_report_form(100, 95, 0, 0, &[(cakes.id, 5)]))
        .await
        .unwrap();

    let latest = db::cash::latest_cash_reports(&state, &ctx, 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].report.id, newer.report.id);
    let names: Vec<&str> = latest[0]
        .line_items
        .iter()
        .map(|item| item.expense_name.as_str())
        .collect();
    assert_eq!(names, vec!["Cakes"]);
    assert!(latest[0].balance.is_zero());

    let all = db::cash::list_cash_reports(&state, &ctx).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].report.id, older.report.id);
    assert_eq!(all[1].line_items.len(), 2);
}
