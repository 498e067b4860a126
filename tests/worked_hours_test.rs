//! Worked hours: overlap rejection, edits and calendar output.

mod common;

use caffe_office::{
    db::{self, hours::CalendarEvent},
    forms::hours::{PositionForm, WorkedHoursForm},
    AppError,
};
use chrono::NaiveDate;
use common::{employee_form, file_state, register, test_state};

fn shift(start: &str, end: &str) -> WorkedHoursForm {
    WorkedHoursForm {
        start_time: start.into(),
        end_time: end.into(),
        date: "2016-03-22".into(),
        position: None,
        employee: None,
    }
}

fn is_overlap(err: &AppError) -> bool {
    err.field_errors()
        .map(|errors| errors.contains("date"))
        .unwrap_or(false)
}

#[tokio::test]
async fn touching_shifts_overlap() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    db::hours::create_worked_hours(&state, &ctx, &shift("12:30", "15:50"))
        .await
        .unwrap();
    let err = db::hours::create_worked_hours(&state, &ctx, &shift("15:50", "16:00"))
        .await
        .unwrap_err();
    assert!(is_overlap(&err));
    assert_eq!(db::hours::list_worked_hours(&state, &ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn separate_shifts_are_accepted() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    db::hours::create_worked_hours(&state, &ctx, &shift("12:30", "15:49"))
        .await
        .unwrap();
    db::hours::create_worked_hours(&state, &ctx, &shift("15:50", "16:00"))
        .await
        .unwrap();

    let mut other_day = shift("12:30", "15:50");
    other_day.date = "23.03.2016".into();
    db::hours::create_worked_hours(&state, &ctx, &other_day).await.unwrap();

    assert_eq!(db::hours::list_worked_hours(&state, &ctx).await.unwrap().len(), 3);
}

#[tokio::test]
async fn other_employees_do_not_collide() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let colleague = db::employees::create_employee(&state, &ctx, &employee_form("colleague"))
        .await
        .unwrap();

    db::hours::create_worked_hours(&state, &ctx, &shift("08:00", "16:00"))
        .await
        .unwrap();
    let mut theirs = shift("08:00", "16:00");
    theirs.employee = Some(colleague.id);
    let hours = db::hours::create_worked_hours(&state, &ctx, &theirs).await.unwrap();
    assert_eq!(hours.employee_id, colleague.id);
}

#[tokio::test]
async fn editing_ignores_the_edited_shift() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    let morning = db::hours::create_worked_hours(&state, &ctx, &shift("08:00", "12:00"))
        .await
        .unwrap();
    db::hours::create_worked_hours(&state, &ctx, &shift("14:00", "18:00"))
        .await
        .unwrap();

    let edited = db::hours::update_worked_hours(&state, &ctx, morning.id, &shift("07:00", "12:30"))
        .await
        .unwrap();
    assert_eq!(edited.start_time.to_string(), "07:00:00");

    let err = db::hours::update_worked_hours(&state, &ctx, morning.id, &shift("07:00", "14:00"))
        .await
        .unwrap_err();
    assert!(is_overlap(&err));
}

#[tokio::test]
async fn reversed_times_are_rejected_on_start_time() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    let err = db::hours::create_worked_hours(&state, &ctx, &shift("16:00", "12:00"))
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("start_time"));
}

#[tokio::test]
async fn reversed_overlapping_shift_reports_both_errors() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;

    db::hours::create_worked_hours(&state, &ctx, &shift("12:00", "14:00"))
        .await
        .unwrap();
    let err = db::hours::create_worked_hours(&state, &ctx, &shift("13:00", "12:30"))
        .await
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.contains("start_time"));
    assert!(errors.contains("date"));
    assert_eq!(db::hours::list_worked_hours(&state, &ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn calendar_event_shape() {
    let state = test_state().await;
    let ctx = register(&state, "Caffe One").await;
    let position = db::hours::create_position(&state, &ctx, &PositionForm { name: "Barista".into() })
        .await
        .unwrap();

    let mut form = shift("12:30", "15:50");
    form.position = Some(position.id);
    let hours = db::hours::create_worked_hours(&state, &ctx, &form).await.unwrap();
    assert_eq!(hours.position_id, Some(position.id));

    let event = serde_json::to_value(CalendarEvent::from(&hours)).unwrap();
    assert_eq!(event["id"], hours.id);
    assert_eq!(event["employee"]["id"], ctx.employee_id());
    assert_eq!(event["employee"]["first_name"], "Ala");
    assert_eq!(event["date"], "2016-03-22");
    assert_eq!(event["start_time"], "12:30:00");
    assert_eq!(event["url"], format!("/hours/{}", hours.id));
    assert_eq!(event["edit_url"], format!("/hours/{}/edit", hours.id));

    let day = NaiveDate::from_ymd_opt(2016, 3, 22).unwrap();
    let summary = db::calendar::day_summary(&state, &ctx, day).await.unwrap();
    assert_eq!(summary.worked_hours.len(), 1);
    assert!(summary.reports.is_empty());
    assert!(summary.cash_reports.is_empty());
}

#[tokio::test]
async fn concurrent_identical_shifts_keep_one() {
    let (state, _dir) = file_state().await;
    let ctx = register(&state, "Caffe One").await;

    let form = shift("08:00", "12:00");
    let (first, second) = tokio::join!(
        db::hours::create_worked_hours(&state, &ctx, &form),
        db::hours::create_worked_hours(&state, &ctx, &form),
    );

    let rejected: Vec<AppError> = [first, second].into_iter().filter_map(Result::err).collect();
    assert_eq!(rejected.len(), 1);
    assert!(is_overlap(&rejected[0]));
    assert_eq!(db::hours::list_worked_hours(&state, &ctx).await.unwrap().len(), 1);
}
