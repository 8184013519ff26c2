use chrono::NaiveDate;
use clinic_desk::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clinic(gateway: Arc<MemoryGateway>) -> (Arc<RecordingNotifier>, Clinic) {
    let _ = pretty_env_logger::try_init();
    let notifier = Arc::new(RecordingNotifier::new());
    let clinic = Clinic::with_gateway(gateway, TableNames::default())
        .with_notifier(notifier.clone())
        .with_clock(fixed_clock(date(2024, 12, 1)));
    (notifier, clinic)
}

#[tokio::test]
async fn second_christmas_closure_is_refused() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .seed(
            "closure_dates",
            vec![json!({ "date": "2024-12-25", "reason": "Christmas", "is_active": true })],
        )
        .await;
    let (notifier, clinic) = clinic(gateway.clone());
    let closures = clinic.closures(ClosureCalendar::Clinic);
    closures.load().await.unwrap();

    let err = closures
        .add_closure(date(2024, 12, 25), "Holiday")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(closures.len().await, 1);
    assert_eq!(gateway.write_count(), 0);
    assert_eq!(notifier.last().map(|n| n.level), Some(Level::Error));
}

#[tokio::test]
async fn clinic_and_mr_calendars_are_independent() {
    let gateway = Arc::new(MemoryGateway::new());
    let (_, clinic) = clinic(gateway.clone());
    let clinic_days = clinic.closures(ClosureCalendar::Clinic);
    let mr_days = clinic.closures(ClosureCalendar::Mr);

    clinic_days.add_closure(date(2024, 12, 25), "Christmas").await.unwrap();
    mr_days.add_closure(date(2024, 12, 25), "Christmas").await.unwrap();

    assert_eq!(gateway.rows("closure_dates").await.len(), 1);
    assert_eq!(gateway.rows("mr_closure_dates").await.len(), 1);
}

#[tokio::test]
async fn deleted_message_disappears_and_closes_detail_view() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .seed(
            "doctor_messages",
            vec![json!({ "message": "Away until Monday", "active": true })],
        )
        .await;
    let (notifier, clinic) = clinic(gateway);
    let messages = clinic.doctor_messages();
    let id = messages.load().await.unwrap()[0].id;

    messages.view(id).await.unwrap();
    messages.delete(id).await.unwrap();

    assert!(messages.viewing().await.is_none());
    assert!(messages.list().find(id).await.is_none());
    assert_eq!(
        notifier.last(),
        Some(Notification::success("Doctor message deleted"))
    );
}

#[tokio::test]
async fn weekday_toggle_waits_for_save() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .seed(
            "mr_weekdays",
            vec![json!({ "day": "Monday", "is_working": false, "max_appointments": 3 })],
        )
        .await;
    let (_, clinic) = clinic(gateway.clone());
    let board = clinic.mr_weekdays();
    board.load().await.unwrap();

    board.toggle_working(Day::Monday).await;
    assert_eq!(gateway.rows("mr_weekdays").await[0]["is_working"], false);

    board.save(Day::Monday).await.unwrap();
    assert_eq!(gateway.rows("mr_weekdays").await[0]["is_working"], true);
}

#[tokio::test]
async fn booked_request_shows_up_pending_for_staff() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .seed(
            "mr_weekdays",
            vec![json!({ "day": "Monday", "is_working": true, "max_appointments": 1 })],
        )
        .await;
    let (_, clinic) = clinic(gateway);

    // 2024-12-02 is a Monday
    let request = MrAppointmentDraft {
        mr_name: "Kiran".into(),
        company_name: "Acme Pharma".into(),
        division_name: "Cardio".into(),
        contact_no: "98765 43210".into(),
        appointment_date: Some(date(2024, 12, 2)),
    };
    clinic.site().book_mr_appointment(&request).await.unwrap();

    let pending = clinic.mr_appointments_with_status(AppointmentStatus::Pending);
    let rows = pending.load().await.unwrap();
    assert_eq!(rows.len(), 1);

    pending.complete(rows[0].id).await.unwrap();
    assert!(pending.load().await.unwrap().is_empty());

    let all = clinic.mr_appointments();
    let rows = all.load().await.unwrap();
    assert_eq!(rows[0].status, AppointmentStatus::Completed);
    assert!(all.cancel(rows[0].id).await.unwrap_err().is_validation());
}

#[test]
fn memory_preview_works_from_sync_code() {
    let gateway = Arc::new(MemoryGateway::new());
    let (_, clinic) = clinic(gateway);

    let unread = tokio_test::block_on(async {
        let site = clinic.site();
        site.submit_contact(&ContactMessageDraft {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            phone: "98765 43210".into(),
            message: "Do you take walk-ins?".into(),
        })
        .await
        .unwrap();

        let inbox = clinic.contact_inbox();
        inbox.load().await.unwrap();
        inbox.unread_count().await
    });

    assert_eq!(unread, 1);
}
