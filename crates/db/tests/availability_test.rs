mod common;

use chrono::{Days, NaiveDate};
use common::{ctx, t, tuesday, Fixture};
use pretty_assertions::assert_eq;
use tirebook_core::{
    errors::BookingError,
    models::{booking::BookingStatus, schedule::ScheduleException},
    scheduling::{availability::NextAvailable, occupancy::WindowVerdict},
};
use uuid::Uuid;

fn closed_on(fixture: &Fixture, date: NaiveDate) {
    fixture.store.insert_exception(ScheduleException {
        id: Uuid::new_v4(),
        service_point_id: fixture.point.id,
        exception_date: date,
        is_closed: true,
        opening_time: None,
        closing_time: None,
        reason: Some("Inventory".to_string()),
    });
}

async fn book(fixture: &Fixture, date: NaiveDate, start: &str, end: &str) {
    fixture
        .admission()
        .create(&ctx(), fixture.request(date, start, end))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_free_slots_of_an_empty_day() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);

    let slots = fixture
        .availability()
        .available_slots(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();

    let windows: Vec<_> = slots.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(
        windows,
        vec![
            (t("09:00"), t("10:00")),
            (t("10:00"), t("11:00")),
            (t("11:00"), t("12:00"))
        ]
    );
}

#[tokio::test]
async fn test_booked_slot_is_not_offered() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    book(&fixture, tuesday(), "10:00", "11:00").await;
    fixture
        .admission()
        .transition(
            &ctx(),
            fixture.store.bookings_on(fixture.point.id, tuesday())[0].id,
            BookingStatus::Confirmed,
        )
        .await
        .unwrap();

    let slots = fixture
        .availability()
        .available_slots(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();

    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![t("09:00"), t("11:00")]);
}

#[tokio::test]
async fn test_post_with_tuesday_off_contributes_nothing() {
    let mut fixture = Fixture::new(2, "09:00", "12:00", 60);
    fixture.customise_post(2, &[("tuesday", false), ("wednesday", true)], "09:00", "12:00");

    let slots = fixture
        .availability()
        .available_slots(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();

    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|s| s.post_number == 1));

    let wednesday = tuesday() + Days::new(1);
    let slots = fixture
        .availability()
        .available_slots(&ctx(), fixture.point.id, wednesday)
        .await
        .unwrap();
    assert_eq!(slots.len(), 6);
}

#[tokio::test]
async fn test_times_count_free_posts() {
    let fixture = Fixture::new(2, "09:00", "11:00", 60);
    book(&fixture, tuesday(), "09:00", "10:00").await;

    let times = fixture
        .availability()
        .available_times(&ctx(), fixture.point.id, tuesday(), None)
        .await
        .unwrap();

    let counts: Vec<_> = times.iter().map(|t| (t.time, t.available_posts, t.total_posts)).collect();
    assert_eq!(counts, vec![(t("09:00"), 1, 2), (t("10:00"), 2, 2)]);

    let long_only = fixture
        .availability()
        .available_times(&ctx(), fixture.point.id, tuesday(), Some(90))
        .await
        .unwrap();
    assert!(long_only.is_empty());
}

#[tokio::test]
async fn test_day_summary_percentages() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    book(&fixture, tuesday(), "09:00", "10:00").await;

    let summary = fixture
        .availability()
        .day_summary(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();
    assert_eq!(summary.total_slots, 3);
    assert_eq!(summary.occupied_slots, 1);
    assert_eq!(summary.free_slots, 2);
    assert_eq!(summary.occupancy_percentage, 33.3);

    closed_on(&fixture, tuesday());
    let closed = fixture
        .availability()
        .day_summary(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();
    assert_eq!(closed.total_slots, 0);
    assert_eq!(closed.occupancy_percentage, 0.0);
}

#[tokio::test]
async fn test_check_window_reports_counts() {
    let fixture = Fixture::new(2, "09:00", "12:00", 60);
    book(&fixture, tuesday(), "10:00", "11:00").await;
    let availability = fixture.availability();

    let check = availability
        .check_window(&ctx(), fixture.point.id, tuesday(), t("10:15"), 30)
        .await
        .unwrap();
    assert_eq!(check.verdict, WindowVerdict::Available);
    assert_eq!((check.total_posts, check.occupied_posts, check.available_posts), (2, 1, 1));

    let late = availability
        .check_window(&ctx(), fixture.point.id, tuesday(), t("11:30"), 60)
        .await
        .unwrap();
    assert_eq!(late.verdict, WindowVerdict::OutsideWorkingHours);
    assert_eq!(late.reason(), Some("outside working hours"));

    let bad = availability
        .check_window(&ctx(), fixture.point.id, tuesday(), t("10:00"), 0)
        .await
        .unwrap_err();
    assert!(matches!(bad, BookingError::Validation(_)));
}

#[tokio::test]
async fn test_store_backed_occupancy_uses_half_open_intervals() {
    let fixture = Fixture::new(2, "09:00", "12:00", 60);
    book(&fixture, tuesday(), "10:00", "11:00").await;
    let cancelled = fixture
        .admission()
        .create(&ctx(), fixture.request(tuesday(), "09:00", "10:00"))
        .await
        .unwrap();
    fixture
        .admission()
        .transition(&ctx(), cancelled.id, BookingStatus::CanceledByClient)
        .await
        .unwrap();

    let availability = fixture.availability();
    let occupancy = availability.occupancy();
    let point = fixture.point.id;

    assert!(!occupancy.is_occupied(point, tuesday(), t("09:00"), t("10:00")).await.unwrap());
    assert!(occupancy.is_occupied(point, tuesday(), t("09:30"), t("10:01")).await.unwrap());
    assert!(occupancy.is_occupied(point, tuesday(), t("10:59"), t("12:00")).await.unwrap());
    assert!(!occupancy.is_occupied(point, tuesday(), t("11:00"), t("12:00")).await.unwrap());

    assert_eq!(occupancy.occupied_count_at(point, tuesday(), t("09:30")).await.unwrap(), 0);
    assert_eq!(occupancy.occupied_count_at(point, tuesday(), t("10:00")).await.unwrap(), 1);
    assert_eq!(occupancy.occupied_count_at(point, tuesday(), t("10:59")).await.unwrap(), 1);
    assert_eq!(occupancy.occupied_count_at(point, tuesday(), t("11:00")).await.unwrap(), 0);

    let other_day = tuesday().checked_add_days(Days::new(1)).unwrap();
    assert!(!occupancy.is_occupied(point, other_day, t("10:00"), t("11:00")).await.unwrap());
}

#[tokio::test]
async fn test_next_available_later_the_same_day() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    book(&fixture, tuesday(), "11:00", "12:00").await;

    let next = fixture
        .availability()
        .next_available(&ctx(), fixture.point.id, tuesday().and_time(t("09:30")), None)
        .await
        .unwrap();

    assert_eq!(
        next,
        Some(NextAvailable {
            date: tuesday(),
            time: t("10:00"),
            available_posts: 1,
            total_posts: 1,
        })
    );
}

#[tokio::test]
async fn test_next_available_skips_a_fully_booked_day() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    for (start, end) in [("09:00", "10:00"), ("10:00", "11:00"), ("11:00", "12:00")] {
        book(&fixture, tuesday(), start, end).await;
    }

    let next = fixture
        .availability()
        .next_available(&ctx(), fixture.point.id, tuesday().and_time(t("08:00")), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(next.date, tuesday() + Days::new(1));
    assert_eq!(next.time, t("09:00"));
}

#[tokio::test]
async fn test_next_available_gives_up_after_the_horizon() {
    let mut fixture = Fixture::new(1, "09:00", "12:00", 60);
    let mut point = fixture.point.clone();
    for (day, hours) in point.working_hours.iter_mut() {
        hours.is_working_day = day == "tuesday";
    }
    fixture.store.insert_point(point.clone());
    fixture.point = point;

    for (start, end) in [("09:00", "10:00"), ("10:00", "11:00"), ("11:00", "12:00")] {
        book(&fixture, tuesday(), start, end).await;
    }
    // Every later Tuesday inside the horizon is closed too.
    for weeks in 1..=4u64 {
        closed_on(&fixture, tuesday() + Days::new(weeks * 7));
    }

    let next = fixture
        .availability()
        .next_available(&ctx(), fixture.point.id, tuesday().and_time(t("08:00")), None)
        .await
        .unwrap();
    assert_eq!(next, None);
}

#[tokio::test]
async fn test_inactive_point_has_no_availability() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    let mut point = fixture.point.clone();
    point.is_active = false;
    fixture.store.insert_point(point);

    let slots = fixture
        .availability()
        .available_slots(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_unknown_point_is_not_found() {
    let fixture = Fixture::new(1, "09:00", "12:00", 60);
    let err = fixture
        .availability()
        .available_slots(&ctx(), Uuid::new_v4(), tuesday())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_rebuild_slot_cache_replaces_rows() {
    let fixture = Fixture::new(2, "09:00", "11:00", 60);
    book(&fixture, tuesday(), "09:00", "10:00").await;
    let availability = fixture.availability();

    let count = availability
        .rebuild_slot_cache(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();
    assert_eq!(count, 4);

    let rows = fixture.store.slots_on(fixture.point.id, tuesday());
    let flags: Vec<_> = rows.iter().map(|r| (r.start_time, r.post_number, r.is_available)).collect();
    assert_eq!(
        flags,
        vec![
            (t("09:00"), 1, false),
            (t("09:00"), 2, true),
            (t("10:00"), 1, true),
            (t("10:00"), 2, true)
        ]
    );

    // A second rebuild replaces instead of appending.
    availability
        .rebuild_slot_cache(&ctx(), fixture.point.id, tuesday())
        .await
        .unwrap();
    assert_eq!(fixture.store.slots_on(fixture.point.id, tuesday()).len(), 4);
}
