//! Fixtures shared by the scheduling unit tests.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use super::resolver::WorkingWindow;
use crate::models::{
    booking::{Booking, BookingStatus, CarInfo, PaymentStatus},
    schedule::{PointCalendar, ScheduleException, ScheduleTemplate},
    service_point::{CustomHours, DayHours, ServicePoint, ServicePost},
};
use crate::time::{parse_clock, DAY_KEYS};

pub fn t(value: &str) -> NaiveTime {
    parse_clock(value).expect("valid clock time in fixture")
}

pub fn window(open: &str, close: &str) -> WorkingWindow {
    WorkingWindow {
        open: t(open),
        close: t(close),
    }
}

/// 2024-01-02.
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

pub fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
}

pub fn point_with_hours(start: &str, end: &str) -> ServicePoint {
    let working_hours = DAY_KEYS
        .iter()
        .map(|day| {
            (
                day.to_string(),
                DayHours {
                    start: start.to_string(),
                    end: end.to_string(),
                    is_working_day: true,
                },
            )
        })
        .collect();
    ServicePoint {
        id: Uuid::new_v4(),
        partner_id: Uuid::new_v4(),
        city_id: None,
        name: "Test point".to_string(),
        default_slot_duration: 60,
        post_count: 1,
        is_active: true,
        working_hours,
    }
}

pub fn calendar_with_hours(start: &str, end: &str) -> PointCalendar {
    PointCalendar {
        point: point_with_hours(start, end),
        templates: Vec::new(),
        exception: None,
    }
}

pub fn weekly_templates(point_id: Uuid, open: &str, close: &str) -> Vec<ScheduleTemplate> {
    (0..7)
        .map(|weekday| ScheduleTemplate {
            id: Uuid::new_v4(),
            service_point_id: point_id,
            weekday,
            opening_time: t(open),
            closing_time: t(close),
            is_working_day: true,
        })
        .collect()
}

pub fn closed_exception(point_id: Uuid, date: NaiveDate) -> ScheduleException {
    ScheduleException {
        id: Uuid::new_v4(),
        service_point_id: point_id,
        exception_date: date,
        is_closed: true,
        opening_time: None,
        closing_time: None,
        reason: Some("holiday".to_string()),
    }
}

pub fn special_hours_exception(point_id: Uuid, date: NaiveDate, open: &str, close: &str) -> ScheduleException {
    ScheduleException {
        is_closed: false,
        opening_time: Some(t(open)),
        closing_time: Some(t(close)),
        reason: None,
        ..closed_exception(point_id, date)
    }
}

pub fn post(point_id: Uuid, number: i32, duration: i32) -> ServicePost {
    ServicePost {
        id: Uuid::new_v4(),
        service_point_id: point_id,
        post_number: number,
        name: Some(format!("Post {number}")),
        slot_duration: duration,
        is_active: true,
        has_custom_schedule: false,
        working_days: BTreeMap::new(),
        custom_hours: None,
    }
}

pub fn custom_post(point_id: Uuid, number: i32, days: &[(&str, bool)], start: &str, end: &str) -> ServicePost {
    ServicePost {
        has_custom_schedule: true,
        working_days: days.iter().map(|(d, on)| (d.to_string(), *on)).collect(),
        custom_hours: Some(CustomHours {
            start: start.to_string(),
            end: end.to_string(),
        }),
        ..post(point_id, number, 60)
    }
}

pub fn booking(point_id: Uuid, date: NaiveDate, start: &str, end: &str, status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        service_point_id: point_id,
        slot_id: None,
        car: CarInfo::default(),
        booking_date: date,
        start_time: t(start),
        end_time: t(end),
        status,
        payment_status: PaymentStatus::NotPaid,
        services: Vec::new(),
        total_price: 0,
        notes: None,
        created_at: Utc::now(),
    }
}
