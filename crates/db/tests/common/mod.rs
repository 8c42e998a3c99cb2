#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use tirebook_core::{
    admission::{BookingAdmission, BookingRequest, RequestedWindow},
    config::SchedulingConfig,
    context::RequestContext,
    models::{
        booking::{BookingEvent, CarInfo},
        service_point::{CustomHours, DayHours, ServicePoint, ServicePost},
    },
    scheduling::availability::Availability,
    store::NotificationSink,
    time::DAY_KEYS,
};
use tirebook_db::MemoryStore;
use uuid::Uuid;

pub fn t(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

/// 2024-01-02, a Tuesday.
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

/// A clock well before every test date.
pub fn ctx() -> RequestContext {
    RequestContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap())
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<BookingEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BookingEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, event: BookingEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub point: ServicePoint,
    pub posts: Vec<ServicePost>,
    pub sink: Arc<RecordingSink>,
}

impl Fixture {
    /// A point open `open`-`close` every day with `post_count` posts of
    /// `duration` minutes.
    pub fn new(post_count: i32, open: &str, close: &str, duration: i32) -> Self {
        let store = Arc::new(MemoryStore::new());
        let point = ServicePoint {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            city_id: None,
            name: "Shinomontazh".to_string(),
            default_slot_duration: duration,
            post_count,
            is_active: true,
            working_hours: DAY_KEYS
                .iter()
                .map(|day| {
                    (
                        day.to_string(),
                        DayHours {
                            start: open.to_string(),
                            end: close.to_string(),
                            is_working_day: true,
                        },
                    )
                })
                .collect(),
        };
        store.insert_point(point.clone());

        let posts: Vec<ServicePost> = (1..=post_count)
            .map(|number| ServicePost {
                id: Uuid::new_v4(),
                service_point_id: point.id,
                post_number: number,
                name: None,
                slot_duration: duration,
                is_active: true,
                has_custom_schedule: false,
                working_days: BTreeMap::new(),
                custom_hours: None,
            })
            .collect();
        for post in &posts {
            store.insert_post(post.clone());
        }

        Self {
            store,
            point,
            posts,
            sink: Arc::new(RecordingSink::default()),
        }
    }

    /// Gives post `number` a custom schedule.
    pub fn customise_post(&mut self, number: i32, days: &[(&str, bool)], start: &str, end: &str) {
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.post_number == number)
            .unwrap();
        post.has_custom_schedule = true;
        post.working_days = days.iter().map(|(d, on)| (d.to_string(), *on)).collect();
        post.custom_hours = Some(CustomHours {
            start: start.to_string(),
            end: end.to_string(),
        });
        self.store.insert_post(post.clone());
    }

    pub fn availability(&self) -> Availability {
        Availability::new(self.store.clone(), self.store.clone(), SchedulingConfig::default())
    }

    pub fn admission(&self) -> BookingAdmission {
        BookingAdmission::new(
            self.availability(),
            self.store.clone(),
            self.store.clone(),
            self.sink.clone(),
        )
    }

    pub fn request(&self, date: NaiveDate, start: &str, end: &str) -> BookingRequest {
        BookingRequest {
            client_id: Uuid::new_v4(),
            service_point_id: self.point.id,
            car: CarInfo {
                license_plate: Some("AA1234BB".to_string()),
                ..CarInfo::default()
            },
            window: RequestedWindow::Times {
                date,
                start: t(start),
                end: t(end),
            },
            services: Vec::new(),
            notes: None,
        }
    }
}
