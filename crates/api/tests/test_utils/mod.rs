#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum_test::TestServer;
use chrono::NaiveDate;
use tirebook_api::{app, ApiState};
use tirebook_core::{
    config::SchedulingConfig,
    models::service_point::{DayHours, ServicePoint, ServicePost},
    store::DiscardNotifications,
    time::DAY_KEYS,
};
use tirebook_db::MemoryStore;
use uuid::Uuid;

/// A far-future Tuesday, so admission never sees it as past.
pub fn booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 1, 6).unwrap()
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub point_id: Uuid,
    pub server: TestServer,
}

impl TestContext {
    /// One point open 09:00-12:00 daily with `post_count` one-hour posts.
    pub fn new(post_count: i32) -> Self {
        let store = Arc::new(MemoryStore::new());
        let point = ServicePoint {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            city_id: None,
            name: "Tyre Hub".to_string(),
            default_slot_duration: 60,
            post_count,
            is_active: true,
            working_hours: DAY_KEYS
                .iter()
                .map(|day| {
                    (
                        day.to_string(),
                        DayHours {
                            start: "09:00".to_string(),
                            end: "12:00".to_string(),
                            is_working_day: true,
                        },
                    )
                })
                .collect(),
        };
        let point_id = point.id;
        store.insert_point(point);
        for number in 1..=post_count {
            store.insert_post(ServicePost {
                id: Uuid::new_v4(),
                service_point_id: point_id,
                post_number: number,
                name: None,
                slot_duration: 60,
                is_active: true,
                has_custom_schedule: false,
                working_days: BTreeMap::new(),
                custom_hours: None,
            });
        }

        let state = Arc::new(ApiState::with_store(
            store.clone(),
            Arc::new(DiscardNotifications),
            SchedulingConfig::default(),
        ));
        let server = TestServer::new(app(state)).unwrap();

        Self {
            store,
            point_id,
            server,
        }
    }

    pub fn day_path(&self, view: &str) -> String {
        format!(
            "/api/service_points/{}/availability/{}/{}",
            self.point_id,
            booking_date(),
            view
        )
    }

    pub fn booking_body(&self, start: &str, end: &str) -> serde_json::Value {
        serde_json::json!({
            "client_id": Uuid::new_v4(),
            "service_point_id": self.point_id,
            "car": { "license_plate": "KA0001AA" },
            "window": {
                "kind": "times",
                "date": booking_date(),
                "start": format!("{start}:00"),
                "end": format!("{end}:00"),
            },
            "notes": null,
        })
    }
}
