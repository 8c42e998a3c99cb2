use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening hours for one day of the week, as stored on the point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub is_working_day: bool,
}

/// Day key (`monday`..`sunday`) to opening hours.
pub type WorkingHours = BTreeMap<String, DayHours>;

/// Hours a post with a custom schedule keeps on each of its working days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHours {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePoint {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub city_id: Option<Uuid>,
    pub name: String,
    /// Minutes; used for posts created without their own duration.
    pub default_slot_duration: i32,
    /// Legacy count kept alongside the post rows.
    pub post_count: i32,
    pub is_active: bool,
    #[serde(default)]
    pub working_hours: WorkingHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePost {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub post_number: i32,
    pub name: Option<String>,
    /// Minutes.
    pub slot_duration: i32,
    pub is_active: bool,
    #[serde(default)]
    pub has_custom_schedule: bool,
    #[serde(default)]
    pub working_days: BTreeMap<String, bool>,
    pub custom_hours: Option<CustomHours>,
}

impl ServicePost {
    pub fn works_on(&self, day_key: &str) -> bool {
        self.working_days.get(day_key).copied().unwrap_or(false)
    }
}

/// Price of one service at one point, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePrice {
    pub service_id: Uuid,
    pub base_price: i64,
    /// Point-specific override of `base_price`.
    pub point_price: Option<i64>,
}

impl ServicePrice {
    pub fn effective(&self) -> i64 {
        self.point_price.unwrap_or(self.base_price)
    }
}
