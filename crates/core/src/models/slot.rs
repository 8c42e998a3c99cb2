use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate booking interval `[start, end)` on one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub post_id: Uuid,
    pub post_number: i32,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration_minutes: i32,
}

/// Materialised slot row. A cache of the dynamic computation, never
/// consulted for availability decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub service_post_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub post_number: i32,
    pub is_available: bool,
}
