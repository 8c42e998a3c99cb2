use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-wide default hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub id: Uuid,
    pub service_point_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: i16,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub is_working_day: bool,
}

/// Date-specific override of a point's hours: a closure or special hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub exception_date: NaiveDate,
    pub is_closed: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

/// The calendar rules of one point as seen on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCalendar {
    pub point: super::service_point::ServicePoint,
    pub templates: Vec<ScheduleTemplate>,
    pub exception: Option<ScheduleException>,
}

impl PointCalendar {
    pub fn template_for(&self, weekday: i16) -> Option<&ScheduleTemplate> {
        self.templates.iter().find(|t| t.weekday == weekday)
    }
}
