//! Effective working window of a post on a date.
//!
//! Precedence: a date exception beats everything (a closed exception closes
//! every post, special hours apply to every post), then the post's custom
//! schedule, then the point's `working_hours`, then the weekday template.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ScheduleConfigError;
use crate::models::{
    schedule::PointCalendar,
    service_point::ServicePost,
};
use crate::time::{day_key, parse_clock, weekday_number};

/// Half-open working window `[open, close)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkingWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl WorkingWindow {
    pub fn contains(&self, instant: NaiveTime) -> bool {
        self.open <= instant && instant < self.close
    }

    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.open <= start && end <= self.close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotWorkingReason {
    /// A date exception closes the whole point.
    PointClosed,
    /// The day is not a working day for this post.
    DayOff,
    /// Stored hours could not be interpreted.
    Misconfigured,
}

impl NotWorkingReason {
    pub fn describe(&self) -> &'static str {
        match self {
            NotWorkingReason::PointClosed => "service point closed on this date",
            NotWorkingReason::DayOff => "non-working day",
            NotWorkingReason::Misconfigured => "non-working day",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostDay {
    Working(WorkingWindow),
    NotWorking(NotWorkingReason),
}

impl PostDay {
    pub fn is_working(&self) -> bool {
        matches!(self, PostDay::Working(_))
    }

    pub fn window(&self) -> Option<WorkingWindow> {
        match self {
            PostDay::Working(window) => Some(*window),
            PostDay::NotWorking(_) => None,
        }
    }
}

/// A post together with its resolved window for the day.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingPost {
    pub post: ServicePost,
    pub window: WorkingWindow,
}

pub fn resolve(
    calendar: &PointCalendar,
    post: &ServicePost,
    date: NaiveDate,
) -> Result<PostDay, ScheduleConfigError> {
    if let Some(exception) = calendar
        .exception
        .as_ref()
        .filter(|e| e.exception_date == date)
    {
        if exception.is_closed {
            return Ok(PostDay::NotWorking(NotWorkingReason::PointClosed));
        }
        let open = exception.opening_time.ok_or(ScheduleConfigError::MissingHours {
            post_id: post.id,
            date,
            what: "exception opening time",
        })?;
        let close = exception.closing_time.ok_or(ScheduleConfigError::MissingHours {
            post_id: post.id,
            date,
            what: "exception closing time",
        })?;
        return working(post, date, open, close);
    }

    let key = day_key(date);

    if post.has_custom_schedule {
        if !post.works_on(key) {
            return Ok(PostDay::NotWorking(NotWorkingReason::DayOff));
        }
        let hours = post
            .custom_hours
            .as_ref()
            .ok_or(ScheduleConfigError::MissingHours {
                post_id: post.id,
                date,
                what: "custom hours",
            })?;
        let open = clock(post, date, &hours.start)?;
        let close = clock(post, date, &hours.end)?;
        return working(post, date, open, close);
    }

    if let Some(hours) = calendar.point.working_hours.get(key) {
        if !hours.is_working_day {
            return Ok(PostDay::NotWorking(NotWorkingReason::DayOff));
        }
        let open = clock(post, date, &hours.start)?;
        let close = clock(post, date, &hours.end)?;
        return working(post, date, open, close);
    }

    match calendar.template_for(weekday_number(date)) {
        Some(template) if template.is_working_day => {
            working(post, date, template.opening_time, template.closing_time)
        }
        _ => Ok(PostDay::NotWorking(NotWorkingReason::DayOff)),
    }
}

/// Like [`resolve`], but a configuration fault makes the post non-working
/// for the date instead of failing.
pub fn resolve_or_closed(calendar: &PointCalendar, post: &ServicePost, date: NaiveDate) -> PostDay {
    match resolve(calendar, post, date) {
        Ok(day) => {
            debug!(post_id = %post.id, %date, ?day, "resolved post schedule");
            day
        }
        Err(err) => {
            warn!(post_id = %post.id, %date, error = %err, "schedule misconfigured, treating post as non-working");
            PostDay::NotWorking(NotWorkingReason::Misconfigured)
        }
    }
}

/// Active posts that work on `date`, in input order.
pub fn working_posts(
    calendar: &PointCalendar,
    posts: &[ServicePost],
    date: NaiveDate,
) -> Vec<WorkingPost> {
    posts
        .iter()
        .filter(|post| post.is_active)
        .filter_map(|post| {
            resolve_or_closed(calendar, post, date)
                .window()
                .map(|window| WorkingPost {
                    post: post.clone(),
                    window,
                })
        })
        .collect()
}

fn clock(post: &ServicePost, date: NaiveDate, value: &str) -> Result<NaiveTime, ScheduleConfigError> {
    parse_clock(value).ok_or_else(|| ScheduleConfigError::MalformedTime {
        post_id: post.id,
        date,
        value: value.to_string(),
    })
}

fn working(
    post: &ServicePost,
    date: NaiveDate,
    open: NaiveTime,
    close: NaiveTime,
) -> Result<PostDay, ScheduleConfigError> {
    if post.slot_duration <= 0 {
        return Err(ScheduleConfigError::InvalidSlotDuration {
            post_id: post.id,
            minutes: post.slot_duration,
        });
    }
    if open >= close {
        return Err(ScheduleConfigError::EmptyWindow {
            post_id: post.id,
            date,
            open,
            close,
        });
    }
    Ok(PostDay::Working(WorkingWindow { open, close }))
}
