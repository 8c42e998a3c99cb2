//! Point-level availability views composed from resolution, slot
//! generation and occupancy.
//!
//! These views are advisory and read without locking; admission re-checks
//! under the day lock before committing anything.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::occupancy::{check_capacity, DayOccupancy, OccupancyChecker, WindowCheck};
use super::resolver::{working_posts, WorkingPost};
use super::slots::generate;
use crate::config::SchedulingConfig;
use crate::context::RequestContext;
use crate::errors::{BookingError, BookingResult};
use crate::models::{
    schedule::{PointCalendar, ScheduleTemplate},
    service_point::{ServicePoint, ServicePost},
    slot::{ScheduleSlot, Slot},
};
use crate::store::{BookingStore, CalendarStore};
use crate::time::add_minutes;

/// Everything needed to compute one point's availability on one date.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub working: Vec<WorkingPost>,
    pub occupancy: DayOccupancy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedSlot {
    pub slot: Slot,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeAvailability {
    pub time: NaiveTime,
    pub available_posts: usize,
    pub total_posts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_slots: usize,
    pub occupied_slots: usize,
    pub free_slots: usize,
    pub occupancy_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAvailable {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available_posts: usize,
    pub total_posts: usize,
}

impl DaySnapshot {
    pub fn new(date: NaiveDate, working: Vec<WorkingPost>, occupancy: DayOccupancy) -> Self {
        let mut working = working;
        working.sort_by_key(|w| w.post.post_number);
        Self {
            date,
            working,
            occupancy,
        }
    }

    /// Every generated slot, tagged free or occupied, ordered by start then
    /// post number.
    ///
    /// Bookings are not pinned to posts, so overlapping bookings are charged
    /// against posts in post-number order: a slot is occupied when the peak
    /// booking count inside it reaches its post's rank among the posts
    /// working at the slot start.
    pub fn tagged_slots(&self) -> Vec<TaggedSlot> {
        let mut tagged: Vec<TaggedSlot> = self
            .working
            .iter()
            .flat_map(|w| generate(&w.post, self.date, w.window.open, w.window.close))
            .map(|slot| {
                let rank = self
                    .working
                    .iter()
                    .filter(|w| w.window.contains(slot.start))
                    .position(|w| w.post.id == slot.post_id)
                    .map_or(usize::MAX, |p| p + 1);
                let peak = self.occupancy.peak_within(slot.start, slot.end);
                TaggedSlot {
                    is_free: peak < rank,
                    slot,
                }
            })
            .collect();
        tagged.sort_by_key(|t| (t.slot.start, t.slot.post_number));
        tagged
    }

    /// Free slots across all working posts, ordered by start.
    pub fn free_slots(&self) -> Vec<Slot> {
        self.tagged_slots()
            .into_iter()
            .filter(|t| t.is_free)
            .map(|t| t.slot)
            .collect()
    }

    /// Free slots grouped by start time. Only times where at least one post
    /// has a free slot (of at least `min_duration` minutes, if given) appear.
    pub fn times(&self, min_duration: Option<i32>) -> Vec<TimeAvailability> {
        let total_posts = self.working.len();
        let mut by_time: BTreeMap<NaiveTime, usize> = BTreeMap::new();
        for slot in self.free_slots() {
            if min_duration.is_some_and(|min| slot.duration_minutes < min) {
                continue;
            }
            *by_time.entry(slot.start).or_default() += 1;
        }
        by_time
            .into_iter()
            .map(|(time, available_posts)| TimeAvailability {
                time,
                available_posts,
                total_posts,
            })
            .collect()
    }

    pub fn summary(&self) -> DaySummary {
        let tagged = self.tagged_slots();
        let total_slots = tagged.len();
        let occupied_slots = tagged.iter().filter(|t| !t.is_free).count();
        DaySummary {
            date: self.date,
            total_slots,
            occupied_slots,
            free_slots: total_slots - occupied_slots,
            occupancy_percentage: occupancy_percentage(occupied_slots, total_slots),
        }
    }

    pub fn check_window(&self, start: NaiveTime, end: NaiveTime, scan_interval_minutes: u32) -> WindowCheck {
        check_capacity(&self.working, &self.occupancy, start, end, scan_interval_minutes)
    }
}

/// `occupied / total * 100`, rounded to one decimal; zero when there is
/// nothing to occupy.
pub fn occupancy_percentage(occupied: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = occupied as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// A point's date-independent rules, loaded once per query.
#[derive(Debug, Clone)]
pub struct PointRules {
    pub point: ServicePoint,
    pub templates: Vec<ScheduleTemplate>,
    pub posts: Vec<ServicePost>,
}

/// Store-backed availability queries.
#[derive(Clone)]
pub struct Availability {
    calendar: Arc<dyn CalendarStore>,
    occupancy: OccupancyChecker,
    config: SchedulingConfig,
}

impl Availability {
    pub fn new(
        calendar: Arc<dyn CalendarStore>,
        bookings: Arc<dyn BookingStore>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            calendar,
            occupancy: OccupancyChecker::new(bookings),
            config,
        }
    }

    pub fn config(&self) -> SchedulingConfig {
        self.config
    }

    pub fn occupancy(&self) -> &OccupancyChecker {
        &self.occupancy
    }

    pub async fn load_rules(&self, service_point_id: Uuid) -> BookingResult<PointRules> {
        let point = self
            .calendar
            .get_service_point(service_point_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Service point with ID {} not found", service_point_id))
            })?;
        let templates = self.calendar.get_templates(service_point_id).await?;
        let posts = self.calendar.get_active_posts(service_point_id).await?;
        Ok(PointRules {
            point,
            templates,
            posts,
        })
    }

    /// Posts working on `date`. An inactive point has none.
    pub async fn working_posts(&self, rules: &PointRules, date: NaiveDate) -> BookingResult<Vec<WorkingPost>> {
        if !rules.point.is_active {
            debug!(service_point_id = %rules.point.id, "service point inactive, no posts working");
            return Ok(Vec::new());
        }
        let calendar = PointCalendar {
            point: rules.point.clone(),
            templates: rules.templates.clone(),
            exception: self.calendar.get_exception(rules.point.id, date).await?,
        };
        Ok(working_posts(&calendar, &rules.posts, date))
    }

    async fn snapshot_with(&self, rules: &PointRules, date: NaiveDate) -> BookingResult<DaySnapshot> {
        let working = self.working_posts(rules, date).await?;
        let occupancy = if working.is_empty() {
            DayOccupancy::default()
        } else {
            self.occupancy.load_day(rules.point.id, date).await?
        };
        Ok(DaySnapshot::new(date, working, occupancy))
    }

    pub async fn snapshot(&self, service_point_id: Uuid, date: NaiveDate) -> BookingResult<DaySnapshot> {
        let rules = self.load_rules(service_point_id).await?;
        self.snapshot_with(&rules, date).await
    }

    pub async fn available_slots(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Vec<Slot>> {
        let slots = self.snapshot(service_point_id, date).await?.free_slots();
        debug!(request_id = %ctx.request_id, %service_point_id, %date, count = slots.len(), "computed free slots");
        Ok(slots)
    }

    pub async fn available_times(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        date: NaiveDate,
        min_duration: Option<i32>,
    ) -> BookingResult<Vec<TimeAvailability>> {
        let times = self.snapshot(service_point_id, date).await?.times(min_duration);
        debug!(request_id = %ctx.request_id, %service_point_id, %date, count = times.len(), "computed available times");
        Ok(times)
    }

    pub async fn day_summary(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<DaySummary> {
        let summary = self.snapshot(service_point_id, date).await?.summary();
        debug!(request_id = %ctx.request_id, %service_point_id, %date, ?summary, "computed day summary");
        Ok(summary)
    }

    /// Whether a booking of `duration_minutes` starting at `start` would be
    /// admitted right now.
    pub async fn check_window(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        duration_minutes: i32,
    ) -> BookingResult<WindowCheck> {
        let end = window_end(start, duration_minutes)?;
        let check = self
            .snapshot(service_point_id, date)
            .await?
            .check_window(start, end, self.config.scan_interval_minutes);
        debug!(request_id = %ctx.request_id, %service_point_id, %date, %start, %end, verdict = ?check.verdict, "checked window");
        Ok(check)
    }

    /// First free time at or after `from`, searching the rest of that date
    /// and then up to `search_horizon_days` following dates.
    pub async fn next_available(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        from: NaiveDateTime,
        min_duration: Option<i32>,
    ) -> BookingResult<Option<NextAvailable>> {
        let rules = self.load_rules(service_point_id).await?;
        let start_date = from.date();

        let today = self.snapshot_with(&rules, start_date).await?;
        if let Some(found) = today
            .times(min_duration)
            .into_iter()
            .find(|t| t.time >= from.time())
        {
            return Ok(Some(next(start_date, found)));
        }

        for offset in 1..=u64::from(self.config.search_horizon_days) {
            let Some(date) = start_date.checked_add_days(Days::new(offset)) else {
                break;
            };
            let snapshot = self.snapshot_with(&rules, date).await?;
            if let Some(found) = snapshot.times(min_duration).into_iter().next() {
                debug!(request_id = %ctx.request_id, %service_point_id, %date, "found next available time");
                return Ok(Some(next(date, found)));
            }
        }

        debug!(request_id = %ctx.request_id, %service_point_id, horizon = self.config.search_horizon_days, "no availability within horizon");
        Ok(None)
    }

    /// Regenerates the cached slot rows of a point for `date`.
    pub async fn rebuild_slot_cache(
        &self,
        ctx: &RequestContext,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<usize> {
        let rows: Vec<ScheduleSlot> = self
            .snapshot(service_point_id, date)
            .await?
            .tagged_slots()
            .into_iter()
            .map(|t| ScheduleSlot {
                id: Uuid::new_v4(),
                service_point_id,
                service_post_id: t.slot.post_id,
                slot_date: date,
                start_time: t.slot.start,
                end_time: t.slot.end,
                post_number: t.slot.post_number,
                is_available: t.is_free,
            })
            .collect();
        let count = rows.len();
        self.calendar.replace_slots(service_point_id, date, rows).await?;
        info!(request_id = %ctx.request_id, %service_point_id, %date, count, "rebuilt slot cache");
        Ok(count)
    }
}

pub fn window_end(start: NaiveTime, duration_minutes: i32) -> BookingResult<NaiveTime> {
    if duration_minutes <= 0 {
        return Err(BookingError::Validation(
            "duration must be a positive number of minutes".to_string(),
        ));
    }
    add_minutes(start, i64::from(duration_minutes))
        .ok_or_else(|| BookingError::Validation("booking window crosses midnight".to_string()))
}

fn next(date: NaiveDate, found: TimeAvailability) -> NextAvailable {
    NextAvailable {
        date,
        time: found.time,
        available_posts: found.available_posts,
        total_posts: found.total_posts,
    }
}
