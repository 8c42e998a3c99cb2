//! How many posts existing bookings hold at a given time.
//!
//! Bookings are not pinned to posts: occupancy is a count of overlapping,
//! non-canceled bookings, compared against the number of posts working at
//! that instant.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use super::resolver::WorkingPost;
use super::slots::scan_instants;
use crate::errors::{BookingError, BookingResult};
use crate::models::booking::{Booking, BookingStatus};
use crate::store::BookingStore;

pub fn start_of_day() -> NaiveTime {
    NaiveTime::MIN
}

pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Active bookings of one point on one date.
#[derive(Debug, Clone, Default)]
pub struct DayOccupancy {
    intervals: Vec<(NaiveTime, NaiveTime)>,
}

impl DayOccupancy {
    pub fn new(bookings: &[Booking]) -> Self {
        let mut intervals: Vec<_> = bookings
            .iter()
            .filter(|b| b.status.occupies())
            .map(|b| (b.start_time, b.end_time))
            .collect();
        intervals.sort();
        Self { intervals }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Any active booking overlaps `[start, end)`.
    pub fn is_occupied(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.intervals.iter().any(|&(s, e)| s < end && e > start)
    }

    /// Bookings active at `instant` (`start <= instant < end`).
    pub fn occupied_count_at(&self, instant: NaiveTime) -> usize {
        self.intervals
            .iter()
            .filter(|&&(s, e)| s <= instant && instant < e)
            .count()
    }

    /// Booking starts strictly inside `(start, end)`.
    fn starts_within(&self, start: NaiveTime, end: NaiveTime) -> impl Iterator<Item = NaiveTime> + '_ {
        self.intervals
            .iter()
            .map(|&(s, _)| s)
            .filter(move |s| start < *s && *s < end)
    }

    /// Largest number of simultaneously active bookings within `[start, end)`.
    pub fn peak_within(&self, start: NaiveTime, end: NaiveTime) -> usize {
        std::iter::once(start)
            .chain(self.starts_within(start, end))
            .map(|instant| self.occupied_count_at(instant))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowVerdict {
    Available,
    NonWorkingDay,
    OutsideWorkingHours,
    Full,
}

/// Capacity verdict for one requested window, reported at its tightest
/// instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowCheck {
    pub verdict: WindowVerdict,
    pub total_posts: usize,
    pub occupied_posts: usize,
    pub available_posts: usize,
}

impl WindowCheck {
    pub fn is_available(&self) -> bool {
        self.verdict == WindowVerdict::Available
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self.verdict {
            WindowVerdict::Available => None,
            WindowVerdict::NonWorkingDay => Some("non-working day"),
            WindowVerdict::OutsideWorkingHours => Some("outside working hours"),
            WindowVerdict::Full => Some("all posts are occupied"),
        }
    }

    pub fn into_result(self) -> BookingResult<()> {
        match self.verdict {
            WindowVerdict::Available => Ok(()),
            WindowVerdict::NonWorkingDay => Err(BookingError::not_working("non-working day")),
            WindowVerdict::OutsideWorkingHours => {
                Err(BookingError::not_working("outside working hours"))
            }
            WindowVerdict::Full => Err(BookingError::CapacityExceeded {
                total: self.total_posts,
                occupied: self.occupied_posts,
                available: self.available_posts,
            }),
        }
    }
}

/// Checks that some post is free at every scanned instant of `[start, end)`.
///
/// The whole window must fit inside at least one post's working hours.
/// Instants are the window start stepped by `scan_interval_minutes`, plus
/// every booking start and every post closing time inside the window so
/// short bookings and early closings between scan points are not missed.
pub fn check_capacity(
    working: &[WorkingPost],
    occupancy: &DayOccupancy,
    start: NaiveTime,
    end: NaiveTime,
    scan_interval_minutes: u32,
) -> WindowCheck {
    if working.is_empty() {
        return WindowCheck {
            verdict: WindowVerdict::NonWorkingDay,
            total_posts: 0,
            occupied_posts: 0,
            available_posts: 0,
        };
    }

    if !working.iter().any(|w| w.window.covers(start, end)) {
        let instant = working
            .iter()
            .map(|w| w.window.close)
            .filter(|close| start <= *close && *close < end)
            .min()
            .unwrap_or(start);
        return WindowCheck {
            verdict: WindowVerdict::OutsideWorkingHours,
            total_posts: 0,
            occupied_posts: occupancy.occupied_count_at(instant),
            available_posts: 0,
        };
    }

    let mut instants = scan_instants(start, end, i64::from(scan_interval_minutes));
    instants.extend(occupancy.starts_within(start, end));
    instants.extend(
        working
            .iter()
            .map(|w| w.window.close)
            .filter(|close| start < *close && *close < end),
    );
    instants.sort();
    instants.dedup();

    let mut tightest: Option<WindowCheck> = None;
    for instant in instants {
        let total = working.iter().filter(|w| w.window.contains(instant)).count();
        if total == 0 {
            return WindowCheck {
                verdict: WindowVerdict::OutsideWorkingHours,
                total_posts: 0,
                occupied_posts: occupancy.occupied_count_at(instant),
                available_posts: 0,
            };
        }
        let occupied = occupancy.occupied_count_at(instant);
        let available = total.saturating_sub(occupied);
        let check = WindowCheck {
            verdict: if available > 0 {
                WindowVerdict::Available
            } else {
                WindowVerdict::Full
            },
            total_posts: total,
            occupied_posts: occupied,
            available_posts: available,
        };
        if tightest
            .as_ref()
            .is_none_or(|t| check.available_posts < t.available_posts)
        {
            tightest = Some(check);
        }
    }

    tightest.unwrap_or(WindowCheck {
        verdict: WindowVerdict::OutsideWorkingHours,
        total_posts: 0,
        occupied_posts: 0,
        available_posts: 0,
    })
}

/// Store-backed occupancy queries for a point and date.
#[derive(Clone)]
pub struct OccupancyChecker {
    bookings: Arc<dyn BookingStore>,
}

impl OccupancyChecker {
    pub fn new(bookings: Arc<dyn BookingStore>) -> Self {
        Self { bookings }
    }

    pub async fn load_day(&self, service_point_id: Uuid, date: NaiveDate) -> BookingResult<DayOccupancy> {
        let bookings = self
            .bookings
            .bookings_overlapping(
                service_point_id,
                date,
                start_of_day(),
                end_of_day(),
                &BookingStatus::RELEASING,
            )
            .await?;
        Ok(DayOccupancy::new(&bookings))
    }

    pub async fn is_occupied(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> BookingResult<bool> {
        let bookings = self
            .bookings
            .bookings_overlapping(service_point_id, date, start, end, &BookingStatus::RELEASING)
            .await?;
        Ok(bookings.iter().any(|b| b.status.occupies() && b.overlaps(start, end)))
    }

    pub async fn occupied_count_at(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        instant: NaiveTime,
    ) -> BookingResult<usize> {
        Ok(self.load_day(service_point_id, date).await?.occupied_count_at(instant))
    }
}
