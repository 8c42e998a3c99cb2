//! In-process store implementing the core ports.
//!
//! Backs tests and local runs without PostgreSQL. Admission on one
//! (point, date) is serialised by a per-key async mutex; other keys proceed
//! in parallel. A key's mutex is removed again once its last holder is done.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tirebook_core::{
    errors::{BookingError, BookingResult},
    models::{
        booking::{Booking, BookingStatus, NewBooking},
        schedule::{ScheduleException, ScheduleTemplate},
        service_point::{ServicePoint, ServicePost, ServicePrice},
        slot::ScheduleSlot,
    },
    store::{BookingStore, CalendarStore, DayTransaction},
};
use uuid::Uuid;

type DayKey = (Uuid, NaiveDate);

#[derive(Default)]
pub struct MemoryStore {
    points: DashMap<Uuid, ServicePoint>,
    templates: DashMap<Uuid, Vec<ScheduleTemplate>>,
    exceptions: DashMap<DayKey, ScheduleException>,
    posts: DashMap<Uuid, Vec<ServicePost>>,
    slots: DashMap<Uuid, ScheduleSlot>,
    base_prices: DashMap<Uuid, i64>,
    point_prices: DashMap<(Uuid, Uuid), i64>,
    bookings: Arc<DashMap<Uuid, Booking>>,
    day_locks: Arc<DashMap<DayKey, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_point(&self, point: ServicePoint) {
        self.points.insert(point.id, point);
    }

    pub fn set_templates(&self, service_point_id: Uuid, templates: Vec<ScheduleTemplate>) {
        self.templates.insert(service_point_id, templates);
    }

    pub fn insert_exception(&self, exception: ScheduleException) {
        self.exceptions
            .insert((exception.service_point_id, exception.exception_date), exception);
    }

    /// Adds or replaces a post, keeping the point's posts ordered by number.
    pub fn insert_post(&self, post: ServicePost) {
        let mut posts = self.posts.entry(post.service_point_id).or_default();
        posts.retain(|p| p.id != post.id);
        posts.push(post);
        posts.sort_by_key(|p| p.post_number);
    }

    pub fn insert_slot(&self, slot: ScheduleSlot) {
        self.slots.insert(slot.id, slot);
    }

    pub fn set_service_price(&self, service_id: Uuid, base_price: i64) {
        self.base_prices.insert(service_id, base_price);
    }

    pub fn set_point_price(&self, service_point_id: Uuid, service_id: Uuid, price: i64) {
        self.point_prices.insert((service_point_id, service_id), price);
    }

    /// Stores a booking as-is, bypassing admission.
    pub fn insert_booking_unchecked(&self, booking: Booking) {
        self.bookings.insert(booking.id, booking);
    }

    pub fn bookings_on(&self, service_point_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        let mut found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.service_point_id == service_point_id && b.booking_date == date)
            .map(|b| b.value().clone())
            .collect();
        found.sort_by_key(|b| (b.start_time, b.created_at));
        found
    }

    pub fn slots_on(&self, service_point_id: Uuid, date: NaiveDate) -> Vec<ScheduleSlot> {
        let mut found: Vec<ScheduleSlot> = self
            .slots
            .iter()
            .filter(|s| s.service_point_id == service_point_id && s.slot_date == date)
            .map(|s| s.value().clone())
            .collect();
        found.sort_by_key(|s| (s.start_time, s.post_number));
        found
    }

    fn day_lock(&self, key: DayKey) -> Arc<Mutex<()>> {
        self.day_locks.entry(key).or_default().clone()
    }
}

fn overlapping(
    bookings: &DashMap<Uuid, Booking>,
    key: DayKey,
    start: NaiveTime,
    end: NaiveTime,
    excluding: &[BookingStatus],
) -> Vec<Booking> {
    let mut found: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.service_point_id == key.0 && b.booking_date == key.1)
        .filter(|b| !excluding.contains(&b.status) && b.overlaps(start, end))
        .map(|b| b.value().clone())
        .collect();
    found.sort_by_key(|b| b.start_time);
    found
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn get_service_point(&self, id: Uuid) -> BookingResult<Option<ServicePoint>> {
        Ok(self.points.get(&id).map(|p| p.value().clone()))
    }

    async fn get_templates(&self, service_point_id: Uuid) -> BookingResult<Vec<ScheduleTemplate>> {
        Ok(self
            .templates
            .get(&service_point_id)
            .map(|t| t.value().clone())
            .unwrap_or_default())
    }

    async fn get_exception(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Option<ScheduleException>> {
        Ok(self
            .exceptions
            .get(&(service_point_id, date))
            .map(|e| e.value().clone()))
    }

    async fn get_active_posts(&self, service_point_id: Uuid) -> BookingResult<Vec<ServicePost>> {
        Ok(self
            .posts
            .get(&service_point_id)
            .map(|posts| posts.iter().filter(|p| p.is_active).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_slot(&self, slot_id: Uuid) -> BookingResult<Option<ScheduleSlot>> {
        Ok(self.slots.get(&slot_id).map(|s| s.value().clone()))
    }

    async fn replace_slots(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        slots: Vec<ScheduleSlot>,
    ) -> BookingResult<()> {
        self.slots
            .retain(|_, s| !(s.service_point_id == service_point_id && s.slot_date == date));
        for slot in slots {
            self.slots.insert(slot.id, slot);
        }
        Ok(())
    }

    async fn service_prices(
        &self,
        service_point_id: Uuid,
        service_ids: &[Uuid],
    ) -> BookingResult<Vec<ServicePrice>> {
        Ok(service_ids
            .iter()
            .filter_map(|id| {
                self.base_prices.get(id).map(|base| ServicePrice {
                    service_id: *id,
                    base_price: *base,
                    point_price: self.point_prices.get(&(service_point_id, *id)).map(|p| *p),
                })
            })
            .collect())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn bookings_overlapping(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>> {
        Ok(overlapping(&self.bookings, (service_point_id, date), start, end, excluding))
    }

    async fn get_booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.value().clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> BookingResult<Booking> {
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", id)))?;
        if booking.status != from {
            return Err(BookingError::Conflict(format!(
                "Booking {} is now {}, expected {}",
                id, booking.status, from
            )));
        }
        booking.status = to;
        Ok(booking.clone())
    }

    async fn begin_day(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Box<dyn DayTransaction>> {
        let key = (service_point_id, date);
        let guard = self.day_lock(key).lock_owned().await;
        Ok(Box::new(MemoryDayTransaction {
            _guard: guard,
            key,
            bookings: Arc::clone(&self.bookings),
            locks: Arc::clone(&self.day_locks),
            pending: Vec::new(),
        }))
    }
}

pub struct MemoryDayTransaction {
    _guard: OwnedMutexGuard<()>,
    key: DayKey,
    bookings: Arc<DashMap<Uuid, Booking>>,
    locks: Arc<DashMap<DayKey, Arc<Mutex<()>>>>,
    pending: Vec<Booking>,
}

impl Drop for MemoryDayTransaction {
    fn drop(&mut self) {
        // The map and our guard hold one reference each; any more belong to waiters.
        self.locks.remove_if(&self.key, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

#[async_trait]
impl DayTransaction for MemoryDayTransaction {
    async fn bookings_overlapping(
        &mut self,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>> {
        let mut found = overlapping(&self.bookings, self.key, start, end, excluding);
        found.extend(
            self.pending
                .iter()
                .filter(|b| !excluding.contains(&b.status) && b.overlaps(start, end))
                .cloned(),
        );
        Ok(found)
    }

    async fn insert_booking(&mut self, new: NewBooking) -> BookingResult<Booking> {
        if (new.service_point_id, new.booking_date) != self.key {
            return Err(BookingError::Validation(
                "Booking does not belong to the locked service point and date".to_string(),
            ));
        }
        let booking = Booking {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            service_point_id: new.service_point_id,
            slot_id: new.slot_id,
            car: new.car,
            booking_date: new.booking_date,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
            payment_status: new.payment_status,
            services: new.services,
            total_price: new.total_price,
            notes: new.notes,
            created_at: Utc::now(),
        };
        self.pending.push(booking.clone());
        Ok(booking)
    }

    async fn commit(mut self: Box<Self>) -> BookingResult<()> {
        for booking in std::mem::take(&mut self.pending) {
            self.bookings.insert(booking.id, booking);
        }
        Ok(())
    }
}
