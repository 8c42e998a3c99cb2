//! Ports onto the durable store and the notification collaborator.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::{
    booking::{Booking, BookingEvent, BookingStatus, NewBooking},
    schedule::{ScheduleException, ScheduleTemplate},
    service_point::{ServicePoint, ServicePost, ServicePrice},
    slot::ScheduleSlot,
};

/// Weekly templates, date exceptions and post configuration.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn get_service_point(&self, id: Uuid) -> BookingResult<Option<ServicePoint>>;

    async fn get_templates(&self, service_point_id: Uuid) -> BookingResult<Vec<ScheduleTemplate>>;

    async fn get_exception(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Option<ScheduleException>>;

    /// Active posts ordered by post number.
    async fn get_active_posts(&self, service_point_id: Uuid) -> BookingResult<Vec<ServicePost>>;

    async fn get_slot(&self, slot_id: Uuid) -> BookingResult<Option<ScheduleSlot>>;

    /// Replaces the cached slot rows of a point for one date.
    async fn replace_slots(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        slots: Vec<ScheduleSlot>,
    ) -> BookingResult<()>;

    /// Prices for the given services at a point. Unknown services are omitted.
    async fn service_prices(
        &self,
        service_point_id: Uuid,
        service_ids: &[Uuid],
    ) -> BookingResult<Vec<ServicePrice>>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings of a point on a date overlapping `[start, end)`, skipping
    /// those whose status is in `excluding`.
    async fn bookings_overlapping(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>>;

    async fn get_booking(&self, id: Uuid) -> BookingResult<Option<Booking>>;

    /// Sets the status if it is still `from`; otherwise `Conflict`.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> BookingResult<Booking>;

    /// Opens the admission critical section for `(service_point_id, date)`.
    async fn begin_day(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Box<dyn DayTransaction>>;
}

/// Exclusive, all-or-nothing access to one point's bookings on one date.
///
/// Dropping the transaction without `commit` discards every write.
#[async_trait]
pub trait DayTransaction: Send {
    async fn bookings_overlapping(
        &mut self,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>>;

    async fn insert_booking(&mut self, booking: NewBooking) -> BookingResult<Booking>;

    async fn commit(self: Box<Self>) -> BookingResult<()>;
}

/// Fire-and-forget sink for booking lifecycle facts.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: BookingEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardNotifications;

impl NotificationSink for DiscardNotifications {
    fn emit(&self, event: BookingEvent) {
        tracing::trace!(booking_id = %event.booking_id, event = ?event.event_type, "notification discarded");
    }
}
