//! Authoritative check-and-commit for new bookings, and booking status
//! transitions.
//!
//! Admission re-runs the capacity check for the exact requested window
//! inside the store's (service point, date) critical section, so two
//! concurrent requests for the last free post cannot both commit. Whatever
//! the client saw in an availability view is not trusted.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::errors::{BookingError, BookingResult};
use crate::models::booking::{
    Booking, BookingEvent, BookingEventType, BookingServiceLine, BookingStatus, CarInfo,
    NewBooking, PaymentStatus,
};
use crate::scheduling::availability::Availability;
use crate::scheduling::occupancy::{check_capacity, end_of_day, start_of_day, DayOccupancy};
use crate::store::{BookingStore, CalendarStore, NotificationSink};

/// Where the requested booking sits in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestedWindow {
    Times {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// A cached slot row; only its date and times are used.
    Slot { slot_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedService {
    pub service_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_id: Uuid,
    pub service_point_id: Uuid,
    #[serde(default)]
    pub car: CarInfo,
    pub window: RequestedWindow,
    #[serde(default)]
    pub services: Vec<RequestedService>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct BookingAdmission {
    availability: Availability,
    calendar: Arc<dyn CalendarStore>,
    bookings: Arc<dyn BookingStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingAdmission {
    pub fn new(
        availability: Availability,
        calendar: Arc<dyn CalendarStore>,
        bookings: Arc<dyn BookingStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            availability,
            calendar,
            bookings,
            notifier,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, request: BookingRequest) -> BookingResult<Booking> {
        let span = tracing::info_span!(
            "admit_booking",
            request_id = %ctx.request_id,
            service_point_id = %request.service_point_id,
        );
        self.admit(ctx, request).instrument(span).await
    }

    async fn admit(&self, ctx: &RequestContext, request: BookingRequest) -> BookingResult<Booking> {
        let rules = self.availability.load_rules(request.service_point_id).await?;
        if !rules.point.is_active {
            return Err(BookingError::Validation(format!(
                "Service point {} is not accepting bookings",
                rules.point.id
            )));
        }
        if !request.car.is_identified() {
            return Err(BookingError::Validation(
                "A car, car type or license plate must be given".to_string(),
            ));
        }

        let (date, start, end) = self.requested_window(&request).await?;
        if start >= end {
            return Err(BookingError::Validation(
                "Booking must end after it starts".to_string(),
            ));
        }
        if date.and_time(start) < ctx.now {
            return Err(BookingError::Validation(
                "Cannot book a time in the past".to_string(),
            ));
        }

        let services = self.price_services(request.service_point_id, &request.services).await?;
        let total_price = services.iter().map(BookingServiceLine::total).sum();

        let working = self.availability.working_posts(&rules, date).await?;

        let mut tx = self.bookings.begin_day(request.service_point_id, date).await?;
        let existing = tx
            .bookings_overlapping(start_of_day(), end_of_day(), &BookingStatus::RELEASING)
            .await?;
        let occupancy = DayOccupancy::new(&existing);
        let check = check_capacity(
            &working,
            &occupancy,
            start,
            end,
            self.availability.config().scan_interval_minutes,
        );
        if let Err(err) = check.clone().into_result() {
            info!(%date, %start, %end, verdict = ?check.verdict, "booking rejected");
            return Err(err);
        }

        let booking = tx
            .insert_booking(NewBooking {
                client_id: request.client_id,
                service_point_id: request.service_point_id,
                slot_id: match request.window {
                    RequestedWindow::Slot { slot_id } => Some(slot_id),
                    RequestedWindow::Times { .. } => None,
                },
                car: request.car,
                booking_date: date,
                start_time: start,
                end_time: end,
                status: BookingStatus::Pending,
                payment_status: PaymentStatus::NotPaid,
                services,
                total_price,
                notes: request.notes,
            })
            .await?;
        tx.commit().await?;

        info!(booking_id = %booking.id, %date, %start, %end, total_price, "booking admitted");
        self.notifier.emit(BookingEvent {
            booking_id: booking.id,
            event_type: BookingEventType::Created,
        });
        Ok(booking)
    }

    async fn requested_window(&self, request: &BookingRequest) -> BookingResult<(NaiveDate, NaiveTime, NaiveTime)> {
        match &request.window {
            RequestedWindow::Times { date, start, end } => Ok((*date, *start, *end)),
            RequestedWindow::Slot { slot_id } => {
                let slot = self
                    .calendar
                    .get_slot(*slot_id)
                    .await?
                    .ok_or_else(|| BookingError::NotFound(format!("Slot with ID {} not found", slot_id)))?;
                if slot.service_point_id != request.service_point_id {
                    return Err(BookingError::Validation(format!(
                        "Slot {} belongs to another service point",
                        slot_id
                    )));
                }
                Ok((slot.slot_date, slot.start_time, slot.end_time))
            }
        }
    }

    async fn price_services(
        &self,
        service_point_id: Uuid,
        requested: &[RequestedService],
    ) -> BookingResult<Vec<BookingServiceLine>> {
        if requested.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = requested.iter().find(|s| s.quantity <= 0) {
            return Err(BookingError::Validation(format!(
                "Quantity for service {} must be positive",
                bad.service_id
            )));
        }
        let merged = merge_services(requested)?;
        let ids: Vec<Uuid> = merged.iter().map(|s| s.service_id).collect();
        let prices = self.calendar.service_prices(service_point_id, &ids).await?;

        merged
            .iter()
            .map(|service| {
                let price = prices
                    .iter()
                    .find(|p| p.service_id == service.service_id)
                    .ok_or_else(|| {
                        BookingError::NotFound(format!("Service with ID {} not found", service.service_id))
                    })?;
                Ok(BookingServiceLine {
                    service_id: service.service_id,
                    quantity: service.quantity,
                    price: price.effective(),
                })
            })
            .collect()
    }

    /// Moves a booking to `to` if the transition table allows it.
    pub async fn transition(&self, ctx: &RequestContext, booking_id: Uuid, to: BookingStatus) -> BookingResult<Booking> {
        let span = tracing::info_span!("transition_booking", request_id = %ctx.request_id, %booking_id);
        async {
            let booking = self
                .bookings
                .get_booking(booking_id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

            let from = booking.status;
            from.transition(to)?;
            let updated = self.bookings.update_status(booking_id, from, to).await?;

            info!(%from, %to, "booking status changed");
            if let Some(event_type) = BookingEventType::for_status(to) {
                self.notifier.emit(BookingEvent {
                    booking_id,
                    event_type,
                });
            }
            Ok(updated)
        }
        .instrument(span)
        .await
    }
}

/// One line per service, in first-mention order; repeated services add up
/// their quantities.
fn merge_services(requested: &[RequestedService]) -> BookingResult<Vec<RequestedService>> {
    let mut merged: Vec<RequestedService> = Vec::with_capacity(requested.len());
    for service in requested {
        match merged.iter_mut().find(|m| m.service_id == service.service_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(service.quantity).ok_or_else(|| {
                    BookingError::Validation(format!(
                        "Quantity for service {} is too large",
                        service.service_id
                    ))
                })?;
            }
            None => merged.push(service.clone()),
        }
    }
    Ok(merged)
}
