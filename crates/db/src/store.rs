//! PostgreSQL implementation of the core store ports.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Postgres, Transaction};
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

use crate::models::DbScheduleSlot;
use crate::repositories::{booking, schedule, service_point, slot};
use crate::DbPool;

/// SQLSTATE codes that mean a concurrent writer won.
const CONFLICT_CODES: [&str; 4] = ["23505", "23P01", "40001", "40P01"];

/// Whether a storage error reports a lost race rather than a fault.
pub fn is_conflict(err: &eyre::Report) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db
            .code()
            .is_some_and(|code| CONFLICT_CODES.contains(&code.as_ref())),
        _ => false,
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CalendarStore for PgStore {
    async fn get_service_point(&self, id: Uuid) -> BookingResult<Option<ServicePoint>> {
        Ok(service_point::get_service_point_by_id(&self.pool, id)
            .await?
            .map(Into::into))
    }

    async fn get_templates(&self, service_point_id: Uuid) -> BookingResult<Vec<ScheduleTemplate>> {
        Ok(schedule::get_templates_by_service_point(&self.pool, service_point_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_exception(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Option<ScheduleException>> {
        Ok(schedule::get_exception_for_date(&self.pool, service_point_id, date)
            .await?
            .map(Into::into))
    }

    async fn get_active_posts(&self, service_point_id: Uuid) -> BookingResult<Vec<ServicePost>> {
        Ok(service_point::get_active_posts(&self.pool, service_point_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_slot(&self, slot_id: Uuid) -> BookingResult<Option<ScheduleSlot>> {
        Ok(slot::get_slot_by_id(&self.pool, slot_id).await?.map(Into::into))
    }

    async fn replace_slots(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        slots: Vec<ScheduleSlot>,
    ) -> BookingResult<()> {
        let rows: Vec<DbScheduleSlot> = slots
            .into_iter()
            .map(|s| DbScheduleSlot {
                id: s.id,
                service_point_id: s.service_point_id,
                service_post_id: s.service_post_id,
                slot_date: s.slot_date,
                start_time: s.start_time,
                end_time: s.end_time,
                post_number: s.post_number,
                is_available: s.is_available,
            })
            .collect();
        slot::replace_slots_for_date(&self.pool, service_point_id, date, &rows).await?;
        Ok(())
    }

    async fn service_prices(
        &self,
        service_point_id: Uuid,
        service_ids: &[Uuid],
    ) -> BookingResult<Vec<ServicePrice>> {
        Ok(service_point::get_service_prices(&self.pool, service_point_id, service_ids)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn bookings_overlapping(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>> {
        let mut conn = self.pool.acquire().await.map_err(eyre::Report::from)?;
        Ok(booking::get_bookings_overlapping(&mut conn, service_point_id, date, start, end, excluding).await?)
    }

    async fn get_booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await.map_err(eyre::Report::from)?;
        Ok(booking::get_booking_by_id(&mut conn, id).await?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> BookingResult<Booking> {
        let mut conn = self.pool.acquire().await.map_err(eyre::Report::from)?;
        match booking::update_booking_status(&mut conn, id, from, to).await? {
            Some(updated) => Ok(updated),
            None => match booking::get_booking_by_id(&mut conn, id).await? {
                Some(current) => Err(BookingError::Conflict(format!(
                    "Booking {} is now {}, expected {}",
                    id, current.status, from
                ))),
                None => Err(BookingError::NotFound(format!("Booking with ID {} not found", id))),
            },
        }
    }

    async fn begin_day(
        &self,
        service_point_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Box<dyn DayTransaction>> {
        let mut tx = self.pool.begin().await.map_err(eyre::Report::from)?;
        booking::lock_booking_day(&mut tx, service_point_id, date).await?;
        Ok(Box::new(PgDayTransaction {
            tx,
            service_point_id,
            date,
        }))
    }
}

/// Transaction holding the advisory lock for one point and date.
pub struct PgDayTransaction {
    tx: Transaction<'static, Postgres>,
    service_point_id: Uuid,
    date: NaiveDate,
}

#[async_trait]
impl DayTransaction for PgDayTransaction {
    async fn bookings_overlapping(
        &mut self,
        start: NaiveTime,
        end: NaiveTime,
        excluding: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>> {
        Ok(booking::get_bookings_overlapping(
            &mut self.tx,
            self.service_point_id,
            self.date,
            start,
            end,
            excluding,
        )
        .await?)
    }

    async fn insert_booking(&mut self, new: NewBooking) -> BookingResult<Booking> {
        if new.service_point_id != self.service_point_id || new.booking_date != self.date {
            return Err(BookingError::Validation(
                "Booking does not belong to the locked service point and date".to_string(),
            ));
        }
        booking::insert_booking(&mut self.tx, &new).await.map_err(|err| {
            if is_conflict(&err) {
                BookingError::Conflict(format!(
                    "Booking on {} at {} lost a concurrent write",
                    new.booking_date, new.start_time
                ))
            } else {
                BookingError::Database(err)
            }
        })
    }

    async fn commit(self: Box<Self>) -> BookingResult<()> {
        self.tx.commit().await.map_err(|err| {
            let report = eyre::Report::from(err);
            if is_conflict(&report) {
                BookingError::Conflict("Booking transaction lost a concurrent write".to_string())
            } else {
                BookingError::Database(report)
            }
        })
    }
}
