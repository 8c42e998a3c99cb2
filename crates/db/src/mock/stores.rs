use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mockall::mock;
use tirebook_core::{
    errors::BookingResult,
    models::{
        booking::{Booking, BookingStatus},
        schedule::{ScheduleException, ScheduleTemplate},
        service_point::{ServicePoint, ServicePost, ServicePrice},
        slot::ScheduleSlot,
    },
    store::{BookingStore, CalendarStore, DayTransaction},
};
use uuid::Uuid;

// Mock stores for testing
mock! {
    pub Calendar {}

    #[async_trait]
    impl CalendarStore for Calendar {
        async fn get_service_point(&self, id: Uuid) -> BookingResult<Option<ServicePoint>>;

        async fn get_templates(&self, service_point_id: Uuid) -> BookingResult<Vec<ScheduleTemplate>>;

        async fn get_exception(
            &self,
            service_point_id: Uuid,
            date: NaiveDate,
        ) -> BookingResult<Option<ScheduleException>>;

        async fn get_active_posts(&self, service_point_id: Uuid) -> BookingResult<Vec<ServicePost>>;

        async fn get_slot(&self, slot_id: Uuid) -> BookingResult<Option<ScheduleSlot>>;

        async fn replace_slots(
            &self,
            service_point_id: Uuid,
            date: NaiveDate,
            slots: Vec<ScheduleSlot>,
        ) -> BookingResult<()>;

        async fn service_prices(
            &self,
            service_point_id: Uuid,
            service_ids: &[Uuid],
        ) -> BookingResult<Vec<ServicePrice>>;
    }
}

mock! {
    pub Bookings {}

    #[async_trait]
    impl BookingStore for Bookings {
        async fn bookings_overlapping(
            &self,
            service_point_id: Uuid,
            date: NaiveDate,
            start: NaiveTime,
            end: NaiveTime,
            excluding: &[BookingStatus],
        ) -> BookingResult<Vec<Booking>>;

        async fn get_booking(&self, id: Uuid) -> BookingResult<Option<Booking>>;

        async fn update_status(
            &self,
            id: Uuid,
            from: BookingStatus,
            to: BookingStatus,
        ) -> BookingResult<Booking>;

        async fn begin_day(
            &self,
            service_point_id: Uuid,
            date: NaiveDate,
        ) -> BookingResult<Box<dyn DayTransaction>>;
    }
}
