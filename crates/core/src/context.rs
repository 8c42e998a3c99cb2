use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

/// Request-scoped values threaded explicitly through scheduling and
/// admission calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    /// Wall-clock "now" in service-point local time.
    pub now: NaiveDateTime,
}

impl RequestContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            now,
        }
    }

    pub fn from_local_clock() -> Self {
        Self::new(Local::now().naive_local())
    }
}
