//! Fixed-step walk over a working window.
//!
//! The one place that steps from an opening time to a closing time; slot
//! generation, capacity scanning and slot-cache rebuilds all go through it.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{service_point::ServicePost, slot::Slot};
use crate::time::add_minutes;

/// Successive `[cursor, cursor + step)` intervals that fit inside
/// `[open, close)`. No partial trailing interval is produced.
#[derive(Debug, Clone)]
pub struct Steps {
    cursor: Option<NaiveTime>,
    close: NaiveTime,
    step_minutes: i64,
}

impl Steps {
    pub fn new(open: NaiveTime, close: NaiveTime, step_minutes: i64) -> Self {
        Self {
            cursor: (step_minutes > 0).then_some(open),
            close,
            step_minutes,
        }
    }
}

impl Iterator for Steps {
    type Item = (NaiveTime, NaiveTime);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;
        match add_minutes(start, self.step_minutes) {
            Some(end) if end <= self.close => {
                self.cursor = Some(end);
                Some((start, end))
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }
}

/// Instants `open, open + step, ...` strictly before `close`.
pub fn scan_instants(open: NaiveTime, close: NaiveTime, step_minutes: i64) -> Vec<NaiveTime> {
    let mut instants = Vec::new();
    let mut cursor = Some(open);
    while let Some(instant) = cursor.filter(|t| *t < close) {
        instants.push(instant);
        cursor = if step_minutes > 0 {
            add_minutes(instant, step_minutes)
        } else {
            None
        };
    }
    instants
}

/// Slots of `post` on `date` within `[open, close)`, ordered by start.
pub fn generate(post: &ServicePost, date: NaiveDate, open: NaiveTime, close: NaiveTime) -> Vec<Slot> {
    Steps::new(open, close, i64::from(post.slot_duration))
        .map(|(start, end)| Slot {
            post_id: post.id,
            post_number: post.post_number,
            date,
            start,
            end,
            duration_minutes: post.slot_duration,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::testing::*;
    use pretty_assertions::assert_eq;

    fn spans(slots: &[Slot]) -> Vec<(String, String)> {
        slots
            .iter()
            .map(|s| (s.start.format("%H:%M").to_string(), s.end.format("%H:%M").to_string()))
            .collect()
    }

    #[test]
    fn no_partial_trailing_slot() {
        let p = post(uuid::Uuid::new_v4(), 1, 30);
        let slots = generate(&p, tuesday(), t("09:00"), t("09:50"));
        assert_eq!(spans(&slots), vec![("09:00".into(), "09:30".into())]);
    }

    #[test]
    fn fills_window_exactly() {
        let p = post(uuid::Uuid::new_v4(), 1, 60);
        let slots = generate(&p, tuesday(), t("09:00"), t("12:00"));
        assert_eq!(
            spans(&slots),
            vec![
                ("09:00".into(), "10:00".into()),
                ("10:00".into(), "11:00".into()),
                ("11:00".into(), "12:00".into()),
            ]
        );
        assert!(slots.iter().all(|s| s.post_id == p.id && s.duration_minutes == 60));
    }

    #[test]
    fn generation_is_deterministic() {
        let p = post(uuid::Uuid::new_v4(), 1, 45);
        assert_eq!(
            generate(&p, tuesday(), t("08:15"), t("17:40")),
            generate(&p, tuesday(), t("08:15"), t("17:40"))
        );
    }

    #[test]
    fn window_shorter_than_duration_yields_nothing() {
        let p = post(uuid::Uuid::new_v4(), 1, 90);
        assert!(generate(&p, tuesday(), t("09:00"), t("10:00")).is_empty());
    }

    #[test]
    fn non_positive_step_yields_nothing() {
        assert_eq!(Steps::new(t("09:00"), t("10:00"), 0).count(), 0);
        assert_eq!(scan_instants(t("09:00"), t("10:00"), 0), vec![t("09:00")]);
    }

    #[test]
    fn walk_stops_before_midnight() {
        let steps: Vec<_> = Steps::new(t("22:00"), t("23:59"), 60).collect();
        assert_eq!(steps, vec![(t("22:00"), t("23:00"))]);
    }

    #[test]
    fn scan_instants_cover_half_open_window() {
        assert_eq!(
            scan_instants(t("10:00"), t("11:00"), 15),
            vec![t("10:00"), t("10:15"), t("10:30"), t("10:45")]
        );
        assert_eq!(scan_instants(t("10:00"), t("10:10"), 15), vec![t("10:00")]);
    }
}
