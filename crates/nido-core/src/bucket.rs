use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::event::CalendarEvent;
use crate::grid::day_key;

/// Events grouped by the calendar day (in the display timezone) their
/// start instant falls on. Keys are canonical `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuckets {
    buckets: BTreeMap<String, Vec<CalendarEvent>>,
    skipped: usize,
}

impl DayBuckets {
    pub fn events_for(&self, key: &str) -> &[CalendarEvent] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn events_on(&self, day: NaiveDate) -> &[CalendarEvent] {
        self.events_for(&day_key(day))
    }

    /// Number of events excluded because their start could not be
    /// resolved to an instant.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }
}

#[tracing::instrument(skip(events))]
pub fn bucketize(events: &[CalendarEvent], timezone: Tz) -> DayBuckets {
    let mut buckets: BTreeMap<String, Vec<CalendarEvent>> = BTreeMap::new();
    let mut skipped = 0_usize;

    for event in events {
        match event.start.resolve(timezone) {
            Some(instant) => {
                let key = day_key(instant.with_timezone(&timezone).date_naive());
                buckets.entry(key).or_default().push(event.clone());
            }
            None => {
                warn!(
                    id = %event.id,
                    title = %event.title,
                    "skipping event with unresolvable start"
                );
                skipped += 1;
            }
        }
    }

    debug!(
        days = buckets.len(),
        skipped, "bucketed events by start day"
    );
    DayBuckets { buckets, skipped }
}
