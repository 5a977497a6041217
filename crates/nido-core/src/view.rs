//! Headless rendering primitives. Each primitive consumes only the data it
//! needs and knows nothing about its siblings; the caller owns iteration,
//! bucket lookups and truncation.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use crate::event::{CalendarEvent, EventColor};
use crate::grid::{self, CalendarView};
use crate::store::CalendarStore;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarHeader {
    pub title: String,
    pub view: CalendarView,
}

pub fn header(store: &CalendarStore) -> CalendarHeader {
    CalendarHeader {
        title: store.formatted_title(),
        view: store.view(),
    }
}

/// Localized abbreviated weekday names for the header row.
pub fn weekday_labels(store: &CalendarStore) -> Vec<String> {
    let locale = store.settings().locale;
    store
        .week_days()
        .iter()
        .map(|day| day.format_localized("%a", locale).to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_key: String,
    pub day_number: u32,
    pub is_current_month: bool,
    pub is_today: bool,
}

/// The cell does not know the anchor date; the caller computes both flags.
pub fn day_cell(date: NaiveDate, is_current_month: bool, is_today: bool) -> DayCell {
    DayCell {
        date,
        day_key: grid::day_key(date),
        day_number: date.day(),
        is_current_month,
        is_today,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventChip {
    pub title: String,
    pub time_label: String,
    pub color: EventColor,
}

/// A single event chip; the time label is the start time rendered in the
/// display timezone, empty when the start cannot be resolved.
pub fn event_chip(event: &CalendarEvent, timezone: Tz) -> EventChip {
    let time_label = event
        .start
        .resolve(timezone)
        .map(|instant| instant.with_timezone(&timezone).format("%H:%M").to_string())
        .unwrap_or_default();

    EventChip {
        title: event.title.clone(),
        time_label,
        color: event.color,
    }
}
