use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::bucket::{self, DayBuckets};
use crate::config::Settings;
use crate::event::CalendarEvent;
use crate::grid::{self, CalendarView};

/// Holds the calendar inputs (anchor date, view, events) together with the
/// fixed session settings. Every derived value is recomputed on read from
/// the current inputs; nothing derived is cached.
#[derive(Debug, Clone)]
pub struct CalendarStore {
    settings: Settings,
    date: NaiveDate,
    view: CalendarView,
    events: Vec<CalendarEvent>,
}

impl CalendarStore {
    pub fn new(settings: Settings) -> Self {
        let date = today_in_zone(&settings);
        let view = settings.default_view;
        debug!(
            date = %date,
            view = view.as_key(),
            timezone = %settings.timezone,
            "created calendar store"
        );

        Self {
            settings,
            date,
            view,
            events: vec![],
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn view(&self) -> CalendarView {
        self.view
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        debug!(date = %date, "set anchor date");
        self.date = date;
    }

    pub fn set_view(&mut self, view: CalendarView) {
        debug!(view = view.as_key(), "set view");
        self.view = view;
    }

    /// Wholesale replacement is the only event mutation primitive; the
    /// caller owns the collection and hands the store a fresh copy.
    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        debug!(count = events.len(), "replaced event collection");
        self.events = events;
    }

    pub fn next(&mut self) {
        self.set_date(grid::shift_focus(self.date, self.view, 1));
    }

    pub fn prev(&mut self) {
        self.set_date(grid::shift_focus(self.date, self.view, -1));
    }

    pub fn today(&mut self) {
        self.set_date(today_in_zone(&self.settings));
    }

    pub fn visible_days(&self) -> Vec<NaiveDate> {
        grid::visible_days(self.date, self.view, self.settings.week_start)
    }

    pub fn events_by_day(&self) -> DayBuckets {
        bucket::bucketize(&self.events, self.settings.timezone)
    }

    /// Representative dates for the weekday header row; anchored to today
    /// in the display timezone, not to the grid anchor.
    pub fn week_days(&self) -> Vec<NaiveDate> {
        grid::week_label_days(today_in_zone(&self.settings), self.settings.week_start)
    }

    pub fn is_today(&self, day: NaiveDate) -> bool {
        day == today_in_zone(&self.settings)
    }

    pub fn formatted_title(&self) -> String {
        let locale = self.settings.locale;
        match self.view {
            CalendarView::Month => self
                .date
                .format_localized("%B %Y", locale)
                .to_string(),
            CalendarView::Week => {
                let start = grid::start_of_week(self.date, self.settings.week_start);
                let end = grid::add_days(start, 6);
                format!(
                    "{} - {}",
                    start.format_localized("%-d %b", locale),
                    end.format_localized("%-d %b %Y", locale)
                )
            }
            CalendarView::Day => self
                .date
                .format_localized("%A, %-d %B %Y", locale)
                .to_string(),
        }
    }
}

fn today_in_zone(settings: &Settings) -> NaiveDate {
    Utc::now()
        .with_timezone(&settings.timezone)
        .date_naive()
}
