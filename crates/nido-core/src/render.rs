use std::io::{self, Write};

use chrono::Datelike;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::bucket::DayBuckets;
use crate::config::Settings;
use crate::event::EventColor;
use crate::grid::CalendarView;
use crate::store::CalendarStore;
use crate::view;

const MONTH_CELL_WIDTH: usize = 16;
const WEEK_DAY_EVENT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            color: settings.color,
        }
    }

    #[tracing::instrument(skip(self, store))]
    pub fn print_calendar(&self, store: &CalendarStore) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_calendar(&mut out, store)
    }

    pub fn write_calendar<W: Write>(
        &self,
        mut out: W,
        store: &CalendarStore,
    ) -> anyhow::Result<()> {
        let header = view::header(store);
        let buckets = store.events_by_day();

        writeln!(out, "{}", self.paint(&header.title, "1"))?;
        writeln!(out)?;

        match store.view() {
            CalendarView::Month => self.write_month(&mut out, store, &buckets)?,
            CalendarView::Week => self.write_week(&mut out, store, &buckets)?,
            CalendarView::Day => self.write_day(&mut out, store, &buckets)?,
        }

        if buckets.skipped() > 0 {
            writeln!(out)?;
            writeln!(
                out,
                "{}",
                self.paint(
                    &format!(
                        "({} events skipped: unreadable start dates)",
                        buckets.skipped()
                    ),
                    "31"
                )
            )?;
        }

        Ok(())
    }

    fn write_month<W: Write>(
        &self,
        out: &mut W,
        store: &CalendarStore,
        buckets: &DayBuckets,
    ) -> anyhow::Result<()> {
        let days = store.visible_days();
        let limit = store.settings().day_event_limit;
        let timezone = store.settings().timezone;
        let anchor_month = store.date().month();

        for label in view::weekday_labels(store) {
            write!(out, "{} ", pad_visible(&label, MONTH_CELL_WIDTH))?;
        }
        writeln!(out)?;
        for _ in 0..7 {
            write!(out, "{:-<width$} ", "", width = MONTH_CELL_WIDTH)?;
        }
        writeln!(out)?;

        // Every cell in a week row gets the same height: day number,
        // `limit` chip lines, one overflow line.
        let cell_height = limit + 2;

        for week in days.chunks(7) {
            let mut cells: Vec<Vec<String>> = Vec::with_capacity(week.len());

            for day in week {
                let cell = view::day_cell(*day, day.month() == anchor_month, store.is_today(*day));
                let events = buckets.events_on(*day);
                let mut lines = Vec::with_capacity(cell_height);

                let number = format!("{:>2}", cell.day_number);
                let number = if cell.is_today {
                    self.paint(&number, "7")
                } else if cell.is_current_month {
                    self.paint(&number, "33")
                } else {
                    self.paint(&number, "90")
                };
                lines.push(number);

                for event in events.iter().take(limit) {
                    let chip = view::event_chip(event, timezone);
                    let text = truncate_to_width(
                        &format!("{} {}", chip.time_label, chip.title),
                        MONTH_CELL_WIDTH,
                    );
                    lines.push(self.paint(&text, color_code(chip.color)));
                }

                if events.len() > limit {
                    lines.push(self.paint(&format!("+{} more", events.len() - limit), "90"));
                }

                while lines.len() < cell_height {
                    lines.push(String::new());
                }
                cells.push(lines);
            }

            for row in 0..cell_height {
                for lines in &cells {
                    write!(out, "{} ", pad_visible(&lines[row], MONTH_CELL_WIDTH))?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    fn write_week<W: Write>(
        &self,
        out: &mut W,
        store: &CalendarStore,
        buckets: &DayBuckets,
    ) -> anyhow::Result<()> {
        let timezone = store.settings().timezone;
        let locale = store.settings().locale;

        for day in store.visible_days() {
            let events = buckets.events_on(day);
            let heading = format!(
                "{} ({})",
                day.format_localized("%a %-d %b", locale),
                events.len()
            );
            let heading = if store.is_today(day) {
                self.paint(&heading, "7")
            } else {
                self.paint(&heading, "1")
            };
            writeln!(out, "{heading}")?;

            for event in events.iter().take(WEEK_DAY_EVENT_LIMIT) {
                let chip = view::event_chip(event, timezone);
                writeln!(
                    out,
                    "  {} {}",
                    chip.time_label,
                    self.paint(&chip.title, color_code(chip.color))
                )?;
            }
            if events.len() > WEEK_DAY_EVENT_LIMIT {
                writeln!(
                    out,
                    "  {}",
                    self.paint(
                        &format!("+{} more", events.len() - WEEK_DAY_EVENT_LIMIT),
                        "90"
                    )
                )?;
            }
        }

        Ok(())
    }

    fn write_day<W: Write>(
        &self,
        out: &mut W,
        store: &CalendarStore,
        buckets: &DayBuckets,
    ) -> anyhow::Result<()> {
        let timezone = store.settings().timezone;
        let day = store.date();

        let mut events: Vec<_> = buckets
            .events_on(day)
            .iter()
            .filter_map(|event| {
                event
                    .start
                    .resolve(timezone)
                    .map(|instant| (instant, event))
            })
            .collect();
        events.sort_by_key(|(instant, _)| *instant);

        if events.is_empty() {
            writeln!(out, "No events on this day.")?;
            return Ok(());
        }

        for (_, event) in events {
            let chip = view::event_chip(event, timezone);
            write!(
                out,
                "{} {}",
                chip.time_label,
                self.paint(&chip.title, color_code(chip.color))
            )?;
            if let Some(location) = &event.location {
                write!(out, " ({location})")?;
            }
            writeln!(out)?;
            if let Some(description) = &event.description {
                writeln!(out, "      {}", self.paint(description, "90"))?;
            }
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn color_code(color: EventColor) -> &'static str {
    match color {
        EventColor::Default => "37",
        EventColor::Blue => "34",
        EventColor::Green => "32",
        EventColor::Red => "31",
        EventColor::Yellow => "33",
        EventColor::Purple => "35",
    }
}

fn pad_visible(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(strip_ansi(text).as_str());
    let padding = width.saturating_sub(visible);
    format!("{}{}", text, " ".repeat(padding))
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
