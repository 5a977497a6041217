use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub enum CalendarView {
  Month,
  Week,
  Day
}

impl CalendarView {
  #[must_use]
  pub fn as_key(
    self
  ) -> &'static str {
    match self {
      | Self::Month => "month",
      | Self::Week => "week",
      | Self::Day => "day"
    }
  }

  #[must_use]
  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "month" => Some(Self::Month),
      | "week" => Some(Self::Week),
      | "day" => Some(Self::Day),
      | _ => None
    }
  }
}

#[must_use]
pub fn visible_days(
  anchor: NaiveDate,
  view: CalendarView,
  week_start: Weekday
) -> Vec<NaiveDate> {
  match view {
    | CalendarView::Month => {
      let first = first_day_of_month(
        anchor.year(),
        anchor.month()
      );
      let last = last_day_of_month(
        anchor.year(),
        anchor.month()
      );
      let grid_start =
        start_of_week(first, week_start);
      let grid_end = add_days(
        start_of_week(last, week_start),
        6
      );
      collect_days(grid_start, grid_end)
    }
    | CalendarView::Week => {
      let start =
        start_of_week(anchor, week_start);
      collect_days(
        start,
        add_days(start, 6)
      )
    }
    | CalendarView::Day => {
      vec![anchor]
    }
  }
}

#[must_use]
pub fn shift_focus(
  anchor: NaiveDate,
  view: CalendarView,
  step: i64
) -> NaiveDate {
  match view {
    | CalendarView::Month => {
      shift_months(anchor, step as i32)
    }
    | CalendarView::Week => {
      add_days(anchor, step * 7)
    }
    | CalendarView::Day => {
      add_days(anchor, step)
    }
  }
}

#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

#[must_use]
pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

/// Seven representative dates for
/// weekday header labels, anchored to
/// today rather than the grid anchor.
#[must_use]
pub fn week_label_days(
  today: NaiveDate,
  week_start: Weekday
) -> Vec<NaiveDate> {
  let start =
    start_of_week(today, week_start);
  (0_i64..7_i64)
    .map(|offset| {
      add_days(start, offset)
    })
    .collect()
}

#[must_use]
pub fn day_key(
  day: NaiveDate
) -> String {
  day.format("%Y-%m-%d").to_string()
}

fn collect_days(
  start: NaiveDate,
  end: NaiveDate
) -> Vec<NaiveDate> {
  let mut days = Vec::new();
  let mut cursor = start;
  while cursor <= end {
    days.push(cursor);
    cursor = add_days(cursor, 1);
  }
  days
}
