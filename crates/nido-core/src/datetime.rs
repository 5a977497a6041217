use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;

use crate::grid::{
  add_days,
  first_day_of_month,
  shift_months
};

/// Resolve an anchor-date expression
/// against now in the display zone.
#[tracing::instrument(skip(now), fields(input = input))]
pub fn parse_anchor_date(
  input: &str,
  now: DateTime<Utc>,
  timezone: Tz
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();
  let today = now
    .with_timezone(&timezone)
    .date_naive();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return Ok(add_days(today, 1))
    }
    | "yesterday" => {
      return Ok(add_days(today, -1))
    }
    | _ => {}
  }

  if token.len() == 4
    && token
      .chars()
      .all(|c| c.is_ascii_digit())
  {
    let year: i32 =
      token.parse().context(
        "invalid 4-digit year"
      )?;
    return first_of_year(year);
  }

  if let Some(target) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today, target
    ));
  }

  if let Some(target_month) =
    parse_month_name(&lower)
  {
    let mut year = today.year();
    let candidate = first_day_of_month(
      year,
      target_month
    );
    if candidate <= today {
      year = year.saturating_add(1);
    }
    return Ok(first_day_of_month(
      year,
      target_month
    ));
  }

  let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwm])$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

  if let Some(caps) =
    rel_re.captures(token)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let num = if sign == "-" {
      -num
    } else {
      num
    };

    return Ok(match unit {
      | "d" => add_days(today, num),
      | "w" => {
        add_days(today, num * 7)
      }
      | "m" => shift_months(
        today,
        num as i32
      ),
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ))
      }
    });
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     4-digit year, weekday names \
     (e.g. monday), month names \
     (e.g. march), +Nd/+Nw/+Nm, \
     YYYY-MM-DD"
  })
}

fn first_of_year(
  year: i32
) -> anyhow::Result<NaiveDate> {
  NaiveDate::from_ymd_opt(year, 1, 1)
    .ok_or_else(|| {
      anyhow!(
        "invalid year value: {year}"
      )
    })
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> NaiveDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  add_days(from, delta)
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 2, 17, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn date(
    year: i32,
    month: u32,
    day: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .expect("valid date")
  }

  #[test]
  fn parses_named_days() {
    let tz = chrono_tz::UTC;
    assert_eq!(
      parse_anchor_date(
        "today",
        now(),
        tz
      )
      .expect("today"),
      date(2026, 2, 17)
    );
    assert_eq!(
      parse_anchor_date(
        "tomorrow",
        now(),
        tz
      )
      .expect("tomorrow"),
      date(2026, 2, 18)
    );
    assert_eq!(
      parse_anchor_date(
        "yesterday",
        now(),
        tz
      )
      .expect("yesterday"),
      date(2026, 2, 16)
    );
  }

  #[test]
  fn today_follows_display_zone() {
    // 2026-02-17 12:00 UTC is still
    // 2026-02-17 in Tokyo, but only
    // 06:00 in Mexico City.
    let anchored = parse_anchor_date(
      "today",
      now(),
      chrono_tz::Asia::Tokyo
    )
    .expect("today");
    assert_eq!(
      anchored,
      date(2026, 2, 17)
    );

    let late = Utc
      .with_ymd_and_hms(
        2026, 2, 17, 23, 0, 0
      )
      .single()
      .expect("valid now");
    let rolled = parse_anchor_date(
      "today",
      late,
      chrono_tz::Asia::Tokyo
    )
    .expect("today");
    assert_eq!(
      rolled,
      date(2026, 2, 18)
    );
  }

  #[test]
  fn parses_weekday_name() {
    let parsed = parse_anchor_date(
      "wednesday",
      now(),
      chrono_tz::UTC
    )
    .expect("weekday");
    assert_eq!(
      parsed,
      date(2026, 2, 18)
    );
  }

  #[test]
  fn parses_month_name() {
    let parsed = parse_anchor_date(
      "march",
      now(),
      chrono_tz::UTC
    )
    .expect("month");
    assert_eq!(parsed, date(2026, 3, 1));

    let wrapped = parse_anchor_date(
      "january",
      now(),
      chrono_tz::UTC
    )
    .expect("month");
    assert_eq!(
      wrapped,
      date(2027, 1, 1)
    );
  }

  #[test]
  fn parses_relative_offsets() {
    let tz = chrono_tz::UTC;
    assert_eq!(
      parse_anchor_date(
        "+3d",
        now(),
        tz
      )
      .expect("+3d"),
      date(2026, 2, 20)
    );
    assert_eq!(
      parse_anchor_date(
        "-1w",
        now(),
        tz
      )
      .expect("-1w"),
      date(2026, 2, 10)
    );
    assert_eq!(
      parse_anchor_date(
        "+1m",
        now(),
        tz
      )
      .expect("+1m"),
      date(2026, 3, 17)
    );
  }

  #[test]
  fn parses_plain_dates_and_years() {
    let tz = chrono_tz::UTC;
    assert_eq!(
      parse_anchor_date(
        "2023-10-01",
        now(),
        tz
      )
      .expect("date"),
      date(2023, 10, 1)
    );
    assert_eq!(
      parse_anchor_date(
        "2028",
        now(),
        tz
      )
      .expect("year"),
      date(2028, 1, 1)
    );
  }

  #[test]
  fn rejects_gibberish() {
    assert!(
      parse_anchor_date(
        "next full moon",
        now(),
        chrono_tz::UTC
      )
      .is_err()
    );
  }
}
