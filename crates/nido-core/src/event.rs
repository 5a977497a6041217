use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[default]
    Default,
    Blue,
    Green,
    Red,
    Yellow,
    Purple,
}

/// An event instant: either an absolute UTC instant or raw text kept
/// verbatim until bucketing resolves it against the display timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventInstant {
    Instant(DateTime<Utc>),
    Text(String),
}

impl EventInstant {
    pub fn resolve(&self, timezone: Tz) -> Option<DateTime<Utc>> {
        match self {
            EventInstant::Instant(instant) => Some(*instant),
            EventInstant::Text(raw) => parse_instant_text(raw, timezone),
        }
    }
}

impl From<DateTime<Utc>> for EventInstant {
    fn from(instant: DateTime<Utc>) -> Self {
        EventInstant::Instant(instant)
    }
}

impl From<&str> for EventInstant {
    fn from(raw: &str) -> Self {
        EventInstant::Text(raw.to_string())
    }
}

impl From<String> for EventInstant {
    fn from(raw: String) -> Self {
        EventInstant::Text(raw)
    }
}

fn parse_instant_text(raw: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(token) {
        return Some(instant.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, fmt) {
            return from_zone_local(naive, timezone);
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return day
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| from_zone_local(naive, timezone));
    }

    None
}

fn from_zone_local(naive: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => {
            warn!(
                %first,
                %second,
                "ambiguous local datetime; using earliest"
            );
            let chosen = if first <= second { first } else { second };
            Some(chosen.with_timezone(&Utc))
        }
        LocalResult::None => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    pub start: EventInstant,

    pub end: EventInstant,

    #[serde(default)]
    pub color: EventColor,
}

impl CalendarEvent {
    pub fn new(title: &str, start: EventInstant, end: EventInstant) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end,
            color: EventColor::Default,
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn load_events(path: impl AsRef<Path>) -> anyhow::Result<Vec<CalendarEvent>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read events file {}", path.display()))?;

    let events: Vec<CalendarEvent> = serde_json::from_str(&text)
        .with_context(|| format!("invalid events JSON in {}", path.display()))?;

    info!(file = %path.display(), count = events.len(), "loaded events");
    Ok(events)
}

/// Built-in demo agenda, laid out over the month containing `anchor`.
pub fn sample_events(anchor: NaiveDate) -> Vec<CalendarEvent> {
    let year = anchor.year();
    let month = anchor.month();
    let clamp = crate::grid::days_in_month(year, month);
    let stamp = |day: u32, clock: &str| -> EventInstant {
        let day = crate::grid::first_day_of_month(year, month)
            .with_day(day.min(clamp))
            .unwrap_or(anchor);
        EventInstant::Text(format!("{}T{clock}", day.format("%Y-%m-%d")))
    };

    vec![
        CalendarEvent {
            id: "evt-1".to_string(),
            title: "Reunión de padres".to_string(),
            description: Some("Avances del trimestre".to_string()),
            location: None,
            start: stamp(3, "10:00"),
            end: stamp(3, "11:00"),
            color: EventColor::Blue,
        },
        CalendarEvent {
            id: "evt-2".to_string(),
            title: "Taller de pintura".to_string(),
            description: None,
            location: Some("Sala Arcoíris".to_string()),
            start: stamp(8, "09:30"),
            end: stamp(8, "10:30"),
            color: EventColor::Green,
        },
        CalendarEvent {
            id: "evt-3".to_string(),
            title: "Visita al zoológico".to_string(),
            description: None,
            location: None,
            start: stamp(15, "09:00"),
            end: stamp(15, "12:00"),
            color: EventColor::Yellow,
        },
        CalendarEvent {
            id: "evt-4".to_string(),
            title: "Sesión de fotos".to_string(),
            description: None,
            location: None,
            start: stamp(15, "11:00"),
            end: stamp(15, "11:45"),
            color: EventColor::Purple,
        },
        CalendarEvent {
            id: "evt-5".to_string(),
            title: "Clase de música".to_string(),
            description: None,
            location: None,
            start: stamp(15, "15:00"),
            end: stamp(15, "16:00"),
            color: EventColor::Red,
        },
        CalendarEvent {
            id: "evt-6".to_string(),
            title: "Festival de primavera".to_string(),
            description: None,
            location: Some("Patio central".to_string()),
            start: stamp(20, "09:00"),
            end: stamp(20, "18:00"),
            color: EventColor::Blue,
        },
        CalendarEvent {
            id: "evt-7".to_string(),
            title: "Simulacro de evacuación".to_string(),
            description: None,
            location: None,
            start: stamp(25, "12:00"),
            end: stamp(25, "12:30"),
            color: EventColor::Default,
        },
    ]
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    #[test]
    fn rfc3339_text_resolves_to_utc() {
        let instant = EventInstant::from("2023-10-25T23:30:00-05:00");
        let resolved = instant.resolve(chrono_tz::UTC).expect("resolves");
        assert_eq!(resolved.to_rfc3339(), "2023-10-26T04:30:00+00:00");
    }

    #[test]
    fn naive_text_resolves_in_display_zone() {
        let instant = EventInstant::from("2023-10-25T09:00");
        let resolved = instant
            .resolve(chrono_tz::America::Bogota)
            .expect("resolves");
        // 09:00 in Bogotá (UTC-5) is 14:00 UTC.
        assert_eq!(resolved.to_rfc3339(), "2023-10-25T14:00:00+00:00");
    }

    #[test]
    fn date_only_text_resolves_to_midnight() {
        let instant = EventInstant::from("2023-10-25");
        let resolved = instant.resolve(chrono_tz::Asia::Tokyo).expect("resolves");
        assert_eq!(resolved.to_rfc3339(), "2023-10-24T15:00:00+00:00");
    }

    #[test]
    fn unparsable_text_fails_closed() {
        assert_eq!(EventInstant::from("").resolve(chrono_tz::UTC), None);
        assert_eq!(
            EventInstant::from("not a date").resolve(chrono_tz::UTC),
            None
        );
    }

    #[test]
    fn event_json_accepts_text_and_instants() {
        let raw = r#"[
            {
                "id": "a",
                "title": "Reunión",
                "start": "2026-03-15T10:00:00Z",
                "end": "2026-03-15T11:00:00Z",
                "color": "blue"
            },
            {
                "id": "b",
                "title": "Taller",
                "start": "2026-03-16T09:30",
                "end": "2026-03-16T10:30"
            }
        ]"#;

        let events: Vec<CalendarEvent> = serde_json::from_str(raw).expect("valid JSON");
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].start, EventInstant::Instant(_)));
        assert!(matches!(events[1].start, EventInstant::Text(_)));
        assert_eq!(events[1].color, EventColor::Default);
    }

    #[test]
    fn new_events_get_distinct_ids() {
        let a = CalendarEvent::new("a", "2026-03-15".into(), "2026-03-15".into());
        let b = CalendarEvent::new("b", "2026-03-15".into(), "2026-03-15".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sample_events_stay_in_anchor_month() {
        let anchor = NaiveDate::from_ymd_opt(2026, 2, 10).expect("valid date");
        for event in sample_events(anchor) {
            let resolved = event
                .start
                .resolve(chrono_tz::UTC)
                .expect("sample start resolves");
            assert_eq!(resolved.month(), 2);
        }
    }
}
