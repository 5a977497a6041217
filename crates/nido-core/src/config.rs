use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Locale,
  Weekday
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  info,
  warn
};

use crate::grid::CalendarView;

const CONFIG_FILE: &str = "nido.toml";
const CONFIG_ENV_VAR: &str =
  "NIDO_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "NIDO_TIMEZONE";
pub const DEFAULT_TIMEZONE: &str =
  "America/Mexico_City";
pub const DEFAULT_LOCALE: &str =
  "en_US";
pub const DEFAULT_DAY_EVENT_LIMIT:
  usize = 2;

#[derive(
  Debug, Clone, Default, Deserialize,
)]
pub struct ConfigFile {
  pub timezone:   Option<String>,
  pub week_start:
    Option<WeekStartValue>,
  pub locale:     Option<String>,
  pub color:      Option<String>,
  pub view:       Option<ViewSection>
}

#[derive(
  Debug, Clone, Default, Deserialize,
)]
pub struct ViewSection {
  pub default: Option<String>,
  pub day_event_limit: Option<usize>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeekStartValue {
  Index(u8),
  Name(String)
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub timezone:   Option<String>,
  pub week_start: Option<String>,
  pub locale:     Option<String>
}

/// Validated, fixed-for-the-session
/// calendar settings. A store is only
/// ever built from a fully resolved
/// value of this type.
#[derive(Debug, Clone)]
pub struct Settings {
  pub timezone:   Tz,
  pub week_start: Weekday,
  pub locale:     Locale,
  pub default_view: CalendarView,
  pub day_event_limit: usize,
  pub color:      bool
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      timezone:   chrono_tz::UTC,
      week_start: Weekday::Sun,
      locale:     Locale::en_US,
      default_view:
        CalendarView::Month,
      day_event_limit:
        DEFAULT_DAY_EVENT_LIMIT,
      color:      true
    }
  }
}

impl Settings {
  #[tracing::instrument(skip_all)]
  pub fn load(
    config_path: Option<&Path>,
    overrides: &Overrides
  ) -> anyhow::Result<Self> {
    let file = match resolve_config_path(
      config_path
    ) {
      | Some(path) => {
        info!(file = %path.display(), "loading config");
        load_config_file(&path)?
      }
      | None => {
        info!(
          "no config file found; \
           using defaults"
        );
        ConfigFile::default()
      }
    };

    let env_timezone = std::env::var(
      TIMEZONE_ENV_VAR
    )
    .ok()
    .map(|raw| raw.trim().to_string())
    .filter(|raw| !raw.is_empty());

    resolve(file, overrides, env_timezone)
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  let candidate =
    std::env::current_dir()
      .ok()
      .map(|dir| {
        dir.join(CONFIG_FILE)
      });
  if let Some(path) = candidate
    && path.exists()
  {
    return Some(path);
  }

  let fallback = dirs::config_dir()?
    .join("nido")
    .join(CONFIG_FILE);
  if fallback.exists() {
    return Some(fallback);
  }

  None
}

fn load_config_file(
  path: &Path
) -> anyhow::Result<ConfigFile> {
  let raw = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;
  toml::from_str(&raw).with_context(
    || {
      format!(
        "failed to parse {}",
        path.display()
      )
    }
  )
}

fn resolve(
  file: ConfigFile,
  overrides: &Overrides,
  env_timezone: Option<String>
) -> anyhow::Result<Settings> {
  let timezone_raw = overrides
    .timezone
    .clone()
    .or(env_timezone)
    .or(file.timezone)
    .unwrap_or_else(|| {
      DEFAULT_TIMEZONE.to_string()
    });
  let timezone =
    parse_timezone(&timezone_raw)?;

  let week_start = match (
    overrides.week_start.as_deref(),
    file.week_start
  ) {
    | (Some(raw), _) => {
      parse_week_start(raw)?
    }
    | (None, Some(value)) => {
      value.to_weekday()?
    }
    | (None, None) => Weekday::Sun
  };

  let locale_raw = overrides
    .locale
    .clone()
    .or(file.locale)
    .unwrap_or_else(|| {
      DEFAULT_LOCALE.to_string()
    });
  let locale =
    parse_locale(&locale_raw)?;

  let view_section =
    file.view.unwrap_or_default();

  let default_view =
    match view_section.default {
      | Some(raw) => {
        CalendarView::from_key(&raw)
          .ok_or_else(|| {
            anyhow!(
              "unknown default view: \
               {raw}"
            )
          })?
      }
      | None => CalendarView::Month
    };

  let day_event_limit =
    match view_section.day_event_limit
    {
      | Some(0) => {
        warn!(
          "day_event_limit of 0 \
           hides every event; using \
           default"
        );
        DEFAULT_DAY_EVENT_LIMIT
      }
      | Some(limit) => limit,
      | None => DEFAULT_DAY_EVENT_LIMIT
    };

  let color = match file
    .color
    .as_deref()
    .unwrap_or("on")
    .to_ascii_lowercase()
    .as_str()
  {
    | "on" | "yes" | "true" | "1" => {
      true
    }
    | "off" | "no" | "false" | "0" => {
      false
    }
    | other => {
      return Err(anyhow!(
        "invalid color setting: \
         {other}"
      ))
    }
  };

  let settings = Settings {
    timezone,
    week_start,
    locale,
    default_view,
    day_event_limit,
    color
  };
  info!(
    timezone = %settings.timezone,
    week_start = ?settings.week_start,
    locale = ?settings.locale,
    view = settings.default_view.as_key(),
    "resolved settings"
  );
  Ok(settings)
}

pub fn parse_timezone(
  raw: &str
) -> anyhow::Result<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(anyhow!(
      "timezone id is empty"
    ));
  }

  trimmed.parse::<Tz>().map_err(
    |err| {
      anyhow!(
        "unknown timezone id \
         {trimmed}: {err}"
      )
    }
  )
}

pub fn parse_week_start(
  raw: &str
) -> anyhow::Result<Weekday> {
  let token = raw
    .trim()
    .to_ascii_lowercase();

  if let Ok(index) =
    token.parse::<u8>()
  {
    return WeekStartValue::Index(
      index
    )
    .to_weekday();
  }

  match token.as_str() {
    | "sunday" | "sun" => {
      Ok(Weekday::Sun)
    }
    | "monday" | "mon" => {
      Ok(Weekday::Mon)
    }
    | "tuesday" | "tue" => {
      Ok(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Ok(Weekday::Wed)
    }
    | "thursday" | "thu" => {
      Ok(Weekday::Thu)
    }
    | "friday" | "fri" => {
      Ok(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Ok(Weekday::Sat)
    }
    | _ => Err(anyhow!(
      "invalid week start: {raw}"
    ))
  }
}

impl WeekStartValue {
  fn to_weekday(
    &self
  ) -> anyhow::Result<Weekday> {
    match self {
      | Self::Index(0) => {
        Ok(Weekday::Sun)
      }
      | Self::Index(1) => {
        Ok(Weekday::Mon)
      }
      | Self::Index(2) => {
        Ok(Weekday::Tue)
      }
      | Self::Index(3) => {
        Ok(Weekday::Wed)
      }
      | Self::Index(4) => {
        Ok(Weekday::Thu)
      }
      | Self::Index(5) => {
        Ok(Weekday::Fri)
      }
      | Self::Index(6) => {
        Ok(Weekday::Sat)
      }
      | Self::Index(other) => {
        Err(anyhow!(
          "week start must be 0-6, \
           got {other}"
        ))
      }
      | Self::Name(name) => {
        parse_week_start(name)
      }
    }
  }
}

pub fn parse_locale(
  raw: &str
) -> anyhow::Result<Locale> {
  let trimmed = raw.trim();
  Locale::try_from(trimmed).map_err(
    |_| {
      anyhow!(
        "unknown locale id: {trimmed}"
      )
    }
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_without_any_source() {
    let settings = resolve(
      ConfigFile::default(),
      &Overrides::default(),
      None
    )
    .expect("resolve defaults");

    assert_eq!(
      settings.timezone.name(),
      DEFAULT_TIMEZONE
    );
    assert_eq!(
      settings.week_start,
      Weekday::Sun
    );
    assert_eq!(
      settings.day_event_limit,
      DEFAULT_DAY_EVENT_LIMIT
    );
    assert!(settings.color);
  }

  #[test]
  fn override_beats_env_and_file() {
    let file = ConfigFile {
      timezone: Some(
        "Asia/Tokyo".to_string()
      ),
      ..ConfigFile::default()
    };
    let overrides = Overrides {
      timezone: Some(
        "America/Bogota".to_string()
      ),
      ..Overrides::default()
    };

    let settings = resolve(
      file,
      &overrides,
      Some("Europe/Madrid".to_string())
    )
    .expect("resolve");

    assert_eq!(
      settings.timezone.name(),
      "America/Bogota"
    );
  }

  #[test]
  fn unknown_timezone_is_an_error() {
    let file = ConfigFile {
      timezone: Some(
        "Mars/Olympus".to_string()
      ),
      ..ConfigFile::default()
    };

    assert!(
      resolve(
        file,
        &Overrides::default(),
        None
      )
      .is_err()
    );
  }

  #[test]
  fn week_start_accepts_index_and_name()
  {
    assert_eq!(
      parse_week_start("0")
        .expect("sunday"),
      Weekday::Sun
    );
    assert_eq!(
      parse_week_start("1")
        .expect("monday"),
      Weekday::Mon
    );
    assert_eq!(
      parse_week_start("monday")
        .expect("monday"),
      Weekday::Mon
    );
    assert!(
      parse_week_start("7").is_err()
    );
    assert!(
      parse_week_start("someday")
        .is_err()
    );
  }

  #[test]
  fn zero_day_event_limit_is_sanitized()
  {
    let file = ConfigFile {
      view: Some(ViewSection {
        default: None,
        day_event_limit: Some(0)
      }),
      ..ConfigFile::default()
    };

    let settings = resolve(
      file,
      &Overrides::default(),
      None
    )
    .expect("resolve");
    assert_eq!(
      settings.day_event_limit,
      DEFAULT_DAY_EVENT_LIMIT
    );
  }

  #[test]
  fn unknown_locale_is_an_error() {
    let overrides = Overrides {
      locale: Some(
        "zz_ZZ".to_string()
      ),
      ..Overrides::default()
    };

    assert!(
      resolve(
        ConfigFile::default(),
        &overrides,
        None
      )
      .is_err()
    );
  }

  #[test]
  fn view_section_parses_from_toml() {
    let file: ConfigFile =
      toml::from_str(
        "timezone = \"Asia/Tokyo\"\n\
         week_start = 1\n\
         [view]\n\
         default = \"week\"\n\
         day_event_limit = 3\n"
      )
      .expect("parse toml");

    let settings = resolve(
      file,
      &Overrides::default(),
      None
    )
    .expect("resolve");

    assert_eq!(
      settings.timezone.name(),
      "Asia/Tokyo"
    );
    assert_eq!(
      settings.week_start,
      Weekday::Mon
    );
    assert_eq!(
      settings.default_view,
      CalendarView::Week
    );
    assert_eq!(
      settings.day_event_limit,
      3
    );
  }
}
