use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nido",
    version,
    about = "Nido: daycare calendar dashboard for the terminal",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Calendar view: month, week or day (default from config)
    pub view: Option<String>,

    /// Anchor date expression (today, 2023-10-01, +2w, march, monday, ...)
    #[arg(long = "date")]
    pub date: Option<String>,

    /// JSON file with an array of events
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Use the built-in demo agenda instead of an events file
    #[arg(long = "sample", conflicts_with = "events")]
    pub sample: bool,

    /// IANA timezone id, e.g. America/Bogota
    #[arg(long = "timezone")]
    pub timezone: Option<String>,

    /// First day of the week: 0-6 (0 = Sunday) or a weekday name
    #[arg(long = "week-start")]
    pub week_start: Option<String>,

    /// Locale id for month/weekday names, e.g. es_ES
    #[arg(long = "locale")]
    pub locale: Option<String>,

    /// Path to nido.toml
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            timezone: self.timezone.clone(),
            week_start: self.week_start.clone(),
            locale: self.locale.clone(),
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
