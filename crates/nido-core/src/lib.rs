pub mod bucket;
pub mod cli;
pub mod config;
pub mod datetime;
pub mod event;
pub mod grid;
pub mod render;
pub mod store;
pub mod view;

use std::ffi::OsString;

use anyhow::{
  Context,
  anyhow
};
use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::Cli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting nido CLI"
  );

  let settings =
    config::Settings::load(
      cli.config.as_deref(),
      &cli.overrides()
    )?;

  let mut store =
    store::CalendarStore::new(
      settings
    );

  if let Some(raw) =
    cli.view.as_deref()
  {
    let view =
      grid::CalendarView::from_key(raw)
        .ok_or_else(|| {
          anyhow!(
            "unknown view: {raw}"
          )
        })?;
    store.set_view(view);
  }

  if let Some(expr) =
    cli.date.as_deref()
  {
    let date =
      datetime::parse_anchor_date(
        expr,
        Utc::now(),
        store.settings().timezone
      )
      .context(
        "failed to parse --date"
      )?;
    store.set_date(date);
  }

  let events = if let Some(path) =
    cli.events.as_ref()
  {
    event::load_events(path)?
  } else if cli.sample {
    debug!("using sample events");
    event::sample_events(store.date())
  } else {
    vec![]
  };
  store.set_events(events);

  let renderer = render::Renderer::new(
    store.settings()
  );
  renderer.print_calendar(&store)?;

  info!("done");
  Ok(())
}
