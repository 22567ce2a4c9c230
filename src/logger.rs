use std::fs::File;

use anyhow::{bail, Context};
use time::{
    format_description::{self, parse},
    OffsetDateTime,
};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, FmtSubscriber};

/// Install a global subscriber writing every event to a timestamped file in the current
/// directory.
///
/// Nothing is created on disk if a global subscriber is already installed.
pub fn init_logger() -> anyhow::Result<()> {
    if tracing::dispatcher::has_been_set() {
        bail!("a global tracing subscriber is already set, consider disabling logs");
    }
    let file_name = get_log_file_name()?;
    let file = File::create(&file_name).with_context(|| format!("cannot create {file_name}"))?;
    let writer = BoxMakeWriter::new(file);
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        local_offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?,
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber)
        .context("a global tracing subscriber is already set, consider disabling logs")
}

fn get_log_file_name() -> anyhow::Result<String> {
    let format = parse("judge_[year]-[month]-[day]_[hour]:[minute]:[second]_log.txt")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(&format)?)
}
