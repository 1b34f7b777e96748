//! Log line format with a wall-clock timestamp and the current frame number.
//!
//! Lines look like `12:04:33.01234 0x01A2  INFO update{level=0}: powerpac::game: Level loaded`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Frames run since startup.
static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits of the frame number are printed.
const FRAME_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

/// ANSI styles used by the formatter. Ignored when the writer has no color support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Dim,
    Bold,
    Color(&'static str),
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dim => "\x1b[2m",
            Style::Bold => "\x1b[1m",
            Style::Color(code) => code,
        }
    }
}

fn paint(writer: &mut Writer<'_>, style: Style, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{}{}\x1b[0m", style.code(), value)
    } else {
        write!(writer, "{}", value)
    }
}

/// Label and color for a level, padded to five characters.
fn level_style(level: &Level) -> (&'static str, Style) {
    match *level {
        Level::TRACE => ("TRACE", Style::Color("\x1b[35m")),
        Level::DEBUG => ("DEBUG", Style::Color("\x1b[34m")),
        Level::INFO => (" INFO", Style::Color("\x1b[32m")),
        Level::WARN => (" WARN", Style::Color("\x1b[33m")),
        Level::ERROR => ("ERROR", Style::Color("\x1b[31m")),
    }
}

/// Event formatter stamping each line with the time and the frame it was logged in.
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let now = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        paint(&mut writer, Style::Dim, now)?;
        writer.write_char(' ')?;
        paint(&mut writer, Style::Dim, format_args!("0x{:04X}", tick_count() & FRAME_DISPLAY_MASK))?;
        writer.write_char(' ')?;

        let (label, style) = level_style(meta.level());
        paint(&mut writer, style, label)?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                any = true;
                paint(&mut writer, Style::Bold, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|f| !f.is_empty()) {
                    paint(&mut writer, Style::Bold, "{")?;
                    write!(writer, "{}", fields)?;
                    paint(&mut writer, Style::Bold, "}")?;
                }
                paint(&mut writer, Style::Dim, ":")?;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        paint(&mut writer, Style::Dim, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Advances the frame number shown in log lines. Called once per game update.
pub fn increment_tick() {
    FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn tick_count() -> u64 {
    FRAME_COUNTER.load(Ordering::Relaxed)
}
