use time::{macros::format_description, Date, OffsetDateTime};

/// Resolves "today" for the journal.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Local calendar date from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        match OffsetDateTime::now_local() {
            Ok(now) => now.date(),
            Err(e) => {
                tracing::warn!(error = %e, "local UTC offset unavailable, using UTC date");
                OffsetDateTime::now_utc().date()
            }
        }
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Formats a date as the `YYYY-MM-DD` key used by logs and weights.
pub fn day_key(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

pub fn parse_day(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format).ok()
}
