//! Document dates, stored as `M/D/YYYY h:MM:SS AM|PM` strings in the source.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

const SOURCE_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// Parse a source date, interpreted as UTC.
pub fn parse_date(raw: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(raw.trim(), SOURCE_FORMAT).ok()
}

/// Parse `raw`, falling back to `default` when it is not a valid date.
pub fn parse_date_or(raw: &str, default: PrimitiveDateTime) -> PrimitiveDateTime {
    parse_date(raw).unwrap_or(default)
}

fn timestamp(date: PrimitiveDateTime) -> f64 {
    date.assume_utc().unix_timestamp() as f64
}

/// Earliest and latest parseable dates of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: PrimitiveDateTime,
    pub max: PrimitiveDateTime,
}

impl DateRange {
    /// Range over the dates that parse. With none, the range is a single
    /// instant at the Unix epoch and every boost is 0.
    pub fn from_dates<'a, I>(dates: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut range: Option<DateRange> = None;
        for date in dates.into_iter().filter_map(parse_date) {
            range = Some(match range {
                None => DateRange { min: date, max: date },
                Some(r) => DateRange { min: r.min.min(date), max: r.max.max(date) },
            });
        }
        range.unwrap_or_else(|| {
            let epoch = time::OffsetDateTime::UNIX_EPOCH;
            let epoch = PrimitiveDateTime::new(epoch.date(), epoch.time());
            DateRange { min: epoch, max: epoch }
        })
    }

    /// Recency boost in `[0, weight]`, growing linearly from `min` to `max`.
    /// Unparseable dates are treated as `min`.
    pub fn score(&self, date: &str, weight: f64) -> f64 {
        let date = parse_date_or(date, self.min);
        let min = timestamp(self.min);
        let span = (timestamp(self.max) - min).max(1.0);
        ((timestamp(date) - min) / span).abs() * weight
    }
}
