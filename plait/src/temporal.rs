//! Invariant parsing of dates, times, spans and UUIDs.

use core::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Hyphenated, simple, braced or URN form.
pub(crate) fn parse_uuid(input: &str) -> Option<Uuid> {
    Uuid::parse_str(input.trim()).ok()
}

/// A date and time with an explicit offset, if the text has one.
fn parse_with_offset(input: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(input, format).ok())
    })
}

/// A date and time without an offset; a bare date is taken as midnight.
fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Texts with an offset are converted to UTC, texts without one are taken
/// as UTC already.
pub(crate) fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    match parse_with_offset(input) {
        Some(with_offset) => Some(with_offset.naive_utc()),
        None => parse_naive(input),
    }
}

pub(crate) fn parse_date_time_utc(input: &str) -> Option<DateTime<Utc>> {
    parse_date_time(input).map(|naive| Utc.from_utc_datetime(&naive))
}

/// Keeps the offset the text names. Texts without one get a zero offset.
pub(crate) fn parse_date_time_offset(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    parse_with_offset(input).or_else(|| {
        let naive = parse_naive(input)?;
        Some(FixedOffset::east_opt(0)?.from_utc_datetime(&naive))
    })
}

pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_time(input).map(|date_time| date_time.date()))
}

fn digits(input: &str) -> Option<i128> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

/// Parses a time-of-day component that must stay below `limit`.
fn component(input: &str, limit: i128) -> Option<i128> {
    digits(input).filter(|value| *value < limit)
}

/// `[-][d.]hh:mm[:ss[.fffffff]]`, or `[-]d` for a whole number of days.
pub(crate) fn parse_time_delta(input: &str) -> Option<TimeDelta> {
    let input = input.trim();
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (days, clock) = match body.split_once(':') {
        None => (digits(body)?, None),
        // a dot before the first colon separates the days
        Some((head, _)) => match head.split_once('.') {
            Some((days, _)) => (digits(days)?, Some(&body[days.len() + 1..])),
            None => (0, Some(body)),
        },
    };

    let mut nanos = days.checked_mul(86_400 * NANOS_PER_SECOND)?;
    if let Some(clock) = clock {
        let mut parts = clock.split(':');
        let hours = component(parts.next()?, 24)?;
        let minutes = component(parts.next()?, 60)?;
        let (seconds, fraction) = match parts.next() {
            Some(seconds) => match seconds.split_once('.') {
                Some((seconds, fraction)) => (component(seconds, 60)?, fraction_nanos(fraction)?),
                None => (component(seconds, 60)?, 0),
            },
            None => (0, 0),
        };
        if parts.next().is_some() {
            return None;
        }
        let clock = ((hours * 60 + minutes) * 60 + seconds) * NANOS_PER_SECOND + fraction;
        nanos = nanos.checked_add(clock)?;
    }
    if negative {
        nanos = nanos.checked_neg()?;
    }

    let seconds = i64::try_from(nanos / NANOS_PER_SECOND).ok()?;
    let subsec = i64::try_from(nanos % NANOS_PER_SECOND).ok()?;
    TimeDelta::try_seconds(seconds)?.checked_add(&TimeDelta::nanoseconds(subsec))
}

/// One to seven digits of fractional seconds, as nanoseconds.
fn fraction_nanos(fraction: &str) -> Option<i128> {
    if fraction.len() > 7 {
        return None;
    }
    let value = digits(fraction)?;
    let scale = 10_i128.pow(9 - fraction.len() as u32);
    Some(value * scale)
}

/// Same grammar as [`parse_time_delta`], but negative spans don't fit.
pub(crate) fn parse_duration(input: &str) -> Option<Duration> {
    parse_time_delta(input)?.to_std().ok()
}
