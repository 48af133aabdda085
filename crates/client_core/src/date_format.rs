use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

pub const INVALID_DATE: &str = "Invalid date";
const FALLBACK_OFFSET_LABEL: &str = "Fallback";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Which parsing stage produced a [`FormattedDate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTier {
    Strict,
    Fallback,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDate {
    /// `Friday, March 15, 2024 • 14:30` for strict input.
    pub date_time: String,
    pub date: String,
    pub time: String,
    pub weekday: String,
    /// `UTC+05:30` for strict input.
    pub offset_label: String,
    pub tier: DateTier,
}

impl FormattedDate {
    fn invalid() -> Self {
        Self {
            date_time: INVALID_DATE.to_string(),
            date: INVALID_DATE.to_string(),
            time: INVALID_DATE.to_string(),
            weekday: INVALID_DATE.to_string(),
            offset_label: INVALID_DATE.to_string(),
            tier: DateTier::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tier != DateTier::Invalid
    }
}

struct StrictTimestamp<'a> {
    year: &'a str,
    hours: &'a str,
    minutes: &'a str,
    offset: &'a str,
    naive: NaiveDateTime,
}

pub fn format_event_date(input: &str) -> FormattedDate {
    if let Some(strict) = parse_strict(input) {
        return format_strict(&strict);
    }
    match parse_generic(input) {
        Some(naive) => format_fallback(naive),
        None => FormattedDate::invalid(),
    }
}

/// `Mar 15, 2024 14:30`, as shown on event cards.
pub fn format_compact(input: &str) -> String {
    wall_clock(input)
        .map(|naive| naive.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `Mar 15, 2024 • 14:30`, as shown next to an attendee's registration.
pub fn format_registered_at(input: &str) -> String {
    wall_clock(input)
        .map(|naive| naive.format("%b %d, %Y • %H:%M").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn wall_clock(input: &str) -> Option<NaiveDateTime> {
    parse_strict(input)
        .map(|strict| strict.naive)
        .or_else(|| parse_generic(input))
}

fn parse_strict(input: &str) -> Option<StrictTimestamp<'_>> {
    const SHAPE: &[u8; 25] = b"dddd-dd-ddTdd:dd:dd#dd:dd";

    let bytes = input.as_bytes();
    if bytes.len() != SHAPE.len() {
        return None;
    }
    let shape_matches = SHAPE.iter().zip(bytes).all(|(expected, actual)| match expected {
        b'd' => actual.is_ascii_digit(),
        b'#' => matches!(actual, b'+' | b'-'),
        literal => literal == actual,
    });
    if !shape_matches {
        return None;
    }

    // All bytes are ASCII past the shape check.
    let number = |range: std::ops::Range<usize>| input[range].parse::<u32>().ok();
    let year = input[0..4].parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(5..7)?, number(8..10)?)?;
    let time = NaiveTime::from_hms_opt(number(11..13)?, number(14..16)?, number(17..19)?)?;

    Some(StrictTimestamp {
        year: &input[0..4],
        hours: &input[11..13],
        minutes: &input[14..16],
        offset: &input[19..25],
        naive: NaiveDateTime::new(date, time),
    })
}

fn format_strict(strict: &StrictTimestamp<'_>) -> FormattedDate {
    let date = strict.naive.date();
    let month = MONTH_NAMES[date.month0() as usize];
    let weekday = weekday_name(date.weekday());
    let time = format!("{}:{}", strict.hours, strict.minutes);
    let long_date = format!("{month} {}, {}", date.day(), strict.year);

    FormattedDate {
        date_time: format!("{weekday}, {long_date} • {time}"),
        date: long_date,
        time,
        weekday: weekday.to_string(),
        offset_label: format!("UTC{}", strict.offset),
        tier: DateTier::Strict,
    }
}

fn parse_generic(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.naive_local());
    }
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn format_fallback(naive: NaiveDateTime) -> FormattedDate {
    let date = naive.format("%-m/%-d/%Y").to_string();
    let time = naive.format("%-I:%M:%S %p").to_string();
    FormattedDate {
        date_time: format!("{date}, {time}"),
        date,
        time,
        weekday: weekday_name(naive.weekday()).to_string(),
        offset_label: FALLBACK_OFFSET_LABEL.to_string(),
        tier: DateTier::Fallback,
    }
}

#[cfg(test)]
#[path = "tests/date_format_tests.rs"]
mod tests;
