use super::*;

/// Sakamoto's day-of-week, 0 = Sunday.
fn sakamoto(year: i32, month: u32, day: u32) -> usize {
    const T: [i32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let dow = (y + y / 4 - y / 100 + y / 400 + T[(month - 1) as usize] + day as i32) % 7;
    dow as usize
}

const SUNDAY_FIRST: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[test]
fn formats_strict_timestamp_without_applying_offset() {
    let formatted = format_event_date("2024-03-15T14:30:00+05:30");
    assert_eq!(formatted.tier, DateTier::Strict);
    assert_eq!(formatted.date, "March 15, 2024");
    assert_eq!(formatted.time, "14:30");
    assert_eq!(formatted.weekday, "Friday");
    assert_eq!(formatted.offset_label, "UTC+05:30");
    assert_eq!(formatted.date_time, "Friday, March 15, 2024 • 14:30");
}

#[test]
fn negative_offsets_and_midnight_keep_literal_fields() {
    let formatted = format_event_date("2023-01-01T00:05:09-08:00");
    assert_eq!(formatted.date, "January 1, 2023");
    assert_eq!(formatted.time, "00:05");
    assert_eq!(formatted.weekday, "Sunday");
    assert_eq!(formatted.offset_label, "UTC-08:00");
}

#[test]
fn weekday_matches_independent_gregorian_calculation() {
    for year in [1900, 1999, 2000, 2024, 2100] {
        for month in 1..=12u32 {
            for day in [1u32, 14, 28] {
                let input = format!("{year:04}-{month:02}-{day:02}T09:15:00+00:00");
                let formatted = format_event_date(&input);
                assert_eq!(formatted.tier, DateTier::Strict, "{input}");
                assert_eq!(
                    formatted.weekday,
                    SUNDAY_FIRST[sakamoto(year, month, day)],
                    "{input}"
                );
                assert_eq!(
                    formatted.date,
                    format!("{} {day}, {year}", MONTH_NAMES[(month - 1) as usize])
                );
            }
        }
    }
}

#[test]
fn leap_day_is_strict() {
    let formatted = format_event_date("2024-02-29T23:59:59+14:00");
    assert_eq!(formatted.weekday, "Thursday");
    assert_eq!(formatted.offset_label, "UTC+14:00");
}

#[test]
fn other_iso_shapes_fall_back_to_locale_style() {
    let formatted = format_event_date("2024-03-15T14:30:00Z");
    assert_eq!(formatted.tier, DateTier::Fallback);
    assert_eq!(formatted.date, "3/15/2024");
    assert_eq!(formatted.time, "2:30:00 PM");
    assert_eq!(formatted.date_time, "3/15/2024, 2:30:00 PM");
    assert_eq!(formatted.weekday, "Friday");
    assert_eq!(formatted.offset_label, "Fallback");

    let formatted = format_event_date("2024-03-15 09:05:00");
    assert_eq!(formatted.tier, DateTier::Fallback);
    assert_eq!(formatted.time, "9:05:00 AM");

    let formatted = format_event_date("2024-03-15");
    assert_eq!(formatted.tier, DateTier::Fallback);
    assert_eq!(formatted.time, "12:00:00 AM");
}

#[test]
fn malformed_input_yields_placeholder_everywhere() {
    for input in [
        "",
        "   ",
        "yesterday",
        "2024-13-01T10:00:00+00:00",
        "2024-02-30T10:00:00+00:00",
        "2024-03-15T25:00:00+00:00",
        "2024-03-15 14:30:00 +05:30 extra",
        "２０２４-03-15T14:30:00+05:30",
    ] {
        let formatted = format_event_date(input);
        assert!(!formatted.is_valid(), "{input:?}");
        for field in [
            &formatted.date_time,
            &formatted.date,
            &formatted.time,
            &formatted.weekday,
            &formatted.offset_label,
        ] {
            assert_eq!(field, INVALID_DATE, "{input:?}");
        }
    }
}

#[test]
fn impossible_calendar_day_in_strict_shape_is_invalid() {
    let formatted = format_event_date("2024-02-30T10:00:00+05:30");
    assert_eq!(formatted.tier, DateTier::Invalid);
    assert_eq!(formatted, FormattedDate::invalid());
    assert_eq!(formatted.date, INVALID_DATE);
    assert_eq!(formatted.offset_label, INVALID_DATE);
}

#[test]
fn compact_and_registration_formats() {
    assert_eq!(format_compact("2024-03-05T08:00:00+05:30"), "Mar 05, 2024 08:00");
    assert_eq!(
        format_registered_at("2024-03-05T18:45:00.000000Z"),
        "Mar 05, 2024 • 18:45"
    );
    assert_eq!(format_compact("soon"), INVALID_DATE);
}
