pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

pub const TIMEZONES: &[&str] = &[
    "Asia/Kolkata",
    "America/New_York",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Asia/Tokyo",
    "Asia/Singapore",
    "Australia/Sydney",
    "Pacific/Auckland",
    "Africa/Cairo",
    "Asia/Dubai",
    "America/Chicago",
    "America/Toronto",
    "Europe/Berlin",
    "Asia/Hong_Kong",
    "Asia/Shanghai",
    "America/Sao_Paulo",
    "Africa/Johannesburg",
    "Asia/Seoul",
    "Europe/Moscow",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneOption {
    pub value: &'static str,
    pub label: String,
}

pub fn timezone_options() -> Vec<TimezoneOption> {
    TIMEZONES
        .iter()
        .map(|&value| TimezoneOption {
            value,
            label: value.replacen('_', " ", 1),
        })
        .collect()
}

pub fn is_known_timezone(name: &str) -> bool {
    TIMEZONES.contains(&name)
}
