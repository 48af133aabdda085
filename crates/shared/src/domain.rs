use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EventId);
id_newtype!(AttendeeId);

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a snake_case wire enum with `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Columns the event list can be ordered by.
    SortField, "sort field", {
        Name => "name",
        Location => "location",
        StartTime => "start_time",
        EndTime => "end_time",
        MaxCapacity => "max_capacity",
        CurrentAttendees => "current_attendees",
    }
);

wire_enum!(
    /// Columns a free-text search is matched against; `All` searches every column.
    SearchField, "search field", {
        All => "all",
        Name => "name",
        Location => "location",
        StartTime => "start_time",
        EndTime => "end_time",
        MaxCapacity => "max_capacity",
        CurrentAttendees => "current_attendees",
    }
);

wire_enum!(SortOrder, "sort order", {
    Asc => "asc",
    Desc => "desc",
});

impl SortField {
    pub fn label(self) -> &'static str {
        match self {
            SortField::Name => "Event Name",
            SortField::Location => "Location",
            SortField::StartTime => "Start Time",
            SortField::EndTime => "End Time",
            SortField::MaxCapacity => "Max Capacity",
            SortField::CurrentAttendees => "Current Attendees",
        }
    }
}

impl SearchField {
    pub fn label(self) -> &'static str {
        match self {
            SearchField::All => "All Fields",
            SearchField::Name => "Event Name",
            SearchField::Location => "Location",
            SearchField::StartTime => "Start Date",
            SearchField::EndTime => "End Date",
            SearchField::MaxCapacity => "Max Capacity",
            SearchField::CurrentAttendees => "Current Attendees",
        }
    }
}

/// Page sizes the list views offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PerPage {
    Five,
    #[default]
    Ten,
    Fifteen,
    Twenty,
    Fifty,
}

impl PerPage {
    pub const ALL: &'static [PerPage] = &[
        PerPage::Five,
        PerPage::Ten,
        PerPage::Fifteen,
        PerPage::Twenty,
        PerPage::Fifty,
    ];

    pub fn get(self) -> u32 {
        match self {
            PerPage::Five => 5,
            PerPage::Ten => 10,
            PerPage::Fifteen => 15,
            PerPage::Twenty => 20,
            PerPage::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PerPage {
    type Error = ParseEnumError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PerPage::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.get() == value)
            .ok_or_else(|| ParseEnumError {
                kind: "page size",
                value: value.to_string(),
            })
    }
}

impl From<PerPage> for u32 {
    fn from(value: PerPage) -> Self {
        value.get()
    }
}

impl FromStr for PerPage {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value.trim().parse::<u32>().map_err(|_| ParseEnumError {
            kind: "page size",
            value: value.to_string(),
        })?;
        PerPage::try_from(parsed)
    }
}

impl fmt::Display for PerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityLevel {
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub max_capacity: u32,
    pub current_attendees: u32,
    pub available_capacity: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    /// Seats left computed from the counters, never negative.
    pub fn remaining_capacity(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_attendees)
    }

    pub fn is_full(&self) -> bool {
        self.available_capacity == 0
    }

    pub fn capacity_percentage(&self) -> f64 {
        if self.max_capacity == 0 {
            return 100.0;
        }
        f64::from(self.current_attendees) / f64::from(self.max_capacity) * 100.0
    }

    pub fn capacity_level(&self) -> CapacityLevel {
        let percentage = self.capacity_percentage();
        if percentage >= 90.0 {
            CapacityLevel::Critical
        } else if percentage >= 75.0 {
            CapacityLevel::High
        } else {
            CapacityLevel::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub event_id: EventId,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}
