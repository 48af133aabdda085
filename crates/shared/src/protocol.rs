use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{Attendee, Event, EventId, PerPage, SearchField, SortField, SortOrder},
    error::{ApiErrorBody, FieldErrors},
};

/// Every API response is wrapped as `{success, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: FieldErrors::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: FieldErrors::new(),
        }
    }

    pub fn into_outcome(self) -> ApiOutcome<T> {
        match (self.success, self.data) {
            (true, Some(data)) => ApiOutcome::Success {
                message: self.message,
                data,
            },
            (true, None) => ApiOutcome::Malformed("successful response carried no data".into()),
            (false, _) => ApiOutcome::Failure(ApiErrorBody {
                message: Some(self.message).filter(|text| !text.is_empty()),
                error: None,
                errors: self.errors,
            }),
        }
    }
}

/// Envelope validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success { message: String, data: T },
    Failure(ApiErrorBody),
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub from: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub to: u64,
}

impl PaginationMeta {
    /// Placeholder shown before the first successful fetch.
    pub fn empty(per_page: u32) -> Self {
        Self {
            current_page: 1,
            per_page,
            total: 0,
            last_page: 1,
            from: 0,
            to: 0,
        }
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersApplied {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub search_for: Option<String>,
    #[serde(default)]
    pub search_in: Option<String>,
    #[serde(default)]
    pub filter_by_location: Option<Vec<String>>,
    #[serde(default)]
    pub seat_available_events: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsPage {
    pub data: Vec<Event>,
    pub pagination: PaginationMeta,
    #[serde(default)]
    pub filters_applied: FiltersApplied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeesPage {
    pub data: Vec<Attendee>,
    pub pagination: PaginationMeta,
    #[serde(default)]
    pub event: Option<Event>,
}

/// Query string for `GET /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventsQuery {
    pub page: u32,
    pub per_page: PerPage,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_for: Option<String>,
    pub search_in: SearchField,
    /// Comma-joined location names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_location: Option<String>,
    pub seat_available_events: bool,
    pub timezone: String,
}

/// Query string for `GET /events/{id}/attendees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeesQuery {
    pub page: u32,
    pub per_page: PerPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub location: String,
    /// Wall-clock `YYYY-MM-DD HH:MM:SS` in `timezone`.
    pub start_time: String,
    pub end_time: String,
    pub max_capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAttendeeRequest {
    pub name: String,
    pub email: String,
}

/// Path helpers shared by the HTTP client and test servers.
pub mod paths {
    use super::EventId;

    pub const EVENTS: &str = "/events";
    pub const LOCATIONS: &str = "/events/locations";

    pub fn register(event_id: EventId) -> String {
        format!("/events/{}/register", event_id.0)
    }

    pub fn attendees(event_id: EventId) -> String {
        format!("/events/{}/attendees", event_id.0)
    }
}
