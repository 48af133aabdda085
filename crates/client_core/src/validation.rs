use chrono::NaiveDateTime;
use shared::{
    error::FieldErrors,
    protocol::{CreateEventRequest, RegisterAttendeeRequest},
};
use thiserror::Error;
use validator::validate_email;

use crate::timezones::is_known_timezone;

const MAX_TEXT_LEN: usize = 255;
const MIN_CAPACITY: u32 = 1;
const MAX_CAPACITY: u32 = 10_000;
const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", describe(.fields))]
pub struct ValidationErrors {
    fields: FieldErrors,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn first_message(&self) -> Option<&str> {
        self.fields
            .values()
            .find_map(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn describe(fields: &FieldErrors) -> String {
    fields
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("{field}: {message}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
}

impl RegistrationForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<RegisterAttendeeRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = self.name.trim();
        let email = self.email.trim();

        check_text(&mut errors, "name", name, "Name");

        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if email.chars().count() > MAX_TEXT_LEN {
            errors.push("email", "Email is too long");
        } else if !validate_email(email) {
            errors.push("email", "Please enter a valid email");
        }

        errors.into_result(RegisterAttendeeRequest {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventForm {
    pub name: String,
    pub location: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub max_capacity: u32,
    pub timezone: String,
}

impl CreateEventForm {
    pub fn validate(&self) -> Result<CreateEventRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = self.name.trim();
        let location = self.location.trim();

        check_text(&mut errors, "name", name, "Event name");
        check_text(&mut errors, "location", location, "Location");

        if self.start_time.is_none() {
            errors.push("start_time", "Start time is required");
        }
        match (self.start_time, self.end_time) {
            (_, None) => errors.push("end_time", "End time is required"),
            (Some(start), Some(end)) if end <= start => {
                errors.push("end_time", "End time must be after start time");
            }
            _ => {}
        }

        if self.max_capacity < MIN_CAPACITY {
            errors.push("max_capacity", "Capacity must be at least 1");
        } else if self.max_capacity > MAX_CAPACITY {
            errors.push("max_capacity", "Capacity cannot exceed 10000");
        }

        if !is_known_timezone(&self.timezone) {
            errors.push("timezone", "Select a supported timezone");
        }

        let format = |time: Option<NaiveDateTime>| {
            time.map(|value| value.format(WIRE_DATETIME_FORMAT).to_string())
                .unwrap_or_default()
        };
        errors.into_result(CreateEventRequest {
            name: name.to_string(),
            location: location.to_string(),
            start_time: format(self.start_time),
            end_time: format(self.end_time),
            max_capacity: self.max_capacity,
            timezone: Some(self.timezone.clone()),
        })
    }
}

fn check_text(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) {
    if value.is_empty() {
        errors.push(field, format!("{label} is required"));
    } else if value.chars().count() > MAX_TEXT_LEN {
        errors.push(field, format!("{label} is too long"));
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
