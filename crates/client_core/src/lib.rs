use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Attendee, Event, EventId},
    error::ApiErrorBody,
    protocol::{
        paths, ApiEnvelope, ApiOutcome, AttendeesPage, CreateEventRequest, EventsPage,
        RegisterAttendeeRequest,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod browser;
pub mod date_format;
pub mod error;
pub mod filters;
pub mod list_controller;
pub mod pagination;
pub mod preferences;
pub mod registration;
pub mod timezones;
pub mod validation;

pub use error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
/// Upper bound for every API call; exceeding it fails with [`ClientError::Timeout`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The remote event service as the dashboard consumes it.
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, ClientError>;
    async fn list_events(&self, filters: &filters::EventFilters) -> Result<EventsPage, ClientError>;
    async fn list_locations(&self) -> Result<Vec<String>, ClientError>;
    async fn register_attendee(
        &self,
        event_id: EventId,
        request: &RegisterAttendeeRequest,
    ) -> Result<Attendee, ClientError>;
    async fn list_attendees(
        &self,
        query: &list_controller::AttendeeQuery,
    ) -> Result<AttendeesPage, ClientError>;
}

pub struct HttpEventApi {
    http: Client,
    base_url: String,
}

impl HttpEventApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| {
            ClientError::Transport(format!("invalid api base url '{base_url}': {err}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Transport(format!(
                "api base url must start with http:// or https://, got '{base_url}'"
            )));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|err| {
            warn!(path, error = %err, "api request failed");
            ClientError::from(err)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(path, "api resource not found");
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            let error_body = serde_json::from_slice::<ApiErrorBody>(&body).unwrap_or_default();
            warn!(
                path,
                status = status.as_u16(),
                message = error_body.summary().unwrap_or_default(),
                "api responded with error status"
            );
            return Err(ClientError::rejected(status.as_u16(), error_body));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body).map_err(|err| {
            warn!(path, error = %err, "api response did not match envelope");
            ClientError::Decode(err.to_string())
        })?;
        match envelope.into_outcome() {
            ApiOutcome::Success { data, .. } => Ok(data),
            ApiOutcome::Failure(error_body) => {
                warn!(
                    path,
                    message = error_body.summary().unwrap_or_default(),
                    "api reported failure"
                );
                Err(ClientError::rejected(status.as_u16(), error_body))
            }
            ApiOutcome::Malformed(reason) => Err(ClientError::Decode(reason)),
        }
    }
}

#[async_trait]
impl EventApi for HttpEventApi {
    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, ClientError> {
        let builder = self.request(Method::POST, paths::EVENTS).json(request);
        self.send(builder, paths::EVENTS).await
    }

    async fn list_events(&self, filters: &filters::EventFilters) -> Result<EventsPage, ClientError> {
        let builder = self
            .request(Method::GET, paths::EVENTS)
            .query(&filters.to_query());
        self.send(builder, paths::EVENTS).await
    }

    async fn list_locations(&self) -> Result<Vec<String>, ClientError> {
        let builder = self.request(Method::GET, paths::LOCATIONS);
        self.send(builder, paths::LOCATIONS).await
    }

    async fn register_attendee(
        &self,
        event_id: EventId,
        request: &RegisterAttendeeRequest,
    ) -> Result<Attendee, ClientError> {
        let path = paths::register(event_id);
        let builder = self.request(Method::POST, &path).json(request);
        self.send(builder, &path).await
    }

    async fn list_attendees(
        &self,
        query: &list_controller::AttendeeQuery,
    ) -> Result<AttendeesPage, ClientError> {
        let path = paths::attendees(query.event_id);
        let builder = self.request(Method::GET, &path).query(&query.to_query());
        self.send(builder, &path).await
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
