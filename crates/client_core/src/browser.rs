use std::sync::Arc;

use shared::domain::{Event, EventId, PerPage};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    filters::{EventFilters, FilterChange, FilterKey},
    list_controller::{EventListController, EventsSource, ListView, LoadOutcome, RefreshCounter},
    preferences::{PreferenceError, TimezonePreference},
    validation::CreateEventForm,
    ClientError, EventApi,
};

pub const LOCATIONS_FAILURE: &str = "Failed to fetch locations";
pub const CREATE_FAILURE: &str = "Failed to create event";
pub const DETAIL_FAILURE: &str = "Failed to fetch event details";

/// Result of a filter change: the reload outcome plus any failure to persist
/// the timezone, which does not block the reload.
#[derive(Debug)]
pub struct FilterUpdate {
    pub outcome: Option<LoadOutcome>,
    pub save_error: Option<PreferenceError>,
}

/// Filters, the events list, and the persisted timezone behind one handle.
pub struct EventBrowser {
    api: Arc<dyn EventApi>,
    filters: Mutex<EventFilters>,
    list: EventListController,
    preference: Arc<dyn TimezonePreference>,
    refresh: Arc<RefreshCounter>,
}

impl EventBrowser {
    pub fn new(
        api: Arc<dyn EventApi>,
        preference: Arc<dyn TimezonePreference>,
        timezone: &str,
        refresh: Arc<RefreshCounter>,
    ) -> Self {
        Self {
            list: EventListController::new(EventsSource::new(Arc::clone(&api))),
            api,
            filters: Mutex::new(EventFilters::with_timezone(timezone)),
            preference,
            refresh,
        }
    }

    pub async fn filters(&self) -> EventFilters {
        self.filters.lock().await.clone()
    }

    pub async fn view(&self) -> ListView<Event> {
        self.list.snapshot().await
    }

    /// Loads when the filters or the refresh counter moved since the last load.
    pub async fn refresh(&self) -> Option<LoadOutcome> {
        let filters = self.filters().await;
        self.list.sync(&filters, self.refresh.current()).await
    }

    /// Applies filter changes, persists a new timezone, and reloads. The reload
    /// happens even when the timezone could not be saved.
    pub async fn apply<I>(&self, changes: I) -> FilterUpdate
    where
        I: IntoIterator<Item = FilterChange>,
    {
        self.update(|filters| filters.apply(changes)).await
    }

    /// Like [`Self::apply`] but lands on `page` with a single load.
    pub async fn apply_at_page<I>(&self, changes: I, page: u32) -> FilterUpdate
    where
        I: IntoIterator<Item = FilterChange>,
    {
        self.update(|filters| filters.apply(changes).go_to_page(page)).await
    }

    async fn update(&self, change: impl FnOnce(&EventFilters) -> EventFilters) -> FilterUpdate {
        let (previous_timezone, next) = {
            let mut filters = self.filters.lock().await;
            let previous = filters.timezone.clone();
            *filters = change(&*filters);
            (previous, filters.clone())
        };
        let save_error = if next.timezone == previous_timezone {
            None
        } else {
            match self.preference.save(&next.timezone) {
                Ok(()) => {
                    info!(timezone = %next.timezone, "timezone preference changed");
                    None
                }
                Err(err) => {
                    warn!(timezone = %next.timezone, error = %err, "could not persist timezone");
                    Some(err)
                }
            }
        };
        FilterUpdate {
            outcome: self.list.sync(&next, self.refresh.current()).await,
            save_error,
        }
    }

    pub async fn go_to_page(&self, page: u32) -> Option<LoadOutcome> {
        let next = {
            let mut filters = self.filters.lock().await;
            *filters = filters.go_to_page(page);
            filters.clone()
        };
        self.list.sync(&next, self.refresh.current()).await
    }

    pub async fn remove(&self, key: FilterKey, value: Option<&str>) -> Option<LoadOutcome> {
        let next = {
            let mut filters = self.filters.lock().await;
            *filters = filters.remove(key, value);
            filters.clone()
        };
        self.list.sync(&next, self.refresh.current()).await
    }

    pub async fn reset(&self) -> Option<LoadOutcome> {
        let next = {
            let mut filters = self.filters.lock().await;
            *filters = filters.reset();
            filters.clone()
        };
        self.list.sync(&next, self.refresh.current()).await
    }

    /// Distinct locations offered by the location filter.
    pub async fn locations(&self) -> Result<Vec<String>, String> {
        self.api.list_locations().await.map_err(|err| {
            let message = err.user_message(LOCATIONS_FAILURE);
            warn!(error = %err, %message, "location lookup failed");
            message
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    Found(Event),
    NotFound,
    Failed(String),
}

/// Finds a single event by scanning the first page of a wide list query.
pub struct EventDetailLookup {
    api: Arc<dyn EventApi>,
}

impl EventDetailLookup {
    pub const PER_PAGE: PerPage = PerPage::Fifty;

    pub fn new(api: Arc<dyn EventApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, event_id: EventId, timezone: &str) -> EventDetail {
        let query =
            EventFilters::with_timezone(timezone).apply([FilterChange::PerPage(Self::PER_PAGE)]);
        match self.api.list_events(&query).await {
            Ok(page) => page
                .data
                .into_iter()
                .find(|event| event.id == event_id)
                .map_or(EventDetail::NotFound, EventDetail::Found),
            Err(ClientError::NotFound) => EventDetail::NotFound,
            Err(err) => {
                let message = err.user_message(DETAIL_FAILURE);
                warn!(%event_id, error = %err, %message, "event detail lookup failed");
                EventDetail::Failed(message)
            }
        }
    }
}

/// Validates and submits the create-event form.
pub struct EventCreator {
    api: Arc<dyn EventApi>,
    refresh: Arc<RefreshCounter>,
}

impl EventCreator {
    pub fn new(api: Arc<dyn EventApi>, refresh: Arc<RefreshCounter>) -> Self {
        Self { api, refresh }
    }

    /// On success the refresh counter is bumped so open lists reload.
    pub async fn create(&self, form: &CreateEventForm) -> Result<Event, ClientError> {
        let request = form.validate()?;
        match self.api.create_event(&request).await {
            Ok(event) => {
                info!(event_id = %event.id, name = %event.name, "event created");
                self.refresh.bump();
                Ok(event)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    message = %err.user_message(CREATE_FAILURE),
                    "event creation failed"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/browser_tests.rs"]
mod tests;
