use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::{
    domain::{Attendee, Event, EventId, PerPage},
    protocol::{AttendeesQuery, PaginationMeta},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{filters::EventFilters, pagination::PaginationState, ClientError, EventApi};

pub const EVENTS_FAILURE: &str = "Failed to fetch events";
pub const ATTENDEES_FAILURE: &str = "Failed to fetch attendees";

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Read-only collaborator a list view fetches from.
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Clone + Send + Sync;
    type Query: Clone + PartialEq + Send + Sync;

    async fn fetch(&self, query: &Self::Query) -> Result<ListPage<Self::Item>, ClientError>;

    /// Shown when a failure carries no message of its own.
    fn failure_message(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed(String),
    /// A newer load was issued while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationState>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl<T> ListView<T> {
    pub fn is_empty_state(&self) -> bool {
        !self.loading && self.items.is_empty()
    }
}

/// Manual refresh trigger, bumped after a create or a registration.
#[derive(Debug, Default)]
pub struct RefreshCounter(AtomicU64);

impl RefreshCounter {
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

struct ListState<T, Q> {
    items: Vec<T>,
    pagination: Option<PaginationMeta>,
    loading: bool,
    last_error: Option<String>,
    latest_token: u64,
    last_trigger: Option<(Q, u64)>,
}

pub struct ListController<S: ListSource> {
    source: S,
    state: Mutex<ListState<S::Item, S::Query>>,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(ListState {
                items: Vec::new(),
                pagination: None,
                loading: false,
                last_error: None,
                latest_token: 0,
                last_trigger: None,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self, query: &S::Query) -> LoadOutcome {
        let token = {
            let mut guard = self.state.lock().await;
            guard.latest_token += 1;
            guard.loading = true;
            guard.latest_token
        };

        let result = self.source.fetch(query).await;

        let mut guard = self.state.lock().await;
        if token != guard.latest_token {
            debug!(
                token,
                latest = guard.latest_token,
                "discarding superseded list response"
            );
            return LoadOutcome::Superseded;
        }
        guard.loading = false;

        match result {
            Ok(page) => {
                guard.items = page.items;
                guard.pagination = Some(page.pagination);
                guard.last_error = None;
                LoadOutcome::Applied
            }
            Err(err) => {
                let message = err.user_message(self.source.failure_message());
                warn!(error = %err, %message, "list load failed");
                guard.last_error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Loads only when the query or the refresh counter moved since the last
    /// trigger. Returns `None` when nothing changed.
    pub async fn sync(&self, query: &S::Query, refresh: u64) -> Option<LoadOutcome> {
        {
            let mut guard = self.state.lock().await;
            let unchanged = guard
                .last_trigger
                .as_ref()
                .is_some_and(|(last_query, last_refresh)| {
                    last_query == query && *last_refresh == refresh
                });
            if unchanged {
                return None;
            }
            guard.last_trigger = Some((query.clone(), refresh));
        }
        Some(self.load(query).await)
    }

    pub async fn snapshot(&self) -> ListView<S::Item> {
        let guard = self.state.lock().await;
        ListView {
            items: guard.items.clone(),
            pagination: guard.pagination.map(PaginationState::new),
            loading: guard.loading,
            last_error: guard.last_error.clone(),
        }
    }

    pub async fn clear_error(&self) {
        self.state.lock().await.last_error = None;
    }
}

pub struct EventsSource {
    api: Arc<dyn EventApi>,
}

impl EventsSource {
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for EventsSource {
    type Item = Event;
    type Query = EventFilters;

    async fn fetch(&self, query: &EventFilters) -> Result<ListPage<Event>, ClientError> {
        let page = self.api.list_events(query).await?;
        Ok(ListPage {
            items: page.data,
            pagination: page.pagination,
        })
    }

    fn failure_message(&self) -> &'static str {
        EVENTS_FAILURE
    }
}

pub type EventListController = ListController<EventsSource>;

/// Query state for one event's attendee list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeQuery {
    pub event_id: EventId,
    pub page: u32,
    pub per_page: PerPage,
    pub search_for: Option<String>,
}

impl AttendeeQuery {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            page: 1,
            per_page: PerPage::default(),
            search_for: None,
        }
    }

    pub fn search(&self, term: &str) -> Self {
        Self {
            page: 1,
            search_for: Some(term.to_string()).filter(|value| !value.trim().is_empty()),
            ..self.clone()
        }
    }

    pub fn go_to_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn set_per_page(&self, per_page: PerPage) -> Self {
        Self {
            page: 1,
            per_page,
            ..self.clone()
        }
    }

    pub fn to_query(&self) -> AttendeesQuery {
        AttendeesQuery {
            page: self.page,
            per_page: self.per_page,
            search_for: self.search_for.clone(),
        }
    }
}

pub struct AttendeesSource {
    api: Arc<dyn EventApi>,
}

impl AttendeesSource {
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for AttendeesSource {
    type Item = Attendee;
    type Query = AttendeeQuery;

    async fn fetch(&self, query: &AttendeeQuery) -> Result<ListPage<Attendee>, ClientError> {
        let page = self.api.list_attendees(query).await?;
        Ok(ListPage {
            items: page.data,
            pagination: page.pagination,
        })
    }

    fn failure_message(&self) -> &'static str {
        ATTENDEES_FAILURE
    }
}

pub type AttendeeListController = ListController<AttendeesSource>;

/// Case-insensitive name/email match over the rows already on screen.
pub fn filter_attendees_locally<'a>(attendees: &'a [Attendee], term: &str) -> Vec<&'a Attendee> {
    let needle = term.trim().to_lowercase();
    attendees
        .iter()
        .filter(|attendee| {
            needle.is_empty()
                || attendee.name.to_lowercase().contains(&needle)
                || attendee.email.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
