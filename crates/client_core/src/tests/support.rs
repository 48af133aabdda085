use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{Attendee, AttendeeId, Event, EventId},
    error::ApiErrorBody,
    protocol::{
        AttendeesPage, CreateEventRequest, EventsPage, FiltersApplied, PaginationMeta,
        RegisterAttendeeRequest,
    },
};

use crate::{filters::EventFilters, list_controller::AttendeeQuery, ClientError, EventApi};

pub const DUPLICATE_EMAIL: &str = "This email is already registered for this event.";

pub fn event(id: i64, name: &str, max_capacity: u32, current_attendees: u32) -> Event {
    Event {
        id: EventId(id),
        name: name.to_string(),
        location: "Bengaluru".to_string(),
        start_time: "2024-03-15T14:30:00+05:30".to_string(),
        end_time: "2024-03-15T17:00:00+05:30".to_string(),
        max_capacity,
        current_attendees,
        available_capacity: max_capacity.saturating_sub(current_attendees),
        created_at: "2024-03-01T09:00:00+05:30".to_string(),
        updated_at: "2024-03-01T09:00:00+05:30".to_string(),
    }
}

fn meta(page: u32, per_page: u32, total: usize) -> PaginationMeta {
    let total = total as u64;
    let per_page = per_page.max(1);
    let last_page = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX).max(1);
    let from = if total == 0 {
        0
    } else {
        u64::from(page - 1) * u64::from(per_page) + 1
    };
    PaginationMeta {
        current_page: page,
        per_page,
        total,
        last_page,
        from,
        to: (u64::from(page) * u64::from(per_page)).min(total),
    }
}

#[derive(Default)]
pub struct FakeEventApi {
    pub events: Mutex<Vec<Event>>,
    pub attendees: Mutex<Vec<Attendee>>,
    pub locations: Mutex<Vec<String>>,
    pub event_queries: Mutex<Vec<EventFilters>>,
    pub created: Mutex<Vec<CreateEventRequest>>,
    pub fail_next: Mutex<Option<ClientError>>,
}

impl FakeEventApi {
    pub fn with_events(events: Vec<Event>) -> Self {
        let api = Self::default();
        *api.events.lock().expect("events") = events;
        api
    }

    pub fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().expect("fail_next") = Some(err);
    }

    fn take_failure(&self) -> Result<(), ClientError> {
        match self.fail_next.lock().expect("fail_next").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn event_query_count(&self) -> usize {
        self.event_queries.lock().expect("queries").len()
    }

    pub fn last_event_query(&self) -> Option<EventFilters> {
        self.event_queries.lock().expect("queries").last().cloned()
    }
}

#[async_trait]
impl EventApi for FakeEventApi {
    async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, ClientError> {
        self.take_failure()?;
        self.created.lock().expect("created").push(request.clone());
        let mut events = self.events.lock().expect("events");
        let mut created = event(events.len() as i64 + 1, &request.name, request.max_capacity, 0);
        created.location = request.location.clone();
        events.push(created.clone());
        Ok(created)
    }

    async fn list_events(&self, filters: &EventFilters) -> Result<EventsPage, ClientError> {
        self.event_queries
            .lock()
            .expect("queries")
            .push(filters.clone());
        self.take_failure()?;
        let events = self.events.lock().expect("events").clone();
        let pagination = meta(filters.page, filters.per_page.get(), events.len());
        Ok(EventsPage {
            data: events,
            pagination,
            filters_applied: FiltersApplied::default(),
        })
    }

    async fn list_locations(&self) -> Result<Vec<String>, ClientError> {
        self.take_failure()?;
        Ok(self.locations.lock().expect("locations").clone())
    }

    async fn register_attendee(
        &self,
        event_id: EventId,
        request: &RegisterAttendeeRequest,
    ) -> Result<Attendee, ClientError> {
        self.take_failure()?;
        let mut attendees = self.attendees.lock().expect("attendees");
        let duplicate = attendees.iter().any(|attendee| {
            attendee.event_id == event_id && attendee.email.eq_ignore_ascii_case(&request.email)
        });
        if duplicate {
            return Err(ClientError::rejected(
                422,
                ApiErrorBody::new("The given data was invalid.")
                    .with_field_error("email", DUPLICATE_EMAIL),
            ));
        }
        let attendee = Attendee {
            id: AttendeeId(attendees.len() as i64 + 1),
            event_id,
            name: request.name.clone(),
            email: request.email.clone(),
            created_at: "2024-03-10T10:00:00+05:30".to_string(),
            updated_at: "2024-03-10T10:00:00+05:30".to_string(),
        };
        attendees.push(attendee.clone());
        Ok(attendee)
    }

    async fn list_attendees(&self, query: &AttendeeQuery) -> Result<AttendeesPage, ClientError> {
        self.take_failure()?;
        let attendees: Vec<Attendee> = self
            .attendees
            .lock()
            .expect("attendees")
            .iter()
            .filter(|attendee| attendee.event_id == query.event_id)
            .cloned()
            .collect();
        let pagination = meta(query.page, query.per_page.get(), attendees.len());
        Ok(AttendeesPage {
            data: attendees,
            pagination,
            event: None,
        })
    }
}
