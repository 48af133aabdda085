use std::{sync::Arc, time::Duration};

use shared::domain::{Attendee, Event, EventId};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    list_controller::RefreshCounter,
    validation::{RegistrationForm, ValidationErrors},
    EventApi,
};

pub const REGISTRATION_FAILURE: &str = "Failed to register attendee";
pub const CONFIRMATION_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    Idle,
    Submitting,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    Registered { event_id: EventId, attendee: Attendee },
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("a registration is already being submitted")]
    InFlight,
    #[error("event is full")]
    EventFull,
    #[error("{0}")]
    Failed(String),
}

struct RegistrationState {
    status: RegistrationStatus,
    // Bumped per submission so a stale confirmation timer cannot reset a newer one.
    generation: u64,
}

pub struct RegistrationController {
    api: Arc<dyn EventApi>,
    state: Arc<Mutex<RegistrationState>>,
    events: broadcast::Sender<RegistrationEvent>,
    confirmation_delay: Duration,
    refresh: Option<Arc<RefreshCounter>>,
}

impl RegistrationController {
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            api,
            state: Arc::new(Mutex::new(RegistrationState {
                status: RegistrationStatus::Idle,
                generation: 0,
            })),
            events,
            confirmation_delay: CONFIRMATION_DELAY,
            refresh: None,
        }
    }

    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Counter bumped together with the `Registered` notification.
    pub fn with_refresh(mut self, refresh: Arc<RefreshCounter>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> RegistrationStatus {
        self.state.lock().await.status.clone()
    }

    pub fn can_register(event: &Event) -> bool {
        !event.is_full()
    }

    /// Same as [`Self::register`], refusing up front when no seats remain.
    pub async fn register_for(
        &self,
        event: &Event,
        form: &RegistrationForm,
    ) -> Result<Attendee, RegistrationError> {
        if !Self::can_register(event) {
            return Err(RegistrationError::EventFull);
        }
        self.register(event.id, form).await
    }

    pub async fn register(
        &self,
        event_id: EventId,
        form: &RegistrationForm,
    ) -> Result<Attendee, RegistrationError> {
        let request = form.validate()?;

        let generation = {
            let mut state = self.state.lock().await;
            if state.status == RegistrationStatus::Submitting {
                return Err(RegistrationError::InFlight);
            }
            state.status = RegistrationStatus::Submitting;
            state.generation += 1;
            state.generation
        };

        match self.api.register_attendee(event_id, &request).await {
            Ok(attendee) => {
                info!(%event_id, attendee_id = %attendee.id, "attendee registered");
                self.state.lock().await.status = RegistrationStatus::Success;
                self.schedule_confirmation(generation, event_id, attendee.clone());
                Ok(attendee)
            }
            Err(err) => {
                let message = err.user_message(REGISTRATION_FAILURE);
                warn!(%event_id, error = %err, %message, "registration failed");
                self.state.lock().await.status = RegistrationStatus::Error(message.clone());
                Err(RegistrationError::Failed(message))
            }
        }
    }

    /// Clears an error so the form can be resubmitted.
    pub async fn dismiss_error(&self) {
        let mut state = self.state.lock().await;
        if matches!(state.status, RegistrationStatus::Error(_)) {
            state.status = RegistrationStatus::Idle;
        }
    }

    fn schedule_confirmation(&self, generation: u64, event_id: EventId, attendee: Attendee) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let refresh = self.refresh.clone();
        let delay = self.confirmation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = state.lock().await;
                if state.generation == generation && state.status == RegistrationStatus::Success {
                    state.status = RegistrationStatus::Idle;
                }
            }
            if let Some(refresh) = refresh {
                refresh.bump();
            }
            // No subscribers is fine.
            let _ = events.send(RegistrationEvent::Registered { event_id, attendee });
        });
    }
}

#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod tests;
