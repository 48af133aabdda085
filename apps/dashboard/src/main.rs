use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use client_core::{
    browser::{EventBrowser, EventCreator, EventDetail, EventDetailLookup, CREATE_FAILURE},
    filters::FilterChange,
    list_controller::{
        filter_attendees_locally, AttendeeListController, AttendeeQuery, AttendeesSource,
        LoadOutcome, RefreshCounter,
    },
    preferences::{startup_timezone, FileTimezonePreference, TimezonePreference},
    registration::{RegistrationController, RegistrationError},
    timezones::{is_known_timezone, timezone_options},
    validation::{CreateEventForm, RegistrationForm},
    EventApi, HttpEventApi,
};
use shared::domain::{EventId, PerPage, SearchField, SortField, SortOrder};
use tracing::info;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(about = "Browse events, manage attendees, and register from the terminal")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Timezone for this run only; use `set-timezone` to persist one.
    #[arg(long)]
    timezone: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists events with search, sort, and location filters.
    Events {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        per_page: Option<PerPage>,
        #[arg(long)]
        sort_by: Option<SortField>,
        #[arg(long)]
        sort_order: Option<SortOrder>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        search_in: Option<SearchField>,
        #[arg(long = "location")]
        locations: Vec<String>,
        #[arg(long)]
        seats_available: bool,
    },
    /// Shows one event.
    Event { id: i64 },
    /// Lists the distinct event locations.
    Locations,
    CreateEvent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        /// `YYYY-MM-DD HH:MM` in the selected timezone.
        #[arg(long, value_parser = parse_local_datetime)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_local_datetime)]
        end: NaiveDateTime,
        #[arg(long)]
        capacity: u32,
    },
    /// Lists the attendees of an event.
    Attendees {
        event_id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        per_page: Option<PerPage>,
        /// Server-side search.
        #[arg(long)]
        search: Option<String>,
        /// Narrows the fetched page by name or email.
        #[arg(long)]
        filter: Option<String>,
    },
    Register {
        event_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    Timezones,
    SetTimezone { timezone: String },
}

fn parse_local_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M"))
        .map_err(|err| format!("expected YYYY-MM-DD HH:MM: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let mut settings = config::load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = url;
    }

    let preference = Arc::new(FileTimezonePreference::new(&settings.preferences_path));
    let timezone = match cli.timezone {
        Some(timezone) if is_known_timezone(&timezone) => timezone,
        Some(timezone) => bail!("unsupported timezone '{timezone}', see `timezones`"),
        None => startup_timezone(preference.as_ref(), &settings.default_timezone),
    };
    info!(api = %settings.api_base_url, %timezone, "dashboard starting");

    let api: Arc<dyn EventApi> = Arc::new(
        HttpEventApi::with_timeout(&settings.api_base_url, settings.request_timeout())
            .context("invalid api configuration")?,
    );
    let refresh = Arc::new(RefreshCounter::default());

    match cli.command {
        Command::Events {
            page,
            per_page,
            sort_by,
            sort_order,
            search,
            search_in,
            locations,
            seats_available,
        } => {
            let browser = EventBrowser::new(api, preference, &timezone, refresh);
            let mut changes = vec![
                FilterChange::SearchFor(search),
                FilterChange::Locations(locations.into_iter().collect()),
                FilterChange::SeatAvailable(seats_available),
            ];
            changes.extend(per_page.map(FilterChange::PerPage));
            changes.extend(sort_by.map(FilterChange::SortBy));
            changes.extend(sort_order.map(FilterChange::SortOrder));
            changes.extend(search_in.map(FilterChange::SearchIn));
            let update = browser.apply_at_page(changes, page).await;
            if let Some(err) = update.save_error {
                eprintln!("warning: {err}");
            }
            if let Some(LoadOutcome::Failed(message)) = update.outcome {
                bail!(message);
            }

            let filters = browser.filters().await;
            let view = browser.view().await;
            println!("Events ({})", filters.timezone);
            if let Some(summary) = render::active_filters(&filters) {
                println!("{summary}");
            }
            if let Some(message) = &view.last_error {
                bail!(message.clone());
            }
            if view.is_empty_state() {
                println!("No events found.");
                return Ok(());
            }
            let pagination = view.pagination;
            for (index, event) in view.items.iter().enumerate() {
                let row = pagination.map_or(index as u64 + 1, |p| p.row_number(index));
                println!("{}", render::event_row(row, event));
            }
            if let Some(pagination) = pagination {
                println!("{}", pagination.summary());
                if pagination.is_paginated() {
                    println!("Pages: {}", render::page_selector(&pagination));
                }
            }
        }
        Command::Event { id } => {
            let lookup = EventDetailLookup::new(api);
            match lookup.load(EventId(id), &timezone).await {
                EventDetail::Failed(message) => bail!(message),
                detail => {
                    for line in render::event_detail_view(&detail) {
                        println!("{line}");
                    }
                }
            }
        }
        Command::Locations => {
            let browser = EventBrowser::new(api, preference, &timezone, refresh);
            match browser.locations().await {
                Ok(locations) if locations.is_empty() => println!("No locations yet."),
                Ok(locations) => {
                    for location in locations {
                        println!("{location}");
                    }
                }
                Err(message) => bail!(message),
            }
        }
        Command::CreateEvent {
            name,
            location,
            start,
            end,
            capacity,
        } => {
            let form = CreateEventForm {
                name,
                location,
                start_time: Some(start),
                end_time: Some(end),
                max_capacity: capacity,
                timezone: timezone.clone(),
            };
            let event = EventCreator::new(api, refresh)
                .create(&form)
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message(CREATE_FAILURE)))?;
            println!("Created event #{} {}", event.id, event.name);
        }
        Command::Attendees {
            event_id,
            page,
            per_page,
            search,
            filter,
        } => {
            let mut query = AttendeeQuery::new(EventId(event_id));
            if let Some(per_page) = per_page {
                query = query.set_per_page(per_page);
            }
            if let Some(term) = search.as_deref() {
                query = query.search(term);
            }
            let query = query.go_to_page(page);

            let controller = AttendeeListController::new(AttendeesSource::new(api));
            if let LoadOutcome::Failed(message) = controller.load(&query).await {
                bail!(message);
            }
            let view = controller.snapshot().await;
            let rows = filter_attendees_locally(&view.items, filter.as_deref().unwrap_or(""));
            if rows.is_empty() {
                println!("No attendees found.");
                return Ok(());
            }
            for (index, attendee) in rows.iter().enumerate() {
                let row = view
                    .pagination
                    .map_or(index as u64 + 1, |p| p.row_number(index));
                println!("{}", render::attendee_row(row, attendee));
            }
            if let Some(pagination) = view.pagination {
                println!("{}", pagination.summary());
                if pagination.is_paginated() {
                    println!("Pages: {}", render::page_selector(&pagination));
                }
            }
        }
        Command::Register {
            event_id,
            name,
            email,
        } => {
            let registration = RegistrationController::new(api).with_refresh(refresh);
            match registration
                .register(EventId(event_id), &RegistrationForm::new(name, email))
                .await
            {
                Ok(attendee) => println!(
                    "Registered {} <{}> for event #{}",
                    attendee.name, attendee.email, attendee.event_id
                ),
                Err(RegistrationError::Invalid(errors)) => {
                    for (field, messages) in errors.fields() {
                        for message in messages {
                            eprintln!("{field}: {message}");
                        }
                    }
                    bail!("registration form is invalid");
                }
                Err(err) => bail!(err.to_string()),
            }
        }
        Command::Timezones => {
            for option in timezone_options() {
                let marker = if option.value == timezone { "*" } else { " " };
                println!("{marker} {:<22} {}", option.value, option.label);
            }
        }
        Command::SetTimezone { timezone } => {
            if !is_known_timezone(&timezone) {
                bail!("unsupported timezone '{timezone}', see `timezones`");
            }
            preference.save(&timezone)?;
            println!("Timezone set to {timezone}");
        }
    }

    Ok(())
}
