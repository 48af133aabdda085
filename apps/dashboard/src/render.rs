use client_core::{
    browser::EventDetail,
    date_format::{format_compact, format_event_date, format_registered_at},
    filters::EventFilters,
    pagination::{PageItem, PaginationState},
};
use shared::domain::{Attendee, CapacityLevel, Event};

pub fn capacity_badge(event: &Event) -> String {
    let level = match event.capacity_level() {
        CapacityLevel::Normal => "",
        CapacityLevel::High => " [filling up]",
        CapacityLevel::Critical => " [almost full]",
    };
    let seats = if event.is_full() {
        "full".to_string()
    } else {
        format!("{} left", event.available_capacity)
    };
    format!(
        "{}/{} ({seats}){level}",
        event.current_attendees, event.max_capacity
    )
}

pub fn event_row(row_number: u64, event: &Event) -> String {
    format!(
        "{row_number:>3}. #{} {} | {} | {} - {} | {}",
        event.id,
        event.name,
        event.location,
        format_compact(&event.start_time),
        format_compact(&event.end_time),
        capacity_badge(event)
    )
}

pub fn event_detail(event: &Event) -> Vec<String> {
    let start = format_event_date(&event.start_time);
    let end = format_event_date(&event.end_time);
    vec![
        format!("{} (#{})", event.name, event.id),
        format!("Location: {}", event.location),
        format!("Starts:   {} ({})", start.date_time, start.offset_label),
        format!("Ends:     {} ({})", end.date_time, end.offset_label),
        format!(
            "Capacity: {} ({:.0}% booked)",
            capacity_badge(event),
            event.capacity_percentage()
        ),
    ]
}

/// A missing event is an answer, not an error.
pub fn event_detail_view(detail: &EventDetail) -> Vec<String> {
    match detail {
        EventDetail::Found(event) => {
            let mut lines = event_detail(event);
            if event.is_full() {
                lines.push("Registration closed: event is full.".to_string());
            }
            lines
        }
        EventDetail::NotFound => vec!["Event not found.".to_string()],
        EventDetail::Failed(message) => vec![message.clone()],
    }
}

pub fn attendee_row(row_number: u64, attendee: &Attendee) -> String {
    format!(
        "{row_number:>3}. {} <{}> registered {}",
        attendee.name,
        attendee.email,
        format_registered_at(&attendee.created_at)
    )
}

/// `1 … 4 [5] 6 … 10`, with the current page bracketed.
pub fn page_selector(pagination: &PaginationState) -> String {
    pagination
        .items()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(page) if page == pagination.current_page() => format!("[{page}]"),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn active_filters(filters: &EventFilters) -> Option<String> {
    if !filters.has_active_filters() {
        return None;
    }
    let labels = filters
        .active_chips()
        .into_iter()
        .map(|chip| chip.label)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "Active filters ({}): {labels}",
        filters.active_filter_count()
    ))
}
