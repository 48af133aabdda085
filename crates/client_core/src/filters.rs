use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{PerPage, SearchField, SortField, SortOrder},
    protocol::EventsQuery,
};

use crate::timezones::DEFAULT_TIMEZONE;

pub const DEFAULT_SORT_FIELD: SortField = SortField::StartTime;
pub const DEFAULT_SORT_ORDER: SortOrder = SortOrder::Asc;
pub const DEFAULT_SEARCH_FIELD: SearchField = SearchField::All;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilters {
    pub timezone: String,
    pub page: u32,
    pub per_page: PerPage,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub search_for: Option<String>,
    pub search_in: SearchField,
    pub filter_by_location: BTreeSet<String>,
    pub seat_available_events: bool,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self::with_timezone(DEFAULT_TIMEZONE)
    }
}

/// One user edit to the filter window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    SearchFor(Option<String>),
    SearchIn(SearchField),
    SortBy(SortField),
    SortOrder(SortOrder),
    Timezone(String),
    PerPage(PerPage),
    Locations(BTreeSet<String>),
    ToggleLocation { location: String, selected: bool },
    SeatAvailable(bool),
    /// Explicit page navigation; the only change that keeps the page.
    Page(u32),
}

/// A dimension that can be removed from the active-filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    SearchFor,
    Location,
    SeatAvailable,
    SortBy,
    SortOrder,
    SearchIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub key: FilterKey,
    pub value: Option<String>,
    pub label: String,
}

impl EventFilters {
    /// Defaults with an injected timezone, read once at startup.
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            page: 1,
            per_page: PerPage::default(),
            sort_by: DEFAULT_SORT_FIELD,
            sort_order: DEFAULT_SORT_ORDER,
            search_for: None,
            search_in: DEFAULT_SEARCH_FIELD,
            filter_by_location: BTreeSet::new(),
            seat_available_events: false,
        }
    }

    /// Applies `changes` in order. Any change other than [`FilterChange::Page`]
    /// sends the result back to page 1, wherever it appears in the batch.
    pub fn apply<I>(&self, changes: I) -> EventFilters
    where
        I: IntoIterator<Item = FilterChange>,
    {
        let mut next = self.clone();
        let mut reset_page = false;

        for change in changes {
            if !matches!(change, FilterChange::Page(_)) {
                reset_page = true;
            }
            match change {
                FilterChange::SearchFor(text) => next.search_for = normalize_search(text),
                FilterChange::SearchIn(field) => next.search_in = field,
                FilterChange::SortBy(field) => next.sort_by = field,
                FilterChange::SortOrder(order) => next.sort_order = order,
                FilterChange::Timezone(timezone) => next.timezone = timezone,
                FilterChange::PerPage(per_page) => next.per_page = per_page,
                FilterChange::Locations(locations) => {
                    next.filter_by_location = locations
                        .into_iter()
                        .filter(|location| !location.trim().is_empty())
                        .collect();
                }
                FilterChange::ToggleLocation { location, selected } => {
                    if selected {
                        next.filter_by_location.insert(location);
                    } else {
                        next.filter_by_location.remove(&location);
                    }
                }
                FilterChange::SeatAvailable(enabled) => next.seat_available_events = enabled,
                FilterChange::Page(page) => next.page = page.max(1),
            }
        }

        if reset_page {
            next.page = 1;
        }
        next
    }

    pub fn go_to_page(&self, page: u32) -> EventFilters {
        self.apply([FilterChange::Page(page)])
    }

    /// Reverts one dimension to its default. Location removal needs the
    /// location to drop; without one the set is left alone.
    pub fn remove(&self, key: FilterKey, value: Option<&str>) -> EventFilters {
        let mut next = self.clone();
        match key {
            FilterKey::SearchFor => next.search_for = None,
            FilterKey::Location => {
                if let Some(location) = value {
                    next.filter_by_location.remove(location);
                }
            }
            FilterKey::SeatAvailable => next.seat_available_events = false,
            FilterKey::SortBy => next.sort_by = DEFAULT_SORT_FIELD,
            FilterKey::SortOrder => next.sort_order = DEFAULT_SORT_ORDER,
            FilterKey::SearchIn => next.search_in = DEFAULT_SEARCH_FIELD,
        }
        next.page = 1;
        next
    }

    /// Back to defaults, keeping the selected timezone.
    pub fn reset(&self) -> EventFilters {
        EventFilters::with_timezone(self.timezone.clone())
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    pub fn active_filter_count(&self) -> usize {
        [
            self.search_for.is_some(),
            !self.filter_by_location.is_empty(),
            self.seat_available_events,
            self.sort_by != DEFAULT_SORT_FIELD,
            self.sort_order != DEFAULT_SORT_ORDER,
            !is_default_search_field(self.search_in),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Removable chips for the active-filter bar, one per location.
    pub fn active_chips(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        if let Some(text) = &self.search_for {
            chips.push(FilterChip {
                key: FilterKey::SearchFor,
                value: None,
                label: format!("\"{text}\""),
            });
        }
        chips.extend(self.filter_by_location.iter().map(|location| FilterChip {
            key: FilterKey::Location,
            value: Some(location.clone()),
            label: location.clone(),
        }));
        if self.seat_available_events {
            chips.push(FilterChip {
                key: FilterKey::SeatAvailable,
                value: None,
                label: "Available Seats Only".to_string(),
            });
        }
        if self.sort_by != DEFAULT_SORT_FIELD {
            chips.push(FilterChip {
                key: FilterKey::SortBy,
                value: None,
                label: self.sort_by.label().to_string(),
            });
        }
        if self.sort_order != DEFAULT_SORT_ORDER {
            chips.push(FilterChip {
                key: FilterKey::SortOrder,
                value: None,
                label: "Descending".to_string(),
            });
        }
        if !is_default_search_field(self.search_in) {
            chips.push(FilterChip {
                key: FilterKey::SearchIn,
                value: None,
                label: format!("In: {}", self.search_in.label()),
            });
        }
        chips
    }

    pub fn to_query(&self) -> EventsQuery {
        EventsQuery {
            page: self.page.max(1),
            per_page: self.per_page,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            search_for: self.search_for.clone(),
            search_in: self.search_in,
            filter_by_location: if self.filter_by_location.is_empty() {
                None
            } else {
                Some(
                    self.filter_by_location
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(","),
                )
            },
            seat_available_events: self.seat_available_events,
            timezone: self.timezone.clone(),
        }
    }
}

/// Both "all" and "name" count as the untouched search field.
pub fn is_default_search_field(field: SearchField) -> bool {
    matches!(field, SearchField::All | SearchField::Name)
}

fn normalize_search(text: Option<String>) -> Option<String> {
    text.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/filters_tests.rs"]
mod tests;
