use shared::protocol::PaginationMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page numbers for the selector: the first page, the neighbours of the
/// current page, and the last page. Strictly increasing, no duplicates.
pub fn page_window(current_page: u32, last_page: u32) -> Vec<u32> {
    let mut pages = vec![1];
    let low = current_page.saturating_sub(1).max(2);
    let high = current_page.saturating_add(1).min(last_page.saturating_sub(1));
    pages.extend(low..=high);
    if last_page > 1 {
        pages.push(last_page);
    }
    pages.dedup();
    pages
}

/// [`page_window`] with an ellipsis wherever consecutive pages skip numbers.
pub fn page_items(current_page: u32, last_page: u32) -> Vec<PageItem> {
    let mut items = Vec::new();
    let mut previous: Option<u32> = None;
    for page in page_window(current_page, last_page) {
        if previous.is_some_and(|prev| page - prev > 1) {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}

/// Server-reported pagination for one list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    meta: PaginationMeta,
}

impl PaginationState {
    pub fn new(meta: PaginationMeta) -> Self {
        Self { meta }
    }

    pub fn meta(&self) -> &PaginationMeta {
        &self.meta
    }

    pub fn current_page(&self) -> u32 {
        self.meta.current_page.max(1)
    }

    pub fn last_page(&self) -> u32 {
        self.meta.last_page.max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page() > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page() < self.last_page()
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous().then(|| self.current_page() - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.current_page() + 1)
    }

    /// Whether the selector is shown at all.
    pub fn is_paginated(&self) -> bool {
        self.last_page() > 1
    }

    pub fn window(&self) -> Vec<u32> {
        page_window(self.current_page(), self.last_page())
    }

    pub fn items(&self) -> Vec<PageItem> {
        page_items(self.current_page(), self.last_page())
    }

    /// 1-based position of the `index`-th row of this page across all pages.
    pub fn row_number(&self, index: usize) -> u64 {
        u64::from(self.current_page() - 1) * u64::from(self.meta.per_page) + index as u64 + 1
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {}-{} of {}",
            self.meta.from, self.meta.to, self.meta.total
        )
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
