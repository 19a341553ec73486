//! Next-page trigger.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::sort::{SortDirection, SortState};

/// Default number of rows requested per page.
pub const DEFAULT_ROWS_PER_PAGE: usize = 50;

/// Request for the host to supply another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadNextPage {
    /// Page number, starting at 1 for the first page after the initial data.
    pub page: usize,
    /// Offset of the first requested row.
    pub from: usize,
    /// Page size.
    pub rows_per_page: usize,
    /// Active sort field, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    /// Active sort direction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
}

/// Page load state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLoadState {
    /// Ready to request the next page.
    #[default]
    Idle,
    /// Waiting for the host to supply a requested page.
    Loading,
}

/// Emits one next-page request per bottom-edge hit while idle.
#[derive(Debug, Clone)]
pub struct PaginationTrigger {
    state: PageLoadState,
    current_page: usize,
    rows_per_page: usize,
}

impl Default for PaginationTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl PaginationTrigger {
    /// Create an idle trigger.
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            state: PageLoadState::Idle,
            current_page: 0,
            rows_per_page,
        }
    }

    /// Current state.
    pub fn state(&self) -> PageLoadState {
        self.state
    }

    /// Whether a page request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state == PageLoadState::Loading
    }

    /// Last requested page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Every record has been loaded.
    pub fn last_page_reached(loaded: usize, total: usize) -> bool {
        loaded >= total
    }

    /// Handle the container reaching its bottom edge.
    ///
    /// Returns a request when idle and more records exist.
    pub fn on_bottom_reached(
        &mut self,
        loaded: usize,
        total: usize,
        sort: &SortState,
    ) -> Option<LoadNextPage> {
        if self.is_loading() {
            trace!("Bottom reached while page {} is loading", self.current_page);
            return None;
        }
        if Self::last_page_reached(loaded, total) {
            trace!("Bottom reached with all {} records loaded", total);
            return None;
        }

        self.current_page += 1;
        self.state = PageLoadState::Loading;
        let request = LoadNextPage {
            page: self.current_page,
            from: self.current_page * self.rows_per_page,
            rows_per_page: self.rows_per_page,
            sort_field: sort.field().map(String::from),
            sort_direction: sort.direction(),
        };
        debug!("Requesting page {} from {}", request.page, request.from);
        Some(request)
    }

    /// The host supplied data.
    pub fn page_loaded(&mut self) {
        self.state = PageLoadState::Idle;
    }

    /// Start over from the first page.
    pub fn reset(&mut self) {
        self.state = PageLoadState::Idle;
        self.current_page = 0;
    }
}
