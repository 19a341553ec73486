//! Windowing engine.
//!
//! Decides which contiguous range of rows is materialized for a scroll
//! position. Two strategies are used:
//!
//! - **Fast path**: a row that is already rendered still intersects the
//!   container, so it anchors the window and its cached offset is exact.
//! - **Jump path**: nothing rendered is visible any more (large jump, first
//!   measurement), so the anchor is estimated from the uniform base height.

use std::ops::RangeInclusive;

use log::trace;

use crate::registry::RowRegistry;

/// Number of extra rows rendered on each side of the visible area.
pub const DEFAULT_SCROLL_BUFFER: usize = 3;

/// Last index of the window before anything has been measured.
pub const INITIAL_LAST_ITEM_INDEX: usize = 15;

/// Distance from the bottom edge still treated as "at the bottom", in pixels.
const BOTTOM_EPSILON: f64 = 0.5;

/// Geometry of the scroll container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Current vertical scroll offset.
    pub scroll_top: f64,
    /// Visible height of the container.
    pub client_height: f64,
    /// Full scrollable height (the scroll proxy plus any chrome).
    pub scroll_height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub fn new(scroll_top: f64, client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Scroll distance left below the visible area.
    pub fn remaining(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// Whether the container is scrolled to its bottom edge.
    pub fn at_bottom(&self) -> bool {
        self.scroll_height > 0.0 && self.remaining() <= BOTTOM_EPSILON
    }
}

/// Bounds of a rendered row, relative to the container's top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// Row identifier.
    pub identifier: String,
    /// Top edge (negative when scrolled above the container).
    pub top: f64,
    /// Bottom edge.
    pub bottom: f64,
}

impl RenderedRow {
    /// Create a rendered row from its top edge and height.
    pub fn new(identifier: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            identifier: identifier.into(),
            top,
            bottom: top + height,
        }
    }

    /// Whether any part of the row lies inside a container of `client_height`.
    pub fn intersects(&self, client_height: f64) -> bool {
        self.bottom >= 0.0 && self.top <= client_height
    }
}

/// Result of a window computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBounds {
    /// First materialized row.
    pub first_item_index: usize,
    /// Last materialized row (inclusive).
    pub last_item_index: usize,
    /// Vertical translation for the first materialized row.
    pub height_offset: f64,
}

/// Inputs to [`visible_item_bounds`] besides the rows themselves.
#[derive(Debug, Clone, Copy)]
pub struct WindowQuery {
    /// Container geometry.
    pub viewport: Viewport,
    /// Estimated (base) row height.
    pub row_height: f64,
    /// Rows added on each side.
    pub buffer: usize,
    /// Scroll direction since the previous computation.
    pub scrolling_down: bool,
    /// First index of the previous window.
    pub previous_first: usize,
}

/// Current window and scroll tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    /// First materialized row.
    pub first_item_index: usize,
    /// Last materialized row (inclusive).
    pub last_item_index: usize,
    /// Rows added on each side.
    pub scroll_buffer: usize,
    /// Scroll offset seen by the previous scroll event.
    pub scroll_position: f64,
    /// Direction of the latest scroll event.
    pub scrolling_down: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_BUFFER)
    }
}

impl WindowState {
    /// Create the initial window.
    pub fn new(scroll_buffer: usize) -> Self {
        Self {
            first_item_index: 0,
            last_item_index: INITIAL_LAST_ITEM_INDEX,
            scroll_buffer,
            scroll_position: 0.0,
            scrolling_down: true,
        }
    }

    /// Record the direction of a scroll to `scroll_top`.
    pub fn track_direction(&mut self, scroll_top: f64) -> bool {
        self.scrolling_down = scroll_top >= self.scroll_position;
        self.scrolling_down
    }

    /// Adopt new bounds. Returns `true` if the index range changed.
    pub fn apply(&mut self, bounds: WindowBounds) -> bool {
        if self.first_item_index == bounds.first_item_index
            && self.last_item_index == bounds.last_item_index
        {
            return false;
        }
        self.first_item_index = bounds.first_item_index;
        self.last_item_index = bounds.last_item_index;
        true
    }

    /// Construct the query for a viewport using the current state.
    pub fn query(&self, viewport: Viewport, row_height: f64) -> WindowQuery {
        WindowQuery {
            viewport,
            row_height,
            buffer: self.scroll_buffer,
            scrolling_down: self.scrolling_down,
            previous_first: self.first_item_index,
        }
    }

    /// Index range of the window.
    pub fn range(&self) -> RangeInclusive<usize> {
        self.first_item_index..=self.last_item_index
    }

    /// Reset to the initial window, keeping the buffer.
    pub fn reset(&mut self) {
        *self = Self::new(self.scroll_buffer);
    }
}

/// Compute the window for a scroll position.
///
/// `rendered` holds the rows currently materialized, with bounds relative to
/// the container top. Returns `None` when nothing can be computed: no rows
/// are loaded, or no row height is known yet.
pub fn visible_item_bounds<T>(
    query: &WindowQuery,
    registry: &RowRegistry<T>,
    rendered: &[RenderedRow],
) -> Option<WindowBounds> {
    let total = registry.len();
    if total == 0 || query.row_height.is_nan() || query.row_height <= 0.0 {
        return None;
    }

    let viewport = query.viewport;
    let row_height = query.row_height;
    let buffer = query.buffer as i64;
    let last_index = total as i64 - 1;
    let per_container = (viewport.client_height.max(0.0) / row_height).ceil() as i64;

    let anchor = rendered
        .iter()
        .filter(|row| row.intersects(viewport.client_height))
        .find_map(|row| registry.get(&row.identifier).ok())
        .map(|record| record.row_index as i64);

    if let Some(anchor) = anchor
        && !(query.scrolling_down && anchor < query.previous_first as i64)
    {
        let first = clamp_index(anchor - buffer, last_index);
        let last = clamp_index(anchor + per_container + buffer, last_index).max(first);
        let height_offset = registry
            .at(first)
            .and_then(|record| record.height_offset)
            .unwrap_or(first as f64 * row_height);
        trace!("Window fast path: anchor {} -> {}..={}", anchor, first, last);
        return Some(WindowBounds {
            first_item_index: first,
            last_item_index: last,
            height_offset,
        });
    }

    let scroll_top = viewport.scroll_top.max(0.0);
    let remaining = viewport.remaining();
    let first_height = registry
        .at(0)
        .map(|record| record.height_or(row_height))
        .unwrap_or(row_height);
    let last_height = registry
        .last()
        .map(|record| record.height_or(row_height))
        .unwrap_or(row_height);

    let mut anchor = if query.scrolling_down && remaining < last_height {
        // Reached the end: pin the window to the final rows.
        last_index - per_container - buffer
    } else if !query.scrolling_down && scroll_top < first_height {
        0
    } else {
        (scroll_top / row_height).floor() as i64
    };
    if anchor > last_index - per_container {
        anchor = last_index - per_container;
    }

    let first = clamp_index(anchor - buffer, last_index);
    let last = clamp_index(anchor + per_container + buffer, last_index).max(first);

    let estimated = first as f64 * row_height;
    let cached = registry
        .at(first)
        .and_then(|record| record.height_offset)
        .unwrap_or(estimated);
    let height_offset = if cached - estimated > query.buffer as f64 * viewport.client_height {
        trace!(
            "Window drift at {}: cached {} vs estimated {}",
            first, cached, estimated
        );
        estimated
    } else {
        cached
    };

    trace!("Window jump path: scroll {} -> {}..={}", scroll_top, first, last);
    Some(WindowBounds {
        first_item_index: first,
        last_item_index: last,
        height_offset,
    })
}

fn clamp_index(value: i64, last_index: i64) -> usize {
    value.clamp(0, last_index.max(0)) as usize
}
