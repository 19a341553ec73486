//! The data grid.
//!
//! [`DataGrid`] owns the row registry, window, scroll proxy, selection, sort
//! and pagination state, and exposes two surfaces:
//!
//! - the **host** surface: data and selection in, [`GridEvent`]s out;
//! - the **renderer** surface: [`RowProps`] for the current window out,
//!   scroll, height, selection and drag callbacks in.
//!
//! All methods run synchronously on the caller's thread.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, trace, warn};

use crate::column::{Column, ColumnRegistry};
use crate::config::GridConfig;
use crate::error::GridError;
use crate::events::{GridEvent, RowDragEnded, RowHeightChanged};
use crate::item::{RowItem, identifier_of};
use crate::pagination::PaginationTrigger;
use crate::registry::{RowRecord, RowRegistry};
use crate::reorder::move_row;
use crate::row::{RowMark, RowProps};
use crate::selection::{
    SelectionBroadcast, SelectionChange, SelectionMode, SelectionState, SubscriptionId,
};
use crate::sizer::{MeasurementQueue, ScrollProxy, commit_measurements};
use crate::sort::{SortChanged, SortState};
use crate::window::{RenderedRow, Viewport, WindowState, visible_item_bounds};

/// Unique identifier for a DataGrid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(usize);

impl GridId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for GridId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__grid_{}", self.0)
    }
}

/// A virtualized, selectable, reorderable data grid.
///
/// # Example
///
/// ```ignore
/// let mut grid = DataGrid::new(GridConfig::new("id").virtual_scrolling(true))?;
/// grid.register_column(Column::new("name").header("Name").sort_field("name"));
/// grid.set_total_records(5000);
/// grid.set_data(first_page);
///
/// // Renderer reports layout, then scroll events.
/// grid.record_measurement("1", 35.0);
/// grid.commit_measurements();
/// grid.on_scroll(Viewport::new(700.0, 350.0, grid.scroll_proxy_height()), &rendered);
///
/// for event in grid.drain_events() {
///     if let GridEvent::LoadNextPage(request) = event {
///         fetch(request);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct DataGrid<T: RowItem> {
    id: GridId,
    config: GridConfig,
    columns: ColumnRegistry,
    registry: RowRegistry<T>,
    /// Raw dataset mirror, index-aligned with the registry.
    data: Vec<T>,
    total_records: usize,
    window: WindowState,
    /// Identifiers handed to the renderer.
    display: Vec<String>,
    list_offset: f64,
    proxy: ScrollProxy,
    measurements: MeasurementQueue,
    viewport: Option<Viewport>,
    selection: SelectionState,
    broadcast: SelectionBroadcast,
    sort: SortState,
    pagination: PaginationTrigger,
    /// No data has been supplied yet.
    awaiting_data: bool,
    events: Vec<GridEvent<T>>,
    dirty: bool,
}

impl<T: RowItem> DataGrid<T> {
    /// Create a grid. Fails if no identifier property is configured.
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let id = GridId::new();
        info!(
            "Creating grid {} keyed by `{}`",
            id, config.identifier_property
        );
        Ok(Self {
            id,
            columns: ColumnRegistry::new(),
            registry: RowRegistry::new(),
            data: Vec::new(),
            total_records: 0,
            window: WindowState::new(config.scroll_buffer),
            display: Vec::new(),
            list_offset: 0.0,
            proxy: ScrollProxy::new(),
            measurements: MeasurementQueue::new(),
            viewport: None,
            selection: SelectionState::new(config.selection_mode),
            broadcast: SelectionBroadcast::new(Some(config.identifier_property.clone())),
            sort: SortState::new(),
            pagination: PaginationTrigger::new(config.rows_per_page),
            awaiting_data: true,
            events: Vec::new(),
            dirty: false,
            config,
        })
    }

    /// Get the unique ID.
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Get the ID as a string.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Get the configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Register a column, replacing any column with the same field.
    pub fn register_column(&mut self, column: Column) {
        self.columns.register(column);
        self.dirty = true;
    }

    /// All registered columns.
    pub fn columns(&self) -> &[Column] {
        self.columns.all()
    }

    /// Columns currently displayed.
    pub fn visible_columns(&self) -> Vec<Column> {
        self.columns.visible()
    }

    /// Resize a column (see [`ColumnRegistry::resize`]).
    pub fn resize_column(&mut self, field: &str, width: f64) -> bool {
        let resized = self.columns.resize(field, width);
        if resized {
            self.dirty = true;
        }
        resized
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no rows are loaded.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Raw dataset mirror, in display order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Get a row record by identifier.
    pub fn row(&self, identifier: &str) -> Result<&RowRecord<T>, GridError> {
        self.registry.get(identifier)
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &RowRecord<T>> {
        self.registry.values_in_order()
    }

    /// Total number of records the host can supply.
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Set the total number of records the host can supply.
    pub fn set_total_records(&mut self, total: usize) {
        self.total_records = total;
    }

    /// Refresh the dataset.
    ///
    /// Rows whose identifier recurs keep their selection, height and
    /// expansion. Rows missing from `items` are dropped.
    pub fn set_data(&mut self, items: Vec<T>) {
        let keyed = self.keyed(items);
        self.registry.sync(keyed, self.selection.all_selected());
        self.data_changed();
    }

    /// Append a page of rows. Identifiers already loaded are updated in place.
    pub fn append_page(&mut self, items: Vec<T>) {
        let keyed = self.keyed(items);
        let selected_default = self.selection.all_selected();
        for (identifier, item) in keyed {
            self.registry.upsert(&identifier, item, selected_default);
        }
        self.data_changed();
    }

    /// Replace the dataset wholesale.
    ///
    /// Drops every record, the selection, the window and the page count.
    /// Measured base height is kept.
    pub fn replace_data(&mut self, items: Vec<T>) {
        let keyed = self.keyed(items);
        self.registry = RowRegistry::new();
        self.selection.clear();
        self.pagination.reset();
        self.window.reset();
        self.list_offset = 0.0;
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.scroll_top = 0.0;
        }
        self.registry.sync(keyed, false);
        self.data_changed();
        self.broadcast_selection();
    }

    fn keyed(&self, items: Vec<T>) -> Vec<(String, T)> {
        let property = &self.config.identifier_property;
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter_map(|item| match identifier_of(&item, property) {
                Ok(identifier) if seen.insert(identifier.clone()) => Some((identifier, item)),
                Ok(identifier) => {
                    warn!("Skipping duplicate row identifier {}", identifier);
                    None
                }
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    None
                }
            })
            .collect()
    }

    fn data_changed(&mut self) {
        self.data = self
            .registry
            .values_in_order()
            .map(|record| record.data.clone())
            .collect();
        self.selection.extend_all(self.registry.identifiers());
        let registry = &self.registry;
        if self
            .selection
            .retain(|identifier| registry.has(identifier), registry.len())
        {
            self.broadcast_selection();
        }
        self.sync_selection_flags();

        if self.proxy.is_initialized() {
            let base = self.proxy.base_row_height();
            self.registry.set_height_offsets(0, base);
            self.proxy.resize_to(self.registry.total_height(base));
            self.fit_window();
        }

        self.pagination.page_loaded();
        self.awaiting_data = false;
        self.refresh_display();
        self.dirty = true;
        debug!(
            "Grid {} holds {} of {} records",
            self.id,
            self.registry.len(),
            self.total_records
        );
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Get the selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Check if a row is selected by ID.
    pub fn is_selected(&self, identifier: &str) -> bool {
        self.selection.is_selected(identifier)
    }

    /// Whether select-all is in effect.
    pub fn all_selected(&self) -> bool {
        self.selection.all_selected()
    }

    /// Get all selected IDs.
    pub fn selected_identifiers(&self) -> &HashSet<String> {
        self.selection.selected()
    }

    /// Get all selected items, in display order.
    pub fn selected_items(&self) -> Vec<T> {
        self.registry
            .values_in_order()
            .filter(|record| record.selected)
            .map(|record| record.data.clone())
            .collect()
    }

    /// Mark host-supplied items as selected.
    ///
    /// Items that are not loaded are skipped.
    pub fn set_selected(&mut self, items: &[T]) {
        let property = &self.config.identifier_property;
        let identifiers: Vec<String> = items
            .iter()
            .filter_map(|item| identifier_of(item, property).ok())
            .filter(|identifier| {
                let known = self.registry.has(identifier);
                if !known {
                    trace!("Selected row {} is not loaded", identifier);
                }
                known
            })
            .collect();
        self.selection.replace(identifiers, self.registry.len());
        self.sync_selection_flags();
        self.broadcast_selection();
    }

    /// A row's selection input changed to `selected`.
    pub fn on_row_selection_changed(&mut self, identifier: &str, selected: bool) {
        if !self.registry.has(identifier) {
            debug!("Ignoring selection of unknown row {}", identifier);
            return;
        }
        self.selection
            .set_row(identifier, selected, self.registry.len());
        self.selection_changed();
    }

    /// Toggle a row's selection. Returns the new state, or `None` if the row
    /// is not loaded.
    pub fn toggle_row(&mut self, identifier: &str) -> Option<bool> {
        if !self.registry.has(identifier) {
            debug!("Ignoring toggle of unknown row {}", identifier);
            return None;
        }
        let selected = self.selection.toggle_row(identifier, self.registry.len());
        self.selection_changed();
        Some(selected)
    }

    /// The header's select-all input changed to `value`.
    ///
    /// Selecting all is only offered in multiple mode.
    pub fn on_select_all_changed(&mut self, value: bool) {
        if value && self.selection.mode() == SelectionMode::Single {
            debug!("Ignoring select-all in single selection mode");
            return;
        }
        self.selection.toggle_all(value, self.registry.identifiers());
        self.sync_selection_flags();
        self.broadcast_selection();
        self.events.push(GridEvent::AllSelected(value));
        self.events
            .push(GridEvent::SelectionChanged(self.selected_items()));
    }

    /// Subscribe a row-level selection input to selection changes.
    pub fn subscribe_selection(
        &mut self,
        listener: impl FnMut(&SelectionChange) + 'static,
    ) -> SubscriptionId {
        self.broadcast.subscribe(listener)
    }

    /// Remove a selection subscription.
    pub fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool {
        self.broadcast.unsubscribe(id)
    }

    /// Broadcast a selection given as whole items.
    pub fn broadcast_items(&mut self, items: &[T]) -> Result<(), GridError> {
        self.broadcast.emit_items(items)
    }

    fn selection_changed(&mut self) {
        self.sync_selection_flags();
        self.broadcast_selection();
        self.events
            .push(GridEvent::SelectionChanged(self.selected_items()));
    }

    fn sync_selection_flags(&mut self) {
        let selection = &self.selection;
        for record in self.registry.values_mut() {
            record.selected = selection.is_selected(&record.identifier);
        }
        self.dirty = true;
    }

    fn broadcast_selection(&mut self) {
        let change = self.selection.notification();
        self.broadcast.emit(&change);
    }

    // -------------------------------------------------------------------------
    // Scrolling and windowing
    // -------------------------------------------------------------------------

    /// Record the container geometry without scrolling.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Handle a scroll event.
    ///
    /// `rendered` holds the bounds of the rows currently on screen, relative
    /// to the container top. Returns `true` if the window changed and the
    /// renderer should redraw.
    pub fn on_scroll(&mut self, viewport: Viewport, rendered: &[RenderedRow]) -> bool {
        self.viewport = Some(viewport);
        if viewport.at_bottom() {
            self.try_load_next_page();
        }
        if !self.config.virtual_scrolling_enabled {
            return false;
        }

        self.window.track_direction(viewport.scroll_top);
        let changed = self.recompute_window(viewport, rendered);
        self.window.scroll_position = viewport.scroll_top;
        changed
    }

    fn recompute_window(&mut self, viewport: Viewport, rendered: &[RenderedRow]) -> bool {
        let query = self.window.query(viewport, self.proxy.base_row_height());
        let Some(bounds) = visible_item_bounds(&query, &self.registry, rendered) else {
            trace!("Window not computed: no measurable rows");
            return false;
        };
        if !self.window.apply(bounds) {
            return false;
        }

        self.list_offset = bounds.height_offset;
        self.refresh_display();
        self.dirty = true;
        debug!(
            "Window {}..={} at {}px",
            bounds.first_item_index, bounds.last_item_index, bounds.height_offset
        );
        true
    }

    /// Re-fit the window after the dataset changed.
    ///
    /// With a known viewport the window is recomputed for the current scroll
    /// position, clamped to the new proxy height. Without one, a window past
    /// the last row is clamped to it.
    fn fit_window(&mut self) {
        if !self.config.virtual_scrolling_enabled {
            return;
        }
        let len = self.registry.len();
        if len == 0 {
            self.window.reset();
            self.list_offset = 0.0;
            if let Some(viewport) = self.viewport.as_mut() {
                viewport.scroll_top = 0.0;
            }
            return;
        }

        let mut refitted = false;
        if let Some(viewport) = self.viewport {
            let max_top = (self.proxy.height() - viewport.client_height).max(0.0);
            let viewport = Viewport {
                scroll_top: viewport.scroll_top.min(max_top),
                scroll_height: self.proxy.height(),
                ..viewport
            };
            self.viewport = Some(viewport);
            self.window.scroll_position = viewport.scroll_top;
            refitted = self.recompute_window(viewport, &[]);
        }
        if self.window.last_item_index >= len {
            let last_index = len - 1;
            self.window.first_item_index = self.window.first_item_index.min(last_index);
            self.window.last_item_index = last_index;
            refitted = false;
            debug!("Window clamped to {:?}", self.window.range());
        }
        if !refitted {
            self.list_offset = self
                .registry
                .at(self.window.first_item_index)
                .and_then(|record| record.height_offset)
                .unwrap_or(0.0);
        }
    }

    fn try_load_next_page(&mut self) {
        if let Some(request) =
            self.pagination
                .on_bottom_reached(self.registry.len(), self.total_records, &self.sort)
        {
            self.events.push(GridEvent::LoadNextPage(request));
            self.dirty = true;
        }
    }

    fn refresh_display(&mut self) {
        let identifiers = self.registry.identifiers();
        self.display = if self.config.virtual_scrolling_enabled {
            let end = (self.window.last_item_index + 1).min(identifiers.len());
            let start = self.window.first_item_index.min(end);
            identifiers[start..end].to_vec()
        } else {
            identifiers.to_vec()
        };
    }

    /// Current window.
    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Identifiers of the rows to render, in order.
    pub fn display_identifiers(&self) -> &[String] {
        &self.display
    }

    /// Render payload for every row in the window.
    pub fn display_rows(&self) -> Vec<RowProps<T>> {
        let columns = self.columns.visible();
        let mark_field = self.config.row_mark_field.as_deref();
        self.display
            .iter()
            .filter_map(|identifier| self.registry.get(identifier).ok())
            .map(|record| RowProps {
                identifier: record.identifier.clone(),
                row_index: record.row_index,
                data: record.data.clone(),
                columns: columns.clone(),
                show_selection_input: self.config.show_selection_input,
                selection_mode: self.config.selection_mode,
                virtual_scrolling_enabled: self.config.virtual_scrolling_enabled,
                height: self.proxy.base_row_height(),
                initialize_selected: self.selection.all_selected() || record.selected,
                expanded: record.expanded,
                relocated: record.relocated,
                draggable: self.config.allow_rows_reorder,
                mark: mark_field
                    .and_then(|field| record.data.row_mark(field))
                    .map(RowMark::normalized),
            })
            .collect()
    }

    /// Vertical translation applied to the rendered rows.
    pub fn list_offset(&self) -> f64 {
        self.list_offset
    }

    // -------------------------------------------------------------------------
    // Measurement
    // -------------------------------------------------------------------------

    /// Renderer callback for a row height change.
    pub fn on_row_height_changed(&mut self, event: RowHeightChanged) {
        self.record_measurement(&event.identifier, event.current_value);
    }

    /// Queue a measured row height until the next commit.
    pub fn record_measurement(&mut self, identifier: &str, height: f64) {
        self.measurements.record(identifier, height);
    }

    /// Apply queued measurements. Call once per render cycle.
    ///
    /// Returns `true` if heights, offsets or the proxy changed.
    pub fn commit_measurements(&mut self) -> bool {
        let commit = commit_measurements(&mut self.measurements, &mut self.registry, &mut self.proxy);
        if !commit.changed() {
            return false;
        }

        if self.config.virtual_scrolling_enabled {
            if commit.seeded
                && let Some(viewport) = self.viewport
            {
                let viewport = Viewport {
                    scroll_height: self.proxy.height(),
                    ..viewport
                };
                self.recompute_window(viewport, &[]);
            }
            if let Some(offset) = self
                .registry
                .at(self.window.first_item_index)
                .and_then(|record| record.height_offset)
            {
                self.list_offset = offset;
            }
        }
        self.dirty = true;
        true
    }

    /// Height of the scroll proxy in pixels.
    pub fn scroll_proxy_height(&self) -> f64 {
        self.proxy.height()
    }

    /// Estimated row height (0 until the first measurement).
    pub fn base_row_height(&self) -> f64 {
        self.proxy.base_row_height()
    }

    // -------------------------------------------------------------------------
    // Reordering and expansion
    // -------------------------------------------------------------------------

    /// Renderer callback for a completed drag.
    pub fn on_row_drag_ended(&mut self, event: RowDragEnded) -> bool {
        if !self.config.allow_rows_reorder {
            debug!("Ignoring drag: row reordering is disabled");
            return false;
        }
        self.move_row(event.current_index, event.next_index)
    }

    /// Move a row. Returns `false` for a no-op.
    pub fn move_row(&mut self, current_index: usize, next_index: usize) -> bool {
        let moved = move_row(
            &mut self.registry,
            &mut self.data,
            current_index,
            next_index,
            self.proxy.base_row_height(),
        );
        if moved {
            self.refresh_display();
            self.dirty = true;
        }
        moved
    }

    /// Clear relocation highlights after they have been drawn.
    pub fn clear_relocated(&mut self) {
        for record in self.registry.values_mut() {
            record.relocated = false;
        }
    }

    /// Open or close a row's expansion area.
    ///
    /// Returns the new state, or `None` if rows are not expandable or the row
    /// is not loaded.
    pub fn toggle_expanded(&mut self, identifier: &str) -> Option<bool> {
        if !self.config.expandable {
            return None;
        }
        let record = match self.registry.get_mut(identifier) {
            Ok(record) => record,
            Err(e) => {
                debug!("Cannot expand: {}", e);
                return None;
            }
        };
        record.expanded = !record.expanded;
        let expanded = record.expanded;
        self.events.push(GridEvent::RowExpanded {
            identifier: identifier.to_string(),
            expanded,
        });
        self.dirty = true;
        Some(expanded)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Get current sort state.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Handle a header click. Columns without a sort field are ignored.
    pub fn on_column_header_clicked(&mut self, field: &str) -> Option<SortChanged> {
        let sort_field = self.columns.get(field)?.sort_field.clone()?;
        let change = self.sort.toggle(&sort_field);
        self.events.push(GridEvent::SortChanged(change.clone()));
        self.dirty = true;
        Some(change)
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Whether the spinner should show: no data yet, or a page is in flight.
    pub fn is_loading(&self) -> bool {
        self.awaiting_data || self.pagination.is_loading()
    }

    /// Every record has been loaded.
    pub fn last_page_reached(&self) -> bool {
        PaginationTrigger::last_page_reached(self.registry.len(), self.total_records)
    }

    /// Last requested page.
    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    // -------------------------------------------------------------------------
    // Events and dirty tracking
    // -------------------------------------------------------------------------

    /// Take every event pushed since the last drain.
    pub fn drain_events(&mut self) -> Vec<GridEvent<T>> {
        std::mem::take(&mut self.events)
    }

    /// Check if the grid has changed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
