use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use datagrid::prelude::*;
use serde_json::{Value, json};

fn comments(range: Range<usize>) -> Vec<Value> {
    range
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Comment {}", i),
                "mark": { "letter": "Urgent" },
            })
        })
        .collect()
}

fn config() -> GridConfig {
    GridConfig::new("id")
        .selection_mode(SelectionMode::Multiple)
        .allow_rows_reorder(true)
        .expandable(true)
}

fn measure_display(grid: &mut DataGrid<Value>, height: f64) -> bool {
    for identifier in grid.display_identifiers().to_vec() {
        grid.record_measurement(&identifier, height);
    }
    grid.commit_measurements()
}

fn virtual_grid(total: usize) -> DataGrid<Value> {
    let mut grid = DataGrid::new(config().virtual_scrolling(true)).unwrap();
    grid.set_total_records(total);
    grid.set_data(comments(0..total));
    grid.set_viewport(Viewport::new(0.0, 350.0, 0.0));
    measure_display(&mut grid, 35.0);
    grid
}

fn paged_grid(total: usize, loaded: usize) -> DataGrid<Value> {
    let mut grid = DataGrid::new(config()).unwrap();
    grid.set_total_records(total);
    grid.set_data(comments(0..loaded));
    grid
}

fn rendered(grid: &DataGrid<Value>, scroll_top: f64) -> Vec<RenderedRow> {
    let height = grid.base_row_height();
    grid.display_identifiers()
        .iter()
        .enumerate()
        .map(|(k, identifier)| {
            RenderedRow::new(
                identifier.clone(),
                grid.list_offset() + k as f64 * height - scroll_top,
                height,
            )
        })
        .collect()
}

fn load_requests(events: &[GridEvent<Value>]) -> Vec<LoadNextPage> {
    events
        .iter()
        .filter_map(|event| match event {
            GridEvent::LoadNextPage(request) => Some(request.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Windowing
// =============================================================================

#[test]
fn test_first_measurement_sets_initial_window() {
    let grid = virtual_grid(5000);

    assert_eq!(grid.scroll_proxy_height(), 175_000.0);
    assert_eq!(grid.base_row_height(), 35.0);
    assert_eq!(grid.window().range(), 0..=13);
    assert_eq!(grid.display_identifiers().len(), 14);
    assert_eq!(grid.list_offset(), 0.0);
}

#[test]
fn test_window_before_measurement_uses_initial_range() {
    let mut grid = DataGrid::new(config().virtual_scrolling(true)).unwrap();
    grid.set_data(comments(0..100));
    assert_eq!(grid.window().range(), 0..=15);
    assert_eq!(grid.display_identifiers().len(), 16);
    assert!(!grid.on_scroll(Viewport::new(100.0, 350.0, 3500.0), &[]));
}

#[test]
fn test_scroll_jump_moves_window() {
    let mut grid = virtual_grid(5000);
    assert!(grid.on_scroll(Viewport::new(35_000.0, 350.0, 175_000.0), &[]));

    assert_eq!(grid.window().range(), 997..=1013);
    assert_eq!(grid.list_offset(), 997.0 * 35.0);
    assert_eq!(grid.display_identifiers()[0], "997");
    assert_eq!(grid.display_rows()[0].row_index, 997);
}

#[test]
fn test_scroll_anchored_on_rendered_row() {
    let mut grid = virtual_grid(5000);
    grid.on_scroll(Viewport::new(35_000.0, 350.0, 175_000.0), &[]);

    let rows = rendered(&grid, 35_350.0);
    assert!(grid.on_scroll(Viewport::new(35_350.0, 350.0, 175_000.0), &rows));
    assert_eq!(grid.window().range(), 1006..=1022);
    assert_eq!(grid.list_offset(), 1006.0 * 35.0);
}

#[test]
fn test_window_stays_in_range_while_scrolling() {
    let mut grid = virtual_grid(5000);
    let max_top = grid.scroll_proxy_height() - 350.0;
    let mut top = 0.0;
    while top <= max_top {
        let rows = rendered(&grid, top);
        grid.on_scroll(Viewport::new(top, 350.0, grid.scroll_proxy_height()), &rows);

        let window = grid.window();
        assert!(window.first_item_index <= window.last_item_index);
        assert!(window.last_item_index < 5000);
        assert_eq!(
            grid.display_identifiers().len(),
            window.last_item_index - window.first_item_index + 1
        );
        top += 7919.0;
    }
}

#[test]
fn test_shrinking_refresh_pulls_window_back() {
    let mut grid = virtual_grid(5000);
    grid.on_scroll(Viewport::new(35_000.0, 350.0, 175_000.0), &[]);
    assert_eq!(grid.window().range(), 997..=1013);

    grid.set_data(comments(0..50));

    let window = grid.window().clone();
    assert_eq!(window.last_item_index, 49);
    assert!(window.first_item_index <= window.last_item_index);
    assert_eq!(
        grid.display_identifiers().len(),
        window.last_item_index - window.first_item_index + 1
    );
    assert_eq!(grid.display_identifiers().last().unwrap(), "49");
    assert_eq!(grid.list_offset(), window.first_item_index as f64 * 35.0);
    assert_eq!(grid.scroll_proxy_height(), 50.0 * 35.0);
}

#[test]
fn test_shrinking_refresh_without_viewport_clamps_window() {
    let mut grid = DataGrid::new(config().virtual_scrolling(true)).unwrap();
    grid.set_data(comments(0..100));
    measure_display(&mut grid, 35.0);
    assert_eq!(grid.window().range(), 0..=15);

    grid.set_data(comments(0..5));
    assert_eq!(grid.window().range(), 0..=4);
    assert_eq!(grid.display_identifiers().len(), 5);
}

#[test]
fn test_emptied_dataset_resets_window() {
    let mut grid = virtual_grid(100);
    grid.on_scroll(Viewport::new(1000.0, 350.0, 3500.0), &[]);
    grid.set_data(Vec::new());
    assert!(grid.display_identifiers().is_empty());

    grid.set_data(comments(0..100));
    assert_eq!(grid.display_identifiers()[0], "0");
    assert!(!grid.display_identifiers().is_empty());
}

#[test]
fn test_non_virtual_grid_displays_everything() {
    let mut grid = paged_grid(20, 20);
    assert_eq!(grid.display_identifiers().len(), 20);
    assert!(!grid.on_scroll(Viewport::new(100.0, 350.0, 700.0), &[]));
}

// =============================================================================
// Measurement
// =============================================================================

#[test]
fn test_row_growth_shifts_later_offsets() {
    let mut grid = virtual_grid(5000);
    let before = grid.row("5").unwrap().height_offset.unwrap();

    grid.on_row_height_changed(RowHeightChanged::new("4", Some(35.0), 140.0));
    assert!(grid.commit_measurements());

    assert_eq!(grid.row("3").unwrap().height_offset, Some(105.0));
    assert_eq!(grid.row("4").unwrap().height_offset, Some(140.0));
    assert_eq!(grid.row("5").unwrap().height_offset, Some(before + 105.0));
    assert_eq!(grid.scroll_proxy_height(), 175_105.0);
}

#[test]
fn test_mixed_first_commit_seeds_from_top_row() {
    let mut grid = DataGrid::new(config().virtual_scrolling(true)).unwrap();
    grid.set_data(comments(0..20));
    grid.set_viewport(Viewport::new(0.0, 350.0, 0.0));
    for identifier in grid.display_identifiers().to_vec() {
        let height = if identifier == "5" { 140.0 } else { 35.0 };
        grid.record_measurement(&identifier, height);
    }
    assert!(grid.commit_measurements());

    assert_eq!(grid.base_row_height(), 35.0);
    assert_eq!(grid.scroll_proxy_height(), 20.0 * 35.0 + 105.0);
    assert_eq!(grid.row("6").unwrap().height_offset, Some(5.0 * 35.0 + 140.0));
}

#[test]
fn test_unchanged_measurement_commits_nothing() {
    let mut grid = virtual_grid(100);
    assert!(!measure_display(&mut grid, 35.0));
    assert!(!grid.commit_measurements());
}

#[test]
fn test_proxy_grows_with_appended_page() {
    let mut grid = DataGrid::new(config().virtual_scrolling(true)).unwrap();
    grid.set_total_records(100);
    grid.set_data(comments(0..50));
    measure_display(&mut grid, 35.0);
    assert_eq!(grid.scroll_proxy_height(), 50.0 * 35.0);

    grid.append_page(comments(50..100));
    assert_eq!(grid.scroll_proxy_height(), 100.0 * 35.0);
    assert_eq!(grid.row("99").unwrap().height_offset, Some(99.0 * 35.0));
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_select_all_covers_appended_page() {
    let mut grid = paged_grid(100, 50);
    grid.on_select_all_changed(true);

    let events = grid.drain_events();
    assert_eq!(events[0], GridEvent::AllSelected(true));
    match &events[1] {
        GridEvent::SelectionChanged(items) => assert_eq!(items.len(), 50),
        other => panic!("unexpected event {:?}", other),
    }

    grid.append_page(comments(50..100));
    assert!(grid.all_selected());
    assert!(grid.is_selected("75"));
    assert!(grid.row("75").unwrap().selected);
    assert_eq!(grid.selected_items().len(), 100);
    assert!(grid.display_rows().iter().all(|row| row.initialize_selected));
}

#[test]
fn test_deselect_all() {
    let mut grid = paged_grid(10, 10);
    grid.on_select_all_changed(true);
    grid.on_select_all_changed(false);

    assert!(!grid.all_selected());
    assert!(grid.selected_items().is_empty());
    assert!(grid.rows().all(|row| !row.selected));
}

#[test]
fn test_select_all_ignored_in_single_mode() {
    let mut grid = DataGrid::new(GridConfig::new("id")).unwrap();
    grid.set_data(comments(0..5));
    grid.on_select_all_changed(true);

    assert!(!grid.all_selected());
    assert!(grid.drain_events().is_empty());
}

#[test]
fn test_row_selection_emits_selected_items() {
    let mut grid = paged_grid(10, 10);
    grid.on_row_selection_changed("3", true);
    grid.on_row_selection_changed("7", true);

    let events = grid.drain_events();
    assert_eq!(events.len(), 2);
    match &events[1] {
        GridEvent::SelectionChanged(items) => {
            let ids: Vec<_> = items.iter().map(|item| item["id"].clone()).collect();
            assert_eq!(ids, vec![json!(3), json!(7)]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_single_mode_row_selection_replaces() {
    let mut grid = DataGrid::new(GridConfig::new("id")).unwrap();
    grid.set_data(comments(0..5));
    grid.on_row_selection_changed("1", true);
    grid.on_row_selection_changed("2", true);

    assert!(!grid.is_selected("1"));
    assert!(!grid.row("1").unwrap().selected);
    assert_eq!(grid.selected_items().len(), 1);
    assert!(grid.display_rows().iter().all(|row| row.display_as_radio()));
}

#[test]
fn test_selecting_every_row_sets_select_all() {
    let mut grid = paged_grid(3, 3);
    for id in ["0", "1", "2"] {
        assert_eq!(grid.toggle_row(id), Some(true));
    }
    assert!(grid.all_selected());
    assert_eq!(grid.toggle_row("1"), Some(false));
    assert!(!grid.all_selected());
}

#[test]
fn test_unknown_row_selection_is_ignored() {
    let mut grid = paged_grid(3, 3);
    grid.on_row_selection_changed("missing", true);
    assert_eq!(grid.toggle_row("missing"), None);
    assert!(grid.drain_events().is_empty());
}

#[test]
fn test_host_selection_skips_unloaded_items() {
    let mut grid = paged_grid(10, 10);
    grid.set_selected(&[json!({"id": 1}), json!({"id": 999})]);

    assert!(grid.is_selected("1"));
    assert!(!grid.is_selected("999"));
    assert!(grid.row("1").unwrap().selected);
    assert!(grid.drain_events().is_empty());
}

#[test]
fn test_selection_broadcast_reaches_subscribers() {
    let mut grid = paged_grid(4, 4);
    let input = Rc::new(RefCell::new(SelectionInput::new(Some("2".to_string()), false, false)));
    let row = input.clone();
    let subscription = grid.subscribe_selection(move |change| row.borrow_mut().apply(change));

    grid.on_select_all_changed(true);
    assert!(input.borrow().checked());

    grid.on_row_selection_changed("2", false);
    assert!(!input.borrow().checked());

    assert!(grid.unsubscribe_selection(subscription));
    grid.on_row_selection_changed("2", true);
    assert!(!input.borrow().checked());
}

#[test]
fn test_refresh_keeps_selection() {
    let mut grid = paged_grid(5, 5);
    grid.on_row_selection_changed("3", true);

    let mut refreshed = comments(0..5);
    refreshed[3]["name"] = json!("Edited");
    grid.set_data(refreshed);

    assert!(grid.row("3").unwrap().selected);
    assert_eq!(grid.row("3").unwrap().data["name"], "Edited");
}

#[test]
fn test_refresh_drops_selection_of_removed_rows() {
    let mut grid = paged_grid(10, 10);
    for id in ["0", "1", "2"] {
        grid.on_row_selection_changed(id, true);
    }

    grid.set_data(comments(3..10));
    assert!(!grid.is_selected("0"));
    assert!(grid.selected_identifiers().is_empty());

    for i in 3..10 {
        grid.on_row_selection_changed(&i.to_string(), true);
    }
    assert_eq!(grid.selected_identifiers().len(), 7);
    assert_eq!(grid.selected_items().len(), 7);
    assert!(grid.all_selected());
}

#[test]
fn test_refresh_keeps_select_all_for_remaining_rows() {
    let mut grid = paged_grid(10, 10);
    grid.on_select_all_changed(true);
    grid.set_data(comments(5..12));

    assert!(grid.all_selected());
    assert_eq!(grid.selected_identifiers().len(), 7);
    assert!(!grid.is_selected("0"));
    assert!(grid.is_selected("11"));
}

#[test]
fn test_single_mode_never_reports_select_all() {
    let mut grid = DataGrid::new(GridConfig::new("id")).unwrap();
    grid.set_data(comments(0..1));
    grid.on_row_selection_changed("0", true);

    assert!(grid.is_selected("0"));
    assert!(!grid.all_selected());
}

// =============================================================================
// Data
// =============================================================================

#[test]
fn test_duplicate_and_unkeyed_items_are_skipped() {
    let mut grid = DataGrid::new(GridConfig::new("id")).unwrap();
    grid.set_data(vec![
        json!({"id": 1, "name": "first"}),
        json!({"id": 1, "name": "second"}),
        json!({"name": "no id"}),
    ]);

    assert_eq!(grid.len(), 1);
    assert_eq!(grid.row("1").unwrap().data["name"], "first");
    assert_eq!(grid.data().len(), 1);
}

#[test]
fn test_append_existing_identifier_updates_in_place() {
    let mut grid = paged_grid(10, 5);
    grid.append_page(vec![json!({"id": 2, "name": "updated"})]);

    assert_eq!(grid.len(), 5);
    assert_eq!(grid.row("2").unwrap().row_index, 2);
    assert_eq!(grid.data()[2]["name"], "updated");
}

#[test]
fn test_replace_data_starts_over() {
    let mut grid = paged_grid(100, 50);
    grid.on_row_selection_changed("1", true);
    grid.on_scroll(Viewport::new(1400.0, 350.0, 1750.0), &[]);
    assert_eq!(grid.current_page(), 1);

    grid.replace_data(comments(0..50));
    assert_eq!(grid.current_page(), 0);
    assert!(!grid.is_selected("1"));
    assert!(!grid.is_loading());
}

#[test]
fn test_display_rows_carry_config_and_mark() {
    let mut grid = DataGrid::new(config().row_mark_field("mark")).unwrap();
    grid.register_column(Column::new("name").header("Name"));
    grid.register_column(Column::new("secret").visible(false));
    grid.set_data(comments(0..3));

    let rows = grid.display_rows();
    assert_eq!(rows.len(), 3);
    let row = &rows[0];
    assert_eq!(row.identifier, "0");
    assert_eq!(row.columns.len(), 1);
    assert!(row.draggable);
    assert!(row.show_selection_input);
    let mark = row.mark.clone().unwrap();
    assert_eq!(mark.letter.as_deref(), Some("U"));
    assert_eq!(mark.color.as_deref(), Some("#98db53"));
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_bottom_edge_requests_next_page_once() {
    let mut grid = paged_grid(200, 50);
    let bottom = Viewport::new(1400.0, 350.0, 1750.0);

    grid.on_scroll(bottom, &[]);
    grid.on_scroll(bottom, &[]);
    let requests = load_requests(&grid.drain_events());
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].page, 1);
    assert_eq!(requests[0].from, 50);
    assert_eq!(requests[0].rows_per_page, 50);
    assert!(grid.is_loading());

    grid.append_page(comments(50..100));
    assert!(!grid.is_loading());
    grid.on_scroll(Viewport::new(3150.0, 350.0, 3500.0), &[]);
    let requests = load_requests(&grid.drain_events());
    assert_eq!(requests[0].page, 2);
    assert_eq!(requests[0].from, 100);
}

#[test]
fn test_no_request_when_all_records_loaded() {
    let mut grid = paged_grid(50, 50);
    grid.on_scroll(Viewport::new(1400.0, 350.0, 1750.0), &[]);
    assert!(grid.last_page_reached());
    assert!(load_requests(&grid.drain_events()).is_empty());
}

#[test]
fn test_no_request_above_bottom_edge() {
    let mut grid = paged_grid(200, 50);
    grid.on_scroll(Viewport::new(1000.0, 350.0, 1750.0), &[]);
    assert!(grid.drain_events().is_empty());
}

#[test]
fn test_loading_until_first_data() {
    let mut grid: DataGrid<Value> = DataGrid::new(GridConfig::new("id")).unwrap();
    assert!(grid.is_loading());
    grid.set_data(Vec::new());
    assert!(!grid.is_loading());
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_header_click_toggles_sort() {
    let mut grid = paged_grid(200, 50);
    grid.register_column(Column::new("name").sort_field("name"));
    grid.register_column(Column::new("body"));

    let change = grid.on_column_header_clicked("name").unwrap();
    assert_eq!(change.sort_direction, SortDirection::Ascending);
    let change = grid.on_column_header_clicked("name").unwrap();
    assert_eq!(change.sort_direction, SortDirection::Descending);
    assert!(grid.on_column_header_clicked("body").is_none());
    assert!(grid.on_column_header_clicked("missing").is_none());

    grid.on_scroll(Viewport::new(1400.0, 350.0, 1750.0), &[]);
    let requests = load_requests(&grid.drain_events());
    assert_eq!(requests[0].sort_field.as_deref(), Some("name"));
    assert_eq!(requests[0].sort_direction, Some(SortDirection::Descending));
}

// =============================================================================
// Reordering
// =============================================================================

#[test]
fn test_drag_end_moves_row() {
    let mut grid = paged_grid(10, 10);
    assert!(grid.on_row_drag_ended(RowDragEnded {
        current_index: 2,
        next_index: 7,
    }));

    let order: Vec<_> = grid.data().iter().map(|item| item["id"].clone()).collect();
    assert_eq!(
        order,
        [0, 1, 3, 4, 5, 6, 7, 2, 8, 9].map(|id| json!(id)).to_vec()
    );
    let relocated: Vec<_> = grid
        .display_rows()
        .into_iter()
        .filter(|row| row.relocated)
        .map(|row| row.identifier)
        .collect();
    assert_eq!(relocated, vec!["2".to_string()]);

    grid.clear_relocated();
    assert!(grid.rows().all(|row| !row.relocated));
}

#[test]
fn test_drag_tracker_feeds_grid() {
    let mut grid = paged_grid(5, 5);
    let mut tracker = DragTracker::new();
    tracker.on_drag_start(0);
    tracker.on_drag_over(4);
    let ended = tracker.on_drop(4).unwrap();

    assert!(grid.on_row_drag_ended(ended));
    assert_eq!(grid.row("0").unwrap().row_index, 4);
}

#[test]
fn test_drag_ignored_when_reorder_disabled() {
    let mut grid = DataGrid::new(GridConfig::new("id")).unwrap();
    grid.set_data(comments(0..5));
    assert!(!grid.on_row_drag_ended(RowDragEnded {
        current_index: 0,
        next_index: 3,
    }));
    assert_eq!(grid.row("0").unwrap().row_index, 0);
}

// =============================================================================
// Expansion and dirty tracking
// =============================================================================

#[test]
fn test_toggle_expanded() {
    let mut grid = paged_grid(5, 5);
    assert_eq!(grid.toggle_expanded("3"), Some(true));
    assert_eq!(
        grid.drain_events(),
        vec![GridEvent::RowExpanded {
            identifier: "3".to_string(),
            expanded: true,
        }]
    );
    assert_eq!(grid.toggle_expanded("3"), Some(false));
    assert_eq!(grid.toggle_expanded("missing"), None);

    let mut fixed = DataGrid::new(GridConfig::new("id")).unwrap();
    fixed.set_data(comments(0..5));
    assert_eq!(fixed.toggle_expanded("3"), None);
}

#[test]
fn test_dirty_tracking() {
    let mut grid = paged_grid(5, 5);
    assert!(grid.is_dirty());
    grid.clear_dirty();
    assert!(!grid.is_dirty());

    grid.on_row_selection_changed("1", true);
    assert!(grid.is_dirty());
}

#[test]
fn test_grid_ids_are_unique() {
    let a: DataGrid<Value> = DataGrid::new(GridConfig::new("id")).unwrap();
    let b: DataGrid<Value> = DataGrid::new(GridConfig::new("id")).unwrap();
    assert_ne!(a.id(), b.id());
    assert!(a.id_string().starts_with("__grid_"));
}
