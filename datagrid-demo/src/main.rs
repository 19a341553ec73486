use std::fs::File;
use std::time::Duration;

use datagrid::prelude::*;
use log::info;
use serde_json::{Value, json};
use simplelog::{Config, LevelFilter, WriteLogger};

const TOTAL_RECORDS: usize = 500;
const ROW_HEIGHT: f64 = 35.0;
const CLIENT_HEIGHT: f64 = 350.0;
const SCROLL_STEP: f64 = 700.0;

fn dataset() -> Vec<Value> {
    (0..TOTAL_RECORDS)
        .map(|i| {
            let mark = if i % 7 == 0 {
                json!({ "letter": "Pinned" })
            } else {
                Value::Null
            };
            json!({
                "id": i,
                "name": format!("Comment {}", i),
                "email": format!("user{}@example.com", i),
                "mark": mark,
            })
        })
        .collect()
}

/// Simulated renderer: report heights for the current window and commit.
fn render(grid: &mut DataGrid<Value>, scroll_top: f64) -> Vec<RenderedRow> {
    let rows = grid.display_rows();
    for row in &rows {
        let height = if row.expanded { ROW_HEIGHT * 3.0 } else { ROW_HEIGHT };
        grid.on_row_height_changed(RowHeightChanged::new(&row.identifier, None, height));
    }
    grid.commit_measurements();
    grid.clear_relocated();
    grid.clear_dirty();

    let mut top = grid.list_offset() - scroll_top;
    grid.display_rows()
        .into_iter()
        .map(|row| {
            let height = grid
                .row(&row.identifier)
                .ok()
                .and_then(|record| record.row_height)
                .unwrap_or(ROW_HEIGHT);
            let rendered = RenderedRow::new(row.identifier, top, height);
            top += height;
            rendered
        })
        .collect()
}

async fn run() -> Result<(), GridError> {
    let config = GridConfig::from_json(
        r#"{
            "identifierProperty": "id",
            "selectionMode": "multiple",
            "virtualScrollingEnabled": true,
            "allowRowsReorder": true,
            "expandable": true,
            "rowMarkField": "mark"
        }"#,
    )?;
    let data = dataset();
    let mut grid = DataGrid::new(config)?;
    grid.register_column(Column::new("name").header("Name").sort_field("name"));
    grid.register_column(Column::new("email").header("Email").width(240.0));
    grid.subscribe_selection(|change| info!("Selection broadcast: {:?}", change));

    let rows_per_page = grid.config().rows_per_page.min(data.len());
    grid.set_total_records(TOTAL_RECORDS);
    grid.set_data(data[..rows_per_page].to_vec());
    grid.set_viewport(Viewport::new(0.0, CLIENT_HEIGHT, 0.0));

    grid.on_select_all_changed(true);
    grid.toggle_expanded("2");
    grid.move_row(1, 4);

    let mut scroll_top = 0.0;
    let mut rendered = render(&mut grid, scroll_top);
    while !grid.last_page_reached() || scroll_top < grid.scroll_proxy_height() - CLIENT_HEIGHT {
        scroll_top = (scroll_top + SCROLL_STEP).min(grid.scroll_proxy_height() - CLIENT_HEIGHT);
        let viewport = Viewport::new(scroll_top, CLIENT_HEIGHT, grid.scroll_proxy_height());
        grid.on_scroll(viewport, &rendered);

        for event in grid.drain_events() {
            match event {
                GridEvent::LoadNextPage(request) => {
                    info!("Host fetching {:?}", request);
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    let end = (request.from + request.rows_per_page).min(data.len());
                    let start = request.from.min(end);
                    grid.append_page(data[start..end].to_vec());
                }
                other => info!("Host received {:?}", other),
            }
        }
        rendered = render(&mut grid, scroll_top);
    }

    println!(
        "Loaded {} of {} rows ({} selected), window {:?}, proxy {}px",
        grid.len(),
        grid.total_records(),
        grid.selected_items().len(),
        grid.window().range(),
        grid.scroll_proxy_height()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let log_file = File::create("datagrid-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
