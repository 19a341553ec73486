//! Virtualized data grid engine.
//!
//! Holds a client-side registry of row records keyed by a host-chosen
//! identifier property, computes which window of rows to materialize for a
//! scroll position, keeps a proxy element sized to the sum of measured row
//! heights, and coordinates selection, reordering and next-page requests.
//!
//! Rendering is left to the host: see [`grid::DataGrid::display_rows`].

pub mod column;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod item;
pub mod pagination;
pub mod registry;
pub mod reorder;
pub mod row;
pub mod selection;
pub mod sizer;
pub mod sort;
pub mod window;

pub use error::GridError;
pub use grid::DataGrid;

pub mod prelude {
    pub use crate::column::{Column, ColumnRegistry};
    pub use crate::config::GridConfig;
    pub use crate::error::GridError;
    pub use crate::events::{GridEvent, RowDragEnded, RowHeightChanged};
    pub use crate::grid::{DataGrid, GridId};
    pub use crate::item::RowItem;
    pub use crate::pagination::{LoadNextPage, PageLoadState};
    pub use crate::registry::{RowRecord, RowRegistry};
    pub use crate::reorder::{DragTracker, RowDragEvents};
    pub use crate::row::{RowMark, RowProps};
    pub use crate::selection::{SelectionChange, SelectionInput, SelectionMode, SubscriptionId};
    pub use crate::sort::{SortChanged, SortDirection};
    pub use crate::window::{RenderedRow, Viewport};
}
