//! Render tree produced by the masonry grid.
//!
//! Nodes carry stable test ids so that callers and tests can count columns
//! and enumerate what each column mounted.

use refresh_ui::{Px, PxPosition};

/// Test id of the grid container.
pub const GRID_TEST_ID: &str = "masonry-grid";

/// Returns the test id of the column at `index`.
pub fn column_test_id(index: usize) -> String {
    format!("masonry-column-{index}")
}

/// An item mounted into a column.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem<R> {
    /// The item id, used as reconciliation key.
    pub id: String,
    /// Index of the item in the caller's item slice.
    pub source_index: usize,
    /// Offset of the item's top edge inside its column.
    pub offset: Px,
    /// Layout height of the item.
    pub height: Px,
    /// Output of the render callback.
    pub content: R,
}

/// A column container.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNode<R> {
    /// Position from the left, starting at 0.
    pub index: usize,
    /// Left edge inside the grid.
    pub x: Px,
    /// Column width.
    pub width: Px,
    /// Full height of the column, including unmounted items.
    pub total_height: Px,
    /// Number of items assigned to the column, mounted or not.
    pub assigned_count: usize,
    /// Mounted items, top to bottom.
    pub items: Vec<RenderedItem<R>>,
}

impl<R> ColumnNode<R> {
    /// Returns the column's test id.
    pub fn test_id(&self) -> String {
        column_test_id(self.index)
    }

    /// Returns the ids of the mounted items, top to bottom.
    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    /// Returns the position of a mounted item inside the grid.
    pub fn item_position(&self, item: &RenderedItem<R>) -> PxPosition {
        PxPosition::new(self.x, item.offset)
    }
}

/// The grid container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridNode<R> {
    /// Resolved number of columns.
    pub column_count: usize,
    /// Matched breakpoint key, for breakpoint-driven grids.
    pub active_breakpoint: Option<Px>,
    /// Whether only the visible window is mounted.
    pub virtualized: bool,
    /// Enforced container height while virtualized.
    pub container_height: Option<Px>,
    /// Height of the tallest column.
    pub content_height: Px,
    /// Current scroll offset, always 0 when not virtualized.
    pub scroll_offset: Px,
    /// Gap between items and between columns.
    pub gap: Px,
    /// Column containers, left to right.
    pub columns: Vec<ColumnNode<R>>,
}

impl<R> GridNode<R> {
    /// Returns the container's test id.
    pub fn test_id(&self) -> &'static str {
        GRID_TEST_ID
    }

    /// Returns the number of mounted items across all columns.
    pub fn rendered_item_count(&self) -> usize {
        self.columns.iter().map(|column| column.items.len()).sum()
    }

    /// Returns the number of items laid out, mounted or not.
    pub fn assigned_item_count(&self) -> usize {
        self.columns.iter().map(|column| column.assigned_count).sum()
    }

    /// Finds a mounted item and its column by id.
    pub fn find_item(&self, id: &str) -> Option<(&ColumnNode<R>, &RenderedItem<R>)> {
        self.columns.iter().find_map(|column| {
            column
                .items
                .iter()
                .find(|item| item.id == id)
                .map(|item| (column, item))
        })
    }

    /// Finds a column by its test id.
    pub fn column_by_test_id(&self, test_id: &str) -> Option<&ColumnNode<R>> {
        self.columns.iter().find(|column| column.test_id() == test_id)
    }
}
