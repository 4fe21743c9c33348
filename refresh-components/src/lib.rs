//! Components for RefreshUI.
//!
//! [`masonry_grid`](mod@crate::masonry_grid) arranges variable-height cards into
//! height-balanced columns whose count follows the viewport width, optionally
//! mounting only the cards near the visible window.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod item;
pub mod masonry_grid;

pub use item::MasonryItem;
pub use masonry_grid::{MasonryGrid, MasonryGridArgs, MasonryGridController, masonry_grid};
