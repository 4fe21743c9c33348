//! Items laid out by the masonry grid.

use refresh_ui::Px;

/// Height used for items whose height is missing or non-positive.
pub const DEFAULT_ITEM_HEIGHT: Px = Px(200);

/// A caller-supplied item with an estimated height.
///
/// The grid never measures or mutates items. `payload` is handed untouched to
/// the render callback.
#[derive(Debug, Clone, PartialEq)]
pub struct MasonryItem<T = ()> {
    /// Stable identifier, used as the key of the rendered item.
    pub id: String,
    /// Estimated rendered height.
    pub height: Px,
    /// Caller data.
    pub payload: T,
}

impl<T> MasonryItem<T> {
    /// Creates an item.
    pub fn new(id: impl Into<String>, height: Px, payload: T) -> Self {
        Self {
            id: id.into(),
            height,
            payload,
        }
    }

    /// Returns the height used for layout, substituting `fallback` for
    /// non-positive heights.
    pub fn effective_height(&self, fallback: Px) -> Px {
        self.height.positive_or(fallback.positive_or(DEFAULT_ITEM_HEIGHT))
    }
}

impl MasonryItem {
    /// Creates an item without payload.
    pub fn bare(id: impl Into<String>, height: Px) -> Self {
        Self::new(id, height, ())
    }
}
