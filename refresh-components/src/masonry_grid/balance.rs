//! Greedy shortest-column balancing.
//!
//! Items are visited in input order and each one goes to the column whose
//! running height is smallest, ties going to the leftmost column. Input order
//! is never changed, so content keeps its reading order at the cost of a
//! looser fit than height-sorted placement would give.

use refresh_ui::Px;
use tracing::warn;

use crate::item::{DEFAULT_ITEM_HEIGHT, MasonryItem};

/// An item's placement inside a [`Column`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnEntry {
    /// Index of the item in the slice passed to the balancer.
    pub source_index: usize,
    /// The item id.
    pub id: String,
    /// Height used for layout, after fallback substitution.
    pub height: Px,
    /// Distance from the top of the column to the top of the item.
    pub offset: Px,
}

impl ColumnEntry {
    /// Returns the offset of the item's bottom edge.
    pub fn end(&self) -> Px {
        self.offset.saturating_add(self.height)
    }
}

/// A vertical stack of items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Position from the left, starting at 0.
    pub index: usize,
    /// Entries in top-to-bottom order.
    pub items: Vec<ColumnEntry>,
    /// Sum of item heights plus the gaps between them.
    pub total_height: Px,
}

impl Column {
    fn new(index: usize) -> Self {
        Self {
            index,
            items: Vec::new(),
            total_height: Px::ZERO,
        }
    }

    /// Returns the number of items in the column.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no item was assigned to the column.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the ids of the column's items, top to bottom.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|entry| entry.id.as_str())
    }

    /// Resolves the entries back to the items they were computed from.
    ///
    /// `source` must be the slice passed to the balancer.
    pub fn resolve<'a, T>(
        &'a self,
        source: &'a [MasonryItem<T>],
    ) -> impl Iterator<Item = &'a MasonryItem<T>> + 'a {
        self.items
            .iter()
            .filter_map(|entry| source.get(entry.source_index))
    }

    fn push(&mut self, source_index: usize, id: &str, height: Px, gap: Px) {
        let offset = if self.items.is_empty() {
            Px::ZERO
        } else {
            self.total_height.saturating_add(gap)
        };
        self.items.push(ColumnEntry {
            source_index,
            id: id.to_owned(),
            height,
            offset,
        });
        self.total_height = offset.saturating_add(height);
    }
}

/// Distributes `items` over `column_count` columns.
///
/// Non-positive heights are replaced by [`DEFAULT_ITEM_HEIGHT`]. See
/// [`distribute_columns_with_fallback`] for the rules.
pub fn distribute_columns<T>(items: &[MasonryItem<T>], column_count: usize, gap: Px) -> Vec<Column> {
    distribute_columns_with_fallback(items, column_count, gap, DEFAULT_ITEM_HEIGHT)
}

/// Distributes `items` over `column_count` columns with an explicit fallback
/// height.
///
/// - `column_count` of 0 is treated as 1, and a negative `gap` as 0.
/// - Every item lands in exactly one column; identical inputs always produce
///   identical columns.
/// - Empty input yields `column_count` empty columns.
pub fn distribute_columns_with_fallback<T>(
    items: &[MasonryItem<T>],
    column_count: usize,
    gap: Px,
    fallback_height: Px,
) -> Vec<Column> {
    let column_count = column_count.max(1);
    let gap = gap.max(Px::ZERO);
    let mut columns: Vec<Column> = (0..column_count).map(Column::new).collect();
    let mut heights = vec![Px::ZERO; column_count];

    for (source_index, item) in items.iter().enumerate() {
        if item.height <= Px::ZERO {
            warn!(id = %item.id, height = item.height.raw(), "Masonry item has a non-positive height, using fallback");
        }
        let height = item.effective_height(fallback_height);
        let target = find_shortest_column(&heights);
        columns[target].push(source_index, &item.id, height, gap);
        heights[target] = columns[target].total_height;
    }

    columns
}

/// Returns the index of the shortest column, preferring the leftmost on ties.
pub(crate) fn find_shortest_column(heights: &[Px]) -> usize {
    let mut index = 0;
    let mut best = heights.first().copied().unwrap_or(Px::ZERO);
    for (i, height) in heights.iter().enumerate().skip(1) {
        if *height < best {
            best = *height;
            index = i;
        }
    }
    index
}

/// Returns the height of the tallest column.
pub fn tallest_column_height(columns: &[Column]) -> Px {
    columns
        .iter()
        .map(|column| column.total_height)
        .max()
        .unwrap_or(Px::ZERO)
}

/// Returns the difference between the tallest and the shortest column.
pub fn column_height_spread(columns: &[Column]) -> Px {
    let shortest = columns
        .iter()
        .map(|column| column.total_height)
        .min()
        .unwrap_or(Px::ZERO);
    tallest_column_height(columns) - shortest
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    fn feed(heights: &[i32]) -> Vec<MasonryItem> {
        heights
            .iter()
            .enumerate()
            .map(|(i, height)| MasonryItem::bare(format!("item-{i}"), Px(*height)))
            .collect()
    }

    fn ids(column: &Column) -> Vec<&str> {
        column.ids().collect()
    }

    #[test]
    fn test_places_into_shortest_column_in_input_order() {
        let items = feed(&[100, 50, 30, 40, 10]);
        let columns = distribute_columns(&items, 2, Px(10));

        // 0 -> col0 (100); 1 -> col1 (50); 2 -> col1 (50+10+30=90);
        // 3 -> col1 (90+10+40=140); 4 -> col0 (100+10+10=120).
        assert_eq!(ids(&columns[0]), vec!["item-0", "item-4"]);
        assert_eq!(ids(&columns[1]), vec!["item-1", "item-2", "item-3"]);
        assert_eq!(columns[0].total_height, Px(120));
        assert_eq!(columns[1].total_height, Px(140));

        let offsets: Vec<Px> = columns[1].items.iter().map(|entry| entry.offset).collect();
        assert_eq!(offsets, vec![Px(0), Px(60), Px(100)]);
    }

    #[test]
    fn test_ties_go_to_leftmost_column() {
        let items = feed(&[10, 10, 10, 10, 10, 10]);
        let columns = distribute_columns(&items, 3, Px(0));
        assert_eq!(ids(&columns[0]), vec!["item-0", "item-3"]);
        assert_eq!(ids(&columns[1]), vec!["item-1", "item-4"]);
        assert_eq!(ids(&columns[2]), vec!["item-2", "item-5"]);
    }

    #[test]
    fn test_total_height_counts_gaps_between_items_only() {
        let items = feed(&[40, 60, 80]);
        let columns = distribute_columns(&items, 1, Px(12));
        assert_eq!(columns[0].total_height, Px(40 + 60 + 80 + 2 * 12));
        assert_eq!(columns[0].items[0].offset, Px::ZERO);
        assert_eq!(columns[0].items[2].end(), columns[0].total_height);
    }

    #[test]
    fn test_distribution_is_deterministic() {
        let items = feed(&[120, 80, 310, 45, 200, 95, 60, 180, 240, 30, 75]);
        let first = distribute_columns(&items, 4, Px(16));
        for _ in 0..5 {
            assert_eq!(distribute_columns(&items, 4, Px(16)), first);
        }
    }

    #[test]
    fn test_every_item_appears_exactly_once() {
        let heights: Vec<i32> = (0..97).map(|i| 40 + (i * 37) % 260).collect();
        let items = feed(&heights);
        let columns = distribute_columns(&items, 5, Px(8));

        let mut seen = HashSet::new();
        let mut count = 0;
        for column in &columns {
            let mut last_source = None;
            for entry in &column.items {
                assert!(seen.insert(entry.source_index), "duplicate item");
                assert_eq!(items[entry.source_index].id, entry.id);
                // Entries within a column keep input order.
                assert!(last_source.is_none_or(|last| last < entry.source_index));
                last_source = Some(entry.source_index);
                count += 1;
            }
        }
        assert_eq!(count, items.len());
    }

    #[rstest]
    #[case(1, 7)]
    #[case(2, 9)]
    #[case(3, 10)]
    #[case(4, 21)]
    #[case(7, 50)]
    fn test_equal_heights_stay_within_one_item(#[case] column_count: usize, #[case] n: usize) {
        let h = 75;
        let items = feed(&vec![h; n]);
        let columns = distribute_columns(&items, column_count, Px::ZERO);
        assert!(column_height_spread(&columns) <= Px(h));

        // With a gap every non-first item also carries the gap.
        let gap = Px(16);
        let columns = distribute_columns(&items, column_count, gap);
        assert!(column_height_spread(&columns) <= Px(h) + gap);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(6)]
    fn test_empty_input_yields_empty_columns(#[case] column_count: usize) {
        let columns = distribute_columns::<()>(&[], column_count, Px(16));
        assert_eq!(columns.len(), column_count);
        for (index, column) in columns.iter().enumerate() {
            assert_eq!(column.index, index);
            assert!(column.is_empty());
            assert_eq!(column.total_height, Px::ZERO);
        }
    }

    #[test]
    fn test_more_columns_than_items_leaves_columns_empty() {
        let items = feed(&[50, 60]);
        let columns = distribute_columns(&items, 4, Px(10));
        assert_eq!(columns.len(), 4);
        assert_eq!(columns.iter().filter(|column| column.is_empty()).count(), 2);
    }

    #[test]
    fn test_zero_columns_and_negative_gap_are_clamped() {
        let items = feed(&[10, 20]);
        let columns = distribute_columns(&items, 0, Px(-5));
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].total_height, Px(30));
    }

    #[test]
    fn test_non_positive_heights_use_fallback() {
        let items = feed(&[0, -20, 50]);
        let columns = distribute_columns_with_fallback(&items, 1, Px::ZERO, Px(90));
        let heights: Vec<Px> = columns[0].items.iter().map(|entry| entry.height).collect();
        assert_eq!(heights, vec![Px(90), Px(90), Px(50)]);
    }

    #[test]
    fn test_resolve_returns_source_items() {
        let items: Vec<MasonryItem<&str>> = vec![
            MasonryItem::new("a", Px(10), "first"),
            MasonryItem::new("b", Px(30), "second"),
            MasonryItem::new("c", Px(10), "third"),
        ];
        let columns = distribute_columns(&items, 2, Px::ZERO);
        let payloads: Vec<&str> = columns[0].resolve(&items).map(|item| item.payload).collect();
        assert_eq!(payloads, vec!["first", "third"]);
    }

    #[test]
    fn test_find_shortest_column_prefers_lowest_index() {
        assert_eq!(find_shortest_column(&[Px(5), Px(3), Px(3)]), 1);
        assert_eq!(find_shortest_column(&[Px(0), Px(0)]), 0);
        assert_eq!(find_shortest_column(&[]), 0);
    }
}
