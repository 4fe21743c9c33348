//! Responsive breakpoint tables and the column-count resolver.
//!
//! ## Usage
//!
//! Map a viewport width to a column count for responsive layouts.
//!
//! A [`BreakpointTable`] is an ordered list of `(min_width, columns)` entries.
//! The active entry for a width is the one with the greatest `min_width` that
//! is less than or equal to the width, so an exact match selects its own entry.
//!
//! Resolution never fails. A table that is empty, lacks the `0` entry, has
//! non-increasing keys or a zero column count resolves to a single column.
//!
//! ```
//! use refresh_ui::{
//!     Px,
//!     breakpoint::{BreakpointTable, resolve_active_breakpoint, resolve_column_count},
//! };
//!
//! let table = BreakpointTable::new([(0, 1), (800, 2), (1600, 4)]);
//! assert_eq!(resolve_column_count(Px(1000), &table), 2);
//! assert_eq!(resolve_active_breakpoint(Px(1700), &table), Px(1600));
//! ```

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::px::Px;

/// Column count used when a table cannot be resolved.
pub const FALLBACK_COLUMNS: usize = 1;

/// A single `(min_width, columns)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    /// Inclusive minimum viewport width.
    pub min_width: Px,
    /// Column count used from `min_width` up to the next entry.
    pub columns: usize,
}

/// Reasons a breakpoint table is rejected by [`BreakpointTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakpointTableError {
    /// The table has no entries.
    #[error("breakpoint table is empty")]
    Empty,
    /// The first entry does not start at width 0.
    #[error("breakpoint table must start at width 0, first entry is {first}")]
    MissingBaseEntry {
        /// Key of the first entry.
        first: Px,
    },
    /// Keys are not strictly increasing.
    #[error("breakpoint keys must be strictly increasing, {next} follows {previous}")]
    NonIncreasing {
        /// The earlier key.
        previous: Px,
        /// The offending later key.
        next: Px,
    },
    /// An entry maps to zero columns.
    #[error("breakpoint {min_width} maps to zero columns")]
    ZeroColumns {
        /// Key of the offending entry.
        min_width: Px,
    },
}

/// Ordered mapping from minimum viewport width to column count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakpointTable {
    entries: SmallVec<[Breakpoint; 4]>,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::new([(0, 1), (600, 2), (1200, 3)])
    }
}

impl FromIterator<(i32, usize)> for BreakpointTable {
    fn from_iter<I: IntoIterator<Item = (i32, usize)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl BreakpointTable {
    /// Creates a table from `(min_width, columns)` pairs, keeping their order.
    ///
    /// No validation happens here; malformed tables resolve to a single
    /// column. Use [`BreakpointTable::try_new`] to reject them instead.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, usize)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(min_width, columns)| Breakpoint {
                    min_width: Px(min_width),
                    columns,
                })
                .collect(),
        }
    }

    /// Creates a table and validates it.
    pub fn try_new<I>(entries: I) -> Result<Self, BreakpointTableError>
    where
        I: IntoIterator<Item = (i32, usize)>,
    {
        let table = Self::new(entries);
        table.validate()?;
        Ok(table)
    }

    /// Returns the entries in table order.
    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks the table invariants.
    pub fn validate(&self) -> Result<(), BreakpointTableError> {
        let first = self.entries.first().ok_or(BreakpointTableError::Empty)?;
        if first.min_width != Px::ZERO {
            return Err(BreakpointTableError::MissingBaseEntry {
                first: first.min_width,
            });
        }
        for pair in self.entries.windows(2) {
            if pair[1].min_width <= pair[0].min_width {
                return Err(BreakpointTableError::NonIncreasing {
                    previous: pair[0].min_width,
                    next: pair[1].min_width,
                });
            }
        }
        if let Some(entry) = self.entries.iter().find(|entry| entry.columns == 0) {
            return Err(BreakpointTableError::ZeroColumns {
                min_width: entry.min_width,
            });
        }
        Ok(())
    }

    /// Returns the entry active at `viewport_width`, or `None` for a
    /// malformed table.
    pub fn active_entry(&self, viewport_width: Px) -> Option<Breakpoint> {
        if let Err(err) = self.validate() {
            warn!("Falling back to a single column: {err}");
            return None;
        }
        let width = viewport_width.max(Px::ZERO);
        // Keys are strictly increasing, so the last key <= width is the greatest one.
        self.entries
            .iter()
            .take_while(|entry| entry.min_width <= width)
            .last()
            .copied()
    }
}

/// Resolves the column count for `viewport_width`.
///
/// Negative widths are treated as `0`. Malformed tables yield
/// [`FALLBACK_COLUMNS`].
pub fn resolve_column_count(viewport_width: Px, table: &BreakpointTable) -> usize {
    table
        .active_entry(viewport_width)
        .map(|entry| entry.columns)
        .unwrap_or(FALLBACK_COLUMNS)
}

/// Resolves the key of the breakpoint active at `viewport_width`.
///
/// Malformed tables report `0`, matching the single-column fallback.
pub fn resolve_active_breakpoint(viewport_width: Px, table: &BreakpointTable) -> Px {
    table
        .active_entry(viewport_width)
        .map(|entry| entry.min_width)
        .unwrap_or(Px::ZERO)
}

impl Serialize for BreakpointTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.min_width.0.to_string(), &entry.columns)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BreakpointTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = BreakpointTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from minimum viewport width to column count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(4));
        while let Some((key, columns)) = access.next_entry::<MinWidthKey, usize>()? {
            entries.push((key.0, columns));
        }
        // Map order carries no meaning. The sort is stable, so duplicate keys stay
        // adjacent and still fail validation.
        entries.sort_by_key(|(min_width, _)| *min_width);
        Ok(BreakpointTable::new(entries))
    }
}

struct MinWidthKey(i32);

impl<'de> Deserialize<'de> for MinWidthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MinWidthKeyVisitor)
    }
}

struct MinWidthKeyVisitor;

impl Visitor<'_> for MinWidthKeyVisitor {
    type Value = MinWidthKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a pixel width as an integer or integer string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value
            .trim()
            .trim_end_matches("px")
            .parse::<i32>()
            .map(MinWidthKey)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        i32::try_from(value)
            .map(MinWidthKey)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i32::try_from(value)
            .map(MinWidthKey)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 1)]
    #[case(599, 1)]
    #[case(600, 2)]
    #[case(1199, 2)]
    #[case(1200, 3)]
    #[case(5000, 3)]
    fn test_default_table_resolution(#[case] width: i32, #[case] expected: usize) {
        let table = BreakpointTable::new([(0, 1), (600, 2), (1200, 3)]);
        assert_eq!(resolve_column_count(Px(width), &table), expected);
    }

    #[rstest]
    #[case(1000, 2, 800)]
    #[case(1700, 4, 1600)]
    #[case(800, 2, 800)]
    #[case(0, 1, 0)]
    fn test_custom_breakpoints(
        #[case] width: i32,
        #[case] columns: usize,
        #[case] active: i32,
    ) {
        let table = BreakpointTable::new([(0, 1), (800, 2), (1600, 4)]);
        assert_eq!(resolve_column_count(Px(width), &table), columns);
        assert_eq!(resolve_active_breakpoint(Px(width), &table), Px(active));
    }

    #[test]
    fn test_non_monotonic_column_counts_are_allowed() {
        let table = BreakpointTable::new([(0, 3), (500, 1), (900, 2)]);
        assert!(table.validate().is_ok());
        assert_eq!(resolve_column_count(Px(100), &table), 3);
        assert_eq!(resolve_column_count(Px(600), &table), 1);
        assert_eq!(resolve_column_count(Px(901), &table), 2);
    }

    #[test]
    fn test_negative_width_uses_base_entry() {
        let table = BreakpointTable::default();
        assert_eq!(resolve_column_count(Px(-20), &table), 1);
        assert_eq!(resolve_active_breakpoint(Px(-20), &table), Px::ZERO);
    }

    #[rstest]
    #[case(BreakpointTable::new(Vec::new()), BreakpointTableError::Empty)]
    #[case(
        BreakpointTable::new([(300, 2), (900, 3)]),
        BreakpointTableError::MissingBaseEntry { first: Px(300) }
    )]
    #[case(
        BreakpointTable::new([(0, 1), (900, 3), (600, 2)]),
        BreakpointTableError::NonIncreasing { previous: Px(900), next: Px(600) }
    )]
    #[case(
        BreakpointTable::new([(0, 1), (600, 2), (600, 3)]),
        BreakpointTableError::NonIncreasing { previous: Px(600), next: Px(600) }
    )]
    #[case(
        BreakpointTable::new([(0, 1), (600, 0)]),
        BreakpointTableError::ZeroColumns { min_width: Px(600) }
    )]
    fn test_malformed_tables_fall_back_to_one_column(
        #[case] table: BreakpointTable,
        #[case] expected: BreakpointTableError,
    ) {
        assert_eq!(table.validate(), Err(expected));
        for width in [0, 700, 5000] {
            assert_eq!(resolve_column_count(Px(width), &table), FALLBACK_COLUMNS);
            assert_eq!(resolve_active_breakpoint(Px(width), &table), Px::ZERO);
        }
    }

    #[test]
    fn test_try_new_rejects_malformed_table() {
        assert!(BreakpointTable::try_new([(0, 1), (10, 2)]).is_ok());
        assert_eq!(
            BreakpointTable::try_new([(10, 2)]),
            Err(BreakpointTableError::MissingBaseEntry { first: Px(10) })
        );
    }

    #[test]
    fn test_deserialize_sorts_map_keys() {
        let expected = BreakpointTable::new([(0, 1), (800, 2), (1600, 4)]);
        let table: BreakpointTable =
            serde_json::from_str(r#"{ "0": 1, "800": 2, "1600": 4 }"#).expect("valid table");
        assert_eq!(table, expected);

        let unordered: BreakpointTable =
            serde_json::from_str(r#"{ "1600": 4, "0": 1, "800": 2 }"#).expect("valid json");
        assert_eq!(unordered, expected);
    }

    #[test]
    fn test_deserialize_keeps_duplicates_for_validation() {
        let table: BreakpointTable =
            serde_json::from_str(r#"{ "0": 1, "600": 2, "600px": 3 }"#).expect("valid json");
        assert_eq!(
            table.validate(),
            Err(BreakpointTableError::NonIncreasing {
                previous: Px(600),
                next: Px(600),
            })
        );
        assert_eq!(resolve_column_count(Px(700), &table), FALLBACK_COLUMNS);
    }

    #[test]
    fn test_deserialize_without_base_entry_falls_back() {
        let table: BreakpointTable =
            serde_json::from_str(r#"{ "600": 2, "1200": 3 }"#).expect("valid json");
        assert_eq!(resolve_column_count(Px(1300), &table), FALLBACK_COLUMNS);
    }

    #[test]
    fn test_deserialize_rejects_non_numeric_keys() {
        let result = serde_json::from_str::<BreakpointTable>(r#"{ "wide": 3 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trips_through_json() {
        let table = BreakpointTable::new([(0, 1), (640, 2)]);
        let json = serde_json::to_string(&table).expect("serializable");
        assert_eq!(json, r#"{"0":1,"640":2}"#);
    }
}
