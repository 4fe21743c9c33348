//! Column count selection and horizontal column tracks.

use refresh_ui::{
    Px,
    breakpoint::{BreakpointTable, resolve_active_breakpoint, resolve_column_count},
};
use serde::{Deserialize, Serialize};

/// Defines how the number of columns is chosen.
///
/// In configuration files a plain integer selects [`ColumnSpec::Fixed`], a
/// `{ "adaptive": px }` object selects [`ColumnSpec::Adaptive`] and any other
/// map is read as a breakpoint table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// A literal column count.
    Fixed(usize),
    /// As many columns as fit while keeping each at least `min_width` wide.
    Adaptive {
        /// Minimum column width.
        #[serde(rename = "adaptive")]
        min_width: Px,
    },
    /// Column count looked up from the viewport width.
    Breakpoints(BreakpointTable),
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::Breakpoints(BreakpointTable::default())
    }
}

/// Outcome of [`ColumnSpec::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Number of columns, at least 1.
    pub count: usize,
    /// Matched breakpoint key, for breakpoint-driven specs.
    pub active_breakpoint: Option<Px>,
}

impl ColumnSpec {
    /// Creates a fixed-count spec.
    pub fn fixed(count: usize) -> Self {
        Self::Fixed(count)
    }

    /// Creates an adaptive spec with a minimum column width.
    pub fn adaptive(min_width: Px) -> Self {
        Self::Adaptive { min_width }
    }

    /// Creates a breakpoint-driven spec.
    pub fn breakpoints(table: BreakpointTable) -> Self {
        Self::Breakpoints(table)
    }

    /// Resolves the column count for a container `width` and column `gap`.
    pub fn resolve(&self, width: Px, gap: Px) -> ResolvedColumns {
        match self {
            Self::Fixed(count) => ResolvedColumns {
                count: (*count).max(1),
                active_breakpoint: None,
            },
            Self::Adaptive { min_width } => {
                let min_i32 = min_width.0.max(1);
                let gap_i32 = gap.0.max(0);
                let available_i32 = width.0.max(0);
                let count = (available_i32.saturating_add(gap_i32)
                    / min_i32.saturating_add(gap_i32))
                .max(1) as usize;
                ResolvedColumns {
                    count,
                    active_breakpoint: None,
                }
            }
            Self::Breakpoints(table) => ResolvedColumns {
                count: resolve_column_count(width, table),
                active_breakpoint: Some(resolve_active_breakpoint(width, table)),
            },
        }
    }
}

/// Horizontal extent of each column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnTracks {
    /// Column widths, left to right.
    pub widths: Vec<Px>,
    /// Left edge of each column.
    pub positions: Vec<Px>,
}

/// Splits `available` into `count` columns separated by `gap`.
///
/// Leftover pixels go to the leftmost columns one at a time. An unmeasured
/// (zero) width yields zero-width columns.
pub fn resolve_tracks(available: Px, count: usize, gap: Px) -> ColumnTracks {
    let count = count.max(1);
    let gap = gap.max(Px::ZERO);
    let spacing_total = gap.saturating_mul_count(count - 1);
    let without_spacing = (available - spacing_total).max(Px::ZERO);
    let base = without_spacing.0 / count as i32;
    let remainder = without_spacing.0 % count as i32;

    let widths: Vec<Px> = (0..count)
        .map(|index| {
            let extra = if (index as i32) < remainder { 1 } else { 0 };
            Px(base + extra)
        })
        .collect();

    let mut positions = Vec::with_capacity(count);
    let mut cursor = Px::ZERO;
    for width in &widths {
        positions.push(cursor);
        cursor = cursor.saturating_add(*width).saturating_add(gap);
    }

    ColumnTracks { widths, positions }
}
