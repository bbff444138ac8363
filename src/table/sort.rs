//! Row ordering for the metrics table.
//!
//! Single-column, stable sorting over flattened rows. Rows that compare
//! equal keep their pre-order position, and [`SortDirection::None`] gives the
//! pre-order sequence back unchanged.

use std::cmp::Ordering;
use std::fmt;

use super::flatten::FlattenedRow;

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    /// Node name, lexicographic.
    Name,
    /// Self weight, numeric.
    SelfValue,
    /// Total weight, numeric.
    Total,
}

impl SortColumn {
    /// Compares two rows on this column, ascending.
    pub fn compare(&self, a: &FlattenedRow, b: &FlattenedRow) -> Ordering {
        match self {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::SelfValue => compare_weights(a.self_value, b.self_value),
            SortColumn::Total => compare_weights(a.total, b.total),
        }
    }
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "self" => Ok(SortColumn::SelfValue),
            "total" => Ok(SortColumn::Total),
            _ => Err(format!(
                "Unknown sort column: '{}'. Valid columns: name, self, total",
                s
            )),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortColumn::Name => write!(f, "name"),
            SortColumn::SelfValue => write!(f, "self"),
            SortColumn::Total => write!(f, "total"),
        }
    }
}

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Original pre-order.
    #[default]
    None,
}

impl SortDirection {
    /// Next direction in the `none -> ascending -> descending -> none` cycle.
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }

    /// Header indicator for the direction.
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
            SortDirection::None => "",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            "none" => Ok(SortDirection::None),
            _ => Err(format!(
                "Unknown sort direction: '{}'. Valid directions: asc, desc, none",
                s
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
            SortDirection::None => write!(f, "none"),
        }
    }
}

/// Current sort of the table: at most one column at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    column: Option<SortColumn>,
    direction: SortDirection,
}

impl SortState {
    /// Unsorted, i.e. pre-order.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state sorted on `column`. `SortDirection::None` yields the unsorted state.
    pub fn sorted_by(column: SortColumn, direction: SortDirection) -> Self {
        if direction == SortDirection::None {
            Self::default()
        } else {
            Self {
                column: Some(column),
                direction,
            }
        }
    }

    /// The sorted column, if any.
    pub fn column(&self) -> Option<SortColumn> {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Direction shown for `column`: `None` unless it is the sorted column.
    pub fn direction_for(&self, column: SortColumn) -> SortDirection {
        if self.column == Some(column) {
            self.direction
        } else {
            SortDirection::None
        }
    }

    /// Header click on `column`.
    ///
    /// The same column cycles `none -> ascending -> descending -> none`.
    /// A different column starts over at ascending and the previous
    /// column's state is dropped.
    pub fn toggle(self, column: SortColumn) -> Self {
        let next = if self.column == Some(column) {
            self.direction.next()
        } else {
            SortDirection::Ascending
        };
        Self::sorted_by(column, next)
    }

    /// Orders `rows` according to this state.
    pub fn apply(&self, rows: &[FlattenedRow]) -> Vec<FlattenedRow> {
        match self.column {
            Some(column) => order(rows, column, self.direction),
            None => rows.to_vec(),
        }
    }
}

/// Returns `rows` ordered by `column` in `direction`.
///
/// The sort is stable in both directions: ties keep their relative input
/// order, so sorting pre-order rows never shuffles equal entries.
///
/// # Example
///
/// ```
/// use flamescope::table::{order, FlattenedRow, SortColumn, SortDirection};
///
/// let rows = vec![
///     FlattenedRow::new("root", 3.0, 10.0, 0),
///     FlattenedRow::new("a", 4.0, 4.0, 1),
///     FlattenedRow::new("b", 3.0, 3.0, 1),
/// ];
/// let sorted = order(&rows, SortColumn::Total, SortDirection::Ascending);
/// assert_eq!(sorted[0].name, "b");
/// ```
pub fn order(
    rows: &[FlattenedRow],
    column: SortColumn,
    direction: SortDirection,
) -> Vec<FlattenedRow> {
    let mut sorted = rows.to_vec();
    match direction {
        SortDirection::None => {}
        SortDirection::Ascending => sorted.sort_by(|a, b| column.compare(a, b)),
        // Comparing b to a, rather than reversing afterwards, keeps ties stable.
        SortDirection::Descending => sorted.sort_by(|a, b| column.compare(b, a)),
    }
    sorted
}

/// Weights are finite once validated, so `partial_cmp` always succeeds.
fn compare_weights(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
