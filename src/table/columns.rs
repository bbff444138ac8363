//! Column descriptors and cell formatting for the metrics table.

use super::flatten::FlattenedRow;
use super::sort::SortColumn;

/// A table column: header label plus cell formatting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: SortColumn,
}

/// The fixed column set, in display order.
pub const COLUMNS: [Column; 3] = [
    Column {
        key: SortColumn::SelfValue,
    },
    Column {
        key: SortColumn::Total,
    },
    Column {
        key: SortColumn::Name,
    },
];

impl Column {
    /// Header text.
    pub fn label(&self) -> &'static str {
        match self.key {
            SortColumn::SelfValue => "Self",
            SortColumn::Total => "Total",
            SortColumn::Name => "Name",
        }
    }

    /// Renders this column's cell for `row`.
    ///
    /// Weight columns read `"<n> (<pct>%)"` where the percentage is relative
    /// to the root's total; the name column is the name as-is.
    pub fn format_cell(&self, row: &FlattenedRow, root_total: f64) -> String {
        match self.key {
            SortColumn::SelfValue => format_weight(row.self_value, root_total),
            SortColumn::Total => format_weight(row.total, root_total),
            SortColumn::Name => row.name.clone(),
        }
    }
}

/// `value` as a whole percentage of `root_total`.
///
/// Halves round toward positive infinity (`2.5 -> 3`, `-2.5 -> -2`). A zero
/// root total has no meaningful ratio and reports 0.
pub fn percent_of(value: f64, root_total: f64) -> i64 {
    if root_total == 0.0 {
        return 0;
    }
    let ratio = value * 100.0 / root_total;
    if !ratio.is_finite() {
        return 0;
    }
    (ratio + 0.5).floor() as i64
}

/// `"<n> (<pct>%)"`, e.g. `"3 (30%)"`.
pub fn format_weight(value: f64, root_total: f64) -> String {
    format!("{} ({}%)", value, percent_of(value, root_total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_and_labels() {
        let labels: Vec<_> = COLUMNS.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Self", "Total", "Name"]);
    }

    #[test]
    fn test_format_cell() {
        let row = FlattenedRow::new("parse", 3.0, 4.0, 1);

        assert_eq!(COLUMNS[0].format_cell(&row, 10.0), "3 (30%)");
        assert_eq!(COLUMNS[1].format_cell(&row, 10.0), "4 (40%)");
        assert_eq!(COLUMNS[2].format_cell(&row, 10.0), "parse");
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent_of(1.0, 3.0), 33);
        assert_eq!(percent_of(2.0, 3.0), 67);
        assert_eq!(percent_of(1.0, 8.0), 13); // 12.5 rounds up
        assert_eq!(percent_of(-1.0, 40.0), -2); // -2.5 rounds toward +inf
        assert_eq!(percent_of(-4.0, 1.0), -400);
    }

    #[test]
    fn test_percent_zero_root_total() {
        assert_eq!(percent_of(5.0, 0.0), 0);
        assert_eq!(percent_of(0.0, 0.0), 0);
        assert_eq!(format_weight(5.0, 0.0), "5 (0%)");
    }

    #[test]
    fn test_format_weight_fractional_and_negative() {
        assert_eq!(format_weight(1.5, 3.0), "1.5 (50%)");
        assert_eq!(format_weight(-4.0, 1.0), "-4 (-400%)");
    }
}
