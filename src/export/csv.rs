//! CSV export implementation.
//!
//! Exports the metrics table in CSV format for spreadsheet use.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or line breaks.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "name,depth,self,self_pct,total,total_pct")?;

        for row in &data.rows {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                Self::escape_field(&row.name),
                row.depth,
                row.self_value,
                data.self_percent(row),
                row.total,
                data.total_percent(row)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_rows;
    use crate::table::{SortColumn, SortDirection, SortState};

    #[test]
    fn test_csv_export_basic() {
        let data = ExportData::new(&sample_rows(), SortState::new());
        let mut output = Vec::new();

        CsvExporter.export(&data, &mut output).unwrap();

        let csv_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        // Header + 4 rows
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "name,depth,self,self_pct,total,total_pct");
        assert_eq!(lines[1], "root,0,3,30,10,100");
        assert_eq!(lines[2], "a,1,-2,-20,4,40");
        assert_eq!(lines[4], "b,1,3,30,3,30");
    }

    #[test]
    fn test_csv_export_follows_sort() {
        let data = ExportData::new(
            &sample_rows(),
            SortState::sorted_by(SortColumn::SelfValue, SortDirection::Ascending),
        );
        let mut output = Vec::new();
        CsvExporter.export(&data, &mut output).unwrap();

        let csv_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        // a (-2) first; root and b tie at 3 and keep pre-order
        assert!(lines[1].starts_with("a,"));
        assert!(lines[2].starts_with("root,"));
        assert!(lines[3].starts_with("b,"));
        assert!(lines[4].starts_with("\"a, inner\","));
    }

    #[test]
    fn test_csv_escape_field() {
        // No escaping needed
        assert_eq!(CsvExporter::escape_field("simple"), "simple");

        // Contains comma
        assert_eq!(
            CsvExporter::escape_field("has,comma"),
            "\"has,comma\""
        );

        // Contains quotes
        assert_eq!(
            CsvExporter::escape_field("has\"quote"),
            "\"has\"\"quote\""
        );

        // Contains newline
        assert_eq!(
            CsvExporter::escape_field("has\nnewline"),
            "\"has\nnewline\""
        );

        // Contains carriage return
        assert_eq!(
            CsvExporter::escape_field("has\rreturn"),
            "\"has\rreturn\""
        );
    }

    #[test]
    fn test_csv_export_special_characters() {
        let data = ExportData::new(&sample_rows(), SortState::new());
        let mut output = Vec::new();
        CsvExporter.export(&data, &mut output).unwrap();

        let csv_str = String::from_utf8(output).unwrap();

        // Name with comma should be quoted
        assert!(csv_str.contains("\"a, inner\",2,6,60,6,60"));
    }
}
