//! Markdown export implementation.
//!
//! Exports the metrics table in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use crate::table::{format_weight, SortState, COLUMNS};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Escape characters that would break a table cell.
    fn escape_cell(value: &str) -> String {
        value.replace('|', "\\|").replace('\n', " ")
    }

    fn sort_description(sort: &SortState) -> String {
        match sort.column() {
            Some(column) => format!("{} ({})", column, sort.direction()),
            None => "pre-order".to_string(),
        }
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Flame Graph Report")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "**Root:** {} ({})",
            Self::escape_cell(&data.root_name),
            data.root_total
        )?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Nodes | {} |", data.rows.len())?;
        writeln!(writer, "| Root Total | {} |", data.root_total)?;
        writeln!(
            writer,
            "| Negative Self | {} |",
            data.negative_self_count()
        )?;
        writeln!(
            writer,
            "| Order | {} |",
            Self::sort_description(&data.sort)
        )?;
        writeln!(writer)?;

        // Table
        writeln!(writer, "## Nodes")?;
        writeln!(writer)?;

        let headers: Vec<&str> = COLUMNS.iter().map(|c| c.label()).collect();
        writeln!(writer, "| {} |", headers.join(" | "))?;
        writeln!(writer, "|------|-------|------|")?;
        for row in &data.rows {
            writeln!(
                writer,
                "| {} | {} | {}{} |",
                format_weight(row.self_value, data.root_total),
                format_weight(row.total, data.root_total),
                "&nbsp;&nbsp;".repeat(row.depth),
                Self::escape_cell(&row.name)
            )?;
        }

        let negative: Vec<_> = data.rows.iter().filter(|r| r.self_value < 0.0).collect();
        if !negative.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "## Negative Self Weight")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "These nodes report less total weight than their children:"
            )?;
            writeln!(writer)?;
            for row in negative {
                writeln!(
                    writer,
                    "- `{}`: self {}",
                    row.name.replace('`', "'"),
                    row.self_value
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_rows;
    use crate::table::{SortColumn, SortDirection};

    fn render(data: &ExportData) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_basic() {
        let md = render(&ExportData::new(&sample_rows(), SortState::new()));

        assert!(md.contains("# Flame Graph Report"));
        assert!(md.contains("**Root:** root (10)"));
        assert!(md.contains("| Nodes | 4 |"));
        assert!(md.contains("| Order | pre-order |"));
        assert!(md.contains("| Self | Total | Name |"));
        assert!(md.contains("| 3 (30%) | 10 (100%) | root |"));
        assert!(md.contains("| -2 (-20%) | 4 (40%) | &nbsp;&nbsp;a |"));
    }

    #[test]
    fn test_markdown_negative_section() {
        let md = render(&ExportData::new(&sample_rows(), SortState::new()));

        assert!(md.contains("## Negative Self Weight"));
        assert!(md.contains("- `a`: self -2"));
    }

    #[test]
    fn test_markdown_no_negative_section_when_consistent() {
        use crate::parser::Node;
        use crate::table::flatten;

        let rows = flatten(&Node::new("root", 2.0).with_child(Node::new("a", 1.0)));
        let md = render(&ExportData::new(&rows, SortState::new()));
        assert!(!md.contains("Negative Self Weight"));
    }

    #[test]
    fn test_markdown_sort_description() {
        let md = render(&ExportData::new(
            &sample_rows(),
            SortState::sorted_by(SortColumn::Total, SortDirection::Ascending),
        ));
        assert!(md.contains("| Order | total (asc) |"));
    }

    #[test]
    fn test_markdown_escape_cell() {
        assert_eq!(MarkdownExporter::escape_cell("a|b"), "a\\|b");
        assert_eq!(MarkdownExporter::escape_cell("a\nb"), "a b");
    }
}
