//! Export functionality for the flattened metrics table.
//!
//! This module provides exporters for writing the self/total table in
//! various formats: JSON, CSV, and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::table::{percent_of, FlattenedRow, SortState};
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// CSV format - spreadsheet-friendly
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
///
/// Holds the table rows already in display order plus what is needed to
/// derive percentages.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Name of the root node
    pub root_name: String,
    /// Root total, the denominator for percentages
    pub root_total: f64,
    /// Rows in the order they should be written
    pub rows: Vec<FlattenedRow>,
    /// Sort that produced `rows`
    pub sort: SortState,
}

impl ExportData {
    /// Create export data from pre-order rows, applying `sort`.
    ///
    /// The first pre-order row is the root.
    pub fn new(pre_order: &[FlattenedRow], sort: SortState) -> Self {
        let (root_name, root_total) = pre_order
            .first()
            .map(|root| (root.name.clone(), root.total))
            .unwrap_or_default();
        Self {
            root_name,
            root_total,
            rows: sort.apply(pre_order),
            sort,
        }
    }

    /// Self weight of `row` as a percentage of the root total
    pub fn self_percent(&self, row: &FlattenedRow) -> i64 {
        percent_of(row.self_value, self.root_total)
    }

    /// Total weight of `row` as a percentage of the root total
    pub fn total_percent(&self, row: &FlattenedRow) -> i64 {
        percent_of(row.total, self.root_total)
    }

    /// Count of rows whose self weight is negative
    pub fn negative_self_count(&self) -> usize {
        self.rows.iter().filter(|r| r.self_value < 0.0).count()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
