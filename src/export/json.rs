//! JSON export implementation.
//!
//! Exports the metrics table in JSON format for machine-readable output,
//! and renders validation failures the same way.

use super::{ExportData, Exporter};
use crate::parser::ValidationErrors;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable row for JSON output.
#[derive(Serialize)]
struct JsonRow<'a> {
    name: &'a str,
    depth: usize,
    #[serde(rename = "self")]
    self_value: f64,
    self_pct: i64,
    total: f64,
    total_pct: i64,
}

/// Serializable sort state for JSON output.
#[derive(Serialize)]
struct JsonSort {
    column: Option<String>,
    direction: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary<'a> {
    root: &'a str,
    root_total: f64,
    nodes: usize,
    negative_self_nodes: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    summary: JsonSummary<'a>,
    sort: JsonSort,
    rows: Vec<JsonRow<'a>>,
}

/// Serializable failure report for JSON output.
#[derive(Serialize)]
struct JsonErrors<'a> {
    kind: &'static str,
    errors: &'a ValidationErrors,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let rows: Vec<JsonRow> = data
            .rows
            .iter()
            .map(|r| JsonRow {
                name: &r.name,
                depth: r.depth,
                self_value: r.self_value,
                self_pct: data.self_percent(r),
                total: r.total,
                total_pct: data.total_percent(r),
            })
            .collect();

        let export = JsonExport {
            summary: JsonSummary {
                root: &data.root_name,
                root_total: data.root_total,
                nodes: data.rows.len(),
                negative_self_nodes: data.negative_self_count(),
            },
            sort: JsonSort {
                column: data.sort.column().map(|c| c.to_string()),
                direction: data.sort.direction().to_string(),
            },
            rows,
        };

        serde_json::to_writer_pretty(&mut *writer, &export)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Render validation failures as pretty JSON.
///
/// ```
/// use flamescope::export::json::errors_to_json;
/// use flamescope::parser::validate;
///
/// let errors = validate(r#"{"name":"root"}"#).unwrap_err();
/// let json = errors_to_json(&errors).unwrap();
/// assert!(json.contains("\"kind\": \"structure\""));
/// ```
pub fn errors_to_json(errors: &ValidationErrors) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonErrors {
        kind: errors.kind().label(),
        errors,
    })
}
