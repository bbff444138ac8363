//! Table module for the per-node metrics view.
//!
//! Flattens a validated tree into rows of self/total weight, orders those
//! rows for display, and describes the table's columns.
//!
//! # Example
//!
//! ```rust
//! use flamescope::parser::validate;
//! use flamescope::table::{flatten, SortColumn, SortState};
//!
//! let tree = validate(r#"{"name":"root","value":10,"children":[
//!     {"name":"a","value":4},{"name":"b","value":3}]}"#).unwrap();
//! let rows = flatten(&tree);
//!
//! let sort = SortState::new().toggle(SortColumn::Total);
//! let ordered = sort.apply(&rows);
//! assert_eq!(ordered[0].name, "b");
//! ```

pub mod columns;
pub mod flatten;
pub mod sort;

pub use columns::{format_weight, percent_of, Column, COLUMNS};
pub use flatten::{flatten, FlattenCache, FlattenedRow};
pub use sort::{order, SortColumn, SortDirection, SortState};
