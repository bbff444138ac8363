//! UI module for the flamescope TUI
//!
//! This module provides the terminal user interface: a flame graph of the
//! validated tree above a sortable self/total table, or the validation
//! errors when the input is rejected.

mod app;
pub mod flame;

pub use app::{handle_key, render, run_app, App, VirtualScrollState};
pub use flame::{FlameDimensions, FlameFrame, FlameGraph};
