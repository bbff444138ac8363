//! flamescope - Flame graph validator and self/total table viewer
//!
//! This crate validates flame-graph JSON documents against the expected node
//! shape, aggregates valid trees into per-node self and total weights, and
//! provides a terminal user interface for exploring the result.

pub mod export;
pub mod parser;
pub mod pipeline;
pub mod table;
pub mod ui;
