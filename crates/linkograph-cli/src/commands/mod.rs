//! CLI command implementations

pub mod completions;
pub mod config;
pub mod enumerate;
pub mod graph;
pub mod io;
pub mod label;
pub mod stats;
