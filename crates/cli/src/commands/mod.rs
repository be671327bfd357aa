//! CLI command implementations.

pub mod sheet;
