//! Shared building blocks for the inventory scanner workspace.
//!
//! Holds everything the other members agree on: the scan configuration, the
//! error taxonomy, the inventory data model, target/range parsing and the
//! trait seams the aggregator consumes.

pub mod config;
pub mod error;
pub mod inventory;
pub mod network;
pub mod probes;
