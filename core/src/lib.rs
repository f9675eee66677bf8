//! # Core Discovery-and-Enrichment Pipeline
//!
//! A scan runs in two stages. The discovery prober sweeps the target range
//! with address-resolution broadcasts and yields candidates in reply order.
//! The inventory aggregator then fans every candidate out to the enrichment
//! probes (reachability, fingerprint, vendor, telemetry) under a bounded
//! worker pool and merges exactly one [`netinv_common::inventory::DeviceRecord`]
//! per candidate, in discovery order.

pub mod classify;
pub mod discovery;
pub mod inventory;
pub mod network;
pub mod reachability;
pub mod scan;
pub mod telemetry;
pub mod vendors;
