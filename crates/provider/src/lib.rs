//! Infrastructure for Currex exchange rates.
//!
//! This crate provides:
//! - An HTTP client for the rate provider
//! - File-backed persistence for the last good rate table

pub mod http;
pub mod snapshot;

pub use http::{HttpRateFetcher, parse_rates};
pub use snapshot::JsonFileSnapshotRepository;
