//! Core business logic for Currex.
//!
//! This crate contains pure currency logic with ZERO web or HTTP-client dependencies.
//! Rate tables, conversion, formatting and session resolution live here.
//!
//! # Modules
//!
//! - `currency` - Currency reference data and display formatting
//! - `rates` - Exchange rate table, refresh, and pairwise rates
//! - `pricing` - Price conversion and fixed-price overrides
//! - `session` - Visitor currency resolution
//! - `settings` - Validated shop configuration
//! - `gateway` - Payment gateway currency restrictions

pub mod currency;
pub mod gateway;
pub mod pricing;
pub mod rates;
pub mod session;
pub mod settings;
