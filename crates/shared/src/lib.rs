//! Shared types, errors, and configuration for Currex.
//!
//! This crate provides common types used across all other crates:
//! - Currency and country codes, money with decimal precision
//! - Typed IDs for products and coupons
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DisplayConfig, RatesConfig, ServerConfig, SessionConfig, ShopConfig};
pub use error::{AppError, AppResult};
pub use types::{CountryCode, CouponId, CurrencyCode, CurrencyCodeError, Money, ProductId};
