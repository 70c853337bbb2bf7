//! Shipping-rate rules for checkout: tiered rules matched against a cart summary and
//! folded into a single rate under a cheapest/highest/sum policy.

pub mod config;
pub mod error;
pub mod rates;
pub mod telemetry;
