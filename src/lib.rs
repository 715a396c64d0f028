//! HTTP contact book backed by a CSV file.
//!
//! - [`store`]: load/save of the full contact set
//! - [`phone_index`]: phone-number duplicate lookup
//! - [`validation`]: field rules for create and update bodies
//! - [`rate_limit`]: per-client fixed-window throttling
//! - [`web`]: axum router, handlers and server start-up

pub mod logging;
pub mod phone_index;
pub mod rate_limit;
pub mod store;
pub mod validation;
pub mod web;
