//! Route handler modules for the contact-book HTTP API.

pub mod contacts;
pub mod help;
