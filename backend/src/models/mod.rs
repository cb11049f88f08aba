//! Domain models for the Retail Inventory service
//!
//! Re-exports the accounting rules and value types from the shared crate;
//! the row types live next to the services that own their tables.

pub use shared::*;
