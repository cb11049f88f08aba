//! Shared types and inventory accounting rules for the Retail Inventory service
//!
//! This crate holds everything that does not touch the database: item package
//! geometry, unit conversions, stock level arithmetic, the adjustment sign rule,
//! loss and sale stock checks.

pub mod error;
pub mod ledger;
pub mod models;
pub mod types;
pub mod units;
pub mod validation;

pub use error::*;
pub use ledger::*;
pub use models::*;
pub use types::*;
pub use units::*;
pub use validation::*;
