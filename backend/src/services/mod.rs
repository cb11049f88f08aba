//! Business logic services for the Retail Inventory service

pub mod inventory;
pub mod items;
pub mod losses;
pub mod sales;
