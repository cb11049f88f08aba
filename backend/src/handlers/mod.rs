//! HTTP handlers for the Retail Inventory API

mod health;
mod inventory;
mod items;
mod losses;
mod sales;

pub use health::*;
pub use inventory::*;
pub use items::*;
pub use losses::*;
pub use sales::*;
