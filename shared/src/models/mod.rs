//! Domain models for the inventory accounting subsystem

mod adjustment;
mod item;
mod loss;
mod sale;
mod stock;

pub use adjustment::*;
pub use item::*;
pub use loss::*;
pub use sale::*;
pub use stock::*;
