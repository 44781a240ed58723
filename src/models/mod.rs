pub mod alert;
pub mod comparison;
pub mod event;

pub use alert::*;
pub use comparison::*;
pub use event::*;

/// Placeholder shown in the results table for a SKU that could not be read.
pub const MISSING_SKU: &str = "-";
