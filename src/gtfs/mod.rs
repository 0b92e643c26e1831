pub mod calendar;
pub mod loader;
pub mod types;

pub use types::*;
