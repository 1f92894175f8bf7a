//! Configuration types
//!
//! Runtime-adjustable presets, fixed timing windows, and the persistence
//! interface backing the settings menu.

pub mod store;
pub mod types;

pub use store::*;
pub use types::*;
