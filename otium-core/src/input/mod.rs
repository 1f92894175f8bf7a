//! Input conditioning
//!
//! Raw digital levels come in once per tick; this module turns them into
//! clean edges ([`debounce`]) and classified button presses ([`button`]).
//! Levels here are logical: `true` means asserted (button pressed, switch
//! on, limit reached). The board layer handles active-low wiring.

pub mod button;
pub mod debounce;

pub use button::PressTracker;
pub use debounce::{DebouncedInput, Edge};
