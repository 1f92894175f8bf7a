//! Button press classification
//!
//! Turns debounced button edges into short/long press counts. The
//! counters are monotonic; consumers (the menu) remember the last value
//! they saw and react to increments, so no event is ever lost or
//! double-handled.

use crate::input::debounce::Edge;
use crate::Millis;

/// Short/long press tracker for the settings button
///
/// A press is long once it has been held for the long-press threshold;
/// the long count increments at that moment, while still held, and the
/// eventual release is then not counted as a short press.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressTracker {
    held: bool,
    pressed_at: Millis,
    long_fired: bool,
    short_presses: u32,
    long_presses: u32,
}

impl PressTracker {
    /// Create a tracker with the button released
    pub fn new() -> Self {
        Self::default()
    }

    /// Total short presses observed since boot
    pub fn short_presses(&self) -> u32 {
        self.short_presses
    }

    /// Total long presses observed since boot
    pub fn long_presses(&self) -> u32 {
        self.long_presses
    }

    /// Advance the tracker by one tick
    ///
    /// `edge` is this tick's debounced button edge, if any (`Rising` =
    /// press, `Falling` = release). The long-press check runs before the
    /// release is handled, so a release in the same tick the threshold
    /// is crossed still counts as a long press, not a short one.
    pub fn update(&mut self, edge: Option<Edge>, now: Millis, long_press_ms: u32) {
        if self.held
            && !self.long_fired
            && now.saturating_sub(self.pressed_at) >= long_press_ms as u64
        {
            self.long_fired = true;
            self.long_presses += 1;
        }

        match edge {
            Some(Edge::Rising) => {
                self.held = true;
                self.pressed_at = now;
                self.long_fired = false;
            }
            Some(Edge::Falling) => {
                if self.held && !self.long_fired {
                    self.short_presses += 1;
                }
                self.held = false;
            }
            None => {}
        }
    }
}
