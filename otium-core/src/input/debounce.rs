//! Level debouncing
//!
//! A candidate level is accepted only after it has persisted unchanged
//! for the configured window. Shorter excursions never reach the
//! debounced output.

use crate::Millis;

/// A debounced level change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Level became asserted
    Rising,
    /// Level became deasserted
    Falling,
}

/// One debounced digital input channel
///
/// Owns the raw sample history for a single pin (button, switch or
/// limit). Mutated only by [`sample`](DebouncedInput::sample), once per
/// tick.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedInput {
    /// Last raw sample
    raw: bool,
    /// Accepted (debounced) level
    stable: bool,
    /// When the raw level last changed
    last_change: Millis,
}

impl DebouncedInput {
    /// Create a channel with a known initial level
    pub fn new(initial: bool) -> Self {
        Self {
            raw: initial,
            stable: initial,
            last_change: 0,
        }
    }

    /// The current debounced level
    pub fn level(&self) -> bool {
        self.stable
    }

    /// Feed one raw sample
    ///
    /// Returns an edge when the debounced level changes. The debounced
    /// level only moves after the raw level has been stable for at least
    /// `window_ms`.
    pub fn sample(&mut self, raw: bool, now: Millis, window_ms: u32) -> Option<Edge> {
        if raw != self.raw {
            self.raw = raw;
            self.last_change = now;
        }

        if self.raw != self.stable && now.saturating_sub(self.last_change) >= window_ms as u64 {
            self.stable = self.raw;
            return Some(if self.stable {
                Edge::Rising
            } else {
                Edge::Falling
            });
        }

        None
    }
}
