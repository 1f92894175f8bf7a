//! Buzzer output
//!
//! Converts the per-tick tone request from
//! [`otium_core::buzzer::PatternPlayer`] into `tone`/`no_tone` calls,
//! issuing them only when the request changes. Re-triggering a tone
//! generator every millisecond makes some piezo drivers stutter.

use crate::gpio::TonePin;

/// Change-only tone adapter
pub struct Buzzer<P> {
    pin: P,
    current: Option<(u16, u8)>,
}

impl<P: TonePin> Buzzer<P> {
    /// Create a silent buzzer
    pub fn new(mut pin: P) -> Self {
        pin.no_tone();
        Self { pin, current: None }
    }

    /// Drive this tick's tone request
    pub fn drive(&mut self, tone_hz: Option<u16>, volume_pct: u8) {
        let request = tone_hz.map(|hz| (hz, volume_pct.min(100)));
        if request == self.current {
            return;
        }
        self.current = request;

        match request {
            Some((hz, volume)) => self.pin.tone(hz, volume),
            None => self.pin.no_tone(),
        }
    }
}
