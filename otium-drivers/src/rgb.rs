//! RGB LED output
//!
//! The core emits non-inverted channel values; this adapter handles the
//! common-anode wiring used on the shipped boards, where a channel is
//! brightest at level 0. Common-cathode boards skip the inversion.

use otium_core::rgb::Rgb;

use crate::gpio::LevelPin;

/// Three-channel RGB LED adapter
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    /// Common-anode wiring: written level is 255 - value
    inverted: bool,
    last: Option<Rgb>,
}

impl<R: LevelPin, G: LevelPin, B: LevelPin> RgbLed<R, G, B> {
    /// Common-anode LED (channel sinks current, level inverted)
    pub fn common_anode(red: R, green: G, blue: B) -> Self {
        Self::new(red, green, blue, true)
    }

    /// Common-cathode LED (levels written as-is)
    pub fn common_cathode(red: R, green: G, blue: B) -> Self {
        Self::new(red, green, blue, false)
    }

    fn new(red: R, green: G, blue: B, inverted: bool) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            inverted,
            last: None,
        };
        led.write(Rgb::OFF);
        led
    }

    /// Write a color, skipping the bus if it is unchanged
    pub fn write(&mut self, color: Rgb) {
        if self.last == Some(color) {
            return;
        }
        self.last = Some(color);

        let level = |v: u8| if self.inverted { 255 - v } else { v };
        self.red.set_level(level(color.r));
        self.green.set_level(level(color.g));
        self.blue.set_level(level(color.b));
    }
}
