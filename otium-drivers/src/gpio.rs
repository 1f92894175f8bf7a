//! Output pin abstractions
//!
//! Boards implement these for their HAL's pin types; the driver structs
//! in the sibling modules are generic over them. Tests use simple mocks.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high
    fn set_high(&mut self);

    /// Set the pin low
    fn set_low(&mut self);

    /// Check if the pin is set high
    fn is_set_high(&self) -> bool;
}

/// Analog-style output channel (0 = off, 255 = full)
///
/// On most boards this is a hardware PWM channel; the RGB LED uses one
/// per color.
pub trait LevelPin {
    /// Set the output level
    fn set_level(&mut self, level: u8);
}

/// Tone output (piezo buzzer or speaker)
pub trait TonePin {
    /// Sound a tone at the given frequency and volume percentage
    fn tone(&mut self, freq_hz: u16, volume_pct: u8);

    /// Stop any tone
    fn no_tone(&mut self);
}

/// Set an [`OutputPin`] from a bool level
pub fn write_level<P: OutputPin>(pin: &mut P, high: bool) {
    if high {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
