//! Input sampling
//!
//! The core works in logical levels (true = asserted). The button,
//! switch and limit on the shipped boards are all wired active-low with
//! internal pull-ups; this adapter corrects the polarity and holds the
//! last good level if a read fails, leaving glitch handling to the
//! core's debouncer.

use embedded_hal::digital::InputPin;

/// Polarity-correcting wrapper around a digital input
pub struct LogicalInput<P> {
    pin: P,
    active_low: bool,
    last: bool,
}

impl<P: InputPin> LogicalInput<P> {
    /// Active-low input (pull-up wiring, asserted = pin low)
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
            last: false,
        }
    }

    /// Active-high input
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
            last: false,
        }
    }

    /// Sample the logical level
    pub fn read(&mut self) -> bool {
        let raw = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        if let Ok(level) = raw {
            self.last = level;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[test]
    fn test_active_low_asserts_on_low_pin() {
        let mut input = LogicalInput::active_low(FakePin { high: false });
        assert!(input.read());

        input.pin.high = true;
        assert!(!input.read());
    }

    #[test]
    fn test_active_high_asserts_on_high_pin() {
        let mut input = LogicalInput::active_high(FakePin { high: true });
        assert!(input.read());

        input.pin.high = false;
        assert!(!input.read());
    }
}
