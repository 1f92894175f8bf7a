//! H-bridge motor output
//!
//! Writes the three pin levels computed by
//! [`otium_core::motor::MotorController`] to a dual-input H-bridge
//! (L298N, DRV8871 and similar). The core already guarantees the two
//! direction inputs are never asserted together.

use otium_core::motor::MotorDrive;

use crate::gpio::{write_level, OutputPin};

/// H-bridge adapter over three output pins
pub struct HBridge<A, B, E> {
    in_a: A,
    in_b: B,
    enable: E,
}

impl<A: OutputPin, B: OutputPin, E: OutputPin> HBridge<A, B, E> {
    /// Create an H-bridge adapter with all lines released
    pub fn new(in_a: A, in_b: B, enable: E) -> Self {
        let mut bridge = Self { in_a, in_b, enable };
        bridge.apply(MotorDrive::stopped());
        bridge
    }

    /// Write one tick's pin levels
    pub fn apply(&mut self, drive: MotorDrive) {
        // Enable last on assert, first on release, so the bridge never
        // sees a transient with both inputs floating while powered.
        if !drive.enable {
            self.enable.set_low();
        }
        write_level(&mut self.in_a, drive.in_a);
        write_level(&mut self.in_b, drive.in_b);
        if drive.enable {
            self.enable.set_high();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::mock::MockPin;

    #[test]
    fn test_starts_released() {
        let bridge = HBridge::new(MockPin::new(), MockPin::new(), MockPin::new());
        assert!(!bridge.in_a.is_set_high());
        assert!(!bridge.in_b.is_set_high());
        assert!(!bridge.enable.is_set_high());
    }

    #[test]
    fn test_forward_and_reverse_levels() {
        let mut bridge = HBridge::new(MockPin::new(), MockPin::new(), MockPin::new());

        bridge.apply(MotorDrive {
            in_a: true,
            in_b: false,
            enable: true,
        });
        assert!(bridge.in_a.is_set_high());
        assert!(!bridge.in_b.is_set_high());
        assert!(bridge.enable.is_set_high());

        bridge.apply(MotorDrive {
            in_a: false,
            in_b: true,
            enable: true,
        });
        assert!(!bridge.in_a.is_set_high());
        assert!(bridge.in_b.is_set_high());
        assert!(bridge.enable.is_set_high());
    }

    #[test]
    fn test_pwm_low_phase_drops_enable_only() {
        let mut bridge = HBridge::new(MockPin::new(), MockPin::new(), MockPin::new());

        bridge.apply(MotorDrive {
            in_a: true,
            in_b: false,
            enable: true,
        });
        bridge.apply(MotorDrive {
            in_a: true,
            in_b: false,
            enable: false,
        });

        // Direction held through the off phase of the PWM cycle
        assert!(bridge.in_a.is_set_high());
        assert!(!bridge.enable.is_set_high());
    }
}
