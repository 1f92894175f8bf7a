//! Motor direction and speed control
//!
//! Direction is a pure function of (switch, limit, claim) re-derived
//! whenever the arbiter marks state changed. Speed is a software PWM on
//! the enable line: the pin is high for `duty x period` of each fixed
//! cycle and low for the remainder, while the two direction pins stay
//! steady for the whole motion.
//!
//! A soft-start phase forces 100% duty for a short window after every
//! direction change to overcome static friction; stopping cancels it.
//!
//! The duty mapping is the attenuated variant: below 20% the effective
//! duty is divided by 10, making low settings deliberately much slower
//! than linear scaling (the straight-proportional variant used by some
//! revisions is not implemented). See [`attenuated_duty`].

use crate::config::TimingConfig;
use crate::Millis;

/// Motor direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Arm extending toward the switch
    Forward,
    /// Arm retracting toward home
    Reverse,
    #[default]
    Stopped,
}

/// Pin levels to apply this tick
///
/// `in_a`/`in_b` select the H-bridge direction; `enable` is the
/// duty-modulated speed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorDrive {
    pub in_a: bool,
    pub in_b: bool,
    pub enable: bool,
}

impl MotorDrive {
    /// All lines released (motor coasting)
    pub const fn stopped() -> Self {
        Self {
            in_a: false,
            in_b: false,
            enable: false,
        }
    }
}

/// Map a speed percentage to an effective PWM duty percentage
///
/// Below 20% the duty is divided by 10, so low settings crawl; from 20%
/// up the mapping is proportional. Monotonic non-decreasing over 0..=100
/// and pinned by tests, since revisions have disagreed on this curve.
pub fn attenuated_duty(speed_pct: u8) -> u8 {
    let speed = speed_pct.min(100);
    if speed < 20 {
        speed / 10
    } else {
        speed
    }
}

/// Motor controller state
///
/// Owns direction, the soft-start window and the software PWM phase.
/// Other components only see the [`MotorDrive`] it emits.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorController {
    direction: Direction,
    /// Configured speed percentage (0-100)
    speed_pct: u8,
    /// End of the current soft-start window, if one is running
    soft_start_until: Option<Millis>,
    /// Start of the current PWM cycle
    pwm_cycle_start: Millis,
}

impl MotorController {
    /// Create a stopped controller
    pub fn new() -> Self {
        Self {
            direction: Direction::Stopped,
            speed_pct: 100,
            soft_start_until: None,
            pwm_cycle_start: 0,
        }
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the soft-start window is running
    pub fn soft_start_active(&self) -> bool {
        self.soft_start_until.is_some()
    }

    /// Set the configured speed (clamped to 100)
    pub fn set_speed(&mut self, pct: u8) {
        self.speed_pct = pct.min(100);
    }

    /// Re-derive direction from the decision inputs
    ///
    /// Forward only while the switch is on and the claim is not already
    /// local: forward motion exists to trigger the claim-on transition,
    /// and is not re-triggered until a fresh off-to-on edge. With the
    /// switch off, the limit decides between Stopped and Reverse.
    ///
    /// A direction change into motion arms the soft-start window; a stop
    /// cancels any window in progress.
    pub fn recompute(
        &mut self,
        switch_on: bool,
        limit_hit: bool,
        claim_local: bool,
        now: Millis,
        cfg: &TimingConfig,
    ) {
        let next = if switch_on && !claim_local {
            Direction::Forward
        } else if limit_hit {
            Direction::Stopped
        } else {
            Direction::Reverse
        };

        if next != self.direction {
            self.direction = next;
            if next == Direction::Stopped {
                self.soft_start_until = None;
            } else {
                self.soft_start_until = Some(now + cfg.soft_start_ms as u64);
                self.pwm_cycle_start = now;
            }
        }
    }

    /// Advance the software PWM and emit this tick's pin levels
    pub fn tick(&mut self, now: Millis, cfg: &TimingConfig) -> MotorDrive {
        if self.direction == Direction::Stopped {
            return MotorDrive::stopped();
        }

        let duty_pct = match self.soft_start_until {
            Some(until) if now < until => 100,
            Some(_) => {
                self.soft_start_until = None;
                attenuated_duty(self.speed_pct)
            }
            None => attenuated_duty(self.speed_pct),
        };

        let cycle = cfg.pwm_cycle_ms as u64;
        let mut phase = now.saturating_sub(self.pwm_cycle_start);
        if phase >= cycle {
            // Re-anchor to the current cycle; keeps phase arithmetic
            // exact over long runs.
            self.pwm_cycle_start = now - (phase % cycle);
            phase %= cycle;
        }
        let on_time = cycle * duty_pct as u64 / 100;
        let enable = phase < on_time;

        match self.direction {
            Direction::Forward => MotorDrive {
                in_a: true,
                in_b: false,
                enable,
            },
            Direction::Reverse => MotorDrive {
                in_a: false,
                in_b: true,
                enable,
            },
            Direction::Stopped => MotorDrive::stopped(),
        }
    }
}

impl Default for MotorController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TimingConfig {
        TimingConfig::default()
    }

    #[test]
    fn test_direction_decision_table() {
        // (switch_on, limit_hit, claim_local) -> expected direction
        let cases = [
            (true, false, false, Direction::Forward),
            (true, true, false, Direction::Forward),
            (false, true, false, Direction::Stopped),
            (false, true, true, Direction::Stopped),
            (false, false, false, Direction::Reverse),
            (false, false, true, Direction::Reverse),
            // Switch on but claim already local: forward not re-triggered
            (true, true, true, Direction::Stopped),
            (true, false, true, Direction::Reverse),
        ];

        for (switch_on, limit_hit, claim_local, expected) in cases {
            let mut motor = MotorController::new();
            motor.recompute(switch_on, limit_hit, claim_local, 0, &cfg());
            assert_eq!(
                motor.direction(),
                expected,
                "switch={switch_on} limit={limit_hit} local={claim_local}"
            );
        }
    }

    #[test]
    fn test_soft_start_forces_full_duty() {
        let mut motor = MotorController::new();
        motor.set_speed(30);
        motor.recompute(true, false, false, 0, &cfg());
        assert!(motor.soft_start_active());

        // Inside the window: enabled for the full cycle
        for now in 0..cfg().soft_start_ms as u64 {
            let drive = motor.tick(now, &cfg());
            assert!(drive.enable, "t={now}");
            assert!(drive.in_a && !drive.in_b);
        }
    }

    #[test]
    fn test_duty_reverts_after_soft_start() {
        let config = cfg();
        let mut motor = MotorController::new();
        motor.set_speed(50);
        motor.recompute(true, false, false, 0, &config);

        // Past the window: 50% duty over the 40 ms cycle
        let base = config.soft_start_ms as u64 + config.pwm_cycle_ms as u64 * 10;
        let cycle_start = base - (base % config.pwm_cycle_ms as u64);
        let mut high = 0;
        for t in 0..config.pwm_cycle_ms as u64 {
            if motor.tick(cycle_start + t, &config).enable {
                high += 1;
            }
        }
        assert_eq!(high, config.pwm_cycle_ms as u64 / 2);
        assert!(!motor.soft_start_active());
    }

    #[test]
    fn test_stop_cancels_soft_start() {
        let mut motor = MotorController::new();
        motor.recompute(true, false, false, 0, &cfg());
        assert!(motor.soft_start_active());

        motor.recompute(false, true, false, 10, &cfg());
        assert!(!motor.soft_start_active());
        assert_eq!(motor.tick(10, &cfg()), MotorDrive::stopped());
    }

    #[test]
    fn test_direction_change_rearms_soft_start() {
        let config = cfg();
        let mut motor = MotorController::new();
        motor.recompute(true, false, false, 0, &config);

        // Run past the first window
        motor.tick(config.soft_start_ms as u64 + 5, &config);
        assert!(!motor.soft_start_active());

        // Reversal re-arms it
        motor.recompute(false, false, true, 500, &config);
        assert_eq!(motor.direction(), Direction::Reverse);
        assert!(motor.soft_start_active());
    }

    #[test]
    fn test_unchanged_direction_keeps_pwm_phase() {
        let config = cfg();
        let mut motor = MotorController::new();
        motor.recompute(true, false, false, 0, &config);

        // Same decision inputs: no soft-start restart
        motor.tick(config.soft_start_ms as u64 + 1, &config);
        motor.recompute(true, false, false, 300, &config);
        assert!(!motor.soft_start_active());
    }

    #[test]
    fn test_attenuated_duty_curve() {
        assert_eq!(attenuated_duty(0), 0);
        assert_eq!(attenuated_duty(10), 1);
        assert_eq!(attenuated_duty(19), 1);
        assert_eq!(attenuated_duty(20), 20);
        assert_eq!(attenuated_duty(55), 55);
        assert_eq!(attenuated_duty(100), 100);
        // Out of range clamps
        assert_eq!(attenuated_duty(255), 100);
    }

    #[test]
    fn test_direction_pins_steady_across_pwm_cycle() {
        let config = cfg();
        let mut motor = MotorController::new();
        motor.set_speed(40);
        motor.recompute(false, false, false, 0, &config);

        let base = config.soft_start_ms as u64 + 40;
        for t in 0..config.pwm_cycle_ms as u64 * 3 {
            let drive = motor.tick(base + t, &config);
            assert!(!drive.in_a);
            assert!(drive.in_b);
        }
    }
}
