//! Top-level control loop
//!
//! One [`Controller::tick`] call per loop iteration wires the whole box
//! together: raw levels in, pin levels out. Everything in between is the
//! state machines from the sibling modules; no step blocks and no step
//! talks to hardware directly.
//!
//! Tick order matters and is fixed: inputs are debounced first, then the
//! buffered remote claim update is drained, then local switch edges and
//! the button/menu run, and only then do the motor, RGB and buzzer
//! produce this tick's outputs. Draining the remote update before the
//! local edges means a peer claim and a local flip arriving in the same
//! tick resolve in favor of the local flip, which is the newest event.

use crate::buzzer::PatternPlayer;
use crate::claim::{self, BoxId, ClaimArbiter, ClaimEffects, ClaimState};
use crate::config::{Presets, SettingsStore, TimingConfig};
use crate::input::{DebouncedInput, Edge, PressTracker};
use crate::menu::{MenuEffect, MenuItem, MenuSession};
use crate::motor::{MotorController, MotorDrive};
use crate::rgb::{AnimationEngine, Rgb};
use crate::Millis;

/// Raw (already polarity-corrected) input levels for one tick
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawInputs {
    /// Settings button is pressed
    pub button_pressed: bool,
    /// Toggle switch is in the "on" position
    pub switch_on: bool,
    /// Arm is at its home position
    pub limit_hit: bool,
}

/// Output levels and events for one tick
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutputs {
    /// H-bridge pin levels
    pub motor: MotorDrive,
    /// RGB channel values (non-inverted)
    pub rgb: Rgb,
    /// Tone to sound this tick, if any
    pub tone_hz: Option<u16>,
    /// Volume for the tone (0-100)
    pub tone_volume_pct: u8,
    /// New value for the shared claim register, if one must go out
    pub publish: Option<BoxId>,
}

/// The box controller
///
/// Owns every state machine and the settings store. The board layer
/// feeds it levels and a clock; the network layer feeds it claim
/// register updates and ships out whatever [`TickOutputs::publish`]
/// carries.
pub struct Controller<S: SettingsStore> {
    cfg: TimingConfig,
    presets: Presets,
    store: S,

    button: DebouncedInput,
    switch: DebouncedInput,
    limit: DebouncedInput,
    presses: PressTracker,

    menu: MenuSession,
    claim: ClaimArbiter,
    motor: MotorController,
    buzzer: PatternPlayer,
    rgb: AnimationEngine,

    /// Motor must re-derive direction this tick
    state_changed: bool,
    /// Latest unprocessed claim register update from the network
    pending_remote: Option<BoxId>,
}

impl<S: SettingsStore> Controller<S> {
    /// Create a controller for a box with the given identity
    ///
    /// Presets are loaded from the store once, here. `initial` seeds the
    /// debouncers so a switch already on at boot does not produce a claim
    /// edge.
    pub fn new(local_id: &str, mut store: S, cfg: TimingConfig, initial: RawInputs) -> Self {
        let presets = Presets::load(&mut store);

        let mut motor = MotorController::new();
        motor.set_speed(presets.motor_speed_pct);

        let claim = ClaimArbiter::new(local_id);
        let mut rgb = AnimationEngine::new();
        rgb.set_mode(presets.rgb_for(claim.bank()));

        Self {
            cfg,
            presets,
            store,
            button: DebouncedInput::new(initial.button_pressed),
            switch: DebouncedInput::new(initial.switch_on),
            limit: DebouncedInput::new(initial.limit_hit),
            presses: PressTracker::new(),
            menu: MenuSession::new(),
            claim,
            motor,
            buzzer: PatternPlayer::new(),
            rgb,
            state_changed: true,
            pending_remote: None,
        }
    }

    /// A new value arrived on the shared claim register
    ///
    /// Buffered and drained at the start of the next tick; if several
    /// arrive within one tick only the newest survives, matching the
    /// register's last-writer-wins semantics.
    pub fn remote_claim_changed(&mut self, id: &str) {
        self.pending_remote = Some(claim::truncated(id));
    }

    /// Whether this box currently holds the active claim
    pub fn is_active(&self) -> bool {
        self.claim.is_active()
    }

    /// Current arbitration state
    pub fn claim_state(&self) -> ClaimState {
        self.claim.state()
    }

    /// Current presets (for displays and status reporting)
    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    /// Selected menu item and whether it is being edited
    pub fn menu_position(&self) -> (&'static MenuItem, bool) {
        (self.menu.item(), self.menu.editing())
    }

    /// Run one control loop iteration
    pub fn tick(&mut self, now: Millis, inputs: RawInputs) -> TickOutputs {
        let button_edge = self
            .button
            .sample(inputs.button_pressed, now, self.cfg.debounce_ms);
        let switch_edge = self.switch.sample(inputs.switch_on, now, self.cfg.debounce_ms);
        let limit_edge = self.limit.sample(inputs.limit_hit, now, self.cfg.debounce_ms);

        let mut publish = None;

        if let Some(id) = self.pending_remote.take() {
            let fx = self
                .claim
                .remote_update(&id, self.switch.level(), self.cfg.remote_override);
            self.apply_claim_effects(fx, now, &mut publish);
        }

        match switch_edge {
            Some(Edge::Rising) => {
                let fx = self.claim.switch_on();
                self.apply_claim_effects(fx, now, &mut publish);
            }
            Some(Edge::Falling) => {
                let fx = self.claim.switch_off();
                self.apply_claim_effects(fx, now, &mut publish);
            }
            None => {}
        }

        if limit_edge.is_some() {
            self.state_changed = true;
        }

        self.presses
            .update(button_edge, now, self.cfg.long_press_ms);
        let menu_effects = self.menu.tick(
            now,
            self.presses.short_presses(),
            self.presses.long_presses(),
            &mut self.presets,
            &self.cfg,
        );
        for effect in menu_effects {
            match effect {
                MenuEffect::ApplyRgb => {
                    self.rgb.set_mode(self.presets.rgb_for(self.claim.bank()));
                }
                MenuEffect::PreviewBuzzer(pattern) => {
                    self.buzzer.play_demo(pattern, now, &self.cfg);
                }
                MenuEffect::Persist(key) => {
                    // A failed save is not fatal; the RAM value stays in
                    // force until reboot.
                    let _ = self.store.save(key, self.presets.value_for(key));
                }
                MenuEffect::Redisplay | MenuEffect::TimedOut => {}
            }
        }
        self.motor.set_speed(self.presets.motor_speed_pct);

        if self.state_changed {
            self.state_changed = false;
            self.motor.recompute(
                self.switch.level(),
                self.limit.level(),
                self.claim.is_active(),
                now,
                &self.cfg,
            );
        }

        TickOutputs {
            motor: self.motor.tick(now, &self.cfg),
            rgb: self.rgb.tick(now, self.presets.brightness_pct, &self.cfg),
            tone_hz: self.buzzer.tick(now, &self.cfg),
            tone_volume_pct: self.presets.volume_pct,
            publish,
        }
    }

    fn apply_claim_effects(
        &mut self,
        fx: ClaimEffects,
        now: Millis,
        publish: &mut Option<BoxId>,
    ) {
        if let Some(bank) = fx.apply {
            self.rgb.set_mode(self.presets.rgb_for(bank));
        }
        if let Some(bank) = fx.play {
            // An Off pattern here silences whatever was playing
            self.buzzer.play(self.presets.buzzer_for(bank), now);
        }
        if fx.state_changed {
            self.state_changed = true;
        }
        if fx.publish.is_some() {
            *publish = fx.publish;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuzzerPattern, MemoryStore, RgbMode, SettingKey};

    const DEBOUNCE: u64 = 50;

    fn controller() -> Controller<MemoryStore> {
        controller_with_store(MemoryStore::new())
    }

    fn controller_with_store(store: MemoryStore) -> Controller<MemoryStore> {
        Controller::new(
            "michael",
            store,
            TimingConfig::default(),
            RawInputs {
                button_pressed: false,
                switch_on: false,
                limit_hit: true,
            },
        )
    }

    /// Run `ctl` at 1 ms resolution with constant inputs
    fn run(
        ctl: &mut Controller<MemoryStore>,
        from: Millis,
        to: Millis,
        inputs: RawInputs,
    ) -> TickOutputs {
        let mut last = TickOutputs::default();
        for now in from..=to {
            last = ctl.tick(now, inputs);
        }
        last
    }

    #[test]
    fn test_boot_shows_inactive_presets() {
        let mut ctl = controller();
        let out = ctl.tick(0, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        });

        // Default inactive bank: LED off, no sound, motor parked
        assert_eq!(out.rgb, Rgb::OFF);
        assert_eq!(out.tone_hz, None);
        assert_eq!(out.motor, MotorDrive::stopped());
        assert_eq!(ctl.claim_state(), ClaimState::Inactive);
    }

    #[test]
    fn test_switch_on_claims_and_publishes() {
        let mut ctl = controller();
        run(&mut ctl, 0, 10, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        });

        // Flip the switch; the edge lands after the debounce window
        let mut published = None;
        for now in 11..=11 + DEBOUNCE + 1 {
            let out = ctl.tick(now, RawInputs {
                button_pressed: false,
                switch_on: true,
                limit_hit: true,
            });
            if out.publish.is_some() {
                published = out.publish;
            }
        }

        assert_eq!(published.as_deref(), Some("michael"));
        assert!(ctl.is_active());
        // Active buzzer default is SOS: a 150 ms leading gap, then tone
        let out = run(&mut ctl, 11 + DEBOUNCE + 2, 11 + DEBOUNCE + 170, RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        });
        assert_eq!(out.tone_hz, Some(800));
        // Active while home: the arm has nothing to do
        assert_eq!(out.motor, MotorDrive::stopped());
    }

    #[test]
    fn test_remote_override_extends_arm() {
        let mut store = MemoryStore::new();
        store
            .save(SettingKey::InactiveBuzzer, BuzzerPattern::Single.as_u8())
            .unwrap();
        let mut ctl = controller_with_store(store);

        let on = RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        });
        run(&mut ctl, 101, 200, on);
        assert!(ctl.is_active());

        // Peer takes the claim while our switch is still on
        ctl.remote_claim_changed("trevor");
        let out = ctl.tick(201, on);

        assert!(!ctl.is_active());
        assert_eq!(ctl.claim_state(), ClaimState::ActiveRemote);
        // Default policy is audible: the inactive pattern sounds
        assert_eq!(out.tone_hz, Some(1000));
        // Arm drives forward to flip our own switch off
        assert!(out.motor.in_a && !out.motor.in_b && out.motor.enable);
    }

    #[test]
    fn test_self_release_is_silent_and_retracts() {
        let mut ctl = controller();
        let home = RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, home);
        run(&mut ctl, 101, 200, RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        });
        assert!(ctl.is_active());

        // Active pattern finishes long before the release
        run(&mut ctl, 201, 5000, RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        });

        // User flips the switch back off; arm is away from home
        let mut published = None;
        let mut sounded = false;
        for now in 5001..=5001 + DEBOUNCE + 1 {
            let out = ctl.tick(now, RawInputs {
                button_pressed: false,
                switch_on: false,
                limit_hit: false,
            });
            if out.publish.is_some() {
                published = out.publish;
            }
            sounded |= out.tone_hz.is_some();
        }

        // Cleared register, no sound, retracting
        assert_eq!(published.as_deref(), Some(""));
        assert!(!sounded);
        assert!(!ctl.is_active());
        let out = ctl.tick(5100, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: false,
        });
        assert!(out.motor.in_b && !out.motor.in_a);

        // Home reached: motor stops
        let out = run(&mut ctl, 5101, 5101 + DEBOUNCE + 1, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        });
        assert_eq!(out.motor, MotorDrive::stopped());
    }

    #[test]
    fn test_remote_echo_does_not_replay_feedback() {
        let mut ctl = controller();
        let on = RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        });
        run(&mut ctl, 101, 200, on);

        // SOS is done by now; the transport echoes our own claim back
        run(&mut ctl, 201, 5000, on);
        ctl.remote_claim_changed("michael");
        let out = ctl.tick(5001, on);

        assert!(ctl.is_active());
        assert_eq!(out.tone_hz, None);
        assert_eq!(out.publish, None);
    }

    #[test]
    fn test_menu_adjustment_persists_to_store() {
        let mut ctl = controller();
        let idle = RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, idle);

        // Long press: hold well past the threshold
        let held = RawInputs {
            button_pressed: true,
            switch_on: false,
            limit_hit: true,
        };
        run(&mut ctl, 101, 1300, held);
        run(&mut ctl, 1301, 1400, idle);
        let (_, editing) = ctl.menu_position();
        assert!(editing);

        // Short press adjusts the first item (active RGB mode)
        run(&mut ctl, 1401, 1500, held);
        run(&mut ctl, 1501, 1600, idle);

        assert_eq!(ctl.presets().active_rgb, RgbMode::Breathing);
        let mut ctl2 = controller_with_store(ctl.store.clone());
        assert_eq!(ctl2.presets().active_rgb, RgbMode::Breathing);
        let _ = ctl2.tick(0, idle);
    }

    #[test]
    fn test_volume_preview_is_bounded() {
        let mut ctl = controller();
        let idle = RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        };
        let held = RawInputs {
            button_pressed: true,
            switch_on: false,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, idle);

        // Browse to VOLUME (5 short presses), then edit and adjust once
        let mut now = 101;
        for _ in 0..5 {
            run(&mut ctl, now, now + 100, held);
            run(&mut ctl, now + 101, now + 200, idle);
            now += 201;
        }
        let (item, _) = ctl.menu_position();
        assert_eq!(item.key, SettingKey::Volume);

        run(&mut ctl, now, now + 1300, held);
        run(&mut ctl, now + 1301, now + 1400, idle);
        now += 1401;
        run(&mut ctl, now, now + 100, held);
        let out = run(&mut ctl, now + 101, now + 200, idle);

        // Preview single beep sounds at the new volume
        assert_eq!(ctl.presets().volume_pct, 0);
        assert_eq!(out.tone_hz, Some(1000));
        assert_eq!(out.tone_volume_pct, 0);
    }

    #[test]
    fn test_switch_glitch_does_not_claim() {
        let mut ctl = controller();
        let home = RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: true,
        };
        run(&mut ctl, 0, 100, home);

        // 20 ms blip on the switch line, shorter than the debounce window
        run(&mut ctl, 101, 120, RawInputs {
            button_pressed: false,
            switch_on: true,
            limit_hit: true,
        });
        let out = run(&mut ctl, 121, 400, home);

        assert!(!ctl.is_active());
        assert_eq!(out.publish, None);
        assert_eq!(out.motor, MotorDrive::stopped());
    }

    #[test]
    fn test_motor_speed_preset_takes_effect() {
        let mut store = MemoryStore::new();
        store.save(SettingKey::MotorSpeed, 50).unwrap();
        let mut ctl = controller_with_store(store);

        let retract = RawInputs {
            button_pressed: false,
            switch_on: false,
            limit_hit: false,
        };
        // Arm away from home: reversing with soft start, then 50% duty
        run(&mut ctl, 0, 1000, retract);

        let mut high = 0;
        let cycle = TimingConfig::default().pwm_cycle_ms as u64;
        let base = 1000 + (cycle - 1000 % cycle) % cycle;
        for t in 0..cycle {
            let out = ctl.tick(base + t + 1, retract);
            assert!(out.motor.in_b);
            if out.motor.enable {
                high += 1;
            }
        }
        assert_eq!(high, cycle / 2);
    }
}
