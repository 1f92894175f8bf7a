//! Settings menu state machine
//!
//! Driven by the short/long press counters from
//! [`crate::input::PressTracker`]: a short press browses or adjusts, a
//! long press enters or leaves editing. Adjustments mutate the RAM
//! presets directly and are persisted immediately, so power loss in the
//! menu keeps everything confirmed so far.
//!
//! The session never touches hardware; each tick returns the effects the
//! controller must carry out (re-apply the RGB mode, preview a buzzer
//! pattern, persist a key).

use heapless::Vec;

use crate::config::{BuzzerPattern, Presets, SettingKey, TimingConfig};
use crate::Millis;

/// One entry of the settings menu
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuItem {
    pub label: &'static str,
    pub key: SettingKey,
}

/// Menu entries in browse order
pub static MENU_ITEMS: [MenuItem; 7] = [
    MenuItem {
        label: "ACTIVE COLOR",
        key: SettingKey::ActiveRgb,
    },
    MenuItem {
        label: "IDLE COLOR",
        key: SettingKey::InactiveRgb,
    },
    MenuItem {
        label: "BRIGHTNESS",
        key: SettingKey::Brightness,
    },
    MenuItem {
        label: "ACTIVE SOUND",
        key: SettingKey::ActiveBuzzer,
    },
    MenuItem {
        label: "IDLE SOUND",
        key: SettingKey::InactiveBuzzer,
    },
    MenuItem {
        label: "VOLUME",
        key: SettingKey::Volume,
    },
    MenuItem {
        label: "MOTOR SPEED",
        key: SettingKey::MotorSpeed,
    },
];

/// Step for percentage settings; wraps past 100 back to 0
const PCT_STEP: u8 = 10;

/// Side effect requested by a menu transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEffect {
    /// The current item/value should be (re)displayed
    Redisplay,
    /// An RGB preset changed; the animation engine must re-apply the
    /// mode for the current bank
    ApplyRgb,
    /// Play a bounded preview of a buzzer pattern
    PreviewBuzzer(BuzzerPattern),
    /// Write the current value of this key to the settings store
    Persist(SettingKey),
    /// The inactivity timeout fired and the session was reset
    TimedOut,
}

/// Effects emitted by one menu tick
pub type MenuEffects = Vec<MenuEffect, 4>;

/// The settings menu session
///
/// Two states: Browsing (short = next item, long = start editing) and
/// Editing (short = adjust value, long = confirm and go back).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuSession {
    index: usize,
    editing: bool,
    /// Press counter values already handled
    seen_short: u32,
    seen_long: u32,
    last_interaction: Millis,
}

impl MenuSession {
    /// Create a session browsing the first item
    pub fn new() -> Self {
        Self {
            index: 0,
            editing: false,
            seen_short: 0,
            seen_long: 0,
            last_interaction: 0,
        }
    }

    /// Item currently selected
    pub fn item(&self) -> &'static MenuItem {
        &MENU_ITEMS[self.index]
    }

    /// Whether the selected item is being edited
    pub fn editing(&self) -> bool {
        self.editing
    }

    /// Advance the session by one tick
    ///
    /// `short_presses` and `long_presses` are the tracker's monotonic
    /// counters; the session reacts to increments since the last tick.
    pub fn tick(
        &mut self,
        now: Millis,
        short_presses: u32,
        long_presses: u32,
        presets: &mut Presets,
        cfg: &TimingConfig,
    ) -> MenuEffects {
        let mut effects = MenuEffects::new();

        let shorts = short_presses.wrapping_sub(self.seen_short);
        let longs = long_presses.wrapping_sub(self.seen_long);
        self.seen_short = short_presses;
        self.seen_long = long_presses;

        if shorts == 0 && longs == 0 {
            self.check_timeout(now, cfg, &mut effects);
            return effects;
        }
        self.last_interaction = now;

        for _ in 0..longs {
            self.editing = !self.editing;
            push(&mut effects, MenuEffect::Redisplay);
        }

        for _ in 0..shorts {
            if self.editing {
                self.adjust(presets, &mut effects);
            } else {
                self.index = (self.index + 1) % MENU_ITEMS.len();
                push(&mut effects, MenuEffect::Redisplay);
            }
        }

        effects
    }

    /// Step the selected item's value and request its side effects
    fn adjust(&mut self, presets: &mut Presets, effects: &mut MenuEffects) {
        let key = self.item().key;
        match key {
            SettingKey::ActiveRgb => {
                presets.active_rgb = presets.active_rgb.next();
                push(effects, MenuEffect::ApplyRgb);
            }
            SettingKey::InactiveRgb => {
                presets.inactive_rgb = presets.inactive_rgb.next();
                push(effects, MenuEffect::ApplyRgb);
            }
            SettingKey::Brightness => {
                presets.brightness_pct = step_pct(presets.brightness_pct);
            }
            SettingKey::ActiveBuzzer => {
                presets.active_buzzer = presets.active_buzzer.next();
                push(effects, MenuEffect::PreviewBuzzer(presets.active_buzzer));
            }
            SettingKey::InactiveBuzzer => {
                presets.inactive_buzzer = presets.inactive_buzzer.next();
                push(effects, MenuEffect::PreviewBuzzer(presets.inactive_buzzer));
            }
            SettingKey::Volume => {
                presets.volume_pct = step_pct(presets.volume_pct);
                // Sound the new volume
                push(effects, MenuEffect::PreviewBuzzer(BuzzerPattern::Single));
            }
            SettingKey::MotorSpeed => {
                presets.motor_speed_pct = step_pct(presets.motor_speed_pct);
            }
        }
        push(effects, MenuEffect::Persist(key));
        push(effects, MenuEffect::Redisplay);
    }

    fn check_timeout(&mut self, now: Millis, cfg: &TimingConfig, effects: &mut MenuEffects) {
        let Some(timeout) = cfg.menu_timeout_ms else {
            return;
        };
        let idle_position = self.index == 0 && !self.editing;
        if !idle_position && now.saturating_sub(self.last_interaction) >= timeout as u64 {
            self.index = 0;
            self.editing = false;
            push(effects, MenuEffect::TimedOut);
        }
    }
}

impl Default for MenuSession {
    fn default() -> Self {
        Self::new()
    }
}

fn step_pct(value: u8) -> u8 {
    let next = value.saturating_add(PCT_STEP);
    if next > 100 {
        0
    } else {
        next
    }
}

fn push(effects: &mut MenuEffects, effect: MenuEffect) {
    // Capacity covers the worst transition (adjust = 3 effects)
    let _ = effects.push(effect);
}
