//! Preset and timing type definitions
//!
//! Presets are the user-adjustable settings cached in RAM and written
//! through [`super::store::SettingsStore`] whenever the menu changes them.

use crate::claim::RemoteOverridePolicy;
use crate::config::store::{SettingKey, SettingsStore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGB feedback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum RgbMode {
    #[default]
    Off = 0,
    White = 1,
    Rainbow = 2,
    Breathing = 3,
    SolidRed = 4,
    SolidGreen = 5,
    SolidBlue = 6,
}

impl RgbMode {
    /// Number of modes, for menu cycling
    pub const COUNT: u8 = 7;

    /// Decode a stored byte; unknown values degrade to `Off`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => RgbMode::White,
            2 => RgbMode::Rainbow,
            3 => RgbMode::Breathing,
            4 => RgbMode::SolidRed,
            5 => RgbMode::SolidGreen,
            6 => RgbMode::SolidBlue,
            _ => RgbMode::Off,
        }
    }

    /// Get the mode as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Next mode in menu cycling order (wraps around)
    pub fn next(self) -> Self {
        Self::from_u8((self.as_u8() + 1) % Self::COUNT)
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            RgbMode::Off => "OFF",
            RgbMode::White => "WHITE",
            RgbMode::Rainbow => "RAINBOW",
            RgbMode::Breathing => "BREATHING",
            RgbMode::SolidRed => "RED",
            RgbMode::SolidGreen => "GREEN",
            RgbMode::SolidBlue => "BLUE",
        }
    }
}

/// Buzzer playback pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum BuzzerPattern {
    #[default]
    Off = 0,
    Single = 1,
    Chirp = 2,
    Loop = 3,
    Sos = 4,
}

impl BuzzerPattern {
    /// Number of patterns, for menu cycling
    pub const COUNT: u8 = 5;

    /// Decode a stored byte; unknown values degrade to `Off`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => BuzzerPattern::Single,
            2 => BuzzerPattern::Chirp,
            3 => BuzzerPattern::Loop,
            4 => BuzzerPattern::Sos,
            _ => BuzzerPattern::Off,
        }
    }

    /// Get the pattern as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Next pattern in menu cycling order (wraps around)
    pub fn next(self) -> Self {
        Self::from_u8((self.as_u8() + 1) % Self::COUNT)
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            BuzzerPattern::Off => "OFF",
            BuzzerPattern::Single => "SINGLE",
            BuzzerPattern::Chirp => "CHIRP",
            BuzzerPattern::Loop => "LOOP",
            BuzzerPattern::Sos => "SOS",
        }
    }
}

/// Which preset bank applies: the box is either active or not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetBank {
    Active,
    Inactive,
}

/// User-adjustable presets, cached in RAM
///
/// Loaded once at boot from the settings store and written back through
/// it whenever the menu changes a value. Percentages are always clamped
/// to 0..=100.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Presets {
    /// RGB mode while this box holds the active claim
    pub active_rgb: RgbMode,
    /// RGB mode while it does not
    pub inactive_rgb: RgbMode,
    /// RGB brightness percentage (0-100)
    pub brightness_pct: u8,
    /// Buzzer pattern played when the box becomes active
    pub active_buzzer: BuzzerPattern,
    /// Buzzer pattern played when the box is overridden/released
    pub inactive_buzzer: BuzzerPattern,
    /// Buzzer volume percentage (0-100)
    pub volume_pct: u8,
    /// Motor speed percentage (0-100)
    pub motor_speed_pct: u8,
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            active_rgb: RgbMode::Rainbow,
            inactive_rgb: RgbMode::Off,
            brightness_pct: 100,
            active_buzzer: BuzzerPattern::Sos,
            inactive_buzzer: BuzzerPattern::Off,
            volume_pct: 100,
            motor_speed_pct: 100,
        }
    }
}

impl Presets {
    /// Load presets from the store, falling back to defaults for missing
    /// keys and clamping/decoding out-of-range values.
    pub fn load<S: SettingsStore>(store: &mut S) -> Self {
        let defaults = Self::default();
        let byte = |store: &mut S, key: SettingKey, default: u8| -> u8 {
            store.load(key).unwrap_or(default)
        };

        Self {
            active_rgb: RgbMode::from_u8(byte(
                store,
                SettingKey::ActiveRgb,
                defaults.active_rgb.as_u8(),
            )),
            inactive_rgb: RgbMode::from_u8(byte(
                store,
                SettingKey::InactiveRgb,
                defaults.inactive_rgb.as_u8(),
            )),
            brightness_pct: byte(store, SettingKey::Brightness, defaults.brightness_pct).min(100),
            active_buzzer: BuzzerPattern::from_u8(byte(
                store,
                SettingKey::ActiveBuzzer,
                defaults.active_buzzer.as_u8(),
            )),
            inactive_buzzer: BuzzerPattern::from_u8(byte(
                store,
                SettingKey::InactiveBuzzer,
                defaults.inactive_buzzer.as_u8(),
            )),
            volume_pct: byte(store, SettingKey::Volume, defaults.volume_pct).min(100),
            motor_speed_pct: byte(store, SettingKey::MotorSpeed, defaults.motor_speed_pct)
                .min(100),
        }
    }

    /// Current stored byte for a key (what the menu persists)
    pub fn value_for(&self, key: SettingKey) -> u8 {
        match key {
            SettingKey::ActiveRgb => self.active_rgb.as_u8(),
            SettingKey::InactiveRgb => self.inactive_rgb.as_u8(),
            SettingKey::Brightness => self.brightness_pct,
            SettingKey::ActiveBuzzer => self.active_buzzer.as_u8(),
            SettingKey::InactiveBuzzer => self.inactive_buzzer.as_u8(),
            SettingKey::Volume => self.volume_pct,
            SettingKey::MotorSpeed => self.motor_speed_pct,
        }
    }

    /// RGB mode for a preset bank
    pub fn rgb_for(&self, bank: PresetBank) -> RgbMode {
        match bank {
            PresetBank::Active => self.active_rgb,
            PresetBank::Inactive => self.inactive_rgb,
        }
    }

    /// Buzzer pattern for a preset bank
    pub fn buzzer_for(&self, bank: PresetBank) -> BuzzerPattern {
        match bank {
            PresetBank::Active => self.active_buzzer,
            PresetBank::Inactive => self.inactive_buzzer,
        }
    }
}

/// Fixed timing windows for the control loop
///
/// All values are milliseconds. Defaults match the shipped hardware; the
/// struct exists so tests and boards can tune them without recompiling
/// the logic.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Input stability window before a level change is accepted
    pub debounce_ms: u32,
    /// Hold duration at which a press becomes a long press
    pub long_press_ms: u32,
    /// Full-power window after a direction change
    pub soft_start_ms: u32,
    /// Software PWM cycle period for the motor enable line
    pub pwm_cycle_ms: u32,
    /// RGB animation step interval
    pub rgb_interval_ms: u32,
    /// Toggle interval for the Loop buzzer pattern
    pub buzzer_loop_ms: u32,
    /// Bound on demo (menu preview) playback
    pub demo_ms: u32,
    /// Optional menu inactivity timeout; `None` disables the feature
    pub menu_timeout_ms: Option<u32>,
    /// Whether a remote override of a locally-on switch is audible
    pub remote_override: RemoteOverridePolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            long_press_ms: 1000,
            soft_start_ms: 150,
            pwm_cycle_ms: 40,
            rgb_interval_ms: 20,
            buzzer_loop_ms: 250,
            demo_ms: 5000,
            menu_timeout_ms: None,
            remote_override: RemoteOverridePolicy::Audible,
        }
    }
}
