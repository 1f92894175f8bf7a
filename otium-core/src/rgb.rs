//! RGB animation engine
//!
//! Static modes set the three channels once; Rainbow and Breathing are
//! time-gated animations advanced from the tick. Colors leave this
//! module brightness-scaled but non-inverted; the common-anode inversion
//! is the output driver's concern.

use crate::config::{RgbMode, TimingConfig};
use crate::Millis;

/// One full-wave sine period quantized to bytes, used for the rainbow
/// hue rotation. Index wraps naturally on u8.
#[rustfmt::skip]
const SINE: [u8; 256] = [
    128, 131, 134, 137, 140, 143, 146, 149, 152, 155, 158, 162, 165, 167, 170, 173,
    176, 179, 182, 185, 188, 190, 193, 196, 198, 201, 203, 206, 208, 211, 213, 215,
    218, 220, 222, 224, 226, 228, 230, 232, 234, 235, 237, 238, 240, 241, 243, 244,
    245, 246, 248, 249, 250, 250, 251, 252, 253, 253, 254, 254, 254, 255, 255, 255,
    255, 255, 255, 255, 254, 254, 254, 253, 253, 252, 251, 250, 250, 249, 248, 246,
    245, 244, 243, 241, 240, 238, 237, 235, 234, 232, 230, 228, 226, 224, 222, 220,
    218, 215, 213, 211, 208, 206, 203, 201, 198, 196, 193, 190, 188, 185, 182, 179,
    176, 173, 170, 167, 165, 162, 158, 155, 152, 149, 146, 143, 140, 137, 134, 131,
    128, 124, 121, 118, 115, 112, 109, 106, 103, 100,  97,  93,  90,  88,  85,  82,
     79,  76,  73,  70,  67,  65,  62,  59,  57,  54,  52,  49,  47,  44,  42,  40,
     37,  35,  33,  31,  29,  27,  25,  23,  21,  20,  18,  17,  15,  14,  12,  11,
     10,   9,   7,   6,   5,   5,   4,   3,   2,   2,   1,   1,   1,   0,   0,   0,
      0,   0,   0,   0,   1,   1,   1,   2,   2,   3,   4,   5,   5,   6,   7,   9,
     10,  11,  12,  14,  15,  17,  18,  20,  21,  23,  25,  27,  29,  31,  33,  35,
     37,  40,  42,  44,  47,  49,  52,  54,  57,  59,  62,  65,  67,  70,  73,  76,
     79,  82,  85,  88,  90,  93,  97, 100, 103, 106, 109, 112, 115, 118, 121, 124,
];

/// Breathing ramp bounds and step
const BREATH_MIN: u8 = 5;
const BREATH_MAX: u8 = 250;
const BREATH_STEP: u8 = 2;

/// A color as written to the three channels (0 = off, 255 = full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale all channels by a brightness percentage (clamped to 100)
    pub fn scaled(self, brightness_pct: u8) -> Self {
        let pct = brightness_pct.min(100) as u16;
        Self {
            r: (self.r as u16 * pct / 100) as u8,
            g: (self.g as u16 * pct / 100) as u8,
            b: (self.b as u16 * pct / 100) as u8,
        }
    }
}

/// RGB color state machine
///
/// Owns the animation phase counters; emits the brightness-scaled color
/// for the current tick.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationEngine {
    mode: RgbMode,
    /// Last animation step time (Rainbow/Breathing gate)
    last_step: Millis,
    /// Rainbow hue phase, wraps on u8
    phase: u8,
    /// Breathing brightness value
    breath: u8,
    /// Breathing ramp direction (+1 / -1)
    breath_rising: bool,
    /// Current unscaled color
    color: Rgb,
}

impl AnimationEngine {
    /// Create an engine with the LED off
    pub fn new() -> Self {
        Self {
            mode: RgbMode::Off,
            last_step: 0,
            phase: 0,
            breath: BREATH_MIN,
            breath_rising: true,
            color: Rgb::OFF,
        }
    }

    /// Current mode
    pub fn mode(&self) -> RgbMode {
        self.mode
    }

    /// Switch mode; static modes take effect immediately
    pub fn set_mode(&mut self, mode: RgbMode) {
        self.mode = mode;
        self.color = match mode {
            RgbMode::Off => Rgb::OFF,
            RgbMode::White => Rgb::new(255, 255, 255),
            RgbMode::SolidRed => Rgb::new(255, 0, 0),
            RgbMode::SolidGreen => Rgb::new(0, 255, 0),
            RgbMode::SolidBlue => Rgb::new(0, 0, 255),
            // Animated modes keep their phase; next tick recolors
            RgbMode::Rainbow | RgbMode::Breathing => self.color,
        };
    }

    /// Advance animations and return the color to write this tick
    pub fn tick(&mut self, now: Millis, brightness_pct: u8, cfg: &TimingConfig) -> Rgb {
        match self.mode {
            RgbMode::Rainbow => {
                if now.saturating_sub(self.last_step) >= cfg.rgb_interval_ms as u64 {
                    self.last_step = now;
                    self.phase = self.phase.wrapping_add(1);
                    self.color = Rgb::new(
                        SINE[self.phase as usize],
                        SINE[self.phase.wrapping_mul(2) as usize],
                        SINE[self.phase.wrapping_mul(3) as usize],
                    );
                }
            }
            RgbMode::Breathing => {
                if now.saturating_sub(self.last_step) >= cfg.rgb_interval_ms as u64 {
                    self.last_step = now;
                    if self.breath_rising {
                        self.breath = self.breath.saturating_add(BREATH_STEP);
                        if self.breath >= BREATH_MAX {
                            self.breath_rising = false;
                        }
                    } else {
                        self.breath = self.breath.saturating_sub(BREATH_STEP);
                        if self.breath <= BREATH_MIN {
                            self.breath_rising = true;
                        }
                    }
                    self.color = Rgb::new(self.breath, self.breath, self.breath);
                }
            }
            _ => {}
        }

        self.color.scaled(brightness_pct)
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}
