//! Buzzer pattern playback
//!
//! Each pattern is an explicit step/timing table advanced purely by
//! comparing elapsed time, so a tick never blocks. The output is the
//! tone frequency to drive this tick, or silence.
//!
//! Demo playback bounds any pattern to a fixed duration for menu
//! previews, force-stopping it even if the pattern would keep looping.

use crate::config::{BuzzerPattern, TimingConfig};
use crate::Millis;

/// Tone for the Single pattern and the Loop pattern
const TONE_HZ: u16 = 1000;
/// Tone for the SOS pattern
const SOS_TONE_HZ: u16 = 800;
/// Chirp tone sequence
const CHIRP_TONES_HZ: [u16; 3] = [800, 1200, 800];
/// Chirp tone duration
const CHIRP_STEP_MS: u64 = 120;
/// Single beep duration
const SINGLE_MS: u64 = 120;
/// SOS on-phase durations (short/short/short, long/long/long, short/short/short)
const SOS_STEPS_MS: [u64; 10] = [0, 150, 150, 150, 400, 400, 400, 150, 150, 150];
/// Silence between SOS steps
const SOS_GAP_MS: u64 = 150;

/// Non-blocking buzzer pattern state machine
///
/// One-shot patterns (Single, Chirp, Sos) return to `Off` on their own;
/// `Loop` toggles until replaced or stopped.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternPlayer {
    pattern: BuzzerPattern,
    /// Step index within the current pattern's table
    step: usize,
    /// When the current step started
    step_start: Millis,
    /// On/off phase for the Loop pattern
    loop_on: bool,
    /// Force-stop deadline while previewing from the menu
    demo_until: Option<Millis>,
}

impl PatternPlayer {
    /// Create an idle player
    pub fn new() -> Self {
        Self {
            pattern: BuzzerPattern::Off,
            step: 0,
            step_start: 0,
            loop_on: false,
            demo_until: None,
        }
    }

    /// Pattern currently playing
    pub fn pattern(&self) -> BuzzerPattern {
        self.pattern
    }

    /// Start a pattern from its first step
    pub fn play(&mut self, pattern: BuzzerPattern, now: Millis) {
        self.pattern = pattern;
        self.step = 0;
        self.step_start = now;
        self.loop_on = false;
        self.demo_until = None;
    }

    /// Start a pattern as a bounded menu preview
    ///
    /// Playback is force-stopped after the demo window even if the
    /// pattern has not finished (or never would, for `Loop`).
    pub fn play_demo(&mut self, pattern: BuzzerPattern, now: Millis, cfg: &TimingConfig) {
        self.play(pattern, now);
        self.demo_until = Some(now + cfg.demo_ms as u64);
    }

    /// Stop playback immediately
    pub fn stop(&mut self) {
        self.pattern = BuzzerPattern::Off;
        self.step = 0;
        self.loop_on = false;
        self.demo_until = None;
    }

    /// Advance playback; returns the tone to sound this tick
    pub fn tick(&mut self, now: Millis, cfg: &TimingConfig) -> Option<u16> {
        if let Some(deadline) = self.demo_until {
            if now >= deadline {
                self.stop();
            }
        }

        match self.pattern {
            BuzzerPattern::Off => None,
            BuzzerPattern::Single => {
                if now.saturating_sub(self.step_start) >= SINGLE_MS {
                    self.stop();
                    None
                } else {
                    Some(TONE_HZ)
                }
            }
            BuzzerPattern::Chirp => self.tick_chirp(now),
            BuzzerPattern::Loop => {
                if now.saturating_sub(self.step_start) >= cfg.buzzer_loop_ms as u64 {
                    self.step_start = now;
                    self.loop_on = !self.loop_on;
                }
                self.loop_on.then_some(TONE_HZ)
            }
            BuzzerPattern::Sos => self.tick_sos(now),
        }
    }

    /// Three tones, each `CHIRP_STEP_MS` on with a 50 ms gap
    fn tick_chirp(&mut self, now: Millis) -> Option<u16> {
        if self.step >= CHIRP_TONES_HZ.len() {
            self.stop();
            return None;
        }

        let elapsed = now.saturating_sub(self.step_start);
        if elapsed < CHIRP_STEP_MS {
            Some(CHIRP_TONES_HZ[self.step])
        } else if elapsed < CHIRP_STEP_MS + 50 {
            None
        } else {
            self.step += 1;
            self.step_start = now;
            if self.step >= CHIRP_TONES_HZ.len() {
                self.stop();
                None
            } else {
                Some(CHIRP_TONES_HZ[self.step])
            }
        }
    }

    /// SOS table: each step sounds for its table duration then gaps for
    /// `SOS_GAP_MS`; returns to Off after the last step. Total playback
    /// is exactly the sum of the table plus the per-step gaps.
    fn tick_sos(&mut self, now: Millis) -> Option<u16> {
        loop {
            if self.step >= SOS_STEPS_MS.len() {
                self.stop();
                return None;
            }

            let on_ms = SOS_STEPS_MS[self.step];
            let elapsed = now.saturating_sub(self.step_start);
            if elapsed < on_ms {
                return Some(SOS_TONE_HZ);
            } else if elapsed < on_ms + SOS_GAP_MS {
                return None;
            }

            // Step complete; re-evaluate the next one at its exact
            // start time so slow ticks do not stretch the pattern.
            self.step_start += on_ms + SOS_GAP_MS;
            self.step += 1;
        }
    }
}

impl Default for PatternPlayer {
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

    /// Drive the player at 1 ms resolution, collecting (time, tone)
    fn run(player: &mut PatternPlayer, from: Millis, to: Millis) -> heapless::Vec<u64, 8192> {
        let mut on_ticks = heapless::Vec::new();
        for now in from..to {
            if player.tick(now, &cfg()).is_some() {
                let _ = on_ticks.push(now);
            }
        }
        on_ticks
    }

    #[test]
    fn test_single_beeps_then_stops() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Single, 0);

        let on = run(&mut player, 0, 500);
        assert_eq!(on.len(), 120);
        assert_eq!(*on.last().unwrap(), 119);
        assert_eq!(player.pattern(), BuzzerPattern::Off);
    }

    #[test]
    fn test_chirp_plays_three_tones() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Chirp, 0);

        let mut tones = heapless::Vec::<u16, 8>::new();
        let mut last = None;
        for now in 0..1000 {
            let tone = player.tick(now, &cfg());
            if tone != last {
                if let Some(freq) = tone {
                    let _ = tones.push(freq);
                }
                last = tone;
            }
        }
        assert_eq!(tones.as_slice(), &CHIRP_TONES_HZ);
        assert_eq!(player.pattern(), BuzzerPattern::Off);
    }

    #[test]
    fn test_loop_toggles_until_stopped() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Loop, 0);

        // Off for the first interval, then toggling every 250 ms
        assert_eq!(player.tick(100, &cfg()), None);
        assert_eq!(player.tick(250, &cfg()), Some(TONE_HZ));
        assert_eq!(player.tick(499, &cfg()), Some(TONE_HZ));
        assert_eq!(player.tick(500, &cfg()), None);
        assert_eq!(player.tick(750, &cfg()), Some(TONE_HZ));

        // Still going after many cycles
        assert_eq!(player.pattern(), BuzzerPattern::Loop);
        player.stop();
        assert_eq!(player.tick(800, &cfg()), None);
    }

    #[test]
    fn test_sos_total_duration_and_auto_off() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Sos, 0);

        let total: u64 = SOS_STEPS_MS.iter().sum::<u64>()
            + SOS_GAP_MS * SOS_STEPS_MS.len() as u64;
        assert_eq!(total, 3750);

        let on = run(&mut player, 0, total + 100);
        // Tone sounds for exactly the sum of the on-phases
        assert_eq!(on.len() as u64, SOS_STEPS_MS.iter().sum::<u64>());
        // Nothing after the table is exhausted
        assert!(on.iter().all(|&t| t < total));
        assert_eq!(player.pattern(), BuzzerPattern::Off);
    }

    #[test]
    fn test_sos_survives_slow_ticks() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Sos, 0);

        // 40 ms tick budget instead of 1 ms; pattern must still end
        let mut now = 0;
        while player.pattern() != BuzzerPattern::Off && now < 10_000 {
            player.tick(now, &cfg());
            now += 40;
        }
        assert_eq!(player.pattern(), BuzzerPattern::Off);
    }

    #[test]
    fn test_demo_force_stops_loop() {
        let mut player = PatternPlayer::new();
        player.play_demo(BuzzerPattern::Loop, 0, &cfg());

        assert_eq!(player.tick(250, &cfg()), Some(TONE_HZ));
        assert!(player.tick(4999, &cfg()).is_some() || player.pattern() == BuzzerPattern::Loop);

        player.tick(5000, &cfg());
        assert_eq!(player.pattern(), BuzzerPattern::Off);
        assert_eq!(player.tick(5001, &cfg()), None);
    }

    #[test]
    fn test_play_replaces_running_pattern() {
        let mut player = PatternPlayer::new();
        player.play(BuzzerPattern::Sos, 0);
        player.tick(100, &cfg());

        player.play(BuzzerPattern::Single, 200);
        assert_eq!(player.tick(200, &cfg()), Some(TONE_HZ));
        assert_eq!(player.pattern(), BuzzerPattern::Single);
    }
}
