//! Board-agnostic core logic for the useless box firmware
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Input debouncing and press classification
//! - Settings menu state machine
//! - Active-claim arbitration between the two paired boxes
//! - Motor direction/soft-start/software-PWM control
//! - Buzzer pattern playback
//! - RGB animation engine
//! - Preset persistence interface
//!
//! Everything is driven from a single cooperative tick (see
//! [`controller::Controller`]) with an injected millisecond clock, so the
//! whole crate is testable on the host with simulated time.

#![no_std]
#![deny(unsafe_code)]

pub mod buzzer;
pub mod claim;
pub mod config;
pub mod controller;
pub mod input;
pub mod menu;
pub mod motor;
pub mod rgb;

/// Milliseconds since an arbitrary monotonic epoch.
///
/// The board layer supplies this on every tick; tests supply it directly.
pub type Millis = u64;
