//! Hardware adapters for the Otium control core
//!
//! otium-core emits plain pin levels, channel values and tone requests;
//! this crate maps them onto actual hardware:
//!
//! - H-bridge motor output (direction + enable lines)
//! - Common-anode/common-cathode RGB LED channels
//! - Tone buzzer with change-only writes
//! - Polarity-correcting input sampling
//!
//! The pin traits are deliberately minimal so boards can wrap whatever
//! their HAL provides.

#![no_std]
#![deny(unsafe_code)]

pub mod buzzer;
pub mod gpio;
pub mod input;
pub mod motor;
pub mod rgb;
