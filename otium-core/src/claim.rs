//! Active-claim arbitration
//!
//! Exactly one of the two paired boxes is supposed to be "active" at a
//! time. The shared state is a single string-valued register holding the
//! claimant's identity, synchronized by an external transport with
//! last-writer-wins semantics. A transient window where both or neither
//! box believes it holds the claim is possible during transport delay;
//! that race is accepted, not solved here.
//!
//! The arbiter never touches hardware. Each operation returns a
//! [`ClaimEffects`] describing the side effects the controller must
//! carry out (publish, preset switch, one-shot feedback pattern).

use heapless::String;

use crate::config::PresetBank;

/// Maximum length of a box identity string
pub const MAX_BOX_ID: usize = 24;

/// A box identity as shared over the claim register; empty = no claimant
pub type BoxId = String<MAX_BOX_ID>;

/// Policy for a remote claim overriding a locally-on switch
///
/// Whether the losing box should beep when the peer takes the claim has
/// flip-flopped across hardware revisions, so it is configuration rather
/// than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteOverridePolicy {
    /// Play the inactive pattern when overridden
    #[default]
    Audible,
    /// Switch presets without feedback
    Silent,
}

/// Arbitration state, derived from the claim register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimState {
    /// Nobody holds the claim
    Inactive,
    /// This box holds the claim
    ActiveLocal,
    /// The peer holds the claim
    ActiveRemote,
}

/// Side effects of one arbitration step
///
/// `state_changed` is set by every transition; the motor controller
/// consumes it once and recomputes its direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClaimEffects {
    /// New value to publish to the shared claim register
    pub publish: Option<BoxId>,
    /// Preset bank to apply (RGB mode switch)
    pub apply: Option<PresetBank>,
    /// Preset bank whose buzzer pattern plays once
    pub play: Option<PresetBank>,
    /// Motor must recompute direction
    pub state_changed: bool,
}

/// Arbiter for the shared active claim
#[derive(Debug, Clone)]
pub struct ClaimArbiter {
    local_id: BoxId,
    /// Last known value of the shared register
    remote_claim: BoxId,
    /// Whether this box currently considers itself active
    active: bool,
}

impl ClaimArbiter {
    /// Create an arbiter for a box with the given identity
    ///
    /// The identity is truncated to [`MAX_BOX_ID`] bytes if longer.
    pub fn new(local_id: &str) -> Self {
        Self {
            local_id: truncated(local_id),
            remote_claim: BoxId::new(),
            active: false,
        }
    }

    /// This box's identity
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Whether this box currently holds the claim
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Preset bank that currently applies to this box
    pub fn bank(&self) -> PresetBank {
        if self.active {
            PresetBank::Active
        } else {
            PresetBank::Inactive
        }
    }

    /// Current arbitration state
    pub fn state(&self) -> ClaimState {
        if self.active {
            ClaimState::ActiveLocal
        } else if self.remote_claim.is_empty() {
            ClaimState::Inactive
        } else {
            ClaimState::ActiveRemote
        }
    }

    /// Local switch moved to "on": claim unconditionally
    ///
    /// Publishes the local identity, switches to the active presets and
    /// plays the active pattern once.
    pub fn switch_on(&mut self) -> ClaimEffects {
        self.remote_claim = self.local_id.clone();
        self.active = true;
        ClaimEffects {
            publish: Some(self.local_id.clone()),
            apply: Some(PresetBank::Active),
            play: Some(PresetBank::Active),
            state_changed: true,
        }
    }

    /// Local switch moved to "off"
    ///
    /// If this box holds the claim the release is self-initiated and
    /// silent: the register is cleared and no pattern plays. If the peer
    /// already took the claim, this box is merely being notified and the
    /// inactive pattern plays.
    pub fn switch_off(&mut self) -> ClaimEffects {
        let held_locally = self.active;
        self.active = false;

        if held_locally && self.remote_claim == self.local_id {
            self.remote_claim.clear();
            ClaimEffects {
                publish: Some(BoxId::new()),
                apply: Some(PresetBank::Inactive),
                play: None,
                state_changed: true,
            }
        } else {
            ClaimEffects {
                publish: None,
                apply: Some(PresetBank::Inactive),
                play: if self.remote_claim.is_empty() {
                    None
                } else {
                    Some(PresetBank::Inactive)
                },
                state_changed: true,
            }
        }
    }

    /// A new value arrived on the shared claim register
    ///
    /// `switch_on` is the current debounced switch level; a peer claim
    /// out-ranks a stale local "on" switch. `policy` selects the
    /// override feedback behavior.
    pub fn remote_update(
        &mut self,
        id: &str,
        switch_on: bool,
        policy: RemoteOverridePolicy,
    ) -> ClaimEffects {
        self.remote_claim = truncated(id);
        let is_us = !self.local_id.is_empty() && self.remote_claim == self.local_id;

        if is_us && !self.active {
            self.active = true;
            ClaimEffects {
                publish: None,
                apply: Some(PresetBank::Active),
                play: Some(PresetBank::Active),
                state_changed: true,
            }
        } else if !is_us && self.active {
            self.active = false;
            ClaimEffects {
                publish: None,
                apply: Some(PresetBank::Inactive),
                play: if switch_on && policy == RemoteOverridePolicy::Audible {
                    Some(PresetBank::Inactive)
                } else {
                    None
                },
                state_changed: true,
            }
        } else {
            // No activity transition; still mark dirty so the motor
            // re-evaluates against the new register value.
            ClaimEffects {
                state_changed: true,
                ..ClaimEffects::default()
            }
        }
    }
}

pub(crate) fn truncated(id: &str) -> BoxId {
    let mut out = BoxId::new();
    for c in id.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
