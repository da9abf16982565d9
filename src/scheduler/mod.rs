//! Motion scheduler.
//!
//! Advances a registry by exactly one tick: every unheld train moves by
//! the policy's step, then wraps to zero if it has passed the end of the
//! track. The scheduler keeps no state between ticks.

pub mod policy;

use tracing::trace;

use crate::registry::TrainRegistry;
use crate::types::SimError;

pub use policy::{MotionPolicy, StationSlowdown, StationZone};

#[derive(Debug, Clone)]
pub struct MotionScheduler {
    track_length: f64,
    policy: MotionPolicy,
}

impl MotionScheduler {
    pub fn new(track_length: f64, policy: MotionPolicy) -> Result<Self, SimError> {
        if !track_length.is_finite() || track_length <= 0.0 {
            return Err(SimError::config(format!(
                "track_length must be positive, got {track_length}"
            )));
        }
        policy.validate()?;
        Ok(Self {
            track_length,
            policy,
        })
    }

    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    pub fn policy(&self) -> &MotionPolicy {
        &self.policy
    }

    /// Position of a free train after one tick.
    ///
    /// The wrap test is strict: a train may land exactly on
    /// `track_length` and only resets on the following tick.
    pub fn next_position(&self, position: f64) -> f64 {
        let next = position + self.policy.step_from(position);
        if next > self.track_length {
            0.0
        } else {
            next
        }
    }

    /// Fails if any train sits outside `[0, track_length]`.
    pub fn check(&self, registry: &TrainRegistry) -> Result<(), SimError> {
        let length = self.track_length;
        match registry
            .trains()
            .find(|t| !(0.0..=length).contains(&t.position()))
        {
            Some(t) => Err(SimError::config(format!(
                "train '{}' at {} is outside [0, {length}]",
                t.id(),
                t.position()
            ))),
            None => Ok(()),
        }
    }

    /// Run one tick over the registry. Returns how many trains moved.
    ///
    /// The registry is checked first; an out-of-range train aborts the
    /// tick with nothing moved.
    pub fn tick(&self, registry: &mut TrainRegistry) -> Result<usize, SimError> {
        self.check(registry)?;
        let moved = registry.advance_unheld(|p| self.next_position(p));
        trace!(moved, held = registry.len() - moved, "Tick applied");
        Ok(moved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
