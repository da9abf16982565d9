//! Train registry.
//!
//! Owns the ordered set of trains for one simulation session. Callers
//! can toggle hold flags and take snapshots; positions only move through
//! the scheduler via the crate-private `advance_unheld`.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::types::{SimError, TrackId, Train, TrainSnapshot, TrainSpec};

#[derive(Debug, Clone)]
pub struct TrainRegistry {
    trains: Vec<Train>,
}

impl TrainRegistry {
    /// Build the registry from construction records, in order.
    ///
    /// Fails on a duplicated id or a track outside `tracks`.
    pub fn initialize(specs: Vec<TrainSpec>, tracks: &[TrackId]) -> Result<Self, SimError> {
        let valid: HashSet<TrackId> = tracks.iter().copied().collect();
        let mut seen = HashSet::with_capacity(specs.len());
        let mut trains = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.id.clone()) {
                return Err(SimError::config(format!("duplicate train id '{}'", spec.id)));
            }
            if !valid.contains(&spec.track) {
                return Err(SimError::config(format!(
                    "train '{}' references unknown track {}",
                    spec.id, spec.track
                )));
            }
            if !spec.position.is_finite() {
                return Err(SimError::config(format!(
                    "train '{}' has a non-finite initial position",
                    spec.id
                )));
            }
            trains.push(Train::from_spec(spec));
        }

        debug!(count = trains.len(), "Train registry initialised");
        Ok(Self { trains })
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.id() == id)
    }

    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.iter()
    }

    pub fn set_hold(&mut self, id: &str, hold: bool) -> Result<(), SimError> {
        let train = self
            .trains
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))?;
        if train.is_held() != hold {
            debug!(train = id, hold, "Hold flag changed");
        }
        train.set_hold(hold);
        Ok(())
    }

    /// Apply an inbound id → hold mapping.
    ///
    /// Every id is checked first; an unknown id leaves all flags untouched.
    /// Trains missing from the map keep their current flag.
    pub fn apply_holds(&mut self, holds: &HashMap<String, bool>) -> Result<(), SimError> {
        if let Some(unknown) = holds.keys().find(|id| self.get(id).is_none()) {
            return Err(SimError::NotFound(unknown.clone()));
        }
        for (id, &hold) in holds {
            self.set_hold(id, hold)?;
        }
        Ok(())
    }

    /// Ordered, owned view of every train for rendering.
    pub fn snapshot(&self) -> Vec<TrainSnapshot> {
        self.trains.iter().map(Train::snapshot).collect()
    }

    /// Move every unheld train to `next(position)`. Returns how many moved.
    pub(crate) fn advance_unheld(&mut self, next: impl Fn(f64) -> f64) -> usize {
        let mut moved = 0;
        for train in self.trains.iter_mut().filter(|t| !t.is_held()) {
            train.set_position(next(train.position()));
            moved += 1;
        }
        moved
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
