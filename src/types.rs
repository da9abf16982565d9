//! Shared types for the train simulation.
//!
//! The data model used by the registry, the scheduler, the driver and
//! every frame consumer. Kept free of behaviour beyond small helpers so
//! the other modules can depend on it without cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track number. A train is bound to exactly one for its lifetime.
pub type TrackId = u32;

/// Index of a completed tick. The frame after the first update is tick 1.
pub type Tick = u64;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Informational priority label. Never consulted by scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

// ---------------------------------------------------------------------------
// Train
// ---------------------------------------------------------------------------

/// Construction record for a single train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSpec {
    pub id: String,
    /// Starting offset along the track.
    pub position: f64,
    pub track: TrackId,
    pub priority: Priority,
    /// Display colour name, e.g. "royalblue".
    pub color: String,
}

impl TrainSpec {
    pub fn new(
        id: impl Into<String>,
        position: f64,
        track: TrackId,
        priority: Priority,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            track,
            priority,
            color: color.into(),
        }
    }
}

/// A train owned by the registry.
///
/// Fields are private: the position only moves through the scheduler and
/// the hold flag only through the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    id: String,
    track: TrackId,
    position: f64,
    hold: bool,
    priority: Priority,
    color: String,
}

impl Train {
    pub(crate) fn from_spec(spec: TrainSpec) -> Self {
        Self {
            id: spec.id,
            track: spec.track,
            position: spec.position,
            hold: false,
            priority: spec.priority,
            color: spec.color,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_held(&self) -> bool {
        self.hold
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub(crate) fn set_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub fn snapshot(&self) -> TrainSnapshot {
        TrainSnapshot {
            id: self.id.clone(),
            track: self.track,
            position: self.position,
            color: self.color.clone(),
            held: self.hold,
            priority: self.priority,
        }
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (track {} @ {:.1}{}, {})",
            self.id,
            self.track,
            self.position,
            if self.hold { ", HOLD" } else { "" },
            self.priority,
        )
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Read-only view of one train, handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSnapshot {
    pub id: String,
    pub track: TrackId,
    pub position: f64,
    pub color: String,
    pub held: bool,
    pub priority: Priority,
}

/// Everything a renderer needs to draw one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub tick: Tick,
    pub trains: Vec<TrainSnapshot>,
    pub at: DateTime<Utc>,
}

impl Frame {
    pub fn new(tick: Tick, trains: Vec<TrainSnapshot>) -> Self {
        Self {
            tick,
            trains,
            at: Utc::now(),
        }
    }

    pub fn train(&self, id: &str) -> Option<&TrainSnapshot> {
        self.trains.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain errors raised by the registry, the scheduler and the driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Train not found: {0}")]
    NotFound(String),
}

impl SimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimError::Configuration(message.into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
