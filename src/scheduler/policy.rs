//! Motion policies.
//!
//! A policy maps a train's current position to its step for one tick.
//! Both variants are plain data so they can come straight from config.

use serde::{Deserialize, Serialize};

use crate::types::SimError;

/// Default step outside any station zone.
pub const DEFAULT_STEP: f64 = 1.0;
/// Default reduced step while inside a station zone.
pub const DEFAULT_STATION_STEP: f64 = 0.3;
/// Default distance before the platform where slowdown begins.
pub const DEFAULT_APPROACH: f64 = 2.0;

/// Inclusive interval `[start, end]` where the reduced step applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationZone {
    pub start: f64,
    pub end: f64,
}

impl StationZone {
    pub fn contains(&self, position: f64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Station geometry plus step sizes for the slowdown policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSlowdown {
    pub station_start: f64,
    pub station_length: f64,
    /// Slowdown begins this far before `station_start`.
    pub approach: f64,
    pub step: f64,
    pub station_step: f64,
}

impl StationSlowdown {
    /// Slowdown policy with the stock step sizes and approach.
    pub fn new(station_start: f64, station_length: f64) -> Self {
        Self {
            station_start,
            station_length,
            approach: DEFAULT_APPROACH,
            step: DEFAULT_STEP,
            station_step: DEFAULT_STATION_STEP,
        }
    }

    pub fn zone(&self) -> StationZone {
        StationZone {
            start: self.station_start - self.approach,
            end: self.station_start + self.station_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionPolicy {
    /// Constant step everywhere.
    Uniform { step: f64 },
    /// Reduced step while inside the station zone.
    Station(StationSlowdown),
}

impl Default for MotionPolicy {
    fn default() -> Self {
        MotionPolicy::Uniform { step: DEFAULT_STEP }
    }
}

impl MotionPolicy {
    /// Distance a free train covers this tick from `position`.
    pub fn step_from(&self, position: f64) -> f64 {
        match self {
            MotionPolicy::Uniform { step } => *step,
            MotionPolicy::Station(s) => {
                if s.zone().contains(position) {
                    s.station_step
                } else {
                    s.step
                }
            }
        }
    }

    /// The slowdown zone, if this policy has one.
    pub fn zone(&self) -> Option<StationZone> {
        match self {
            MotionPolicy::Uniform { .. } => None,
            MotionPolicy::Station(s) => Some(s.zone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MotionPolicy::Uniform { .. } => "uniform",
            MotionPolicy::Station(_) => "station",
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            MotionPolicy::Uniform { step } => check_step("step", *step),
            MotionPolicy::Station(s) => {
                check_step("step", s.step)?;
                check_step("station_step", s.station_step)?;
                if !s.station_start.is_finite()
                    || !s.station_length.is_finite()
                    || !s.approach.is_finite()
                {
                    return Err(SimError::config("station geometry must be finite"));
                }
                let zone = s.zone();
                if zone.end < zone.start {
                    return Err(SimError::config(format!(
                        "station zone is inverted: [{}, {}]",
                        zone.start, zone.end
                    )));
                }
                Ok(())
            }
        }
    }
}

fn check_step(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{name} must be a positive number, got {value}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
