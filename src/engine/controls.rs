//! Inbound controls: per-train hold flags and the inter-tick delay.
//!
//! The driver reads a copy of these at each tick boundary; the dashboard
//! writes them between ticks.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::types::SimError;

/// Fastest allowed playback, per tick.
pub const MIN_TICK_DELAY: Duration = Duration::from_millis(100);
/// Slowest allowed playback, per tick.
pub const MAX_TICK_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    holds: HashMap<String, bool>,
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    tick_delay: Duration,
}

pub type SharedControls = Arc<RwLock<Controls>>;

impl Controls {
    pub fn new(tick_delay: Duration) -> Result<Self, SimError> {
        check_delay(tick_delay)?;
        Ok(Self {
            holds: HashMap::new(),
            tick_delay,
        })
    }

    pub fn shared(self) -> SharedControls {
        Arc::new(RwLock::new(self))
    }

    pub fn holds(&self) -> &HashMap<String, bool> {
        &self.holds
    }

    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    /// Record a hold request. Id validity is checked by the registry
    /// when the driver applies the map.
    pub fn set_hold(&mut self, id: impl Into<String>, hold: bool) {
        self.holds.insert(id.into(), hold);
    }

    pub fn set_tick_delay(&mut self, delay: Duration) -> Result<(), SimError> {
        check_delay(delay)?;
        self.tick_delay = delay;
        Ok(())
    }
}

fn check_delay(delay: Duration) -> Result<(), SimError> {
    if (MIN_TICK_DELAY..=MAX_TICK_DELAY).contains(&delay) {
        Ok(())
    } else {
        Err(SimError::config(format!(
            "tick delay must be between {}ms and {}ms, got {}ms",
            MIN_TICK_DELAY.as_millis(),
            MAX_TICK_DELAY.as_millis(),
            delay.as_millis()
        )))
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
