//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Everything has a default matching the stock three-track scenario, so
//! a missing section (or a missing file, see `main.rs`) still yields a
//! runnable simulation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::engine::controls::Controls;
use crate::registry::TrainRegistry;
use crate::render::Layout;
use crate::scheduler::policy::{DEFAULT_APPROACH, DEFAULT_STATION_STEP, DEFAULT_STEP};
use crate::scheduler::{MotionPolicy, MotionScheduler, StationSlowdown};
use crate::types::{Priority, TrackId, TrainSpec};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub policy: PolicyConfig,
    pub trains: TrainsConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub tracks: Vec<TrackId>,
    pub track_length: f64,
    /// Coach count behind the engine. Display only.
    pub train_length: usize,
    /// Ticks per run. Defaults to twice the track length.
    pub total_ticks: Option<u64>,
    pub tick_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tracks: vec![1, 2, 3],
            track_length: 40.0,
            train_length: 4,
            total_ticks: None,
            tick_delay_ms: 300,
        }
    }
}

impl SimulationConfig {
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
            .unwrap_or_else(|| (self.track_length.max(0.0) * 2.0).round() as u64)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Uniform,
    Station,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    pub step: f64,
    pub station_step: f64,
    pub station_start: f64,
    pub station_length: f64,
    pub approach: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::Station,
            step: DEFAULT_STEP,
            station_step: DEFAULT_STATION_STEP,
            station_start: 15.0,
            station_length: 8.0,
            approach: DEFAULT_APPROACH,
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> MotionPolicy {
        match self.kind {
            PolicyKind::Uniform => MotionPolicy::Uniform { step: self.step },
            PolicyKind::Station => MotionPolicy::Station(StationSlowdown {
                station_start: self.station_start,
                station_length: self.station_length,
                approach: self.approach,
                step: self.step,
                station_step: self.station_step,
            }),
        }
    }
}

/// `[[trains]]` entries, kept as a newtype so the default applies when
/// the array is absent.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(transparent)]
pub struct TrainsConfig(pub Vec<TrainSpec>);

impl Default for TrainsConfig {
    fn default() -> Self {
        Self(vec![
            TrainSpec::new("T1", 0.0, 1, Priority::High, "royalblue"),
            TrainSpec::new("T2", 6.0, 2, Priority::Medium, "seagreen"),
            TrainSpec::new("T3", 12.0, 3, Priority::Low, "firebrick"),
        ])
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8080,
        }
    }
}

/// Runtime pieces built from a validated configuration.
pub struct SimulationParts {
    pub registry: TrainRegistry,
    pub scheduler: MotionScheduler,
    pub controls: Controls,
    pub layout: Layout,
    pub total_ticks: u64,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Build the registry, scheduler, controls and layout.
    pub fn into_parts(self) -> Result<SimulationParts> {
        let sim = self.simulation;
        let policy = self.policy.to_policy();
        let scheduler = MotionScheduler::new(sim.track_length, policy)
            .context("Invalid scheduler configuration")?;
        let registry = TrainRegistry::initialize(self.trains.0, &sim.tracks)
            .context("Invalid train configuration")?;
        let controls = Controls::new(Duration::from_millis(sim.tick_delay_ms))
            .context("Invalid tick delay")?;
        let layout = Layout::new(
            sim.tracks.clone(),
            sim.track_length,
            sim.train_length,
            scheduler.policy(),
        );
        Ok(SimulationParts {
            registry,
            scheduler,
            controls,
            layout,
            total_ticks: sim.total_ticks(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_scenario() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.simulation.tracks, vec![1, 2, 3]);
        assert_eq!(cfg.simulation.track_length, 40.0);
        assert_eq!(cfg.simulation.train_length, 4);
        assert_eq!(cfg.simulation.total_ticks(), 80);
        assert_eq!(cfg.policy.kind, PolicyKind::Station);
        assert_eq!(cfg.trains.0.len(), 3);
        assert!(!cfg.dashboard.enabled);
    }

    #[test]
    fn test_parse_uniform_policy() {
        let cfg = AppConfig::parse(
            r#"
            [simulation]
            tracks = [1, 2]
            track_length = 30
            total_ticks = 30

            [policy]
            kind = "uniform"

            [[trains]]
            id = "A"
            position = 0
            track = 1
            priority = "High"
            color = "red"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.simulation.track_length, 30.0);
        assert_eq!(cfg.simulation.total_ticks(), 30);
        assert_eq!(cfg.policy.to_policy(), MotionPolicy::Uniform { step: 1.0 });
        assert_eq!(cfg.trains.0.len(), 1);
        assert_eq!(cfg.trains.0[0].priority, Priority::High);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.simulation.tick_delay_ms, 300);
        assert_eq!(cfg.dashboard.port, 8080);
    }

    #[test]
    fn test_parse_empty_is_default() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.trains.0[2].id, "T3");
        assert_eq!(cfg.policy.station_start, 15.0);
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        let result = AppConfig::parse("[policy]\nkind = \"teleport\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_into_parts() {
        let parts = AppConfig::default().into_parts().unwrap();
        assert_eq!(parts.registry.len(), 3);
        assert_eq!(parts.scheduler.track_length(), 40.0);
        assert_eq!(parts.total_ticks, 80);
        assert_eq!(parts.controls.tick_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_into_parts_rejects_bad_track() {
        let mut cfg = AppConfig::default();
        cfg.simulation.tracks = vec![1, 2];
        let err = cfg.into_parts().err().unwrap();
        assert!(format!("{err:#}").contains("unknown track 3"));
    }

    #[test]
    fn test_into_parts_rejects_zero_length() {
        let mut cfg = AppConfig::default();
        cfg.simulation.track_length = 0.0;
        assert!(cfg.into_parts().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("trainsim_test_config_{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[simulation]\ntrack_length = 25\n").unwrap();

        let cfg = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.simulation.track_length, 25.0);
        assert_eq!(cfg.simulation.total_ticks(), 50);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_bundled_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
        let cfg = AppConfig::load(path).unwrap();
        assert_eq!(cfg.trains.0[0].id, "T1");
        assert_eq!(cfg.policy.kind, PolicyKind::Station);
        assert_eq!(cfg.simulation.total_ticks(), 80);
        let parts = cfg.into_parts().unwrap();
        assert_eq!(parts.registry.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/tmp/trainsim_does_not_exist_xyz.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
