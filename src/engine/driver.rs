//! Simulation driver.
//!
//! Owns the registry and scheduler for one session. `step` is the
//! synchronous tick; `run` is the paced loop that reads controls, ticks,
//! publishes the frame to every sink and then waits the tick delay.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::controls::SharedControls;
use super::FrameSink;
use crate::registry::TrainRegistry;
use crate::scheduler::MotionScheduler;
use crate::types::{Frame, SimError, Tick};

/// Outcome of a paced run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub stopped_early: bool,
    pub final_frame: Frame,
}

pub struct Simulation {
    registry: TrainRegistry,
    scheduler: MotionScheduler,
    tick: Tick,
    total_ticks: u64,
}

impl Simulation {
    /// Fails if any train starts outside `[0, track_length]`.
    pub fn new(
        registry: TrainRegistry,
        scheduler: MotionScheduler,
        total_ticks: u64,
    ) -> Result<Self, SimError> {
        scheduler.check(&registry)?;
        Ok(Self {
            registry,
            scheduler,
            tick: 0,
            total_ticks,
        })
    }

    pub fn registry(&self) -> &TrainRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &MotionScheduler {
        &self.scheduler
    }

    /// Number of ticks applied so far.
    pub fn tick_index(&self) -> Tick {
        self.tick
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks
    }

    pub fn set_hold(&mut self, id: &str, hold: bool) -> Result<(), SimError> {
        self.registry.set_hold(id, hold)
    }

    /// Snapshot of the current state labelled with the current tick.
    pub fn frame(&self) -> Frame {
        Frame::new(self.tick, self.registry.snapshot())
    }

    /// Apply `holds`, advance one tick and return the new frame.
    ///
    /// On an unknown id nothing changes and the tick does not advance.
    pub fn step(&mut self, holds: &HashMap<String, bool>) -> Result<Frame, SimError> {
        self.registry.apply_holds(holds)?;
        let moved = self.scheduler.tick(&mut self.registry)?;
        self.tick += 1;
        debug!(tick = self.tick, moved, "Tick complete");
        Ok(self.frame())
    }

    /// Run until the configured tick count is reached or `shutdown`
    /// resolves. Controls are re-read at every tick boundary.
    pub async fn run<F>(
        &mut self,
        controls: &SharedControls,
        sinks: &[Arc<dyn FrameSink>],
        shutdown: F,
    ) -> Result<RunSummary>
    where
        F: Future,
    {
        tokio::pin!(shutdown);
        let start_tick = self.tick;
        let mut stopped_early = false;

        info!(
            trains = self.registry.len(),
            total_ticks = self.total_ticks,
            policy = self.scheduler.policy().name(),
            "Simulation starting"
        );

        while !self.is_finished() {
            let (holds, delay) = {
                let c = controls.read().await;
                (c.holds().clone(), c.tick_delay())
            };

            let frame = self
                .step(&holds)
                .with_context(|| format!("Tick {} failed", self.tick + 1))?;
            publish(sinks, &frame).await;

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    info!(tick = self.tick, "Shutdown signal received.");
                    stopped_early = true;
                    break;
                }
            }
        }

        let summary = RunSummary {
            ticks_run: self.tick - start_tick,
            stopped_early,
            final_frame: self.frame(),
        };
        info!(
            ticks = summary.ticks_run,
            stopped_early,
            "Simulation finished"
        );
        Ok(summary)
    }
}

/// Hand a frame to every sink. A failing sink is logged and skipped.
async fn publish(sinks: &[Arc<dyn FrameSink>], frame: &Frame) {
    for sink in sinks {
        if let Err(e) = sink.present(frame).await {
            warn!(sink = sink.name(), tick = frame.tick, error = %e, "Sink failed to present frame");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
