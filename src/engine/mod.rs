//! Simulation engine — the tick → publish → wait loop.
//!
//! Defines the `FrameSink` trait that renderers implement; the driver
//! pushes one frame per tick to every registered sink.

pub mod controls;
pub mod driver;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Frame;

/// Consumer of rendered frames (terminal, dashboard, test recorders).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Draw or store one frame.
    async fn present(&self, frame: &Frame) -> Result<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
