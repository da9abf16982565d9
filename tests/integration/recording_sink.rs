//! Recording sink for integration testing.
//!
//! Stores every presented frame in memory so tests can inspect the
//! whole run after the driver returns.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use trainsim::engine::FrameSink;
use trainsim::types::Frame;

pub struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
    /// If set, `present` fails from this tick on.
    fail_from: Option<u64>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            fail_from: None,
        }
    }

    pub fn failing_from(tick: u64) -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            fail_from: Some(tick),
        }
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn present(&self, frame: &Frame) -> Result<()> {
        if self.fail_from.is_some_and(|t| frame.tick >= t) {
            return Err(anyhow!("recording sink closed at tick {}", frame.tick));
        }
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
