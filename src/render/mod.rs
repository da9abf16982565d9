//! Text renderer.
//!
//! Draws a frame as plain text: a station sign and platform above each
//! track, then the rail with every train on it (engine labelled with the
//! train id, coaches behind it), then a one-line legend per train.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;

use crate::engine::FrameSink;
use crate::scheduler::MotionPolicy;
use crate::types::{Frame, TrackId};

const RAIL: char = '-';
const PLATFORM: char = '#';
const COACH: char = '=';
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Static geometry shared by every frame of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub tracks: Vec<TrackId>,
    pub track_length: f64,
    pub train_length: usize,
    /// `(start, length)` of the platform, when the policy has a station.
    pub station: Option<(f64, f64)>,
}

impl Layout {
    pub fn new(
        tracks: Vec<TrackId>,
        track_length: f64,
        train_length: usize,
        policy: &MotionPolicy,
    ) -> Self {
        let station = match policy {
            MotionPolicy::Station(s) => Some((s.station_start, s.station_length)),
            MotionPolicy::Uniform { .. } => None,
        };
        Self {
            tracks,
            track_length,
            train_length,
            station,
        }
    }

    fn columns(&self) -> usize {
        self.track_length.max(0.0).ceil() as usize + 1
    }

    /// Render one frame to a string.
    pub fn render(&self, frame: &Frame) -> String {
        let cols = self.columns();
        let label_width = self
            .tracks
            .iter()
            .map(|t| t.to_string().len())
            .max()
            .unwrap_or(1);
        let margin = " ".repeat(label_width + 1);
        let mut out = format!("Train Simulation at Time {}\n", frame.tick);

        for &track in &self.tracks {
            if let Some((start, length)) = self.station {
                let (sign, platform) = self.platform_rows(track, start, length, cols);
                out.push_str(&format!("{margin}{}\n", sign.trim_end()));
                out.push_str(&format!("{margin}{}\n", platform.trim_end()));
            }

            let mut rail = vec![RAIL; cols];
            for train in frame.trains.iter().filter(|t| t.track == track) {
                let head = train.position.max(0.0).floor() as usize;
                let body = train
                    .id
                    .chars()
                    .chain(std::iter::repeat(COACH).take(self.train_length));
                for (cell, glyph) in rail.iter_mut().skip(head).zip(body) {
                    *cell = glyph;
                }
            }
            let rail: String = rail.into_iter().collect();
            out.push_str(&format!("{track:>label_width$} {rail}\n"));
        }

        for train in &frame.trains {
            out.push_str(&format!(
                "  {} track {} @ {:.1} [{}] {}{}\n",
                train.id,
                train.track,
                train.position,
                train.priority,
                train.color,
                if train.held { " HOLD" } else { "" },
            ));
        }
        out
    }

    fn platform_rows(&self, track: TrackId, start: f64, length: f64, cols: usize) -> (String, String) {
        let first = start.max(0.0).floor() as usize;
        let last = (start + length).max(0.0).ceil() as usize;
        let mut platform = vec![' '; cols];
        for cell in platform.iter_mut().take(last.min(cols)).skip(first) {
            *cell = PLATFORM;
        }

        let label = format!("Station-{track}");
        let centre = ((start + length / 2.0).max(0.0)) as usize;
        let offset = centre.saturating_sub(label.len() / 2);
        let mut sign = vec![' '; cols];
        for (cell, ch) in sign.iter_mut().skip(offset).zip(label.chars()) {
            *cell = ch;
        }

        (sign.into_iter().collect(), platform.into_iter().collect())
    }
}

/// Writes each frame to stdout.
pub struct TerminalRenderer {
    layout: Layout,
    clear: bool,
}

impl TerminalRenderer {
    /// `clear` redraws in place instead of scrolling.
    pub fn new(layout: Layout, clear: bool) -> Self {
        Self { layout, clear }
    }
}

#[async_trait]
impl FrameSink for TerminalRenderer {
    async fn present(&self, frame: &Frame) -> Result<()> {
        let text = self.layout.render(frame);
        let mut stdout = std::io::stdout().lock();
        if self.clear {
            stdout.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write frame to stdout")
    }

    fn name(&self) -> &str {
        "terminal"
    }
}
