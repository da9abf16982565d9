//! Integration tests: full runs through the public API.

mod recording_sink;
mod simulation;
