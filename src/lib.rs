//! trainsim — station train simulation.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod registry;
pub mod scheduler;
pub mod engine;
pub mod render;
pub mod dashboard;
