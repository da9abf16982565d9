//! trainsim — station train simulation.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the registry and scheduler, optionally starts the dashboard,
//! and runs the paced tick loop until it completes or Ctrl+C.

use anyhow::Result;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use trainsim::config::AppConfig;
use trainsim::dashboard::{self, routes::DashboardState};
use trainsim::engine::driver::Simulation;
use trainsim::engine::FrameSink;
use trainsim::render::TerminalRenderer;

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = if Path::new(&path).exists() {
        AppConfig::load(&path)?
    } else {
        warn!(path = %path, "Config file not found, using the built-in scenario");
        AppConfig::default()
    };

    info!(
        tracks = ?cfg.simulation.tracks,
        track_length = cfg.simulation.track_length,
        policy = ?cfg.policy.kind,
        trains = cfg.trains.0.len(),
        "trainsim starting up"
    );

    let dashboard_cfg = cfg.dashboard.clone();
    let parts = cfg.into_parts()?;
    let controls = parts.controls.shared();
    let train_ids: Vec<String> = parts.registry.trains().map(|t| t.id().to_string()).collect();

    let clear = std::io::stdout().is_terminal();
    let mut sinks: Vec<Arc<dyn FrameSink>> =
        vec![Arc::new(TerminalRenderer::new(parts.layout.clone(), clear))];

    if dashboard_cfg.enabled {
        let state = Arc::new(DashboardState::new(controls.clone(), train_ids, parts.layout));
        dashboard::spawn_dashboard(state.clone(), dashboard_cfg.port).await?;
        sinks.push(state);
    }

    let mut sim = Simulation::new(parts.registry, parts.scheduler, parts.total_ticks)?;
    let summary = sim.run(&controls, &sinks, tokio::signal::ctrl_c()).await?;

    for train in &summary.final_frame.trains {
        info!(
            train = %train.id,
            track = train.track,
            position = format!("{:.1}", train.position),
            held = train.held,
            "Final position"
        );
    }
    info!(
        ticks = summary.ticks_run,
        stopped_early = summary.stopped_early,
        "trainsim shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so they do
/// not interleave with rendered frames.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trainsim=info"));

    let json_logging = std::env::var("TRAINSIM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
