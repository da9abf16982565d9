//! End-to-end simulation runs.
//!
//! Builds simulations from TOML and checks the motion rules over whole
//! runs: bounds, track immutability, hold freeze, the edge pause before
//! wrap, and station slowdown.

use std::collections::HashMap;
use std::sync::Arc;

use trainsim::config::AppConfig;
use trainsim::engine::driver::Simulation;
use trainsim::engine::FrameSink;
use trainsim::types::Frame;

use crate::recording_sink::RecordingSink;

const THREE_TRACKS_UNIFORM: &str = r#"
[simulation]
tracks = [1, 2, 3]
track_length = 30
total_ticks = 31
tick_delay_ms = 100

[policy]
kind = "uniform"

[[trains]]
id = "T1"
position = 0
track = 1
priority = "High"
color = "royalblue"

[[trains]]
id = "T2"
position = 6
track = 2
priority = "Medium"
color = "seagreen"

[[trains]]
id = "T3"
position = 12
track = 3
priority = "Low"
color = "firebrick"
"#;

fn build(toml: &str) -> (Simulation, trainsim::engine::controls::SharedControls) {
    let parts = AppConfig::parse(toml).unwrap().into_parts().unwrap();
    let controls = parts.controls.shared();
    let sim = Simulation::new(parts.registry, parts.scheduler, parts.total_ticks).unwrap();
    (sim, controls)
}

fn position(frame: &Frame, id: &str) -> f64 {
    frame.train(id).unwrap().position
}

#[test]
fn test_three_train_uniform_scenario() {
    let (mut sim, _) = build(THREE_TRACKS_UNIFORM);
    let none = HashMap::new();
    let mut frames = Vec::new();
    while !sim.is_finished() {
        frames.push(sim.step(&none).unwrap());
    }
    assert_eq!(frames.len(), 31);

    // Tick 30: T1 sits exactly on the end of the track.
    let tick30 = &frames[29];
    assert_eq!(tick30.tick, 30);
    assert_eq!(position(tick30, "T1"), 30.0);
    // T2 reached 30 at tick 24, wrapped at 25, then moved 5 more.
    assert_eq!(position(tick30, "T2"), 5.0);
    // T3 reached 30 at tick 18, wrapped at 19, then moved 11 more.
    assert_eq!(position(tick30, "T3"), 11.0);

    // Tick 31: T1 wraps.
    assert_eq!(position(&frames[30], "T1"), 0.0);
}

#[test]
fn test_bounds_and_track_immutability() {
    let (mut sim, _) = build("[simulation]\ntotal_ticks = 400\n");
    let tracks: HashMap<String, u32> = sim
        .frame()
        .trains
        .into_iter()
        .map(|t| (t.id, t.track))
        .collect();
    let length = sim.scheduler().track_length();
    let none = HashMap::new();

    while !sim.is_finished() {
        let frame = sim.step(&none).unwrap();
        for t in &frame.trains {
            assert!(
                (0.0..=length).contains(&t.position),
                "tick {}: {} at {}",
                frame.tick,
                t.id,
                t.position
            );
            assert_eq!(tracks[&t.id], t.track);
        }
    }
}

#[test]
fn test_hold_freezes_exactly() {
    let (mut sim, _) = build("");
    let free = HashMap::new();
    for _ in 0..7 {
        sim.step(&free).unwrap();
    }
    let before = position(&sim.frame(), "T3");

    let hold = HashMap::from([("T3".to_string(), true)]);
    for _ in 0..20 {
        let frame = sim.step(&hold).unwrap();
        assert_eq!(position(&frame, "T3"), before);
    }

    let release = HashMap::from([("T3".to_string(), false)]);
    let frame = sim.step(&release).unwrap();
    assert_ne!(position(&frame, "T3"), before);
}

#[test]
fn test_station_slowdown_over_a_lap() {
    // Default scenario: station 15/8, zone [13, 23].
    let (mut sim, _) = build("[simulation]\ntotal_ticks = 200\n");
    let none = HashMap::new();
    let mut prev = sim.frame();
    while !sim.is_finished() {
        let frame = sim.step(&none).unwrap();
        for t in &frame.trains {
            let from = position(&prev, &t.id);
            if t.position == 0.0 && from > 0.0 {
                continue;
            }
            let moved = t.position - from;
            let expected = if (13.0..=23.0).contains(&from) { 0.3 } else { 1.0 };
            assert!(
                (moved - expected).abs() < 1e-9,
                "{} moved {moved} from {from}",
                t.id
            );
        }
        prev = frame;
    }
}

#[tokio::test(start_paused = true)]
async fn test_paced_run_records_every_frame() {
    let (mut sim, controls) = build(THREE_TRACKS_UNIFORM);
    let sink = Arc::new(RecordingSink::new());
    let sinks: Vec<Arc<dyn FrameSink>> = vec![sink.clone()];

    controls.write().await.set_hold("T2", true);
    let summary = sim
        .run(&controls, &sinks, std::future::pending::<()>())
        .await
        .unwrap();

    let frames = sink.frames();
    assert_eq!(frames.len(), 31);
    assert_eq!(summary.ticks_run, 31);
    assert!(frames.iter().all(|f| position(f, "T2") == 6.0));
    let ticks: Vec<u64> = frames.iter().map(|f| f.tick).collect();
    assert_eq!(ticks, (1..=31).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_failing_sink_does_not_stop_others() {
    let (mut sim, controls) = build(THREE_TRACKS_UNIFORM);
    let broken = Arc::new(RecordingSink::failing_from(3));
    let healthy = Arc::new(RecordingSink::new());
    let sinks: Vec<Arc<dyn FrameSink>> = vec![broken.clone(), healthy.clone()];

    sim.run(&controls, &sinks, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(broken.frames().len(), 2);
    assert_eq!(healthy.frames().len(), 31);
}

#[test]
fn test_inverted_station_is_rejected() {
    let result = AppConfig::parse("[policy]\nstation_start = 15\nstation_length = -20\n")
        .unwrap()
        .into_parts();
    assert!(result.is_err());
}

#[test]
fn test_train_past_track_end_is_rejected() {
    let parts = AppConfig::parse(
        "[simulation]\ntracks = [1]\ntrack_length = 10\n\n[[trains]]\nid = \"X\"\nposition = 11\ntrack = 1\npriority = \"Low\"\ncolor = \"gray\"\n",
    )
    .unwrap()
    .into_parts()
    .unwrap();
    assert!(Simulation::new(parts.registry, parts.scheduler, parts.total_ticks).is_err());
}
