//! Integration test: the full lifecycle against a threaded context.
//!
//! Exercises the real boundary: spawn, start, pause, body replacement
//! mid-run, and shutdown, with events crossing actual channels.

use std::time::{Duration, Instant};

use orrery_core::{BodySpec, TickId, Vec2};
use orrery_engine::{ExecStrategy, RunConfig, Simulation};
use orrery_test_utils::body_cloud;

fn pair() -> Vec<BodySpec> {
    vec![
        BodySpec::new(100.0, Vec2::new(0.0, 0.0), Vec2::ZERO),
        BodySpec::new(100.0, Vec2::new(10_000.0, 0.0), Vec2::ZERO),
    ]
}

fn threaded() -> Simulation {
    Simulation::new(RunConfig {
        strategy: ExecStrategy::Thread,
        tick_rate_hz: None,
        ..Default::default()
    })
    .unwrap()
}

/// Pump until the timeline reaches at least `tick`, with a timeout so
/// a wedged context fails the test instead of hanging it.
fn pump_until(sim: &mut Simulation, tick: u64) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while sim.max_tick().map_or(true, |t| t.0 < tick) {
        sim.pump();
        assert!(Instant::now() < deadline, "no progress before deadline");
        std::thread::yield_now();
    }
}

#[test]
fn start_pause_resume_preserves_the_timeline() {
    let mut sim = threaded();
    sim.create_bodies(pair()).unwrap();
    sim.start().unwrap();
    pump_until(&mut sim, 5);

    sim.stop().unwrap();
    // Absorb in-flight ticks until the stream goes quiet; the context
    // may commit one more tick before it observes the pause.
    loop {
        std::thread::sleep(Duration::from_millis(20));
        if sim.pump() == 0 {
            break;
        }
    }
    let paused_at = sim.max_tick().unwrap();

    std::thread::sleep(Duration::from_millis(50));
    sim.pump();
    assert_eq!(sim.max_tick(), Some(paused_at), "paused context must not tick");

    sim.start().unwrap();
    pump_until(&mut sim, paused_at.0 + 3);
    assert!(sim.max_tick().unwrap() > paused_at);
    assert_eq!(sim.first_tick(), Some(TickId(0)), "history survived the pause");
}

#[test]
fn replacement_mid_run_starts_a_fresh_timeline() {
    let mut sim = threaded();
    sim.create_bodies(pair()).unwrap();
    sim.start().unwrap();
    pump_until(&mut sim, 5);

    let ids = sim.create_bodies(body_cloud(7, 12, 5_000.0, 4.0)).unwrap();
    assert_eq!(ids.len(), 12);

    // The new context re-publishes tick 0; nothing from the old run
    // may reappear ahead of it.
    pump_until(&mut sim, 0);
    assert_eq!(sim.first_tick(), Some(TickId(0)));

    sim.start().unwrap();
    pump_until(&mut sim, 3);
    let snap = sim.snapshot_at(TickId(0)).unwrap();
    assert_eq!(snap.body_count(), 12, "tick 0 carries the replacement roster");
}

#[test]
fn shutdown_joins_and_is_final() {
    let mut sim = threaded();
    sim.create_bodies(pair()).unwrap();
    sim.start().unwrap();
    pump_until(&mut sim, 3);

    let report = sim.shutdown(Duration::from_secs(5)).unwrap();
    assert!(report.joined, "context should exit within the grace period");
    assert!(!sim.is_running());

    // The timeline outlives the context.
    assert!(sim.max_tick().unwrap().0 >= 3);
    sim.snapshot_at(TickId(1)).unwrap();

    // Commands after shutdown fail cleanly.
    assert!(sim.start().is_err());
}
