mod common;

use std::time::Duration;

use common::{wait_until, MockEngine, Script};
use renderq_engine::{EngineError, ProgressSampler};

#[test]
fn pixel_count_is_resolved_once_it_is_non_zero() {
    let engine = MockEngine::new().script(
        "scene.lxs",
        Script {
            resolution_after: 1,
            ..Script::default()
        },
    );
    let sampler = ProgressSampler::new(engine.context("scene.lxs"));

    let first = sampler.kick().unwrap();
    assert_eq!(first.pixels, 0);
    assert_eq!(first.status_line(), None);

    let second = sampler.kick().unwrap();
    assert_eq!(second.pixels, 50);
    assert!(second.status_line().is_some());

    sampler.kick().unwrap();
    // Two pairs of width/height reads, none after the count was known.
    assert_eq!(engine.calls().resolution_reads, 4);
    assert_eq!(sampler.pixels(), 50);
}

#[test]
fn network_samples_are_only_read_with_connected_servers() {
    let local = MockEngine::new();
    let sampler = ProgressSampler::new(local.context("scene.lxs"));
    let snapshot = sampler.kick().unwrap();
    assert_eq!(snapshot.network, None);
    assert_eq!(local.calls().network_reads, 0);
    assert!(!snapshot.status_line().unwrap().contains("[Net"));

    let networked = MockEngine::new().script(
        "scene.lxs",
        Script {
            servers: 2,
            ..Script::default()
        },
    );
    let sampler = ProgressSampler::new(networked.context("scene.lxs"));
    let snapshot = sampler.kick().unwrap();
    assert_eq!(networked.calls().network_reads, 1);
    let line = snapshot.status_line().unwrap();
    assert!(line.contains("[Net (2): 10.00 S/Px"), "{line}");
}

#[test]
fn seeded_resolution_skips_the_engine_query() {
    let engine = MockEngine::new();
    let sampler = ProgressSampler::new(engine.context("scene.lxs"));
    sampler.seed_resolution(4.0, 3.0);

    let snapshot = sampler.poke().unwrap();
    assert_eq!(snapshot.pixels, 12);
    assert_eq!(engine.calls().resolution_reads, 0);
}

#[test]
fn background_task_refreshes_the_snapshot() {
    let engine = MockEngine::new();
    let mut sampler = ProgressSampler::with_timing(
        engine.context("scene.lxs"),
        Duration::from_millis(1),
        Duration::ZERO,
    );
    assert_eq!(sampler.last_snapshot(), None);

    sampler.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || sampler
        .last_snapshot()
        .is_some()));
    sampler.finish().unwrap();
}

#[test]
fn background_failure_is_returned_when_finishing() {
    let engine = MockEngine::new().script(
        "scene.lxs",
        Script {
            fail_elapsed: true,
            ..Script::default()
        },
    );
    let mut sampler = ProgressSampler::with_timing(
        engine.context("scene.lxs"),
        Duration::from_millis(1),
        Duration::ZERO,
    );
    sampler.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let err = sampler.finish().unwrap_err();
    assert!(matches!(err, EngineError::StatisticUnavailable("secElapsed")));
}
