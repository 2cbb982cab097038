/*!
 * Detector Properties
 * Dedup, happens-before chains, read-state round trips and sampling rates
 */

use pretty_assertions::assert_eq;
use racedet::{
    CollectingSink, Detector, DetectorOptions, ExecutionContext, ReadStateKind, Sampler,
};
use std::sync::Arc;

fn detector_with_sink(options: DetectorOptions) -> (Detector, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let detector = Detector::builder()
        .with_options(options)
        .with_sink(sink.clone())
        .build()
        .expect("valid options");
    (detector, sink)
}

#[test]
fn test_repeated_conflict_counted_once() {
    for repeats in [2usize, 5, 50] {
        let (detector, sink) = detector_with_sink(DetectorOptions::default());
        let mut a = ExecutionContext::start(1);
        let mut b = ExecutionContext::start(2);

        for _ in 0..repeats {
            detector.on_write(0x40, &mut a);
            detector.on_write(0x40, &mut b);
        }

        assert_eq!(detector.races_detected(), 1, "repeats = {repeats}");
        assert_eq!(sink.len(), 1);
    }
}

#[test]
fn test_same_epoch_never_races() {
    let (detector, sink) =
        detector_with_sink(DetectorOptions::default().with_advance_on_access(false));
    let mut ctx = ExecutionContext::start(1);

    for _ in 0..10 {
        detector.on_write(0x40, &mut ctx);
        detector.on_read(0x40, &mut ctx);
    }

    assert!(sink.is_empty());
}

#[test]
fn test_release_acquire_chain() {
    for depth in 2u64..8 {
        let (detector, sink) = detector_with_sink(DetectorOptions::default());
        let lock = 0x1000;
        let var = 0x2000;

        let mut ctx = ExecutionContext::start(1);
        detector.on_write(var, &mut ctx);
        detector.on_release(lock, &mut ctx);

        for tid in 2..=depth {
            let mut next = ExecutionContext::start(tid);
            detector.on_acquire(lock, &mut next);
            detector.on_release(lock, &mut next);
            ctx = next;
        }

        detector.on_acquire(lock, &mut ctx);
        detector.on_read(var, &mut ctx);

        assert_eq!(detector.races_detected(), 0, "depth = {depth}");
        assert!(sink.is_empty());
    }
}

#[test]
fn test_promotion_round_trip() {
    let (detector, sink) = detector_with_sink(DetectorOptions::default());
    let var = 0x3000;

    let mut main = ExecutionContext::start(0);
    detector.on_write(var, &mut main);
    let mut r1 = main.spawn(1);
    let mut r2 = main.spawn(2);

    detector.on_read(var, &mut r1);
    detector.on_read(var, &mut r2);
    let shared = detector.location_snapshot(var).expect("cell exists");
    assert_eq!(shared.read_state, ReadStateKind::Shared);
    assert_eq!(detector.promotion_stats().promoted_cells, 1);

    // Writer that has seen both reads
    let lock = 0x3100;
    detector.on_release(lock, &mut r1);
    detector.on_release_merge(lock, &mut r2);
    detector.on_acquire(lock, &mut r1);
    detector.on_write(var, &mut r1);

    let demoted = detector.location_snapshot(var).expect("cell exists");
    assert_eq!(demoted.read_state, ReadStateKind::Empty);
    assert_eq!(demoted.demotions, 1);
    assert_eq!(detector.promotion_stats().promoted_cells, 0);

    let fast_before = detector.promotion_stats().fast_path_reads;
    detector.on_read(var, &mut r1);
    let after = detector.location_snapshot(var).expect("cell exists");
    assert_eq!(after.read_state, ReadStateKind::Single);
    assert_eq!(detector.promotion_stats().fast_path_reads, fast_before + 1);

    assert!(sink.is_empty());
}

#[test]
fn test_rwlock_writer_sees_all_readers() {
    let (detector, sink) = detector_with_sink(DetectorOptions::default());
    let lock = 0x4000;
    let var = 0x4100;

    let mut released = Vec::new();
    for tid in 1..=6u64 {
        let mut reader = ExecutionContext::start(tid);
        detector.on_acquire(lock, &mut reader);
        detector.on_read(var, &mut reader);
        let at_release = reader.own_clock();
        detector.on_release_merge(lock, &mut reader);
        released.push((reader.tid(), at_release));
    }

    let mut writer = ExecutionContext::start(99);
    detector.on_acquire(lock, &mut writer);
    for (tid, clock) in &released {
        assert!(writer.clock().get(*tid) >= *clock);
    }
    detector.on_write(var, &mut writer);

    assert!(sink.is_empty());
}

#[test]
fn test_sampling_fraction_tracks_rate() {
    for rate in [2u64, 10, 100] {
        let sampler = Sampler::new(rate);
        let trials = 10_000;
        for _ in 0..trials {
            sampler.should_sample();
        }

        let stats = sampler.stats();
        let expected = 1.0 / rate as f64;
        assert_eq!(stats.total, trials);
        assert!(
            (stats.sampled_fraction() - expected).abs() < 0.01,
            "rate {rate}: {}",
            stats.sampled_fraction()
        );
    }
}

#[test]
fn test_full_rate_and_disabled_sample_everything() {
    for sampler in [Sampler::new(1), Sampler::disabled()] {
        assert!((0..10_000).all(|_| sampler.should_sample()));
        assert_eq!(sampler.expected_detection_rate(1), 1.0);
    }
}
