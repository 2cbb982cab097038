/*!
 * End-to-End Scenarios
 * Lock, race, wait-group and channel flows driven through the public API
 */

use pretty_assertions::assert_eq;
use racedet::{
    AccessKind, CollectingSink, Detector, ExecutionContext, RaceKind, ThreadId,
};
use std::sync::Arc;

fn detector_with_sink() -> (Detector, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let detector = Detector::builder()
        .with_sink(sink.clone())
        .build()
        .expect("default options are valid");
    (detector, sink)
}

const X: usize = 0x7000_0000;
const Y: usize = 0x7000_0008;
const LOCK: usize = 0x7100_0000;
const CHANNEL: usize = 0x7200_0000;
const WAIT_GROUP: usize = 0x7300_0000;

#[test]
fn test_lock_handoff_is_race_free() {
    let (detector, sink) = detector_with_sink();
    let mut t1 = ExecutionContext::start(1);
    let mut t2 = ExecutionContext::start(2);

    detector.on_write(X, &mut t1);
    detector.on_release(LOCK, &mut t1);

    detector.on_acquire(LOCK, &mut t2);
    detector.on_read(X, &mut t2);

    assert_eq!(detector.races_detected(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_unsynchronized_write_then_read() {
    let (detector, sink) = detector_with_sink();
    let mut t1 = ExecutionContext::start(1);
    while t1.own_clock() < 5 {
        t1.advance();
    }
    let mut t2 = ExecutionContext::start(2);

    detector.on_write(X, &mut t1);
    detector.on_read(X, &mut t2);

    assert_eq!(detector.races_detected(), 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.kind, RaceKind::WriteRead);
    assert_eq!(record.current.kind, AccessKind::Read);
    assert_eq!(record.current.thread_id, ThreadId(2));
    assert_eq!(record.previous.kind, AccessKind::Write);
    assert_eq!(record.previous.thread_id, ThreadId(1));
    assert_eq!(record.previous.epoch.clock(), 5);
    assert_eq!((record.key.low, record.key.high), (ThreadId(1), ThreadId(2)));
}

#[test]
fn test_unsynchronized_write_then_read_mirrored() {
    let (detector, sink) = detector_with_sink();
    let mut t1 = ExecutionContext::start(1);
    let mut t2 = ExecutionContext::start(2);
    while t2.own_clock() < 5 {
        t2.advance();
    }

    detector.on_write(X, &mut t2);
    detector.on_read(X, &mut t1);

    assert_eq!(detector.races_detected(), 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.kind, RaceKind::WriteRead);
    assert_eq!(record.current.thread_id, ThreadId(1));
    assert_eq!(record.previous.thread_id, ThreadId(2));
    assert_eq!((record.key.low, record.key.high), (ThreadId(1), ThreadId(2)));
}

#[test]
fn test_write_read_key_matches_across_directions() {
    let (forward, _) = detector_with_sink();
    let mut a = ExecutionContext::start(1);
    let mut b = ExecutionContext::start(2);
    forward.on_write(X, &mut a);
    forward.on_read(X, &mut b);

    let (backward, _) = detector_with_sink();
    let mut a = ExecutionContext::start(1);
    let mut b = ExecutionContext::start(2);
    backward.on_write(X, &mut b);
    backward.on_read(X, &mut a);

    assert_eq!(forward.race_keys(), backward.race_keys());
}

#[test]
fn test_race_key_ignores_access_order() {
    let (first, _) = detector_with_sink();
    let (second, _) = detector_with_sink();

    let mut a = ExecutionContext::start(1);
    let mut b = ExecutionContext::start(2);
    first.on_write(X, &mut a);
    first.on_write(X, &mut b);

    let mut a = ExecutionContext::start(1);
    let mut b = ExecutionContext::start(2);
    second.on_write(X, &mut b);
    second.on_write(X, &mut a);

    assert_eq!(first.race_keys(), second.race_keys());
}

#[test]
fn test_wait_group_joins_workers() {
    let (detector, sink) = detector_with_sink();
    let mut waiter = ExecutionContext::start(0);
    let vars = [0x100usize, 0x200, 0x300];

    detector.on_wait_group_add(WAIT_GROUP, 3, &mut waiter);

    let mut finished = Vec::new();
    for (i, var) in vars.iter().enumerate() {
        let mut worker = waiter.spawn(i as u64 + 1);
        detector.on_write(*var, &mut worker);
        let at_done = worker.own_clock();
        detector.on_wait_group_done(WAIT_GROUP, &mut worker);
        finished.push((worker.tid(), at_done));
    }

    detector.on_wait_group_wait_before(WAIT_GROUP, &waiter);
    detector.on_wait_group_wait_after(WAIT_GROUP, &mut waiter);
    for var in vars {
        detector.on_read(var, &mut waiter);
    }

    assert_eq!(detector.races_detected(), 0);
    assert!(sink.is_empty());
    for (tid, clock) in finished {
        assert!(waiter.clock().get(tid) >= clock);
    }
    assert_eq!(detector.sync_snapshot(WAIT_GROUP).map(|s| s.counter), Some(0));
}

#[test]
fn test_receive_from_closed_channel() {
    let (detector, sink) = detector_with_sink();
    let mut closer = ExecutionContext::start(3);
    let mut receiver = ExecutionContext::start(4);

    detector.on_write(Y, &mut closer);
    detector.on_channel_close(CHANNEL, &mut closer);

    detector.on_channel_recv_before(CHANNEL, &receiver);
    detector.on_channel_recv_after(CHANNEL, &mut receiver);
    detector.on_read(Y, &mut receiver);

    assert_eq!(detector.races_detected(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_receive_without_send_or_close_races() {
    let (detector, sink) = detector_with_sink();
    let mut writer = ExecutionContext::start(3);
    let mut receiver = ExecutionContext::start(4);

    detector.on_write(Y, &mut writer);
    detector.on_channel_recv_after(CHANNEL, &mut receiver);
    detector.on_read(Y, &mut receiver);

    assert_eq!(sink.len(), 1);
}

#[test]
fn test_join_thread_orders_child_writes() {
    let (detector, sink) = detector_with_sink();
    let mut parent = ExecutionContext::start(0);
    let mut child = parent.spawn(1);

    detector.on_write(X, &mut child);
    parent.join_thread(child);
    detector.on_write(X, &mut parent);

    assert!(sink.is_empty());
}
