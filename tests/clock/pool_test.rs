/*!
 * Clock Pool Tests
 */

use racedet::clock::{acquire, release};
use racedet::{pool_stats, ExecutionContext, ThreadId};
use std::thread;

#[test]
fn test_released_clocks_come_back_cleared() {
    let mut vc = acquire();
    vc.set(ThreadId(7), 42);
    release(vc);

    let again = acquire();
    assert!(again.is_zero());
    assert_eq!(again.get(ThreadId(7)), 0);
}

#[test]
fn test_context_lifecycle_recycles_clocks() {
    // Warm the pool on this thread
    drop(ExecutionContext::start(1));
    let before = pool_stats();

    for tid in 0..32 {
        drop(ExecutionContext::start(tid));
    }

    let after = pool_stats();
    assert!(after.hits >= before.hits + 32);
}

#[test]
fn test_clocks_cross_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|tid| {
            thread::spawn(move || {
                let mut ctx = ExecutionContext::start(tid);
                ctx.advance();
                ctx.snapshot()
            })
        })
        .collect();

    for (tid, handle) in handles.into_iter().enumerate() {
        let snapshot = handle.join().unwrap();
        assert_eq!(snapshot.get(ThreadId(tid as u16)), 2);
        release(snapshot);
    }
}
