/*!
 * Vector Clock Laws
 * Property tests for join and the partial order
 */

use proptest::prelude::*;
use racedet::{Epoch, ThreadId, VectorClock};

fn clock_strategy() -> impl Strategy<Value = VectorClock> {
    prop::collection::vec((0u16..32, 1u64..1_000), 0..12)
        .prop_map(|entries| entries.into_iter().map(|(t, c)| (ThreadId(t), c)).collect())
}

fn joined(a: &VectorClock, b: &VectorClock) -> VectorClock {
    let mut out = a.clone();
    out.join(b);
    out
}

proptest! {
    #[test]
    fn join_is_commutative(a in clock_strategy(), b in clock_strategy()) {
        prop_assert_eq!(joined(&a, &b), joined(&b, &a));
    }

    #[test]
    fn join_is_idempotent(a in clock_strategy(), b in clock_strategy()) {
        let ab = joined(&a, &b);
        prop_assert_eq!(joined(&ab, &b), ab.clone());
        prop_assert_eq!(joined(&a, &a), a);
    }

    #[test]
    fn join_is_upper_bound(a in clock_strategy(), b in clock_strategy()) {
        let ab = joined(&a, &b);
        prop_assert!(a.less_or_equal(&ab));
        prop_assert!(b.less_or_equal(&ab));
        prop_assert!(ab.first_uncovered(&ab).is_none());
    }

    #[test]
    fn epoch_covered_by_own_clock(t in 0u16..64, c in 1u64..1_000_000) {
        let tid = ThreadId(t);
        let mut vc = VectorClock::new();
        vc.set(tid, c);
        let epoch = Epoch::new(tid, c);

        prop_assert_eq!(epoch.tid(), tid);
        prop_assert_eq!(epoch.clock(), c);
        prop_assert!(epoch.happens_before(&vc));
        prop_assert!(!Epoch::new(tid, c + 1).happens_before(&vc));
    }
}

#[test]
fn test_concurrent_clocks() {
    let a: VectorClock = [(ThreadId(1), 2)].into_iter().collect();
    let b: VectorClock = [(ThreadId(2), 3)].into_iter().collect();

    assert!(a.concurrent(&b));
    assert!(!a.less_or_equal(&b));
    assert_eq!(b.first_uncovered(&a), Some((ThreadId(2), 3)));
}
