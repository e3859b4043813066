//! Property tests: the two pool strategies are interchangeable under an
//! exact quantum, and the bucket pool's active-slot heap stays bounded.

use proptest::prelude::*;
use qkernel::{Event, EventIdGen, EventPool, HashedBucketPool, OrderedPool, Quantum, SimTime};

const END: u64 = 200;

#[derive(Clone, Debug)]
enum Op {
    /// Insert at `current + offset`; may land past the end.
    Add(u64),
    /// Insert `back` ticks before the clock; always rejected.
    AddPast(u64),
    Next,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..40).prop_map(Op::Add),
        1 => (1u64..5).prop_map(Op::AddPast),
        3 => Just(Op::Next),
    ]
}

type Fired = Option<(u64, u64)>;

fn fired(event: Option<Event<u64>>) -> Fired {
    event.map(|e| (e.at.ticks(), e.payload))
}

proptest! {
    #[test]
    fn prop_strategies_agree(
        start in 0u64..20,
        ops in prop::collection::vec(op_strategy(), 0..400),
    ) {
        let (ts, te) = (SimTime::new(start), SimTime::new(END));
        let mut ordered: OrderedPool<u64> = OrderedPool::new(ts, te).unwrap();
        let mut hashed: HashedBucketPool<u64> =
            HashedBucketPool::with_quantum(ts, te, Quantum::EXACT).unwrap();
        let mut ids = EventIdGen::new();
        let mut last: Option<u64> = None;

        for op in ops {
            let now = ordered.current_time().ticks();
            prop_assert_eq!(now, hashed.current_time().ticks());

            match op {
                Op::Add(offset) => {
                    let at = SimTime::new(now + offset);
                    let id = ids.next_id();
                    let a = ordered.add_event(Event::new(id, at, id.raw()));
                    let b = hashed.add_event(Event::new(id, at, id.raw()));
                    prop_assert_eq!(a, b);
                    prop_assert_eq!(a, at.ticks() <= END);
                }
                Op::AddPast(back) => {
                    let Some(before) = now.checked_sub(back) else { continue };
                    let id = ids.next_id();
                    let len = ordered.len();
                    prop_assert!(!ordered.add_event(Event::new(id, SimTime::new(before), 0)));
                    prop_assert!(!hashed.add_event(Event::new(id, SimTime::new(before), 0)));
                    prop_assert_eq!(ordered.len(), len);
                    prop_assert_eq!(hashed.len(), len);
                }
                Op::Next => {
                    let a = fired(ordered.next_event());
                    let b = fired(hashed.next_event());
                    prop_assert_eq!(a, b);
                    match a {
                        Some((at, _)) => {
                            prop_assert!(last.map_or(true, |prev| prev <= at));
                            prop_assert_eq!(ordered.current_time().ticks(), at);
                            last = Some(at);
                        }
                        None => {
                            prop_assert_eq!(ordered.current_time().ticks(), END);
                        }
                    }
                    prop_assert_eq!(hashed.current_time(), ordered.current_time());
                }
            }
            prop_assert_eq!(ordered.len(), hashed.len());
            prop_assert!(hashed.active_slot_count() <= hashed.bucket_count() + 1);
        }

        // Drain the rest in lockstep.
        loop {
            let a = fired(ordered.next_event());
            let b = fired(hashed.next_event());
            prop_assert_eq!(a, b);
            prop_assert!(hashed.active_slot_count() <= hashed.bucket_count() + 1);
            if a.is_none() {
                break;
            }
        }
        prop_assert_eq!(hashed.current_time(), SimTime::new(END));
        prop_assert_eq!(hashed.active_slot_count(), 0);
        prop_assert_eq!(hashed.bucket_count(), 0);
    }

    #[test]
    fn prop_coarse_quantum_orders_by_slot(
        quantum in 1u64..16,
        times in prop::collection::vec(0u64..500, 1..200),
    ) {
        let q = Quantum::new(quantum).unwrap();
        let mut pool: HashedBucketPool<usize> =
            HashedBucketPool::with_quantum(SimTime::ZERO, SimTime::new(500), q).unwrap();
        let mut ids = EventIdGen::new();
        for (i, at) in times.iter().enumerate() {
            prop_assert!(pool.add_event(Event::new(ids.next_id(), SimTime::new(*at), i)));
        }

        let mut prev: Option<(u64, usize)> = None;
        while let Some(e) = pool.next_event() {
            // (slot, insertion index) strictly increases.
            let key = (e.at.time_slot(q), e.payload);
            prop_assert!(prev.map_or(true, |p| p < key));
            prop_assert_eq!(pool.current_time(), e.at);
            prev = Some(key);
        }
        prop_assert_eq!(pool.current_time(), SimTime::new(500));
        prop_assert_eq!(pool.len(), 0);
    }
}
