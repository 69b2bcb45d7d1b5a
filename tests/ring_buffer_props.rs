use daq_sampler::data::{RingBuffer, Row};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn ring_buffer_matches_bounded_fifo_model(
        capacity in 1usize..16,
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut evictions = 0u64;

        for op in ops {
            match op {
                Op::Push(value) => {
                    let expected = if model.len() == capacity {
                        evictions += 1;
                        model.pop_front()
                    } else {
                        None
                    };
                    model.push_back(value);
                    prop_assert_eq!(ring.push(value), expected);
                }
                Op::Pop => {
                    prop_assert_eq!(ring.pop(), model.pop_front());
                }
            }

            prop_assert_eq!(ring.len(), model.len());
            prop_assert!(ring.len() <= ring.capacity());
            prop_assert_eq!(ring.is_empty(), model.is_empty());
            prop_assert_eq!(ring.is_full(), model.len() == capacity);
            prop_assert_eq!(ring.peek(), model.front());
            prop_assert_eq!(ring.evicted(), evictions);
        }

        let live: Vec<i32> = ring.iter().copied().collect();
        let expected: Vec<i32> = model.iter().copied().collect();
        prop_assert_eq!(live, expected);
    }

    #[test]
    fn overfilled_buffer_keeps_newest_rows(
        capacity in 1usize..32,
        extra in 0usize..64,
    ) {
        let total = capacity + extra;
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();
        for seq in 0..total {
            ring.push(Row::new([seq as i32, seq as i32]));
        }

        prop_assert_eq!(ring.len(), capacity);
        prop_assert_eq!(ring.evicted(), extra as u64);
        for seq in extra..total {
            let row = ring.pop().unwrap();
            prop_assert_eq!(row.samples(), &[seq as i32, seq as i32]);
        }
        prop_assert_eq!(ring.pop(), None);
    }

    #[test]
    fn pop_on_empty_leaves_buffer_usable(
        capacity in 1usize..8,
        pops in 1usize..10,
        value in any::<i32>(),
    ) {
        let mut ring = RingBuffer::with_capacity(capacity).unwrap();
        for _ in 0..pops {
            prop_assert_eq!(ring.pop(), None);
        }
        prop_assert!(ring.is_empty());

        ring.push(value);
        prop_assert_eq!(ring.pop(), Some(value));
        prop_assert_eq!(ring.pop(), None);
    }
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(RingBuffer::<Row<2>>::with_capacity(0).is_err());
}
