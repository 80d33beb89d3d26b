use activity_ring::{RING_SIZE, Ring};

#[test]
fn test_default_ring_is_empty() {
    let ring = Ring::<RING_SIZE>::default();
    assert!(ring.is_empty());
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.start(), 0);
    assert_eq!(ring.capacity(), 100);
    assert_eq!(ring.slots().count(), 0);
}

#[test]
fn test_advance_fills_slots_in_order() {
    let mut ring = Ring::<4>::default();
    for expected in 0..4 {
        let (next, idx) = ring.advance();
        assert_eq!(idx, expected);
        assert_eq!(next.start(), 0);
        assert_eq!(next.len(), expected + 1);
        ring = next;
    }
    assert_eq!(ring.len(), ring.capacity());
}

#[test]
fn test_advance_when_full_evicts_oldest() {
    let mut ring = Ring::<3>::default();
    for _ in 0..3 {
        ring = ring.advance().0;
    }

    let (ring, idx) = ring.advance();
    assert_eq!(idx, 0);
    assert_eq!(ring.start(), 1);
    assert_eq!(ring.len(), 3);

    let (ring, idx) = ring.advance();
    assert_eq!(idx, 1);
    assert_eq!(ring.start(), 2);

    let (ring, idx) = ring.advance();
    assert_eq!(idx, 2);
    assert_eq!(ring.start(), 0);
    assert_eq!(ring.len(), 3);
}

#[test]
fn test_newest_is_always_last_slot() {
    let mut ring = Ring::<5>::default();
    for _ in 0..23 {
        let (next, idx) = ring.advance();
        assert_eq!(next.at(next.len() - 1), idx);
        ring = next;
    }
}

#[test]
fn test_at_wraps_around() {
    let ring = Ring::<4>::from_parts(3, 4).unwrap();
    let slots: Vec<usize> = ring.slots().collect();
    assert_eq!(slots, vec![3, 0, 1, 2]);
    assert_eq!(ring.at(1), 0);
}

#[test]
fn test_from_parts_rejects_out_of_range() {
    assert!(Ring::<4>::from_parts(0, 5).is_none());
    assert!(Ring::<4>::from_parts(4, 1).is_none());
    assert!(Ring::<4>::from_parts(3, 4).is_some());
    assert_eq!(Ring::<4>::from_parts(0, 0), Some(Ring::default()));
}

#[test]
fn test_capacity_one() {
    let ring = Ring::<1>::default();
    let (ring, idx) = ring.advance();
    assert_eq!((idx, ring.start(), ring.len()), (0, 0, 1));
    let (ring, idx) = ring.advance();
    assert_eq!((idx, ring.start(), ring.len()), (0, 0, 1));
}
