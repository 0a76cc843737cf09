use ai_core::{DeterministicRng, SplitMix64};

#[test]
fn same_seed_same_stream() {
    let mut a = SplitMix64::new(42);
    let mut b = SplitMix64::new(42);
    for _ in 0..64 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn unit_floats_stay_in_half_open_range() {
    let mut rng = SplitMix64::new(7);
    for _ in 0..10_000 {
        let x = rng.next_f32_unit();
        assert!((0.0..1.0).contains(&x), "{x} escaped [0, 1)");
    }
}

#[test]
fn next_index_stays_in_bounds_through_a_box() {
    let mut rng: Box<dyn DeterministicRng> = Box::new(SplitMix64::new(3));
    for len in 1..16 {
        assert!(rng.next_index(len) < len);
    }
}
