use rand_core::Rng;

/// uniform sample in `[0, 1)`.
pub(crate) fn unit<R: Rng>(rng: &mut R) -> f64 {
    let bits = rng.next_u64();
    (bits as f64) * (1.0 / (u64::MAX as f64 + 1.0))
}

/// uniform sample in `[low, high)`.
pub(crate) fn uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * unit(rng)
}

/// uniform integer in `low..=high`.
pub(crate) fn integer<R: Rng>(rng: &mut R, low: u64, high: u64) -> u64 {
    debug_assert!(low <= high);
    match (high - low).checked_add(1) {
        Some(span) => low + rng.next_u64() % span,
        // the whole u64 range
        None => rng.next_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;

    #[test]
    fn bounds() {
        let mut rng = ChaChaRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let u = unit(&mut rng);
            assert!((0.0..1.0).contains(&u));
            let x = uniform(&mut rng, 5.0, 10.0);
            assert!((5.0..10.0).contains(&x));
            let i = integer(&mut rng, 1, 5);
            assert!((1..=5).contains(&i));
        }
    }

    #[test]
    fn integer_full_range() {
        let mut rng = ChaChaRng::seed_from_u64(42);
        for _ in 0..100 {
            integer(&mut rng, 0, u64::MAX);
            let i = integer(&mut rng, u64::MAX, u64::MAX);
            assert_eq!(i, u64::MAX);
            assert!(integer(&mut rng, 1, u64::MAX) >= 1);
        }
    }
}
