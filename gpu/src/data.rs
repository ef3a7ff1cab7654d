//! Random operand generation.

use rand::Rng;

/// Generated values are integers in `0..RANDOM_UPPER`.
pub const RANDOM_UPPER: u32 = 10;

/// Fill an array of `count` floats with uniform integers in `[0, 10)`.
pub fn random_array<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<f32> {
    (0..count)
        .map(|_| rng.gen_range(0..RANDOM_UPPER) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Deterministic RNG for reproducible tests
    fn make_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_values_are_small_integers() {
        let mut rng = make_rng();
        let values = random_array(&mut rng, 10_000);

        assert_eq!(values.len(), 10_000);
        for v in &values {
            assert!((0.0..=9.0).contains(v), "out of range: {}", v);
            assert_eq!(v.fract(), 0.0, "not integral: {}", v);
        }
    }

    #[test]
    fn test_empty_array() {
        assert!(random_array(&mut make_rng(), 0).is_empty());
    }

    #[test]
    fn test_arrays_are_independent_draws() {
        let mut rng = make_rng();
        let a = random_array(&mut rng, 64);
        let b = random_array(&mut rng, 64);
        assert_ne!(a, b);
    }
}
