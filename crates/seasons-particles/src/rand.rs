//! Lightweight xorshift32 PRNG and the random-value table sampled by shaders

/// Entries in the random-value table uploaded as a 1D texture
pub const RANDOM_TABLE_SIZE: usize = 1024;

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }

    /// Returns a float in [min, max]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// `count` vec4 values with every component in [-1, 1]
    pub fn random_values(&mut self, count: usize) -> Vec<[f32; 4]> {
        (0..count)
            .map(|_| {
                [
                    self.range(-1.0, 1.0),
                    self.range(-1.0, 1.0),
                    self.range(-1.0, 1.0),
                    self.range(-1.0, 1.0),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn zero_seed_still_produces_values() {
        let mut rng = ParticleRng::new(0);
        let a = rng.next_f32();
        let b = rng.next_f32();
        assert_ne!(a, b);
    }

    #[test]
    fn random_table_is_signed_unit_range() {
        let mut rng = ParticleRng::new(7);
        let table = rng.random_values(RANDOM_TABLE_SIZE);
        assert_eq!(table.len(), RANDOM_TABLE_SIZE);
        assert!(table.iter().flatten().all(|v| (-1.0..=1.0).contains(v)));
        // Both signs show up
        assert!(table.iter().any(|v| v[0] < 0.0));
        assert!(table.iter().any(|v| v[0] > 0.0));
    }
}
