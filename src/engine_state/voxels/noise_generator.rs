//! # Gradient Noise
//!
//! Deterministic 3D gradient noise, the single source of procedural variation
//! in the world. The permutation table is shuffled once from the seed and
//! duplicated so lattice lookups never wrap.
//!
//! [`NoiseGenerator`] implements [`NoiseFn`], so it can stand in anywhere a
//! `noise::Perlin` would be sampled.

use noise::NoiseFn;

const TABLE_SIZE: usize = 256;

/// Seeded, immutable 3D gradient noise.
///
/// Two generators built from the same seed return identical values for
/// identical inputs, on any thread, forever.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseGenerator {
    seed: u64,
    permutation: [u8; TABLE_SIZE * 2],
}

impl NoiseGenerator {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u64) -> Self {
        let mut table: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        fastrand::Rng::with_seed(seed).shuffle(&mut table);

        let permutation = std::array::from_fn(|i| table[i % TABLE_SIZE]);

        NoiseGenerator { seed, permutation }
    }

    /// The seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples the noise field.
    ///
    /// # Returns
    /// A value in `[-1, 1]` for finite input. Non-finite input yields NaN,
    /// which callers treat as a generation failure.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x_floor, y_floor, z_floor) = (x.floor(), y.floor(), z.floor());

        let xi = lattice_index(x_floor);
        let yi = lattice_index(y_floor);
        let zi = lattice_index(z_floor);

        let x = x - x_floor;
        let y = y - y_floor;
        let z = z - z_floor;

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.permutation;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let value = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(u, grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );

        value.clamp(-1.0, 1.0)
    }
}

impl NoiseFn<f64, 3> for NoiseGenerator {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.noise(point[0], point[1], point[2])
    }
}

/// Wraps a floored coordinate into the permutation table.
fn lattice_index(floored: f64) -> usize {
    (floored as i64 & (TABLE_SIZE as i64 - 1)) as usize
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of twelve edge gradients picked by `hash`.
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> impl Iterator<Item = (f64, f64, f64)> {
        (0..200).map(|i| {
            let t = i as f64;
            (t * 0.37 - 30.0, t * 0.11, 50.0 - t * 0.53)
        })
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = NoiseGenerator::new(1234);
        let b = NoiseGenerator::new(1234);
        for (x, y, z) in sample_points() {
            assert_eq!(a.noise(x, y, z).to_bits(), b.noise(x, y, z).to_bits());
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseGenerator::new(1);
        let b = NoiseGenerator::new(2);
        assert!(sample_points().any(|(x, y, z)| a.noise(x, y, z) != b.noise(x, y, z)));
    }

    #[test]
    fn test_output_in_range() {
        let generator = NoiseGenerator::new(99);
        for (x, y, z) in sample_points() {
            let value = generator.noise(x, y, z);
            assert!((-1.0..=1.0).contains(&value), "{value} at ({x}, {y}, {z})");
        }
    }

    #[test]
    fn test_zero_on_lattice_points() {
        let generator = NoiseGenerator::new(7);
        for x in -3..3 {
            for z in -3..3 {
                assert_eq!(generator.noise(x as f64, 0.0, z as f64), 0.0);
            }
        }
    }

    #[test]
    fn test_continuity() {
        let generator = NoiseGenerator::new(5);
        for (x, y, z) in sample_points() {
            let here = generator.noise(x, y, z);
            let nearby = generator.noise(x + 1e-4, y, z + 1e-4);
            assert!((here - nearby).abs() < 1e-2);
        }
    }

    #[test]
    fn test_not_constant() {
        let generator = NoiseGenerator::new(11);
        assert!(sample_points().any(|(x, y, z)| generator.noise(x, y, z).abs() > 0.05));
    }

    #[test]
    fn test_non_finite_input_is_nan() {
        let generator = NoiseGenerator::new(0);
        assert!(generator.noise(f64::NAN, 0.0, 0.0).is_nan());
        assert!(generator.noise(f64::INFINITY, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_noise_fn_matches_noise() {
        let generator = NoiseGenerator::new(3);
        assert_eq!(generator.get([1.5, 0.25, -7.75]), generator.noise(1.5, 0.25, -7.75));
    }
}
