//! Random sampling helpers shared by the shape generators.
//!
//! Every generator that needs randomness takes a `&mut Sampler` instead of
//! reaching for a global RNG, so tests can seed it and get the same cloud
//! twice.
//!
//! ```ignore
//! let mut sampler = Sampler::seeded(7);
//! let p = sampler.on_sphere(80.0);
//! assert!((p.length() - 80.0).abs() < 1e-3);
//! ```

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Source of randomness for shape generation and buffer allocation.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Sampler seeded from the wall clock, different each program execution.
    pub fn from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Deterministic sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random index in `0..n`.
    #[inline]
    pub fn random_index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n.max(1))
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    // ========== Position helpers ==========

    /// Random point on the surface of a sphere of given radius.
    ///
    /// Uses inverse-CDF polar sampling (`phi = acos(2u - 1)`) so points are
    /// uniform over the surface rather than bunched at the poles.
    pub fn on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.random_angle();
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();

        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    }

    /// Random point inside an axis-aligned cube of given half-size.
    pub fn in_cube(&mut self, half_size: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
        )
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_clock()
    }
}

/// Convert HSV to RGB.
///
/// * `h` - 0.0 to 1.0 (wraps)
/// * `s` - 0.0 (gray) to 1.0 (vivid)
/// * `v` - 0.0 (black) to 1.0 (bright)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_sphere_radius() {
        let mut sampler = Sampler::seeded(1);
        for _ in 0..200 {
            let p = sampler.on_sphere(80.0);
            assert!((p.length() - 80.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = Sampler::seeded(99);
        let mut b = Sampler::seeded(99);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut sampler = Sampler::seeded(3);
        assert_eq!(sampler.random_range(2.0, 2.0), 2.0);
        assert_eq!(sampler.random_index(0), 0);
    }

    #[test]
    fn test_in_cube_bounds() {
        let mut sampler = Sampler::seeded(5);
        for _ in 0..100 {
            let p = sampler.in_cube(150.0);
            assert!(p.abs().max_element() <= 150.0);
        }
    }

    #[test]
    fn test_hsv_to_rgb() {
        let red = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((red.x - 1.0).abs() < 0.001);
        assert!(red.y < 0.001);
        assert!(red.z < 0.001);
    }
}
