use core::f32::consts::PI;

use glam::{vec2, Vec2, Vec3};

/// Per-pixel white-noise generator.
///
/// Every pixel of every pass owns its own generator, seeded from the pixel
/// index, frame and frame-level seed (see: [`crate::DiPassParams::wnoise()`]),
/// so that the whole pipeline stays reproducible.
#[derive(Copy, Clone, Debug)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Generates a uniform sample in range `<0.0, 1.0)`.
    pub fn sample(&mut self) -> f32 {
        // Keep the top 24 bits, which is what a f32 mantissa can represent
        // exactly - this guarantees we never return 1.0
        (self.sample_int() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(747796405)
            .wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }

    /// Generates a uniform sample on a circle.
    pub fn sample_circle(&mut self) -> Vec2 {
        let angle = self.sample() * PI * 2.0;

        vec2(angle.cos(), angle.sin())
    }

    /// Generates a uniform sample inside of a disk.
    pub fn sample_disk(&mut self) -> Vec2 {
        let radius = self.sample().sqrt();

        self.sample_circle() * radius
    }

    /// Generates a cosine-weighted sample on a hemisphere around given
    /// normal.
    pub fn sample_hemisphere_cosine(&mut self, normal: Vec3) -> Vec3 {
        let disk = self.sample_disk();
        let z = (1.0 - disk.length_squared()).max(0.0).sqrt();
        let (t, b) = normal.any_orthonormal_pair();

        (t * disk.x + b * disk.y + normal * z).normalize()
    }
}

/// Thomas Wang's integer hash; used to turn sequential seeds (pixel indices,
/// frame numbers) into decorrelated generator states.
pub fn wang_hash(mut seed: u32) -> u32 {
    seed = (seed ^ 61) ^ (seed >> 16);
    seed = seed.wrapping_mul(9);
    seed ^= seed >> 4;
    seed = seed.wrapping_mul(0x27d4eb2d);
    seed ^= seed >> 15;
    seed
}

/// Van der Corput radical inverse in base 2.
pub fn radical_inverse(bits: u32) -> f32 {
    (bits.reverse_bits() >> 8) as f32 / (1u32 << 24) as f32
}

/// Returns the `nth` point of a Hammersley set of `count` points, in the unit
/// square.
///
/// The first coordinate is offset by half a cell so that no point lands on
/// the square's edge (which, mapped onto a disk, would be its center).
pub fn hammersley(nth: u32, count: u32) -> Vec2 {
    vec2((nth as f32 + 0.5) / (count as f32), radical_inverse(nth))
}

/// Maps a point from the unit square onto a disk of given radius.
pub fn square_to_disk(uv: Vec2, radius: f32) -> Vec2 {
    let r = radius * uv.x.sqrt();
    let theta = 2.0 * PI * uv.y;

    vec2(r * theta.cos(), r * theta.sin())
}

/// Rotates `point` by an angle given as `(cos, sin)`.
pub fn rotate(point: Vec2, cos_sin: Vec2) -> Vec2 {
    vec2(
        point.x * cos_sin.x - point.y * cos_sin.y,
        point.x * cos_sin.y + point.y * cos_sin.x,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn samples_are_in_unit_range() {
        let mut wnoise = WhiteNoise::new(1234);

        for _ in 0..100_000 {
            let sample = wnoise.sample();

            assert!(sample >= 0.0 && sample < 1.0, "got {sample}");
        }
    }

    #[test]
    fn samples_are_deterministic() {
        let mut a = WhiteNoise::new(wang_hash(42));
        let mut b = WhiteNoise::new(wang_hash(42));

        for _ in 0..32 {
            assert_eq!(a.sample_int(), b.sample_int());
        }
    }

    #[test]
    fn zero_seed_does_not_get_stuck() {
        let mut wnoise = WhiteNoise::new(0);
        let a = wnoise.sample_int();
        let b = wnoise.sample_int();

        assert_ne!(a, b);
    }

    #[test]
    fn samples_are_roughly_uniform() {
        let mut wnoise = WhiteNoise::new(wang_hash(7));
        let mut mean = 0.0;

        for _ in 0..100_000 {
            mean += wnoise.sample() as f64;
        }

        assert_relative_eq!(0.5, mean / 100_000.0, epsilon = 0.01);
    }

    #[test]
    fn radical_inverse() {
        assert_eq!(0.0, super::radical_inverse(0));
        assert_eq!(0.5, super::radical_inverse(1));
        assert_eq!(0.25, super::radical_inverse(2));
        assert_eq!(0.75, super::radical_inverse(3));
        assert_eq!(0.125, super::radical_inverse(4));
    }

    #[test]
    fn hammersley_stays_inside_disk() {
        for count in 1..16 {
            for nth in 0..count {
                let point = square_to_disk(hammersley(nth, count), 10.0);

                assert!(point.length() <= 10.0 + 1e-4);
                assert!(point.length() > 0.0);
            }
        }
    }

    #[test]
    fn rotate() {
        let point = super::rotate(vec2(1.0, 0.0), vec2(0.0, 1.0));

        assert_relative_eq!(0.0, point.x);
        assert_relative_eq!(1.0, point.y);
    }

    #[test]
    fn cosine_hemisphere_stays_above_surface() {
        let mut wnoise = WhiteNoise::new(wang_hash(3));
        let normal = vec3(0.0, 1.0, 0.0);

        for _ in 0..1000 {
            let dir = wnoise.sample_hemisphere_cosine(normal);

            assert!(dir.dot(normal) >= 0.0);
            assert_relative_eq!(1.0, dir.length(), epsilon = 0.001);
        }
    }
}
