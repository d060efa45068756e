use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec3};

use crate::{
    F32Ext, LightId, Ray, Scene, Surface, Vec3Ext, WhiteNoise, ENVMAP_DISTANCE,
    SHADING_POINT_OFFSET,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DiSample {
    pub light_id: LightId,

    /// See: `Self::FLAG_*`
    pub flags: u32,

    /// Point on the light or, for environment samples, direction towards the
    /// environment
    pub light_point: Vec3,

    /// Target function of this sample, as evaluated at the surface of the
    /// reservoir it currently lives in
    pub target_function: f32,
}

impl DiSample {
    /// Sample comes from the environment map; `light_point` is a direction.
    pub const FLAG_ENVMAP: u32 = 1 << 0;

    /// Sample has been found through a refraction, i.e. it lies behind the
    /// surface.
    pub const FLAG_BSDF_REFRACTION: u32 = 1 << 1;

    pub fn is_envmap(&self) -> bool {
        self.flags & Self::FLAG_ENVMAP != 0
    }

    pub fn is_refraction(&self) -> bool {
        self.flags & Self::FLAG_BSDF_REFRACTION != 0
    }

    /// Returns normalized direction from `point` towards this sample and the
    /// distance to it (infinite for environment samples).
    pub fn dir_and_distance(&self, point: Vec3) -> (Vec3, f32) {
        if self.is_envmap() {
            (self.light_point, f32::INFINITY)
        } else {
            (self.light_point - point).normalize_and_length()
        }
    }

    /// Returns the shadow ray connecting `point` with this sample.
    pub fn shadow_ray(&self, point: Vec3) -> Ray {
        if self.is_envmap() {
            Ray::new(point, self.light_point).with_len(ENVMAP_DISTANCE)
        } else {
            let (dir, distance) = self.dir_and_distance(point);

            Ray::new(point, dir)
                .with_len((distance - SHADING_POINT_OFFSET).max(0.0))
        }
    }

    pub fn is_occluded(&self, scene: &impl Scene, point: Vec3) -> bool {
        scene.is_occluded(self.shadow_ray(point))
    }

    /// Returns the jacobian determinant of the reconnection shift moving
    /// this sample from a surface at `from` onto a surface at `to`.
    ///
    /// Returns `None` when the shift is too extreme to be reused, as
    /// determined by `threshold`.
    pub fn jacobian(
        &self,
        scene: &impl Scene,
        from: Vec3,
        to: Vec3,
        threshold: f32,
    ) -> Option<f32> {
        if self.is_envmap() {
            return Some(1.0);
        }

        let light_normal = scene.light_at(self.light_id, self.light_point).normal;

        let (from_dir, from_distance) =
            (from - self.light_point).normalize_and_length();

        let (to_dir, to_distance) = (to - self.light_point).normalize_and_length();

        let cos_from = light_normal.dot(from_dir).abs();
        let cos_to = light_normal.dot(to_dir).abs();

        let jacobian =
            (cos_to * from_distance.sqr()) / (cos_from * to_distance.sqr());

        if !jacobian.is_finite()
            || jacobian <= 0.0
            || jacobian > threshold
            || jacobian < 1.0 / threshold
        {
            None
        } else {
            Some(jacobian)
        }
    }
}

/// Weighted-reservoir-sampling state of a single pixel.
///
/// Each pass starts with an empty (default) reservoir, streams candidates
/// and other reservoirs into it, and finishes it by computing the
/// unbiased contribution weight through [`Self::end()`] or
/// [`Self::end_with_normalization()`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DiReservoir {
    pub sample: DiSample,

    /// Confidence, i.e. number of candidates this reservoir represents
    pub m: u32,

    pub weight_sum: f32,

    /// Unbiased contribution weight
    pub ucw: f32,
}

impl DiReservoir {
    /// Streams a freshly generated candidate into this reservoir; returns
    /// whether the candidate has been selected.
    pub fn add_one_candidate(
        &mut self,
        sample: DiSample,
        weight: f32,
        wnoise: &mut WhiteNoise,
    ) -> bool {
        let weight = weight.or_zero();

        self.m = self.m.saturating_add(1);
        self.weight_sum += weight;

        if wnoise.sample() * self.weight_sum < weight {
            self.sample = sample;
            true
        } else {
            false
        }
    }

    /// Streams another (already finished) reservoir into this one; returns
    /// whether the other reservoir's sample has been selected.
    ///
    /// `target_function` is the other sample's target function evaluated at
    /// this reservoir's surface, `jacobian` is the determinant of the shift
    /// mapping the other sample onto this surface.
    pub fn combine_with(
        &mut self,
        other: DiReservoir,
        mis_weight: f32,
        target_function: f32,
        jacobian: f32,
        wnoise: &mut WhiteNoise,
    ) -> bool {
        let weight =
            (mis_weight * target_function * other.ucw * jacobian).or_zero();

        self.m = self.m.saturating_add(other.m);
        self.weight_sum += weight;

        if wnoise.sample() * self.weight_sum < weight {
            self.sample = other.sample;
            self.sample.target_function = target_function;
            true
        } else {
            false
        }
    }

    pub fn end(&mut self) {
        self.ucw = if self.weight_sum <= 0.0
            || self.sample.target_function <= 0.0
        {
            0.0
        } else {
            (self.weight_sum / self.sample.target_function).or_zero()
        };
    }

    pub fn end_with_normalization(
        &mut self,
        normalization_numerator: f32,
        normalization_denominator: f32,
    ) {
        self.ucw = if self.weight_sum <= 0.0
            || self.sample.target_function <= 0.0
            || normalization_numerator == 0.0
            || normalization_denominator == 0.0
        {
            0.0
        } else {
            (self.weight_sum / self.sample.target_function
                * normalization_numerator
                / normalization_denominator)
                .or_zero()
        };
    }

    /// Panics (in debug builds) if this reservoir contains invalid values.
    pub fn sanity_check(&self, pixel: UVec2) {
        debug_assert!(
            self.weight_sum.is_finite() && self.weight_sum >= 0.0,
            "pixel {pixel}: invalid weight sum ({})",
            self.weight_sum
        );

        debug_assert!(
            self.ucw.is_finite() && self.ucw >= 0.0,
            "pixel {pixel}: invalid unbiased contribution weight ({})",
            self.ucw
        );

        debug_assert!(
            self.ucw == 0.0
                || (self.sample.target_function.is_finite()
                    && self.sample.target_function >= 0.0),
            "pixel {pixel}: invalid target function ({})",
            self.sample.target_function
        );
    }

    /// Limits this reservoir's confidence; zero means no limit.
    pub fn clamp_m(&mut self, max: u32) {
        if max > 0 {
            self.m = self.m.min(max);
        }
    }

    /// Shadow-tests the selected sample, dropping its contribution if it's
    /// occluded.
    pub fn visibility_reuse(&mut self, scene: &impl Scene, surface: &Surface) {
        if self.ucw > 0.0 && self.sample.is_occluded(scene, surface.point) {
            self.ucw = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;
    use crate::{testing::TestScene, wang_hash};

    fn sample(light_id: u32, target_function: f32) -> DiSample {
        DiSample {
            light_id: LightId::new(light_id),
            flags: 0,
            light_point: vec3(light_id as f32, 1.0, 0.0),
            target_function,
        }
    }

    fn finished(sample: DiSample, m: u32, weight: f32) -> DiReservoir {
        let mut reservoir = DiReservoir {
            sample,
            m,
            weight_sum: weight,
            ucw: 0.0,
        };

        reservoir.end();
        reservoir
    }

    #[test]
    fn layout() {
        assert_eq!(24, std::mem::size_of::<DiSample>());
        assert_eq!(36, std::mem::size_of::<DiReservoir>());
    }

    #[test]
    fn add_one_candidate_is_proportional_to_weight() {
        let trials = 100_000;
        let mut hits = 0;

        for trial in 0..trials {
            let mut wnoise = WhiteNoise::new(wang_hash(trial));
            let mut reservoir = DiReservoir::default();

            reservoir.add_one_candidate(sample(1, 5.0), 5.0, &mut wnoise);
            reservoir.add_one_candidate(sample(2, 1.0), 1.0, &mut wnoise);

            assert_eq!(2, reservoir.m);
            assert_eq!(6.0, reservoir.weight_sum);

            if reservoir.sample.light_id == LightId::new(1) {
                hits += 1;
            }
        }

        let ratio = hits as f32 / trials as f32;

        assert_relative_eq!(5.0 / 6.0, ratio, epsilon = 0.01);
    }

    #[test]
    fn zero_weights_are_never_selected() {
        let mut wnoise = WhiteNoise::new(1);
        let mut reservoir = DiReservoir::default();

        assert!(!reservoir.add_one_candidate(sample(1, 0.0), 0.0, &mut wnoise));
        assert!(!reservoir.add_one_candidate(
            sample(2, 1.0),
            f32::NAN,
            &mut wnoise
        ));

        assert_eq!(2, reservoir.m);
        assert_eq!(0.0, reservoir.weight_sum);
        assert_eq!(DiSample::default(), reservoir.sample);
    }

    #[test]
    fn combine_with_preserves_m() {
        let mut wnoise = WhiteNoise::new(123);
        let mut reservoir = DiReservoir::default();

        reservoir.combine_with(
            finished(sample(1, 2.0), 4, 3.0),
            1.0,
            2.5,
            1.0,
            &mut wnoise,
        );

        reservoir.combine_with(
            finished(sample(2, 0.0), 7, 0.0),
            1.0,
            0.0,
            1.0,
            &mut wnoise,
        );

        reservoir.combine_with(DiReservoir::default(), 1.0, 0.0, 1.0, &mut wnoise);

        assert_eq!(11, reservoir.m);

        // The only non-zero contribution must have been selected, with its
        // target function replaced
        assert_eq!(LightId::new(1), reservoir.sample.light_id);
        assert_eq!(2.5, reservoir.sample.target_function);
        assert_relative_eq!(2.5 * 1.5, reservoir.weight_sum);
    }

    #[test]
    fn combining_empty_reservoir_is_identity() {
        let mut wnoise = WhiteNoise::new(5);
        let mut reservoir = DiReservoir::default();

        reservoir.add_one_candidate(sample(3, 2.0), 4.0, &mut wnoise);

        let expected = reservoir;

        assert!(!reservoir.combine_with(
            DiReservoir::default(),
            1.0,
            123.0,
            1.0,
            &mut wnoise
        ));

        assert_eq!(expected, reservoir);
    }

    #[test]
    fn end() {
        let mut reservoir = DiReservoir::default();

        reservoir.end();
        assert_eq!(0.0, reservoir.ucw);

        let mut reservoir = finished(sample(1, 0.0), 1, 2.0);

        reservoir.end();
        assert_eq!(0.0, reservoir.ucw);

        let mut reservoir = finished(sample(1, 4.0), 1, 2.0);

        reservoir.end();
        assert_eq!(0.5, reservoir.ucw);
    }

    #[test]
    fn end_with_normalization() {
        let mut reservoir = finished(sample(1, 4.0), 3, 2.0);

        reservoir.end_with_normalization(0.0, 3.0);
        assert_eq!(0.0, reservoir.ucw);

        reservoir.end_with_normalization(1.0, 0.0);
        assert_eq!(0.0, reservoir.ucw);

        reservoir.end_with_normalization(1.0, 4.0);
        assert_eq!(0.125, reservoir.ucw);
    }

    #[test]
    fn clamp_m() {
        let mut reservoir = finished(sample(1, 4.0), 30, 2.0);

        reservoir.clamp_m(0);
        assert_eq!(30, reservoir.m);

        reservoir.clamp_m(10);
        assert_eq!(10, reservoir.m);

        reservoir.clamp_m(20);
        assert_eq!(10, reservoir.m);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "pixel [3, 4]: invalid weight sum")]
    fn sanity_check() {
        let reservoir = DiReservoir {
            weight_sum: f32::NAN,
            ..Default::default()
        };

        reservoir.sanity_check(uvec2(3, 4));
    }

    #[test]
    fn jacobian() {
        let scene = TestScene::single_light();
        let light = scene.lights()[0];

        let sample = DiSample {
            light_id: LightId::new(0),
            flags: 0,
            light_point: light.center,
            target_function: 1.0,
        };

        let below = light.center - Vec3::Y;

        assert_eq!(
            Some(1.0),
            sample.jacobian(&scene, below, below, 10.0)
        );

        // Moving twice as far away (along the normal) makes the solid angle
        // four times smaller
        let jacobian =
            sample.jacobian(&scene, below, light.center - 2.0 * Vec3::Y, 10.0);

        assert_relative_eq!(0.25, jacobian.unwrap(), epsilon = 0.0001);

        // ... which gets rejected by a strict-enough threshold
        assert_eq!(
            None,
            sample.jacobian(&scene, below, light.center - 2.0 * Vec3::Y, 2.0)
        );

        // Grazing reconnections are rejected as well
        assert_eq!(
            None,
            sample.jacobian(
                &scene,
                below,
                light.center + vec3(5.0, 0.0, 0.0),
                10.0
            )
        );
    }

    #[test]
    fn envmap_jacobian() {
        let scene = TestScene::single_light();

        let sample = DiSample {
            light_id: LightId::default(),
            flags: DiSample::FLAG_ENVMAP,
            light_point: Vec3::Y,
            target_function: 1.0,
        };

        assert_eq!(
            Some(1.0),
            sample.jacobian(&scene, Vec3::ZERO, vec3(100.0, 0.0, 0.0), 10.0)
        );
    }

    #[test]
    fn visibility_reuse() {
        let scene = TestScene::single_light()
            .with_occluder(vec3(0.0, 1.0, 0.0), 0.25);

        let light = scene.lights()[0];

        let surface = Surface {
            normal: Vec3::Y,
            ..Default::default()
        };

        let mut reservoir = finished(
            DiSample {
                light_id: LightId::new(0),
                flags: 0,
                light_point: light.center,
                target_function: 1.0,
            },
            1,
            1.0,
        );

        reservoir.visibility_reuse(&scene, &Surface {
            point: vec3(3.0, 0.0, 3.0),
            ..surface
        });

        assert_eq!(1.0, reservoir.ucw);

        reservoir.visibility_reuse(&scene, &surface);

        assert_eq!(0.0, reservoir.ucw);
    }
}
